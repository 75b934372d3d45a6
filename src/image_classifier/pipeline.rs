use crate::error::ClassifierError;
use crate::image_classifier::interface::{ImageClassifier, Prediction};
use crate::image_classifier::preprocess::preprocess;
use crate::image_classifier::ranking::{softmax, top_k};
use crate::label_catalog::LabelCatalog;
use crate::library::logger::interface::Logger;
use crate::network::interface::{Network, NetworkLoader};
use image::{DynamicImage, GenericImageView};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierState {
    Uninitialized,
    Loading,
    Ready,
}

/// Raised for the duration of a load. Lowered on drop, so a panicking
/// loader also leaves the pipeline `Uninitialized`.
struct LoadingFlag<'a>(&'a AtomicBool);

impl<'a> LoadingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Preprocessing, one forward pass and ranking around a lazily loaded network.
///
/// The network is loaded at most once. Concurrent first callers wait behind
/// the one doing the load. A failed load leaves the pipeline `Uninitialized`
/// so the next call tries again. After that `predict` never mutates anything.
pub struct ClassificationPipeline {
    loader: Box<dyn NetworkLoader>,
    network: OnceLock<Arc<dyn Network>>,
    load_lock: Mutex<()>,
    loading: AtomicBool,
    catalog: Arc<LabelCatalog>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ClassificationPipeline {
    pub fn new(
        loader: Box<dyn NetworkLoader>,
        catalog: Arc<LabelCatalog>,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            loader,
            network: OnceLock::new(),
            load_lock: Mutex::new(()),
            loading: AtomicBool::new(false),
            catalog,
            logger: logger.with_namespace("pipeline"),
        }
    }

    pub fn state(&self) -> ClassifierState {
        // The flag is read first: it is only lowered after the network is
        // stored, so a lowered flag with no network means no load has finished.
        let loading = self.loading.load(Ordering::SeqCst);
        if self.network.get().is_some() {
            ClassifierState::Ready
        } else if loading {
            ClassifierState::Loading
        } else {
            ClassifierState::Uninitialized
        }
    }

    pub fn catalog(&self) -> &LabelCatalog {
        &self.catalog
    }

    /// Loads the network now instead of on the first prediction.
    pub fn load(&self) -> Result<(), ClassifierError> {
        self.network().map(|_| ())
    }

    fn network(&self) -> Result<&dyn Network, ClassifierError> {
        if let Some(network) = self.network.get() {
            return Ok(&**network);
        }

        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Whoever held the lock before us may have finished the load.
        if let Some(network) = self.network.get() {
            return Ok(&**network);
        }

        let loading = LoadingFlag::raise(&self.loading);
        let _ = self
            .logger
            .info(&format!("Loading network from {}", self.loader.source()));
        let started = Instant::now();

        match self.loader.load() {
            Ok(network) => {
                let network = self.network.get_or_init(|| network);
                drop(loading);
                let _ = self.logger.info(&format!(
                    "Network ready in {:.2}s",
                    started.elapsed().as_secs_f32()
                ));
                Ok(&**network)
            }
            Err(e) => {
                drop(loading);
                let _ = self
                    .logger
                    .error(&format!("Network load failed: {}", e.user_message()));
                Err(e)
            }
        }
    }

    fn check_top_k(&self, top_k: usize) -> Result<(), ClassifierError> {
        if top_k == 0 || top_k > self.catalog.len() {
            return Err(ClassifierError::invalid_input(format!(
                "top_k must be between 1 and {}, got {}",
                self.catalog.len(),
                top_k
            )));
        }
        Ok(())
    }

    /// Probability of every class in catalog order.
    pub fn probabilities(&self, image: &DynamicImage) -> Result<Vec<f32>, ClassifierError> {
        let network = self.network()?;
        let input = preprocess(image)?;
        let logits = network.logits(input)?;

        if logits.len() != self.catalog.len() {
            return Err(ClassifierError::inference(format!(
                "network produced {} scores for {} labels",
                logits.len(),
                self.catalog.len()
            )));
        }

        if let Some(index) = logits.iter().position(|logit| !logit.is_finite()) {
            return Err(ClassifierError::inference(format!(
                "network produced a non-finite score ({}) for class {}",
                logits[index], index
            )));
        }

        Ok(softmax(&logits))
    }
}

impl ImageClassifier for ClassificationPipeline {
    fn predict(
        &self,
        image: &DynamicImage,
        top_k_count: usize,
    ) -> Result<Vec<Prediction>, ClassifierError> {
        self.check_top_k(top_k_count)?;

        let probabilities = self.probabilities(image)?;

        let predictions: Vec<Prediction> = top_k(&probabilities, top_k_count)
            .into_iter()
            .map(|(index, confidence)| Prediction {
                label: self.catalog.label(index).to_string(),
                confidence,
            })
            .collect();

        if let Some(best) = predictions.first() {
            let (width, height) = image.dimensions();
            let _ = self.logger.info(&format!(
                "Classified {}x{} image: {} ({:.3})",
                width,
                height,
                best.label,
                best.confidence
            ));
        }

        Ok(predictions)
    }

    fn predict_bytes(&self, bytes: &[u8], top_k: usize) -> Result<Vec<Prediction>, ClassifierError> {
        self.check_top_k(top_k)?;
        let image = image::load_from_memory(bytes)?;
        self.predict(&image, top_k)
    }
}
