use crate::error::ClassifierError;
use crate::library::logger::interface::Logger;
use crate::network::interface::{Network, NetworkLoader};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tract_onnx::prelude::Tensor;

/// Stand-in for the pretrained network: each logit is a fixed bias plus a
/// fixed weighting of the per-channel input means. Deterministic for a seed.
#[derive(Debug, Clone)]
pub struct NetworkFake {
    weights: Vec<[f32; 3]>,
    bias: Vec<f32>,
}

impl NetworkFake {
    pub fn seeded(seed: u64, classes: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let weights = (0..classes)
            .map(|_| {
                [
                    rng.random_range(-4.0..4.0),
                    rng.random_range(-4.0..4.0),
                    rng.random_range(-4.0..4.0),
                ]
            })
            .collect();
        let bias = (0..classes).map(|_| rng.random_range(-1.0..1.0)).collect();

        Self { weights, bias }
    }

    /// Ignores the input and always returns `logits`.
    pub fn fixed(logits: Vec<f32>) -> Self {
        Self {
            weights: vec![[0.0; 3]; logits.len()],
            bias: logits,
        }
    }
}

impl Network for NetworkFake {
    fn logits(&self, input: Tensor) -> Result<Vec<f32>, ClassifierError> {
        let slice = input
            .as_slice::<f32>()
            .map_err(ClassifierError::inference)?;

        let plane = slice.len() / 3;
        let mut means = [0.0f32; 3];
        if plane > 0 {
            for (channel, mean) in means.iter_mut().enumerate() {
                let values = &slice[channel * plane..(channel + 1) * plane];
                *mean = values.iter().sum::<f32>() / plane as f32;
            }
        }

        Ok(self
            .weights
            .iter()
            .zip(self.bias.iter())
            .map(|(w, b)| b + w[0] * means[0] + w[1] * means[1] + w[2] * means[2])
            .collect())
    }
}

pub struct NetworkLoaderFake {
    network: Arc<NetworkFake>,
    delay: Duration,
    failures_remaining: AtomicUsize,
    panics_remaining: AtomicUsize,
    load_count: AtomicUsize,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl NetworkLoaderFake {
    pub fn new(network: NetworkFake, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            network: Arc::new(network),
            delay: Duration::ZERO,
            failures_remaining: AtomicUsize::new(0),
            panics_remaining: AtomicUsize::new(0),
            load_count: AtomicUsize::new(0),
            logger: logger.with_namespace("network").with_namespace("fake"),
        }
    }

    /// Each load blocks for `delay`, widening the window for racing callers.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// The next `failures` loads fail as if the weights were unreachable.
    pub fn with_failures(self, failures: usize) -> Self {
        self.failures_remaining.store(failures, Ordering::SeqCst);
        self
    }

    /// The next `panics` loads panic instead of returning.
    pub fn with_panics(self, panics: usize) -> Self {
        self.panics_remaining.store(panics, Ordering::SeqCst);
        self
    }

    /// How many times `load` has been called, failed attempts included.
    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }
}

impl NetworkLoader for NetworkLoaderFake {
    fn load(&self) -> Result<Arc<dyn Network>, ClassifierError> {
        self.load_count.fetch_add(1, Ordering::SeqCst);
        let _ = self.logger.info("Loading fake network...");
        std::thread::sleep(self.delay);

        let panicked = self
            .panics_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if panicked {
            panic!("simulated loader crash");
        }

        let failed = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(ClassifierError::model_load(
                self.source(),
                "simulated download failure",
            ));
        }

        Ok(self.network.clone())
    }

    fn source(&self) -> String {
        "fake://mobilenet_v2".to_string()
    }
}
