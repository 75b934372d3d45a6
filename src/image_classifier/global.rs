use crate::config::Config;
use crate::error::ClassifierError;
use crate::image_classifier::pipeline::ClassificationPipeline;
use crate::label_catalog::LabelCatalog;
use crate::library::logger::impl_console::LoggerConsole;
use crate::network::impl_tract_onnx::NetworkLoaderTractOnnx;
use std::sync::{Arc, OnceLock};

static CLASSIFIER: OnceLock<ClassificationPipeline> = OnceLock::new();

pub fn build_pipeline(config: &Config) -> Result<ClassificationPipeline, ClassifierError> {
    let logger = Arc::new(LoggerConsole::new(config.logger_timezone));

    let catalog = match &config.labels_path {
        Some(path) => LabelCatalog::from_path(path)?,
        None => LabelCatalog::imagenet()?,
    };

    let loader = NetworkLoaderTractOnnx::new(config.model_path.clone(), logger.clone());

    Ok(ClassificationPipeline::new(
        Box::new(loader),
        Arc::new(catalog),
        logger,
    ))
}

/// The process-wide classifier, configured from the environment.
pub fn get_classifier() -> Result<&'static ClassificationPipeline, ClassifierError> {
    get_classifier_with(&Config::from_env())
}

/// The process-wide classifier. `config` is only used by the call that
/// constructs it; every call makes sure the network is loaded.
pub fn get_classifier_with(
    config: &Config,
) -> Result<&'static ClassificationPipeline, ClassifierError> {
    let pipeline = match CLASSIFIER.get() {
        Some(pipeline) => pipeline,
        None => {
            // Construction does not touch the network, so losing a race here
            // only drops an unloaded pipeline.
            let built = build_pipeline(config)?;
            CLASSIFIER.get_or_init(|| built)
        }
    };

    pipeline.load()?;

    Ok(pipeline)
}
