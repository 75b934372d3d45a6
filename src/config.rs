use chrono::Offset;
use std::path::PathBuf;

pub const ENV_MODEL_PATH: &str = "IMAGE_CLASSIFIER_MODEL";
pub const ENV_LABELS_PATH: &str = "IMAGE_CLASSIFIER_LABELS";

#[derive(Debug, Clone)]
pub struct Config {
    /// ONNX export of MobileNetV2 trained on ImageNet-1K.
    pub model_path: PathBuf,
    /// Replaces the embedded ImageNet label list when set.
    pub labels_path: Option<PathBuf>,
    pub logger_timezone: chrono::FixedOffset,
    pub default_top_k: usize,
    /// Upper bound of the UI slider. The pipeline itself accepts up to the catalog size.
    pub max_top_k_ui: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/mobilenetv2-7.onnx"),
            labels_path: None,
            logger_timezone: chrono::Utc.fix(),
            default_top_k: 5,
            max_top_k_ui: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_overrides(
            std::env::var_os(ENV_MODEL_PATH).map(PathBuf::from),
            std::env::var_os(ENV_LABELS_PATH).map(PathBuf::from),
        )
    }

    pub fn with_overrides(mut self, model_path: Option<PathBuf>, labels_path: Option<PathBuf>) -> Self {
        if let Some(model_path) = model_path {
            self.model_path = model_path;
        }
        if labels_path.is_some() {
            self.labels_path = labels_path;
        }
        self
    }
}
