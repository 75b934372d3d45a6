use crate::error::ClassifierError;
use image::DynamicImage;

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    /// Probability in `[0, 1]`, not a percentage.
    pub confidence: f32,
}

pub trait ImageClassifier: Send + Sync {
    /// The `top_k` most likely labels for `image`, most likely first.
    fn predict(
        &self,
        image: &DynamicImage,
        top_k: usize,
    ) -> Result<Vec<Prediction>, ClassifierError>;

    /// Same as [`ImageClassifier::predict`] for still-encoded bytes (jpg, png, webp...).
    fn predict_bytes(&self, bytes: &[u8], top_k: usize) -> Result<Vec<Prediction>, ClassifierError>;
}
