//! Error types for the classification pipeline.
//!
//! Every failure surfaced by [`crate::image_classifier::pipeline::ClassificationPipeline`]
//! is one of these variants. Nothing is retried internally; the caller decides
//! what to show the user.

use thiserror::Error;

/// Errors that can occur while loading the network or classifying an image.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The caller passed an argument outside the accepted range (e.g. `top_k`).
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// The image bytes could not be decoded into a bitmap.
    #[error("image decode")]
    Decode(#[from] image::ImageError),

    /// The pretrained weights could not be read or initialized.
    #[error("model load from '{path}'")]
    ModelLoad {
        /// Where the weights were expected.
        path: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The label catalog could not be read or has the wrong shape.
    #[error("label catalog: {message}")]
    Catalog {
        /// A message describing the catalog problem.
        message: String,
    },

    /// The forward pass failed or produced an unexpected output.
    #[error("inference")]
    Inference(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ClassifierError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn model_load(
        path: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ModelLoad {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn inference(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Inference(source.into())
    }

    /// Catalog failures happen while the classifier is being set up, so they
    /// are reported to users the same way as missing weights.
    pub fn is_model_load(&self) -> bool {
        matches!(self, Self::ModelLoad { .. } | Self::Catalog { .. })
    }

    /// Message suitable for showing in the UI, including the source chain.
    pub fn user_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = std::error::Error::source(cause);
        }
        message
    }
}
