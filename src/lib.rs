//! Top-K ImageNet classification of a single image with a pretrained
//! MobileNetV2, behind a lazily loaded process-wide pipeline.

pub mod config;
pub mod error;
pub mod image_classifier;
pub mod label_catalog;
pub mod library;
pub mod network;

pub use error::ClassifierError;
pub use image_classifier::global::{get_classifier, get_classifier_with};
pub use image_classifier::interface::{ImageClassifier, Prediction};
pub use image_classifier::pipeline::{ClassificationPipeline, ClassifierState};
