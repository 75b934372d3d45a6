use crate::error::ClassifierError;
use std::sync::Arc;
use tract_onnx::prelude::Tensor;

/// A loaded network: a fixed function from a `[1, 3, 224, 224]` tensor to
/// one unnormalized score per class.
pub trait Network: Send + Sync {
    fn logits(&self, input: Tensor) -> Result<Vec<f32>, ClassifierError>;
}

/// Produces the network. Expensive; the pipeline calls it at most once per
/// successful load.
pub trait NetworkLoader: Send + Sync {
    fn load(&self) -> Result<Arc<dyn Network>, ClassifierError>;

    /// Where the weights come from, for log lines.
    fn source(&self) -> String;
}

impl<T: NetworkLoader + ?Sized> NetworkLoader for Arc<T> {
    fn load(&self) -> Result<Arc<dyn Network>, ClassifierError> {
        (**self).load()
    }

    fn source(&self) -> String {
        (**self).source()
    }
}
