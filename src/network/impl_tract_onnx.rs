use crate::error::ClassifierError;
use crate::image_classifier::preprocess::CROP_SIZE;
use crate::library::logger::interface::Logger;
use crate::network::interface::{Network, NetworkLoader};
use std::path::PathBuf;
use std::sync::Arc;
use tract_onnx::prelude::*;

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

pub struct NetworkTractOnnx {
    model: Plan,
}

impl Network for NetworkTractOnnx {
    fn logits(&self, input: Tensor) -> Result<Vec<f32>, ClassifierError> {
        let outputs = self
            .model
            .run(tvec!(input.into_tvalue()))
            .map_err(ClassifierError::inference)?;

        let output = outputs
            .first()
            .ok_or_else(|| ClassifierError::inference("model produced no outputs"))?;

        let scores = output
            .to_array_view::<f32>()
            .map_err(ClassifierError::inference)?;

        Ok(scores.iter().copied().collect())
    }
}

pub struct NetworkLoaderTractOnnx {
    model_path: PathBuf,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl NetworkLoaderTractOnnx {
    pub fn new(model_path: PathBuf, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            model_path,
            logger: logger.with_namespace("tract_onnx"),
        }
    }

    fn build_plan(&self) -> TractResult<Plan> {
        let side = CROP_SIZE as usize;
        let plan = tract_onnx::onnx()
            .model_for_path(&self.model_path)?
            .with_input_fact(0, f32::fact([1, 3, side, side]).into())?
            .into_optimized()?
            .into_runnable()?;
        Ok(plan)
    }
}

impl NetworkLoader for NetworkLoaderTractOnnx {
    fn load(&self) -> Result<Arc<dyn Network>, ClassifierError> {
        if !self.model_path.is_file() {
            return Err(ClassifierError::model_load(
                self.source(),
                "weights file not found; download mobilenetv2-7.onnx from the ONNX model zoo or set IMAGE_CLASSIFIER_MODEL",
            ));
        }

        let _ = self.logger.info(&format!("Optimizing {}", self.source()));

        let model = self
            .build_plan()
            .map_err(|e| ClassifierError::model_load(self.source(), e))?;

        Ok(Arc::new(NetworkTractOnnx { model }))
    }

    fn source(&self) -> String {
        self.model_path.display().to_string()
    }
}
