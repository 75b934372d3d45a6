use clap::Parser;
use image_classifier::config::Config;
use image_classifier::image_classifier::global::get_classifier_with;
use image_classifier::image_classifier::interface::ImageClassifier;
use std::path::PathBuf;

mod app;

/// Classify images into the 1000 ImageNet categories with MobileNetV2.
#[derive(Parser)]
struct Args {
    /// Images to classify. Opens the window when none are given.
    images: Vec<PathBuf>,

    /// Number of predictions per image (defaults to the configured value).
    #[arg(long)]
    top_k: Option<usize>,

    /// ONNX weights (defaults to $IMAGE_CLASSIFIER_MODEL or models/mobilenetv2-7.onnx).
    #[arg(long)]
    model: Option<PathBuf>,

    /// Label list replacing the built-in ImageNet categories, one per line.
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Open the window even when images are given.
    #[arg(long)]
    gui: bool,
}

impl Args {
    fn top_k(&self, config: &Config) -> usize {
        self.top_k.unwrap_or(config.default_top_k)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = Config::from_env().with_overrides(args.model.clone(), args.labels.clone());
    let top_k = args.top_k(&config);

    if args.gui || args.images.is_empty() {
        return app::run(config);
    }

    let classifier = get_classifier_with(&config)?;

    for path in &args.images {
        println!("{}", path.display());

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("  could not read: {}", e);
                continue;
            }
        };

        match classifier.predict_bytes(&bytes, top_k) {
            Ok(predictions) => {
                for (i, prediction) in predictions.iter().enumerate() {
                    println!(
                        "  {:>2}. {:<40} {:>5.1}%",
                        i + 1,
                        prediction.label,
                        prediction.confidence * 100.0
                    );
                }
            }
            Err(e) => eprintln!("  {}", e.user_message()),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_defaults_to_config() {
        let config = Config {
            default_top_k: 7,
            ..Config::default()
        };

        let args = Args::parse_from(["image-classifier", "dog.jpg"]);

        assert_eq!(args.top_k(&config), 7);
    }

    #[test]
    fn test_top_k_flag_overrides_config() {
        let args = Args::parse_from(["image-classifier", "--top-k", "3", "dog.jpg"]);

        assert_eq!(args.top_k(&Config::default()), 3);
    }
}
