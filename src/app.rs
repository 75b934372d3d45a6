use eframe::egui;
use image::DynamicImage;
use image_classifier::config::Config;
use image_classifier::error::ClassifierError;
use image_classifier::image_classifier::global::get_classifier_with;
use image_classifier::image_classifier::interface::{ImageClassifier, Prediction};
use std::path::Path;

const ACCEPTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

struct Upload {
    name: String,
    image: DynamicImage,
    texture: egui::TextureHandle,
}

struct ClassifierWindow {
    config: Config,
    top_k: usize,
    path_input: String,
    upload: Option<Upload>,
    predictions: Option<Vec<Prediction>>,
    message: Option<String>,
}

impl ClassifierWindow {
    fn new(config: Config) -> Self {
        Self {
            top_k: config.default_top_k,
            config,
            path_input: String::new(),
            upload: None,
            predictions: None,
            message: None,
        }
    }

    fn open_path(&mut self, ctx: &egui::Context) {
        let path = Path::new(self.path_input.trim()).to_path_buf();

        let accepted = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if !accepted {
            self.message = Some(format!(
                "Choose a {} file",
                ACCEPTED_EXTENSIONS.join(", ")
            ));
            return;
        }

        match std::fs::read(&path) {
            Ok(bytes) => self.open_bytes(ctx, path.display().to_string(), &bytes),
            Err(e) => self.message = Some(format!("Could not read {}: {}", path.display(), e)),
        }
    }

    fn open_bytes(&mut self, ctx: &egui::Context, name: String, bytes: &[u8]) {
        self.predictions = None;
        match image::load_from_memory(bytes) {
            Ok(image) => {
                let rgba = image.to_rgba8();
                let size = [rgba.width() as usize, rgba.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                let texture = ctx.load_texture("upload", color_image, egui::TextureOptions::default());
                self.upload = Some(Upload {
                    name,
                    image,
                    texture,
                });
                self.message = None;
            }
            Err(e) => {
                self.upload = None;
                self.message = Some(ClassifierError::from(e).user_message());
            }
        }
    }

    fn classify(&mut self) {
        let Some(upload) = &self.upload else {
            return;
        };

        let result = get_classifier_with(&self.config)
            .and_then(|classifier| classifier.predict(&upload.image, self.top_k));

        match result {
            Ok(predictions) => {
                self.predictions = Some(predictions);
                self.message = None;
            }
            Err(e) => {
                self.predictions = None;
                self.message = Some(e.user_message());
            }
        }
    }
}

impl eframe::App for ClassifierWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if let Some(bytes) = file.bytes {
                self.open_bytes(ctx, file.name, &bytes);
            } else if let Some(path) = file.path {
                self.path_input = path.display().to_string();
                self.open_path(ctx);
            }
        }

        egui::SidePanel::left("sidebar").show(ctx, |ui| {
            ui.heading("About");
            ui.label(
                "This app uses a pretrained MobileNetV2 model to classify images \
                 into 1000 ImageNet categories.",
            );
            ui.add_space(12.0);
            ui.heading("Settings");
            ui.label("Number of predictions");
            ui.add(egui::Slider::new(&mut self.top_k, 1..=self.config.max_top_k_ui));
        });

        let mut open_clicked = false;
        let mut classify_clicked = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Image Classifier");
                ui.label("Upload an image to classify it using MobileNetV2 trained on ImageNet.");
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    ui.label("Image path:");
                    let response = ui.text_edit_singleline(&mut self.path_input);
                    let submitted =
                        response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    open_clicked = ui.button("Open").clicked() || submitted;
                });

                if let Some(message) = &self.message {
                    ui.colored_label(egui::Color32::RED, message);
                }

                match &self.upload {
                    Some(upload) => {
                        let size = upload.texture.size_vec2();
                        let scale = (ui.available_width() / size.x).min(1.0);
                        ui.image((upload.texture.id(), size * scale));
                        ui.label(&upload.name);

                        classify_clicked = ui.button("🔍 Classify Image").clicked();
                    }
                    None => {
                        ui.label("👆 Upload an image to get started!");
                        ui.add_space(8.0);
                        ui.strong("How it works");
                        ui.label("1. Open a JPG, PNG, or WebP image (or drop it on the window)");
                        ui.label("2. Click \"Classify Image\"");
                        ui.label("3. View the top predictions with confidence scores");
                    }
                }

                if let Some(predictions) = &self.predictions {
                    ui.add_space(8.0);
                    ui.heading("Predictions");
                    for (i, prediction) in predictions.iter().enumerate() {
                        ui.horizontal(|ui| {
                            ui.strong(format!("{}. {}", i + 1, prediction.label));
                        });
                        ui.horizontal(|ui| {
                            ui.add(
                                egui::ProgressBar::new(prediction.confidence)
                                    .desired_width(ui.available_width() * 0.75),
                            );
                            ui.label(format!("{:.1}%", prediction.confidence * 100.0));
                        });
                    }
                }
            });
        });

        if open_clicked {
            self.open_path(ctx);
        }
        if classify_clicked {
            self.classify();
        }
    }
}

pub fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    let window = ClassifierWindow::new(config);

    eframe::run_native(
        "Image Classifier",
        options,
        Box::new(|_cc| Box::new(window)),
    )?;

    Ok(())
}
