use std::path::{Path, PathBuf};

use eframe::egui;
use eframe::{App, Frame};
use image::DynamicImage;
use image::imageops::FilterType;
use scenery::{ClassifyError, Pipeline, PredictionResult, open_image};
use tracing::info;

use crate::ui;

/// Side of the square the selected image is shown in.
pub const PREVIEW_SIDE: u32 = 300;

/// The desktop form.
///
/// Holds the pipeline built at startup plus whatever the last request left
/// behind: a preview, the report text and an error waiting to be dismissed.
pub struct ClassifierApp {
    pub pipeline: Pipeline,
    /// Contents of the path field.
    pub path_input: String,
    /// Preview pixels from the last accepted image, not yet uploaded to the GPU.
    pub pending_preview: Option<egui::ColorImage>,
    pub preview: Option<egui::TextureHandle>,
    /// Report text of the last successful request.
    pub result_text: String,
    /// Message shown in the error dialog until dismissed.
    pub error: Option<String>,
}

impl ClassifierApp {
    pub fn new(pipeline: Pipeline) -> Self {
        // Same check the form runs on every request, surfaced once at startup.
        let error = pipeline.bank().err().map(|e| e.user_message());
        Self {
            pipeline,
            path_input: String::new(),
            pending_preview: None,
            preview: None,
            result_text: String::new(),
            error,
        }
    }

    /// Runs one request for the image at `path`.
    ///
    /// The previous preview and report are cleared first, so a failed request
    /// leaves only its error behind. The decoded image is returned on success.
    pub fn submit(&mut self, path: &Path) -> Option<DynamicImage> {
        self.clear_result();
        self.path_input = path.display().to_string();
        match self.classify(path) {
            Ok((image, result)) => {
                info!(path = %path.display(), "request finished");
                self.pending_preview = Some(preview_pixels(&image));
                self.result_text = form_report(&result);
                self.error = None;
                Some(image)
            }
            Err(e) => {
                self.error = Some(e.user_message());
                None
            }
        }
    }

    fn classify(&self, path: &Path) -> Result<(DynamicImage, PredictionResult), ClassifyError> {
        self.pipeline.bank()?;
        let image = open_image(path)?;
        let result = self.pipeline.classify_image(&image)?;
        Ok((image, result))
    }

    fn clear_result(&mut self) {
        self.result_text.clear();
        self.pending_preview = None;
        self.preview = None;
    }

    /// Submits whatever is typed in the path field.
    pub fn submit_input(&mut self) {
        let path = PathBuf::from(self.path_input.trim());
        if path.as_os_str().is_empty() {
            self.clear_result();
            self.error = Some("No image selected.".to_string());
            return;
        }
        self.submit(&path);
    }

    /// Moves a freshly decoded preview onto the GPU.
    pub fn upload_preview(&mut self, ctx: &egui::Context) {
        if let Some(pixels) = self.pending_preview.take() {
            self.preview = Some(ctx.load_texture("preview", pixels, egui::TextureOptions::LINEAR));
        }
    }
}

impl App for ClassifierApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.upload_preview(ctx);
        ui::handle_dropped_files(self, ctx);
        ui::draw_side_panel(self, ctx);
        ui::draw_central_panel(self, ctx);
        ui::draw_error_dialog(self, ctx);
    }
}

/// Result box text. The legend lives in the side panel, not here.
pub fn form_report(result: &PredictionResult) -> String {
    format!("Prediction Results:\n\n{}", result)
}

/// Stretches `image` to the preview square, like the form always did.
fn preview_pixels(image: &DynamicImage) -> egui::ColorImage {
    let side = PREVIEW_SIDE as usize;
    let rgba = image
        .resize_exact(PREVIEW_SIDE, PREVIEW_SIDE, FilterType::Triangle)
        .to_rgba8();
    egui::ColorImage::from_rgba_unmultiplied([side, side], rgba.as_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use ndarray::ArrayView1;
    use scenery::{BankError, ClassLabel, LEGEND, Model, ModelBank, ModelKind, PredictError};

    fn unavailable() -> Pipeline {
        Pipeline::new(Err(BankError::MissingModel(ModelKind::RandomForest)))
    }

    struct Fixed(i64);

    impl Model for Fixed {
        fn predict(&self, _features: ArrayView1<f64>) -> Result<ClassLabel, PredictError> {
            Ok(ClassLabel(self.0))
        }
    }

    fn always(label: i64) -> Pipeline {
        let bank = ModelBank::from_models(
            ModelKind::ALL.map(|kind| (kind, Box::new(Fixed(label)) as Box<dyn Model>)),
        );
        Pipeline::new(bank)
    }

    fn write_png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(40, 20, Rgb([10, 200, 30]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn startup_reports_missing_models() {
        let app = ClassifierApp::new(unavailable());
        let error = app.error.as_deref().unwrap();
        assert!(error.starts_with("Models not loaded"), "{error}");
        assert!(error.contains("Random Forest"), "{error}");
    }

    #[test]
    fn submit_without_models_clears_previous_result() {
        let dir = tempfile::tempdir().unwrap();
        let png = write_png(dir.path(), "scene.png");

        let mut app = ClassifierApp::new(unavailable());
        app.error = None;
        app.result_text = "SVM: 1\n".to_string();
        app.pending_preview = Some(egui::ColorImage::new([1, 1], egui::Color32::BLACK));

        assert!(app.submit(&png).is_none());
        assert!(app.error.as_deref().unwrap().starts_with("Models not loaded"));
        assert!(app.result_text.is_empty());
        assert!(app.pending_preview.is_none());
        assert!(app.preview.is_none());
        assert_eq!(app.path_input, png.display().to_string());
    }

    #[test]
    fn successful_request_then_corrupt_upload() {
        let dir = tempfile::tempdir().unwrap();
        let png = write_png(dir.path(), "scene.png");
        let corrupt = dir.path().join("broken.png");
        let bytes = std::fs::read(&png).unwrap();
        std::fs::write(&corrupt, &bytes[..30]).unwrap();

        let mut app = ClassifierApp::new(always(1));
        assert!(app.error.is_none());

        let image = app.submit(&png).unwrap();
        assert_eq!((image.width(), image.height()), (40, 20));
        assert!(app.error.is_none());
        assert!(app.pending_preview.is_some());
        assert_eq!(
            app.result_text,
            "Prediction Results:\n\n\
             SVM: 1\n\
             Decision Tree: 1\n\
             Logistic Regression: 1\n\
             Random Forest: 1\n"
        );
        assert!(!app.result_text.contains(LEGEND));

        assert!(app.submit(&corrupt).is_none());
        let error = app.error.as_deref().unwrap();
        assert!(error.starts_with("Error processing image"), "{error}");
        assert!(app.result_text.is_empty());
        assert!(app.pending_preview.is_none());
    }

    #[test]
    fn empty_path_field_is_rejected() {
        let mut app = ClassifierApp::new(always(0));
        app.result_text = "stale".to_string();
        app.path_input = "   ".to_string();
        app.submit_input();
        assert_eq!(app.error.as_deref(), Some("No image selected."));
        assert!(app.result_text.is_empty());
    }

    #[test]
    fn preview_is_stretched_to_square() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 20, Rgb([1, 2, 3])));
        let pixels = preview_pixels(&image);
        assert_eq!(pixels.size, [300, 300]);
        assert_eq!(pixels.pixels[0], egui::Color32::from_rgb(1, 2, 3));
    }
}
