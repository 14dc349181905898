use crate::app::{ClassifierApp, PREVIEW_SIDE};

use std::path::PathBuf;

use eframe::egui;
use scenery::{LEGEND, SUPPORTED_EXTENSIONS, is_supported_path};

/// Legend line shown under the controls.
pub fn legend_text() -> String {
    format!("Classes: {}", LEGEND)
}

/// Asks for a JPEG or PNG through the native open dialog.
fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select an image")
        .add_filter("Image files", &SUPPORTED_EXTENSIONS[..])
        .pick_file()
}

/// Draws the left panel with the path field and the legend.
pub fn draw_side_panel(app: &mut ClassifierApp, ctx: &egui::Context) {
    egui::SidePanel::left("controls_panel")
        .min_width(240.0)
        .show(ctx, |ui| {
            ui.heading("Image Classification");
            ui.separator();

            if ui.button("Upload Image").clicked() {
                if let Some(path) = pick_image() {
                    app.submit(&path);
                }
            }
            ui.label("...or drop an image onto the window.");

            ui.separator();
            ui.label("Image path (JPEG or PNG):");
            let response = ui.text_edit_singleline(&mut app.path_input);
            let entered =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Classify").clicked() || entered {
                app.submit_input();
            }

            ui.separator();
            ui.label(legend_text());
            if !app.pipeline.is_available() {
                ui.colored_label(egui::Color32::RED, "Models not loaded");
            }
        });
}

/// Draws the preview and the report text.
pub fn draw_central_panel(app: &mut ClassifierApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let side = PREVIEW_SIDE as f32;
        match &app.preview {
            Some(texture) => {
                let sized = egui::load::SizedTexture::from_handle(texture);
                ui.add(egui::Image::from_texture(sized).fit_to_exact_size(egui::vec2(side, side)));
            }
            None => {
                let (rect, _) = ui.allocate_exact_size(egui::vec2(side, side), egui::Sense::hover());
                ui.painter().rect_filled(rect, 0.0, egui::Color32::from_gray(40));
            }
        }

        ui.separator();
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.add(
                egui::TextEdit::multiline(&mut app.result_text.as_str())
                    .desired_width(f32::INFINITY)
                    .desired_rows(6)
                    .font(egui::TextStyle::Monospace),
            );
        });
    });
}

/// Shows the pending error, if any, until the user closes it.
pub fn draw_error_dialog(app: &mut ClassifierApp, ctx: &egui::Context) {
    let Some(message) = &app.error else {
        return;
    };
    let mut dismissed = false;
    egui::Window::new("Error")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(message);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });
    if dismissed {
        app.error = None;
    }
}

/// Submits the first dropped file with a supported extension.
pub fn handle_dropped_files(app: &mut ClassifierApp, ctx: &egui::Context) {
    let dropped = ctx.input(|i| i.raw.dropped_files.clone());
    if dropped.is_empty() {
        return;
    }
    let path = dropped
        .into_iter()
        .filter_map(|file| file.path)
        .find(|path| is_supported_path(path));
    match path {
        Some(path) => {
            app.submit(&path);
        }
        None => app.error = Some("Please drop a .jpg, .jpeg or .png file.".to_string()),
    }
}
