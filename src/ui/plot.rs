use eframe::egui::{self, Color32, TextureHandle, Ui};
use egui_plot::{Plot, PlotImage, PlotPoint};

use crate::color::ColorScale;
use crate::data::model::Frame;
use crate::state::{AppState, Limits};

// ---------------------------------------------------------------------------
// Image plot (central panel)
// ---------------------------------------------------------------------------

/// Render the selected frame with its colour bar and a hover readout.
///
/// Pixel centres sit on integer plot coordinates, with row 0 at the top
/// (plot `y = -row`).
pub fn image_plot(ui: &mut Ui, state: &AppState, texture: Option<&TextureHandle>) {
    let (frame, texture) = match (state.current_frame(), texture) {
        (Some(frame), Some(texture)) => (frame, texture),
        _ => {
            let msg = if state.dataset.is_none() {
                "No data available  (File → Open acquisition…)"
            } else {
                "Selected frame is not available"
            };
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading(msg);
            });
            return;
        }
    };

    let limits = state.current_limits();
    let (rows, cols) = frame.dim();
    let center = PlotPoint::new((cols as f64 - 1.0) / 2.0, -(rows as f64 - 1.0) / 2.0);

    let bar_height = 48.0;
    let plot_height = (ui.available_height() - bar_height).max(100.0);

    let response = Plot::new("frame_plot")
        .data_aspect(1.0)
        .height(plot_height)
        .x_axis_label("x (px)")
        .y_axis_label("y (px)")
        .y_axis_formatter(|mark, _range| {
            let row = -mark.value;
            format!("{}", if row == 0.0 { 0.0 } else { row })
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.image(PlotImage::new(
                texture,
                center,
                [cols as f32, rows as f32],
            ));
            plot_ui.pointer_coordinate()
        });

    let hover = response
        .inner
        .map(|p| readout(frame, p.x, -p.y))
        .unwrap_or_default();

    color_bar(ui, limits, &hover);
}

/// Text shown for the pointer at column `x`, row `y`.
pub fn readout(frame: &Frame, x: f64, y: f64) -> String {
    let (rows, cols) = frame.dim();
    let col = (x + 0.5).floor();
    let row = (y + 0.5).floor();
    if col >= 0.0 && row >= 0.0 && (col as usize) < cols && (row as usize) < rows {
        let (c, r) = (col as usize, row as usize);
        format!("({c},{r}), z={:.2}", frame[[r, c]])
    } else {
        format!("x={x:.4}, y={y:.4}")
    }
}

// ---------------------------------------------------------------------------
// Colour bar
// ---------------------------------------------------------------------------

fn color_bar(ui: &mut Ui, limits: Limits, hover: &str) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(limits.min.to_string());

        let width = (ui.available_width() - 220.0).max(60.0);
        let (rect, _) = ui.allocate_exact_size(egui::vec2(width, 16.0), egui::Sense::hover());
        let painter = ui.painter();
        let steps = 64;
        let step_width = rect.width() / steps as f32;
        for i in 0..steps {
            let t = i as f32 / (steps - 1) as f32;
            let x0 = rect.left() + i as f32 * step_width;
            painter.rect_filled(
                egui::Rect::from_min_size(
                    egui::pos2(x0, rect.top()),
                    egui::vec2(step_width + 1.0, rect.height()),
                ),
                0.0,
                ColorScale::color_at(t),
            );
        }
        painter.rect_stroke(
            rect,
            0.0,
            egui::Stroke::new(1.0, Color32::GRAY),
            egui::StrokeKind::Inside,
        );

        ui.label(limits.max.to_string());
        ui.separator();
        ui.monospace(hover);
    });
}
