use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::export_png;
use crate::data::model::{FrameKind, FrameStats};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – image selection and display range
// ---------------------------------------------------------------------------

/// Render the left display panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Display");
    ui.separator();

    // ---- Kinetic index (one per species) ----
    ui.strong("Kinetic frame");
    let mut kinetic = state.selection().kinetic_index;
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for k in 0..state.settings.kinetic_series_length {
            ui.radio_value(&mut kinetic, k, state.settings.kinetic_label(k));
        }
    });
    state.select_kinetic(kinetic);

    // ---- Frame within the OD series ----
    ui.add_space(4.0);
    ui.strong("Image");
    let mut frame = state.selection().frame;
    egui::ComboBox::from_id_salt("frame_kind")
        .selected_text(frame.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for kind in FrameKind::ALL {
                ui.selectable_value(&mut frame, kind, kind.to_string());
            }
        });
    state.select_frame(frame);

    // ---- Colour range, applied on Enter ----
    ui.add_space(4.0);
    ui.strong("Colour range");
    let mut submitted = false;
    egui::Grid::new("limits_grid").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("Min");
        let min = ui.add(egui::TextEdit::singleline(&mut state.min_text).desired_width(80.0));
        ui.end_row();
        ui.label("Max");
        let max = ui.add(egui::TextEdit::singleline(&mut state.max_text).desired_width(80.0));
        ui.end_row();

        let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
        submitted = enter && (min.lost_focus() || max.lost_focus());
    });
    if submitted {
        state.commit_limits();
    }

    ui.separator();
    stats_table(ui, state);
}

/// Min / max / mean of every frame at the selected kinetic index.
fn stats_table(ui: &mut Ui, state: &AppState) {
    ui.strong("Statistics");
    let Some(series) = state
        .dataset
        .as_ref()
        .and_then(|ds| ds.series(state.selection().kinetic_index))
    else {
        ui.label("No data available.");
        return;
    };

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(60.0))
        .columns(Column::auto().at_least(56.0), 3)
        .header(18.0, |mut header| {
            for title in ["Frame", "Min", "Max", "Mean"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for kind in FrameKind::ALL {
                let Some(frame) = series.frame(kind) else {
                    continue;
                };
                let stats = FrameStats::of(frame);
                body.row(18.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(kind.to_string());
                    });
                    match stats {
                        Some(s) => {
                            for v in [s.min, s.max, s.mean] {
                                row.col(|ui: &mut Ui| {
                                    ui.monospace(format!("{v:.2}"));
                                });
                            }
                        }
                        None => {
                            for _ in 0..3 {
                                row.col(|ui: &mut Ui| {
                                    ui.label("–");
                                });
                            }
                        }
                    }
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open acquisition…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.current_frame().is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export PNG…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some((rows, cols))) = (
            &state.dataset,
            state.dataset.as_ref().and_then(|ds| ds.frame_dim()),
        ) {
            let name = state
                .source
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{name}  {} kinetic frames, {cols}×{rows} px",
                ds.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open acquisition")
        .add_filter("Supported files", &["csv", "json"])
        .add_filter("Saved frames (CSV)", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

fn export_dialog(state: &mut AppState) {
    let Some(frame) = state.current_frame() else {
        return;
    };
    let sel = state.selection();
    let default_name = format!(
        "{}_{}.png",
        state.settings.kinetic_label(sel.kinetic_index),
        sel.frame
    );
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export image")
        .set_file_name(default_name)
        .add_filter("PNG", &["png"])
        .save_file()
    else {
        return;
    };

    if let Err(e) = export_png(&path, frame, state.current_limits().scale()) {
        log::error!("Failed to export image: {e:#}");
        state.status_message = Some(format!("Error: {e:#}"));
    }
}
