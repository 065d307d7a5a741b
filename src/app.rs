use eframe::egui::{self, TextureHandle, TextureOptions};

use crate::color::render_rgb;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct KrbCamApp {
    pub state: AppState,
    /// Texture of the displayed frame, tagged with the state revision it shows.
    texture: Option<(u64, TextureHandle)>,
}

impl KrbCamApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            texture: None,
        }
    }

    /// Re-upload the frame texture when the selection, limits or data changed.
    fn refresh_texture(&mut self, ctx: &egui::Context) {
        let revision = self.state.revision();
        if matches!(&self.texture, Some((r, _)) if *r == revision) {
            return;
        }
        self.texture = self.state.current_frame().map(|frame| {
            let rgb = render_rgb(frame, self.state.current_limits().scale());
            let handle = ctx.load_texture(
                "frame",
                rgb.to_color_image(),
                TextureOptions::NEAREST,
            );
            (revision, handle)
        });
    }
}

impl eframe::App for KrbCamApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.refresh_texture(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selection and limits ----
        egui::SidePanel::left("display_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // Selection changes above take effect this frame.
        self.refresh_texture(ctx);

        // ---- Central panel: image ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let texture = self.texture.as_ref().map(|(_, t)| t);
            plot::image_plot(ui, &self.state, texture);
        });
    }
}
