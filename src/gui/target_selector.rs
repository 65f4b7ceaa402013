use crate::geometry::Rect;
use crate::gui::theme::PanelColors;
use crate::settings::TargetProfile;
use eframe::egui;

const WIDTH: f32 = 220.0;
const ROW_HEIGHT: f32 = 36.0;

/// Small always-on-top window listing the configured targets.
#[derive(Default)]
pub struct TargetSelector {
    pub open: bool,
}

impl TargetSelector {
    fn viewport_id() -> egui::ViewportId {
        egui::ViewportId::from_hash_of("float_launcher_target_selector")
    }

    /// Show the selector left of `icon`. Returns the chosen profile.
    pub fn ui(
        &mut self,
        ctx: &egui::Context,
        targets: &[TargetProfile],
        icon: Rect,
    ) -> Option<TargetProfile> {
        if !self.open {
            return None;
        }
        let height = ROW_HEIGHT * (targets.len() as f32 + 1.5);
        let builder = egui::ViewportBuilder::default()
            .with_title("Choose a target")
            .with_position([icon.x as f32 - WIDTH, icon.y as f32 - height + icon.height as f32])
            .with_inner_size([WIDTH, height])
            .with_always_on_top()
            .with_resizable(false);
        let (choice, keep_open) = ctx.show_viewport_immediate(Self::viewport_id(), builder, |ctx, _| {
            let mut choice = None;
            let mut keep_open = !ctx.input(|i| i.viewport().close_requested());
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.label("Open which assistant?");
                for target in targets {
                    let colors = PanelColors::from(&target.theme);
                    let button = egui::Button::new(
                        egui::RichText::new(&target.name).color(egui::Color32::WHITE),
                    )
                    .fill(colors.button)
                    .min_size(egui::vec2(ui.available_width(), ROW_HEIGHT - 8.0));
                    if ui.add(button).clicked() {
                        choice = Some(target.clone());
                    }
                }
                if ui.button("Cancel").clicked() {
                    keep_open = false;
                }
            });
            (choice, keep_open)
        });
        if choice.is_some() || !keep_open {
            self.open = false;
        }
        choice
    }
}
