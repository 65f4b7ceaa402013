use crate::settings::PanelTheme;
use eframe::egui;

const FALLBACK: egui::Color32 = egui::Color32::from_rgb(0x10, 0xa3, 0x7f);

/// Parse `#rrggbb` (the leading `#` is optional).
pub fn parse_hex_color(s: &str) -> Option<egui::Color32> {
    let bytes = hex::decode(s.trim().trim_start_matches('#')).ok()?;
    match bytes.as_slice() {
        [r, g, b] => Some(egui::Color32::from_rgb(*r, *g, *b)),
        _ => None,
    }
}

fn color_or_fallback(s: &str) -> egui::Color32 {
    parse_hex_color(s).unwrap_or_else(|| {
        tracing::warn!(color = s, "invalid theme colour");
        FALLBACK
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelColors {
    pub button: egui::Color32,
    pub submenu: egui::Color32,
    pub size: egui::Color32,
}

impl From<&PanelTheme> for PanelColors {
    fn from(theme: &PanelTheme) -> Self {
        Self {
            button: color_or_fallback(&theme.button_color),
            submenu: color_or_fallback(&theme.submenu_color),
            size: color_or_fallback(&theme.size_color),
        }
    }
}

/// Style the panel chrome with the target's colours.
pub fn apply_panel_visuals(ui: &mut egui::Ui, colors: PanelColors) {
    let visuals = &mut ui.style_mut().visuals;
    visuals.widgets.inactive.weak_bg_fill = colors.button;
    visuals.widgets.inactive.bg_fill = colors.button;
    visuals.widgets.hovered.weak_bg_fill = colors.submenu;
    visuals.widgets.hovered.bg_fill = colors.submenu;
    visuals.widgets.active.weak_bg_fill = colors.size;
    visuals.widgets.active.bg_fill = colors.size;
    visuals.override_text_color = Some(egui::Color32::WHITE);
}
