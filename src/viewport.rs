use crate::geometry::{Point, Rect};
use crate::session::SessionEffect;
use eframe::egui;
use once_cell::sync::Lazy;

static PANEL_VIEWPORT: Lazy<egui::ViewportId> =
    Lazy::new(|| egui::ViewportId::from_hash_of("float_launcher_panel"));

/// Viewport of the overlay panel. The launcher icon lives in the root viewport.
pub fn panel_viewport_id() -> egui::ViewportId {
    *PANEL_VIEWPORT
}

/// The part of [`egui::Context`] used to move windows, so the mapping from
/// session effects to viewport commands can be tested without a window.
pub trait ViewportCtx {
    fn send_viewport_cmd_to(&self, id: egui::ViewportId, cmd: egui::ViewportCommand);
    fn request_repaint(&self);
}

impl ViewportCtx for egui::Context {
    fn send_viewport_cmd_to(&self, id: egui::ViewportId, cmd: egui::ViewportCommand) {
        egui::Context::send_viewport_cmd_to(self, id, cmd);
    }

    fn request_repaint(&self) {
        egui::Context::request_repaint(self);
    }
}

fn pos(p: Point) -> egui::Pos2 {
    egui::pos2(p.x as f32, p.y as f32)
}

fn size(r: Rect) -> egui::Vec2 {
    egui::vec2(r.width as f32, r.height as f32)
}

/// Pushes geometry to the windows, but only when it differs from what was
/// last sent. Windows report their own moves back to us, so resending the
/// same position each frame would fight the window manager.
#[derive(Debug, Default)]
pub struct GeometrySync {
    icon: Option<Point>,
    icon_size: Option<(i32, i32)>,
    panel: Option<Rect>,
}

impl GeometrySync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate one effect into viewport commands. Returns false for effects
    /// that are not about window geometry.
    pub fn apply(&mut self, ctx: &dyn ViewportCtx, effect: &SessionEffect) -> bool {
        match effect {
            SessionEffect::IconMoved(p) => self.move_icon(ctx, *p),
            SessionEffect::PanelShown(r) => {
                self.panel = None;
                self.sync_panel(ctx, *r);
            }
            SessionEffect::PanelMoved(p) => {
                if let Some(current) = self.panel {
                    let moved = Rect::from_origin_size(*p, current.size());
                    self.sync_panel(ctx, moved);
                }
            }
            SessionEffect::PanelHidden => {
                self.panel = None;
                ctx.send_viewport_cmd_to(
                    panel_viewport_id(),
                    egui::ViewportCommand::Visible(false),
                );
            }
            SessionEffect::RaisePanel => {
                ctx.send_viewport_cmd_to(panel_viewport_id(), egui::ViewportCommand::Focus);
            }
            SessionEffect::Quit => {
                ctx.send_viewport_cmd_to(egui::ViewportId::ROOT, egui::ViewportCommand::Close);
            }
            _ => return false,
        }
        ctx.request_repaint();
        true
    }

    /// Turn the root window into the borderless always-on-top icon.
    pub fn become_icon(&mut self, ctx: &dyn ViewportCtx, icon: Rect) {
        let root = egui::ViewportId::ROOT;
        ctx.send_viewport_cmd_to(root, egui::ViewportCommand::Decorations(false));
        ctx.send_viewport_cmd_to(
            root,
            egui::ViewportCommand::WindowLevel(egui::WindowLevel::AlwaysOnTop),
        );
        if self.icon_size != Some((icon.width, icon.height)) {
            ctx.send_viewport_cmd_to(root, egui::ViewportCommand::InnerSize(size(icon)));
            self.icon_size = Some((icon.width, icon.height));
        }
        self.move_icon(ctx, icon.origin());
        ctx.request_repaint();
    }

    pub fn move_icon(&mut self, ctx: &dyn ViewportCtx, origin: Point) {
        if self.icon == Some(origin) {
            return;
        }
        self.icon = Some(origin);
        ctx.send_viewport_cmd_to(
            egui::ViewportId::ROOT,
            egui::ViewportCommand::OuterPosition(pos(origin)),
        );
    }

    /// Called every frame while the panel is visible, including during a
    /// resize animation.
    pub fn sync_panel(&mut self, ctx: &dyn ViewportCtx, rect: Rect) {
        let id = panel_viewport_id();
        match self.panel {
            Some(last) if last == rect => return,
            Some(last) if last.size() == rect.size() => {
                ctx.send_viewport_cmd_to(id, egui::ViewportCommand::OuterPosition(pos(rect.origin())));
            }
            Some(last) if last.origin() == rect.origin() => {
                ctx.send_viewport_cmd_to(id, egui::ViewportCommand::InnerSize(size(rect)));
            }
            _ => {
                ctx.send_viewport_cmd_to(id, egui::ViewportCommand::OuterPosition(pos(rect.origin())));
                ctx.send_viewport_cmd_to(id, egui::ViewportCommand::InnerSize(size(rect)));
            }
        }
        self.panel = Some(rect);
    }

    pub fn last_panel(&self) -> Option<Rect> {
        self.panel
    }
}
