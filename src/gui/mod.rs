//! eframe shell: the registration dialog, the launcher icon and the overlay
//! panel, all driven by a [`SessionController`].

pub mod prompt_dialog;
pub mod registration;
pub mod target_selector;
pub mod theme;

pub use prompt_dialog::{PromptDialog, PromptOutcome};
pub use registration::{RegistrationAction, RegistrationDialog};
pub use target_selector::TargetSelector;

use crate::geometry::{Point, Rect, SizePreset};
use crate::license::LicenseGate;
use crate::prompts::PromptStore;
use crate::session::{
    PointerEvent, SessionConfig, SessionController, SessionEffect, SessionState, Widget,
};
use crate::settings::Settings;
use crate::toast_log::append_toast_log;
use crate::viewport::{panel_viewport_id, GeometrySync};
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::time::{Duration, Instant};
use theme::{apply_panel_visuals, PanelColors};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const HEADER_HEIGHT: f32 = 28.0;

fn push_toast(toasts: &mut Toasts, toast: Toast) {
    append_toast_log(toast.text.text());
    toasts.add(toast);
}

#[derive(Debug, Clone, PartialEq)]
enum PanelAction {
    Pointer(PointerEvent),
    Resize(SizePreset),
    OpenInBrowser,
    CreatePrompt,
    OpenPrompts,
    Close,
    Quit,
}

/// Convert this frame's pointer input over `response` into screen-space
/// events for the controller.
fn pointer_events(ctx: &egui::Context, response: &egui::Response) -> Vec<PointerEvent> {
    let (origin, pos, pressed, released, down) = ctx.input(|i| {
        (
            i.viewport().outer_rect.map(|r| r.min).unwrap_or(egui::Pos2::ZERO),
            i.pointer.interact_pos(),
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.primary_down(),
        )
    });
    let Some(local) = pos else {
        return Vec::new();
    };
    let at = Point::new(
        (origin.x + local.x).round() as i32,
        (origin.y + local.y).round() as i32,
    );
    let mut events = Vec::new();
    if response.double_clicked() {
        events.push(PointerEvent::DoubleClick(at));
    }
    if pressed && response.hovered() {
        events.push(PointerEvent::Down(at));
    } else if down {
        events.push(PointerEvent::Move(at));
    }
    if released {
        events.push(PointerEvent::Up(at));
    }
    events
}

pub struct LauncherApp {
    controller: SessionController,
    effects: Receiver<SessionEffect>,
    sync: GeometrySync,
    registration: RegistrationDialog,
    prompt_dialog: PromptDialog,
    target_selector: TargetSelector,
    prompts: PromptStore,
    toasts: Toasts,
    enable_toasts: bool,
    toast_duration: f32,
}

impl LauncherApp {
    pub fn new(settings: &Settings, gate: Arc<LicenseGate>) -> Self {
        let (tx, rx) = channel();
        let screen = Rect::new(0, 0, 1920, 1080);
        let mut controller =
            SessionController::new(SessionConfig::from_settings(settings), screen, gate, tx);
        controller.start();
        let prompts = PromptStore::new(&settings.prompts_dir);
        if let Err(e) = prompts.ensure() {
            tracing::error!("failed to prepare prompts directory: {e}");
        }
        Self {
            controller,
            effects: rx,
            sync: GeometrySync::new(),
            registration: RegistrationDialog::default(),
            prompt_dialog: PromptDialog::default(),
            target_selector: TargetSelector::default(),
            prompts,
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_TOP, [10.0, 10.0]),
            enable_toasts: settings.enable_toasts,
            toast_duration: settings.session.toast_secs,
        }
    }

    fn toast(&mut self, text: impl Into<String>, kind: ToastKind) {
        let text = text.into();
        if !self.enable_toasts {
            append_toast_log(&text);
            return;
        }
        push_toast(
            &mut self.toasts,
            Toast {
                text: text.into(),
                kind,
                options: ToastOptions::default().duration_in_seconds(self.toast_duration as f64),
            },
        );
    }

    fn drain_effects(&mut self, ctx: &egui::Context) {
        while let Ok(effect) = self.effects.try_recv() {
            if self.sync.apply(ctx, &effect) {
                continue;
            }
            match effect {
                SessionEffect::Unlocked => {
                    self.registration.clear();
                    self.sync.become_icon(ctx, self.controller.icon_rect());
                }
                SessionEffect::GateFailed {
                    message,
                    persistence_failure,
                } => {
                    if persistence_failure {
                        self.toast(message, ToastKind::Error);
                    }
                }
                SessionEffect::ChooseTarget => self.target_selector.open = true,
                SessionEffect::Toast(msg) => self.toast(msg, ToastKind::Info),
                _ => {}
            }
        }
    }

    fn update_screen(&mut self, ctx: &egui::Context) {
        if let Some(size) = ctx.input(|i| i.viewport().monitor_size) {
            self.controller.set_screen(Rect::new(
                0,
                0,
                size.x.round() as i32,
                size.y.round() as i32,
            ));
        }
    }

    fn registration_ui(&mut self, ctx: &egui::Context, state: crate::license::GateState) {
        let error = self.controller.last_gate_error().map(str::to_owned);
        let mut action = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            action = self.registration.ui(ui, state, error.as_deref());
        });
        match action {
            Some(RegistrationAction::Submit(token)) => {
                self.controller.submit_token(&token);
            }
            Some(RegistrationAction::Cancel) => {
                self.controller.cancel_verification();
            }
            None => {}
        }
    }

    fn icon_ui(&mut self, ctx: &egui::Context, now: Instant) {
        let colors = self
            .controller
            .target()
            .map(|t| PanelColors::from(&t.theme))
            .unwrap_or_else(|| PanelColors::from(&crate::settings::PanelTheme::default()));
        let mut events = Vec::new();
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let response = ui.interact(rect, ui.id().with("launcher_icon"), egui::Sense::click_and_drag());
                let radius = rect.width().min(rect.height()) / 2.0 - 1.0;
                ui.painter().circle_filled(rect.center(), radius, colors.button);
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "AI",
                    egui::FontId::proportional(radius * 0.8),
                    egui::Color32::WHITE,
                );
                events = pointer_events(ctx, &response);
            });
        for event in events {
            self.controller.pointer(Widget::Icon, event, now);
        }
    }

    fn panel_ui(&mut self, ctx: &egui::Context, now: Instant) {
        let Some(panel) = self.controller.panel().filter(|p| p.visible).cloned() else {
            return;
        };
        self.sync.sync_panel(ctx, panel.rect);
        let builder = egui::ViewportBuilder::default()
            .with_title(panel.target.name.clone())
            .with_position([panel.rect.x as f32, panel.rect.y as f32])
            .with_inner_size([panel.rect.width as f32, panel.rect.height as f32])
            .with_decorations(false)
            .with_always_on_top();
        let colors = PanelColors::from(&panel.target.theme);
        let opacity = panel.opacity;
        let prompt_dialog = &mut self.prompt_dialog;
        let prompts = &self.prompts;
        let toasts = &mut self.toasts;
        let enable_toasts = self.enable_toasts;
        let (actions, outcome) = ctx.show_viewport_immediate(panel_viewport_id(), builder, |ctx, _| {
            let mut actions = Vec::new();
            if ctx.input(|i| i.viewport().close_requested()) {
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
                actions.push(PanelAction::Close);
            }
            let fill = ctx.style().visuals.panel_fill.gamma_multiply(opacity);
            egui::TopBottomPanel::top("panel_header")
                .exact_height(HEADER_HEIGHT)
                .frame(egui::Frame::none().fill(colors.submenu.gamma_multiply(opacity)))
                .show(ctx, |ui| {
                    let header = ui.interact(ui.max_rect(), ui.id().with("drag"), egui::Sense::drag());
                    for event in pointer_events(ctx, &header) {
                        actions.push(PanelAction::Pointer(event));
                    }
                    ui.horizontal_centered(|ui| {
                        apply_panel_visuals(ui, colors);
                        ui.label(egui::RichText::new(&panel.target.name).strong());
                        ui.menu_button("Prompt", |ui| {
                            if ui.button("Create").clicked() {
                                actions.push(PanelAction::CreatePrompt);
                                ui.close_menu();
                            }
                            if ui.button("Open").clicked() {
                                actions.push(PanelAction::OpenPrompts);
                                ui.close_menu();
                            }
                        });
                        ui.menu_button(format!("Size: {}", panel.preset.label()), |ui| {
                            for preset in SizePreset::ALL {
                                if ui.radio(preset == panel.preset, preset.label()).clicked() {
                                    actions.push(PanelAction::Resize(preset));
                                    ui.close_menu();
                                }
                            }
                        });
                        if ui.button("Open in browser").clicked() {
                            actions.push(PanelAction::OpenInBrowser);
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Quit").clicked() {
                                actions.push(PanelAction::Quit);
                            }
                            if ui.button("Close").clicked() {
                                actions.push(PanelAction::Close);
                            }
                        });
                    });
                });
            egui::CentralPanel::default()
                .frame(egui::Frame::none().fill(fill).inner_margin(12.0))
                .show(ctx, |ui| {
                    ui.heading(&panel.target.name);
                    ui.hyperlink(&panel.target.url);
                    ui.label("Use \"Open in browser\" to continue the conversation.");
                });
            let outcome = prompt_dialog.ui(ctx, prompts);
            if enable_toasts {
                toasts.show(ctx);
            }
            (actions, outcome)
        });
        if let Some(outcome) = outcome {
            self.handle_prompt_outcome(outcome);
        }
        for action in actions {
            self.handle_panel_action(action, now);
        }
    }

    fn handle_prompt_outcome(&mut self, outcome: PromptOutcome) {
        match outcome {
            PromptOutcome::Info(msg) => self.toast(msg, ToastKind::Success),
            PromptOutcome::Error(msg) => {
                tracing::warn!("{msg}");
                self.toast(msg, ToastKind::Error);
            }
        }
    }

    fn handle_panel_action(&mut self, action: PanelAction, now: Instant) {
        match action {
            PanelAction::Pointer(event) => {
                self.controller.pointer(Widget::Panel, event, now);
            }
            PanelAction::Resize(preset) => {
                self.controller.resize(preset, now);
            }
            PanelAction::OpenInBrowser => {
                if let Some(url) = self.controller.target().map(|t| t.url.clone()) {
                    if let Err(e) = open::that(&url) {
                        tracing::error!(%url, "failed to open browser: {e}");
                        self.toast(format!("Failed to open {url}"), ToastKind::Error);
                    }
                }
            }
            PanelAction::CreatePrompt => self.prompt_dialog.open_create(),
            PanelAction::OpenPrompts => {
                if let Some(outcome) = self.prompt_dialog.open_browse(&self.prompts) {
                    self.handle_prompt_outcome(outcome);
                }
            }
            PanelAction::Close => {
                self.controller.close_panel(now);
            }
            PanelAction::Quit => self.controller.quit(),
        }
    }

    fn target_ui(&mut self, ctx: &egui::Context, now: Instant) {
        let icon = self.controller.icon_rect();
        let targets = self.controller.targets().to_vec();
        if let Some(target) = self.target_selector.ui(ctx, &targets, icon) {
            self.controller.select_target(target);
            self.controller.toggle(now);
        }
    }
}

impl eframe::App for LauncherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_screen(ctx);
        if ctx.input(|i| i.viewport().close_requested()) && !self.controller.quit_requested() {
            self.controller.quit();
        }
        self.controller.pump_gate_reports();
        let now = Instant::now();
        self.controller.tick(now);
        self.drain_effects(ctx);

        match self.controller.state() {
            SessionState::Locked(gate) => {
                self.registration_ui(ctx, gate);
                if self.enable_toasts {
                    self.toasts.show(ctx);
                }
            }
            _ => {
                self.icon_ui(ctx, now);
                self.target_ui(ctx, now);
                if self.controller.panel_rect().is_some() {
                    self.panel_ui(ctx, now);
                } else if self.enable_toasts {
                    self.toasts.show(ctx);
                }
            }
        }

        self.drain_effects(ctx);
        if self.controller.needs_repaint() {
            ctx.request_repaint_after(FRAME_INTERVAL);
        }
    }
}
