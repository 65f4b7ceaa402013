use crate::geometry::{
    anchored_panel_rect, Delta, Point, Rect, ScreenBounds, Size, SizePreset, SizePresets,
};
use crate::license::gate::{GateState, LicenseGate};
use crate::license::worker::{self, GateReport, GateRequest, GateTask};
use crate::license::LicenseError;
use crate::session::animation::{Animation, Tween};
use crate::session::messages::{SessionEffect, Transition};
use crate::session::state::{can_transition, SessionState};
use crate::session::widgets::{dispatch, LauncherIcon, OverlayPanel, PointerEvent, PointerIntent, Widget};
use crate::settings::{Settings, TargetProfile};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::{Duration, Instant};

const DEFAULT_ICON_MARGIN: i32 = 100;

fn default_icon_origin(screen: ScreenBounds) -> Point {
    Point::new(
        screen.x + screen.width - DEFAULT_ICON_MARGIN,
        screen.y + screen.height - DEFAULT_ICON_MARGIN,
    )
}

/// Everything the controller needs from the settings file.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub icon_size: Size,
    pub icon_position: Option<Point>,
    pub size_presets: SizePresets,
    pub default_preset: SizePreset,
    pub animation: Duration,
    pub targets: Vec<TargetProfile>,
}

impl SessionConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        let s = &settings.session;
        Self {
            icon_size: Size::new(s.icon_size.0, s.icon_size.1),
            icon_position: s.icon_position.map(|(x, y)| Point::new(x, y)),
            size_presets: s.size_presets,
            default_preset: s.default_preset,
            animation: Duration::from_millis(s.animation_ms),
            targets: settings.targets.clone(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Owns the launcher icon and the overlay panel and keeps them anchored.
///
/// All methods run on the UI thread; only license verification is handed to
/// a worker and comes back through [`pump_gate_reports`](Self::pump_gate_reports).
pub struct SessionController {
    config: SessionConfig,
    screen: ScreenBounds,
    state: SessionState,
    icon: LauncherIcon,
    panel: Option<OverlayPanel>,
    preset: SizePreset,
    target: Option<TargetProfile>,
    animation: Option<Animation>,
    gate: Arc<LicenseGate>,
    task: Option<GateTask>,
    last_gate_error: Option<String>,
    quit_requested: bool,
    effects: Sender<SessionEffect>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        screen: ScreenBounds,
        gate: Arc<LicenseGate>,
        effects: Sender<SessionEffect>,
    ) -> Self {
        let origin = config
            .icon_position
            .unwrap_or_else(|| default_icon_origin(screen));
        let icon = LauncherIcon::new(Rect::from_origin_size(origin, config.icon_size));
        let target = match config.targets.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        };
        Self {
            preset: config.default_preset,
            config,
            screen,
            state: SessionState::Locked(GateState::Unverified),
            icon,
            panel: None,
            target,
            animation: None,
            gate,
            task: None,
            last_gate_error: None,
            quit_requested: false,
            effects,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn icon_rect(&self) -> Rect {
        self.icon.rect
    }

    pub fn icon(&self) -> &LauncherIcon {
        &self.icon
    }

    pub fn panel(&self) -> Option<&OverlayPanel> {
        self.panel.as_ref()
    }

    /// Geometry of the panel while it is on screen.
    pub fn panel_rect(&self) -> Option<Rect> {
        self.panel.as_ref().filter(|p| p.visible).map(|p| p.rect)
    }

    pub fn panel_opacity(&self) -> f32 {
        self.panel.as_ref().map(|p| p.opacity).unwrap_or(0.0)
    }

    pub fn preset(&self) -> SizePreset {
        self.preset
    }

    pub fn target(&self) -> Option<&TargetProfile> {
        self.target.as_ref()
    }

    pub fn targets(&self) -> &[TargetProfile] {
        &self.config.targets
    }

    pub fn screen(&self) -> ScreenBounds {
        self.screen
    }

    pub fn last_gate_error(&self) -> Option<&str> {
        self.last_gate_error.as_deref()
    }

    pub fn is_verifying(&self) -> bool {
        self.task.is_some()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Something is still moving or a worker is pending.
    pub fn needs_repaint(&self) -> bool {
        self.animation.is_some() || self.task.is_some()
    }

    /// Update the usable screen area. Until the launcher is unlocked the
    /// icon has not been shown, so a default position follows the new bounds.
    pub fn set_screen(&mut self, screen: ScreenBounds) {
        if self.screen == screen {
            return;
        }
        tracing::debug!(?screen, "screen bounds updated");
        self.screen = screen;
        if !self.state.is_unlocked() && self.config.icon_position.is_none() {
            let origin = default_icon_origin(screen);
            self.icon.rect = Rect::from_origin_size(origin, self.config.icon_size);
        }
    }

    fn emit(&self, effect: SessionEffect) {
        let _ = self.effects.send(effect);
    }

    fn transition(&mut self, to: SessionState) -> bool {
        if !can_transition(self.state, to) {
            tracing::warn!(from=?self.state, to=?to, "rejected session transition");
            return false;
        }
        if self.state != to {
            tracing::debug!(from=?self.state, to=?to, "session transition");
        }
        self.state = to;
        true
    }

    // --- license gate -----------------------------------------------------

    /// Run the startup license check in the background.
    pub fn start(&mut self) {
        if self.state != SessionState::Locked(GateState::Unverified) || self.task.is_some() {
            return;
        }
        match worker::spawn(self.gate.clone(), GateRequest::Check) {
            Ok(task) => self.task = Some(task),
            Err(e) => {
                tracing::error!("failed to start license check: {e}");
                self.transition(SessionState::Locked(GateState::AwaitingToken));
            }
        }
    }

    pub fn submit_token(&mut self, token: &str) -> Transition {
        if self.state != SessionState::Locked(GateState::AwaitingToken) {
            return Transition::Ignored;
        }
        if token.trim().is_empty() {
            self.fail_gate(LicenseError::EmptyInput, GateState::AwaitingToken);
            return Transition::Ignored;
        }
        match worker::spawn(self.gate.clone(), GateRequest::Activate(token.to_string())) {
            Ok(task) => {
                self.task = Some(task);
                self.last_gate_error = None;
                self.transition(SessionState::Locked(GateState::Verifying));
                Transition::Applied
            }
            Err(e) => {
                self.fail_gate(LicenseError::Network(e.to_string()), GateState::AwaitingToken);
                Transition::Ignored
            }
        }
    }

    /// Dismissing the "verifying" dialog abandons the request; a late
    /// success is not written to the cache.
    pub fn cancel_verification(&mut self) -> Transition {
        if self.state != SessionState::Locked(GateState::Verifying) {
            return Transition::Ignored;
        }
        if let Some(task) = self.task.take() {
            task.cancel();
        }
        self.transition(SessionState::Locked(GateState::AwaitingToken));
        Transition::Applied
    }

    pub fn pump_gate_reports(&mut self) {
        let Some(report) = self.task.as_mut().and_then(|t| t.try_report()) else {
            return;
        };
        self.task = None;
        self.handle_report(report);
    }

    /// Block up to `timeout` for the pending gate operation.
    pub fn wait_for_gate(&mut self, timeout: Duration) -> bool {
        let Some(report) = self.task.as_mut().and_then(|t| t.wait(timeout)) else {
            return false;
        };
        self.task = None;
        self.handle_report(report);
        true
    }

    fn handle_report(&mut self, report: GateReport) {
        let SessionState::Locked(gate @ (GateState::Unverified | GateState::Verifying)) =
            self.state
        else {
            return;
        };
        match report {
            GateReport::Checked(outcome) => match gate.after_check(outcome) {
                None => self.unlock(),
                Some(next) => {
                    self.transition(SessionState::Locked(next));
                }
            },
            GateReport::Activated(result) => {
                let next = gate.after_activation(&result);
                match (result, next) {
                    (Err(e), Some(next)) => self.fail_gate(e, next),
                    _ => {
                        self.unlock();
                        self.notify("License activated");
                    }
                }
            }
        }
    }

    fn fail_gate(&mut self, err: LicenseError, next: GateState) {
        if err.is_persistence_failure() {
            tracing::error!("activation succeeded but was not stored: {err}");
        } else {
            tracing::info!("activation failed: {err}");
        }
        self.last_gate_error = Some(err.user_message());
        self.emit(SessionEffect::gate_failed(&err));
        self.transition(SessionState::Locked(next));
    }

    fn unlock(&mut self) {
        if self.transition(SessionState::Collapsed) {
            self.last_gate_error = None;
            self.icon.visible = true;
            tracing::info!("launcher unlocked");
            self.emit(SessionEffect::Unlocked);
        }
    }

    // --- session ----------------------------------------------------------

    pub fn select_target(&mut self, target: TargetProfile) {
        tracing::debug!(target = %target.name, "target selected");
        if let Some(panel) = self.panel.as_mut() {
            panel.target = target.clone();
        }
        self.target = Some(target);
    }

    pub fn toggle(&mut self, now: Instant) -> Transition {
        match self.state {
            SessionState::Locked(_) => Transition::Ignored,
            SessionState::Collapsed => {
                if self.target.is_none() {
                    self.emit(SessionEffect::ChooseTarget);
                    return Transition::Ignored;
                }
                self.begin_expand(now);
                Transition::Applied
            }
            SessionState::Collapsing => {
                self.begin_expand(now);
                Transition::Applied
            }
            SessionState::Expanding | SessionState::Expanded => {
                self.begin_collapse(now);
                Transition::Applied
            }
        }
    }

    /// Closing the panel hides it; only [`quit`](Self::quit) ends the process.
    pub fn close_panel(&mut self, now: Instant) -> Transition {
        match self.state {
            SessionState::Expanding | SessionState::Expanded => {
                self.begin_collapse(now);
                Transition::Applied
            }
            _ => Transition::Ignored,
        }
    }

    pub fn quit(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
        self.quit_requested = true;
        tracing::info!("quit requested");
        self.emit(SessionEffect::Quit);
    }

    pub fn notify(&self, message: impl Into<String>) {
        self.emit(SessionEffect::Toast(message.into()));
    }

    pub fn resize(&mut self, preset: SizePreset, now: Instant) -> Transition {
        match self.state {
            SessionState::Locked(_) => return Transition::Ignored,
            SessionState::Collapsed | SessionState::Collapsing => {
                self.preset = preset;
                return Transition::Ignored;
            }
            SessionState::Expanding => self.settle_animation(),
            SessionState::Expanded => {}
        }
        self.preset = preset;
        let size = self.config.size_presets.size_for(preset, self.screen);
        let to = anchored_panel_rect(self.icon.rect, size, self.screen);
        let from = self.current_panel_rect(now);
        let Some(panel) = self.panel.as_mut() else {
            return Transition::Ignored;
        };
        panel.preset = preset;
        tracing::debug!(?preset, ?from, ?to, "resizing panel");
        self.animation = Some(Animation::Reshape(Tween::new(
            from,
            to,
            now,
            self.config.animation,
        )));
        Transition::Applied
    }

    pub fn pointer(&mut self, widget: Widget, event: PointerEvent, now: Instant) -> Transition {
        if !self.state.is_unlocked() {
            return Transition::Ignored;
        }
        let intent = match widget {
            Widget::Icon => dispatch(&mut self.icon, event),
            Widget::Panel => match self.panel.as_mut() {
                Some(panel) if panel.visible => dispatch(panel, event),
                _ => None,
            },
        };
        match intent {
            None => Transition::Ignored,
            Some(PointerIntent::DragBy(delta)) => {
                self.drag_pair(delta);
                Transition::Applied
            }
            Some(PointerIntent::Activate) => self.toggle(now),
            Some(PointerIntent::Raise) => {
                if self.state.panel_visible() {
                    self.emit(SessionEffect::RaisePanel);
                    Transition::Applied
                } else {
                    Transition::Ignored
                }
            }
        }
    }

    /// Advance the running animation. Returns true while one is still active.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(animation) = self.animation else {
            return false;
        };
        if animation.is_finished(now) {
            self.settle_animation();
            return false;
        }
        if let Some(panel) = self.panel.as_mut() {
            match animation {
                Animation::Fade(t) => panel.opacity = t.value(now),
                Animation::Reshape(t) => panel.rect = t.value(now),
            }
        }
        true
    }

    /// Move the icon by `delta` and re-anchor the panel to it. Away from the
    /// screen edges the panel moves by the same delta; near them it stays
    /// clamped to the screen origin.
    fn drag_pair(&mut self, delta: Delta) {
        self.settle_animation();
        self.icon.rect = self.icon.rect.translated(delta);
        self.emit(SessionEffect::IconMoved(self.icon.rect.origin()));
        let icon = self.icon.rect;
        let screen = self.screen;
        if let Some(panel) = self.panel.as_mut().filter(|p| p.visible) {
            panel.rect = anchored_panel_rect(icon, panel.rect.size(), screen);
            let origin = panel.rect.origin();
            self.emit(SessionEffect::PanelMoved(origin));
        }
    }

    fn current_panel_rect(&self, now: Instant) -> Rect {
        match self.animation {
            Some(Animation::Reshape(t)) => t.value(now),
            _ => self.panel.as_ref().map(|p| p.rect).unwrap_or_default(),
        }
    }

    fn begin_expand(&mut self, now: Instant) {
        let size = self.config.size_presets.size_for(self.preset, self.screen);
        let rect = anchored_panel_rect(self.icon.rect, size, self.screen);
        let Some(target) = self.target.clone() else {
            return;
        };
        let panel = self
            .panel
            .get_or_insert_with(|| OverlayPanel::new(rect, self.preset, target.clone()));
        let from = if panel.visible { panel.opacity } else { 0.0 };
        if !panel.visible {
            panel.rect = rect;
            panel.preset = self.preset;
            panel.target = target;
            panel.opacity = 0.0;
            panel.visible = true;
            let _ = self.effects.send(SessionEffect::PanelShown(rect));
        }
        self.animation = Some(Animation::Fade(Tween::new(
            from,
            1.0,
            now,
            self.config.animation,
        )));
        self.transition(SessionState::Expanding);
    }

    fn begin_collapse(&mut self, now: Instant) {
        if matches!(self.animation, Some(Animation::Reshape(_))) {
            self.settle_animation();
        }
        let from = self.panel_opacity();
        self.animation = Some(Animation::Fade(Tween::new(
            from,
            0.0,
            now,
            self.config.animation,
        )));
        self.transition(SessionState::Collapsing);
    }

    /// Jump the running animation to its end state.
    fn settle_animation(&mut self) {
        let Some(animation) = self.animation.take() else {
            return;
        };
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        match animation {
            Animation::Reshape(t) => panel.rect = t.to,
            Animation::Fade(t) => {
                panel.opacity = t.to;
                match self.state {
                    SessionState::Expanding => {
                        self.transition(SessionState::Expanded);
                    }
                    SessionState::Collapsing => {
                        panel.visible = false;
                        let _ = self.effects.send(SessionEffect::PanelHidden);
                        self.transition(SessionState::Collapsed);
                    }
                    _ => {}
                }
            }
        }
    }
}
