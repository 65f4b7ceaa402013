use crate::geometry::{Delta, Point, Rect, SizePreset};
use crate::settings::TargetProfile;

/// Pointer travel (in pixels, per axis) before a press becomes a drag.
pub const DRAG_THRESHOLD: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    Icon,
    Panel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    DoubleClick(Point),
}

/// What a widget wants the controller to do with a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerIntent {
    DragBy(Delta),
    Activate,
    Raise,
}

pub trait PointerHandler {
    fn on_pointer_down(&mut self, at: Point) -> Option<PointerIntent>;
    fn on_pointer_move(&mut self, at: Point) -> Option<PointerIntent>;
    fn on_pointer_up(&mut self, at: Point) -> Option<PointerIntent>;
    fn on_double_click(&mut self, at: Point) -> Option<PointerIntent>;
}

pub fn dispatch(handler: &mut dyn PointerHandler, event: PointerEvent) -> Option<PointerIntent> {
    match event {
        PointerEvent::Down(p) => handler.on_pointer_down(p),
        PointerEvent::Move(p) => handler.on_pointer_move(p),
        PointerEvent::Up(p) => handler.on_pointer_up(p),
        PointerEvent::DoubleClick(p) => handler.on_double_click(p),
    }
}

/// Press/move/release bookkeeping in screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragTracker {
    pressed_at: Option<Point>,
    last: Option<Point>,
    dragging: bool,
}

impl DragTracker {
    pub fn press(&mut self, at: Point) {
        self.pressed_at = Some(at);
        self.last = Some(at);
        self.dragging = false;
    }

    /// Movement since the previous pointer sample, once past the threshold.
    pub fn motion(&mut self, at: Point) -> Option<Delta> {
        let pressed = self.pressed_at?;
        if !self.dragging {
            if !pressed.delta_to(at).exceeds(DRAG_THRESHOLD) {
                return None;
            }
            self.dragging = true;
        }
        let last = self.last.unwrap_or(pressed);
        self.last = Some(at);
        let delta = last.delta_to(at);
        (!delta.is_zero()).then_some(delta)
    }

    /// Ends the gesture; returns whether it was a click rather than a drag.
    pub fn release(&mut self) -> bool {
        let was_click = self.pressed_at.is_some() && !self.dragging;
        *self = Self::default();
        was_click
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}

#[derive(Debug, Clone)]
pub struct LauncherIcon {
    pub rect: Rect,
    pub visible: bool,
    drag: DragTracker,
    /// Set by a double-click; the release that completes it is not a click.
    swallow_release: bool,
}

impl LauncherIcon {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            visible: false,
            drag: DragTracker::default(),
            swallow_release: false,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }
}

impl PointerHandler for LauncherIcon {
    fn on_pointer_down(&mut self, at: Point) -> Option<PointerIntent> {
        self.drag.press(at);
        self.swallow_release = false;
        None
    }

    fn on_pointer_move(&mut self, at: Point) -> Option<PointerIntent> {
        self.drag.motion(at).map(PointerIntent::DragBy)
    }

    fn on_pointer_up(&mut self, at: Point) -> Option<PointerIntent> {
        let trailing = self.drag.motion(at);
        let was_click = self.drag.release();
        if std::mem::take(&mut self.swallow_release) {
            return None;
        }
        if was_click {
            Some(PointerIntent::Activate)
        } else {
            trailing.map(PointerIntent::DragBy)
        }
    }

    fn on_double_click(&mut self, _at: Point) -> Option<PointerIntent> {
        self.swallow_release = true;
        Some(PointerIntent::Raise)
    }
}

/// The overlay panel. Created on first expansion, then hidden and reused.
#[derive(Debug, Clone)]
pub struct OverlayPanel {
    pub rect: Rect,
    pub preset: SizePreset,
    pub target: TargetProfile,
    pub opacity: f32,
    pub visible: bool,
    drag: DragTracker,
}

impl OverlayPanel {
    pub fn new(rect: Rect, preset: SizePreset, target: TargetProfile) -> Self {
        Self {
            rect,
            preset,
            target,
            opacity: 0.0,
            visible: false,
            drag: DragTracker::default(),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }
}

impl PointerHandler for OverlayPanel {
    fn on_pointer_down(&mut self, at: Point) -> Option<PointerIntent> {
        self.drag.press(at);
        None
    }

    fn on_pointer_move(&mut self, at: Point) -> Option<PointerIntent> {
        self.drag.motion(at).map(PointerIntent::DragBy)
    }

    fn on_pointer_up(&mut self, at: Point) -> Option<PointerIntent> {
        let trailing = self.drag.motion(at);
        self.drag.release();
        trailing.map(PointerIntent::DragBy)
    }

    fn on_double_click(&mut self, _at: Point) -> Option<PointerIntent> {
        None
    }
}
