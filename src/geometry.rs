use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, delta: Delta) -> Self {
        Self::new(self.x + delta.dx, self.y + delta.dy)
    }

    /// Vector from `self` to `other`.
    pub fn delta_to(self, other: Point) -> Delta {
        Delta::new(other.x - self.x, other.y - self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delta {
    pub dx: i32,
    pub dy: i32,
}

impl Delta {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub fn is_zero(self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    pub fn exceeds(self, threshold: i32) -> bool {
        self.dx.abs() > threshold || self.dy.abs() > threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn translated(&self, delta: Delta) -> Self {
        Self::from_origin_size(self.origin().offset(delta), self.size())
    }
}

/// Usable area of the screen the launcher lives on.
pub type ScreenBounds = Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizePreset {
    Small,
    Medium,
    Large,
}

impl SizePreset {
    pub const ALL: [SizePreset; 3] = [SizePreset::Small, SizePreset::Medium, SizePreset::Large];

    pub fn label(self) -> &'static str {
        match self {
            SizePreset::Small => "Small",
            SizePreset::Medium => "Medium",
            SizePreset::Large => "Large",
        }
    }
}

impl Default for SizePreset {
    fn default() -> Self {
        SizePreset::Small
    }
}

/// Panel sizes as `(width, height)` fractions of the usable screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizePresets {
    pub small: (f32, f32),
    pub medium: (f32, f32),
    pub large: (f32, f32),
}

impl Default for SizePresets {
    fn default() -> Self {
        Self {
            small: (0.5, 0.6),
            medium: (0.7, 0.8),
            large: (0.8, 0.9),
        }
    }
}

impl SizePresets {
    pub fn fractions(&self, preset: SizePreset) -> (f32, f32) {
        match preset {
            SizePreset::Small => self.small,
            SizePreset::Medium => self.medium,
            SizePreset::Large => self.large,
        }
    }

    pub fn size_for(&self, preset: SizePreset, screen: ScreenBounds) -> Size {
        let (fw, fh) = self.fractions(preset);
        Size::new(
            (screen.width as f32 * fw).round() as i32,
            (screen.height as f32 * fh).round() as i32,
        )
    }
}

/// Where the panel goes for an icon at `icon`: left of the icon with its
/// bottom edge on the icon's vertical centre, clamped to the screen origin.
pub fn panel_origin(icon: Rect, panel: Size, screen: ScreenBounds) -> Point {
    let (x, y) = unclamped_panel_origin(icon, panel);
    Point::new(x.max(screen.x), y.max(screen.y))
}

pub fn unclamped_panel_origin(icon: Rect, panel: Size) -> (i32, i32) {
    (
        icon.x - panel.width,
        icon.y - panel.height + icon.height / 2,
    )
}

/// Inverse of [`panel_origin`] for an unclamped panel.
pub fn icon_origin(panel: Rect, icon: Size) -> Point {
    Point::new(panel.right(), panel.y + panel.height - icon.height / 2)
}

/// Full anchored rectangle for a panel of `size` next to `icon`.
pub fn anchored_panel_rect(icon: Rect, size: Size, screen: ScreenBounds) -> Rect {
    Rect::from_origin_size(panel_origin(icon, size, screen), size)
}

/// True when `panel` sits where [`panel_origin`] would put it for `icon`.
pub fn is_anchored(icon: Rect, panel: Rect, screen: ScreenBounds) -> bool {
    panel.origin() == panel_origin(icon, panel.size(), screen)
}
