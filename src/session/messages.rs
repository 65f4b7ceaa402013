use crate::geometry::{Point, Rect};
use crate::license::LicenseError;

/// Notifications from the controller to the windowing layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    Unlocked,
    GateFailed { message: String, persistence_failure: bool },
    IconMoved(Point),
    PanelShown(Rect),
    PanelMoved(Point),
    PanelHidden,
    RaisePanel,
    ChooseTarget,
    Toast(String),
    Quit,
}

impl SessionEffect {
    pub fn gate_failed(err: &LicenseError) -> Self {
        SessionEffect::GateFailed {
            message: err.user_message(),
            persistence_failure: err.is_persistence_failure(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored,
}
