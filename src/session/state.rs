use crate::license::gate::GateState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Locked(GateState),
    Collapsed,
    Expanding,
    Expanded,
    Collapsing,
}

impl SessionState {
    pub fn is_unlocked(self) -> bool {
        !matches!(self, Self::Locked(_))
    }

    pub fn is_animating(self) -> bool {
        matches!(self, Self::Expanding | Self::Collapsing)
    }

    /// The panel is on screen, possibly fading.
    pub fn panel_visible(self) -> bool {
        matches!(self, Self::Expanding | Self::Expanded | Self::Collapsing)
    }
}

pub fn can_transition(from: SessionState, to: SessionState) -> bool {
    use GateState::*;
    use SessionState::*;
    matches!(
        (from, to),
        (Locked(Unverified), Locked(AwaitingToken))
            | (Locked(Unverified), Collapsed)
            | (Locked(AwaitingToken), Locked(Verifying))
            | (Locked(Verifying), Locked(AwaitingToken))
            | (Locked(Verifying), Collapsed)
            | (Collapsed, Expanding)
            | (Expanding, Expanded)
            | (Expanding, Collapsing)
            | (Expanded, Collapsing)
            | (Collapsing, Collapsed)
            | (Collapsing, Expanding)
    ) || from == to
}
