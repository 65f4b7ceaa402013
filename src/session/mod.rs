//! Launcher icon and overlay panel: state machine, pointer handling and the
//! controller that keeps the two windows anchored.

pub mod animation;
pub mod controller;
pub mod messages;
pub mod state;
pub mod widgets;

pub use controller::{SessionConfig, SessionController};
pub use messages::{SessionEffect, Transition};
pub use state::{can_transition, SessionState};
pub use widgets::{PointerEvent, PointerIntent, Widget};
