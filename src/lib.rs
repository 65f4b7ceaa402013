pub mod geometry;
pub mod license;
pub mod logging;
pub mod prompts;
pub mod session;
pub mod settings;
pub mod toast_log;
pub mod viewport;

pub mod gui;
