// Library surface for the binary, headless integration tests and reuse.
// Keep this lean: terminal setup and CLI parsing stay in main.rs.
pub mod config;
pub mod geometry;
pub mod motion;
pub mod runtime;
pub mod session;
pub mod timer;
pub mod ui;
