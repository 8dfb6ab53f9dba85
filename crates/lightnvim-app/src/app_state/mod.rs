//! Top-level application state.
//!
//! Implements `winit::application::ApplicationHandler` to drive the main
//! event loop. Coordinates config, renderer, terminal, and the editor
//! session.

mod core;
mod event_handler;
mod init;
mod input;
mod render;
mod session;
mod shutdown;
mod sizing;
mod terminal;
mod types;

pub use core::LightNvimApp;
pub use types::UserEvent;
