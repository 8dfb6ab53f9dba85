//! `ApplicationHandler` implementation for the winit event loop.

use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::window::WindowId;

use super::core::LightNvimApp;
use super::input::encode_key;
use super::session::CloseAction;
use super::types::UserEvent;

impl ApplicationHandler<UserEvent> for LightNvimApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if !self.initialize_window(event_loop) {
            self.request_exit(1);
            event_loop.exit();
            return;
        }

        self.reset_blink();
        self.request_redraw();
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::PtyOutput => self.pump_terminal(),
            UserEvent::Gui(gui_event) => self.handle_gui_event(gui_event),
        }
        if self.should_exit {
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Window close requested");
                match self.session.close() {
                    CloseAction::DestroyWindow => {
                        self.shutdown();
                        self.request_exit(0);
                        event_loop.exit();
                    }
                    CloseAction::AwaitEditorExit => {
                        tracing::debug!("quit sent; waiting for the editor to exit");
                    }
                }
            }

            WindowEvent::Destroyed => {
                self.request_exit(0);
                event_loop.exit();
            }

            WindowEvent::Resized(size) => self.on_resized(size),

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.on_scale_factor_changed(scale_factor);
            }

            WindowEvent::ModifiersChanged(new_modifiers) => {
                self.modifiers = new_modifiers.state();
            }

            WindowEvent::KeyboardInput { event, .. } => self.handle_keyboard_input(event),

            WindowEvent::CursorMoved { .. } => self.show_pointer(),

            WindowEvent::RedrawRequested => {
                if self.should_exit {
                    event_loop.exit();
                    return;
                }
                self.render_frame();
                self.needs_redraw = false;
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
            return;
        }

        match self.advance_blink(Instant::now()) {
            Some(next) => event_loop.set_control_flow(ControlFlow::WaitUntil(next)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}

impl LightNvimApp {
    /// Encode a key press and send it to the editor.
    fn handle_keyboard_input(&mut self, event: KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        let Some(terminal) = self.terminal.as_mut() else {
            return;
        };

        let bytes = encode_key(&event.logical_key, self.modifiers, terminal.app_cursor());
        if bytes.is_empty() {
            return;
        }
        if let Err(e) = terminal.write_input(&bytes) {
            tracing::warn!("Failed to write key to editor: {e}");
        }

        self.hide_pointer();
        self.reset_blink();
        self.request_redraw();
    }

    /// Hide the mouse pointer while typing, if the style asks for it.
    fn hide_pointer(&mut self) {
        let autohide = self
            .terminal
            .as_ref()
            .is_some_and(|t| t.style().mouse_autohide);
        if !autohide || self.pointer_hidden {
            return;
        }
        if let Some(window) = &self.window {
            window.set_cursor_visible(false);
            self.pointer_hidden = true;
        }
    }

    fn show_pointer(&mut self) {
        if !self.pointer_hidden {
            return;
        }
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        self.pointer_hidden = false;
    }
}
