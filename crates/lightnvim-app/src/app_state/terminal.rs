//! Terminal signals, editor notifications, and window geometry.

use std::sync::atomic::Ordering;
use std::time::Duration;

use winit::dpi::PhysicalSize;
use winit::window::{UserAttentionType, Window};

use lightnvim_common::{Color, FontDescriptor, PixelSize};
use lightnvim_rpc::{BridgeOptions, GuiEvent, RpcBridge};
use lightnvim_terminal::TerminalSignal;

use super::core::LightNvimApp;
use super::sizing::{CellGeometry, SizingHost};
use super::types::EventSink;

/// [`SizingHost`] over the winit window.
struct WindowHost<'a> {
    window: &'a Window,
    /// Set when the platform applied a request synchronously.
    applied: Option<PhysicalSize<u32>>,
}

impl SizingHost for WindowHost<'_> {
    fn allocation(&self) -> PixelSize {
        let size = self.window.inner_size();
        PixelSize::new(size.width, size.height)
    }

    fn is_maximized(&self) -> bool {
        self.window.is_maximized()
    }

    fn request_size(&mut self, size: PixelSize) {
        self.applied = self
            .window
            .request_inner_size(PhysicalSize::new(size.width, size.height));
    }
}

// =============================================================================
// TERMINAL OUTPUT
// =============================================================================

impl LightNvimApp {
    /// Drain PTY output and react to what it produced.
    pub(super) fn pump_terminal(&mut self) {
        self.pty_pending.store(false, Ordering::Release);
        let Some(terminal) = self.terminal.as_mut() else {
            return;
        };

        let signals = terminal.pump();
        for signal in signals {
            self.handle_signal(signal);
        }
        self.request_redraw();
    }

    fn handle_signal(&mut self, signal: TerminalSignal) {
        match signal {
            TerminalSignal::CursorMoved => {
                self.reset_blink();
                self.attach_editor();
            }
            TerminalSignal::TitleChanged(title) => self.on_title_changed(title),
            TerminalSignal::ChildExited(code) => {
                tracing::info!(?code, "editor exited");
                let code = code.map_or(0, |c| i32::try_from(c).unwrap_or(1));
                self.shutdown();
                self.request_exit(code);
            }
            TerminalSignal::Bell => {
                if let Some(window) = &self.window {
                    window.request_user_attention(Some(UserAttentionType::Informational));
                }
            }
        }
    }

    /// First cursor movement means the editor is up: attach to its socket.
    fn attach_editor(&mut self) {
        let editor = &self.config.editor;
        let options = BridgeOptions {
            plugin_script: editor.plugin_script.clone(),
            init_script: editor.init_script.clone(),
            readiness_grace: Duration::from_millis(editor.readiness_grace_ms),
        };
        let sink = EventSink::new(self.proxy.clone());

        match self
            .session
            .attach_once(|socket| RpcBridge::start(socket, &options, sink))
        {
            Ok(true) => {
                if let Some(bridge) = self.session.link() {
                    tracing::info!(channel_id = bridge.channel_id(), "rpc bridge started");
                }
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!(
                    socket = %self.session.socket().display(),
                    "Failed to attach to editor: {e}"
                );
                self.request_exit(1);
            }
        }
    }

    fn on_title_changed(&mut self, title: Option<String>) {
        if self.sizing.is_unsized() {
            tracing::debug!("first title change, snapping window to the grid");
        }
        if let Some(window) = &self.window {
            let title = title.as_deref().unwrap_or(&self.config.window.title);
            window.set_title(title);
        }
        self.snap_window(true);
    }

    // =========================================================================
    // EDITOR NOTIFICATIONS
    // =========================================================================

    pub(super) fn handle_gui_event(&mut self, event: GuiEvent) {
        match event {
            GuiEvent::Font { spec, font } => self.apply_font(&spec, font),
            GuiEvent::Color { spec, color } => self.apply_color(&spec, color),
            GuiEvent::Ready => self.session.mark_ready(),
            GuiEvent::EditorGone => {
                tracing::info!("editor connection gone, closing window");
                self.shutdown();
                self.request_exit(0);
            }
        }
    }

    fn apply_font(&mut self, spec: &str, font: FontDescriptor) {
        let Some(rs) = self.render_state.as_mut() else {
            return;
        };
        let font = resolve_font(font, rs.font());
        tracing::info!(spec, font = %font, "applying font");
        let cell = rs.set_font(font);
        if let Some(terminal) = self.terminal.as_mut() {
            if let Err(e) = terminal.set_font(cell) {
                tracing::warn!("Terminal resize after font change failed: {e}");
            }
        }
        self.session.echo_font(spec);
        self.snap_window(false);
        self.request_redraw();
    }

    fn apply_color(&mut self, spec: &str, color: Color) {
        tracing::debug!(spec, "applying background color");
        if let Some(terminal) = self.terminal.as_mut() {
            terminal.set_color_background(color);
        }
        self.request_redraw();
    }

    // =========================================================================
    // GEOMETRY
    // =========================================================================

    /// A new window allocation: refit the grid, then snap the window to it.
    pub(super) fn on_resized(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.fit_to_window(size);
        self.snap_window(false);
        self.request_redraw();
    }

    pub(super) fn on_scale_factor_changed(&mut self, scale_factor: f64) {
        let Some(rs) = self.render_state.as_mut() else {
            return;
        };
        let cell = rs.set_scale_factor(scale_factor);
        if let Some(terminal) = self.terminal.as_mut() {
            let refit = terminal
                .set_scale_factor(scale_factor)
                .and_then(|_| terminal.set_font(cell));
            if let Err(e) = refit {
                tracing::warn!("Terminal refit after scale change failed: {e}");
            }
        }
        tracing::debug!(scale_factor, ?cell, "scale factor changed");
        self.request_redraw();
    }

    fn fit_to_window(&mut self, size: PhysicalSize<u32>) {
        if let Some(rs) = self.render_state.as_mut() {
            rs.resize(size.width, size.height);
        }
        if let Some(terminal) = self.terminal.as_mut() {
            if let Err(e) = terminal.resize_to_pixels(PixelSize::new(size.width, size.height)) {
                tracing::warn!("Terminal resize failed: {e}");
            }
        }
    }

    /// Run the sizing controller; `title` selects the one-shot title path.
    fn snap_window(&mut self, title: bool) {
        let (Some(window), Some(terminal)) = (self.window.clone(), self.terminal.as_ref()) else {
            return;
        };
        let geometry = CellGeometry::of(terminal);
        let mut host = WindowHost {
            window: &window,
            applied: None,
        };

        if title {
            self.sizing.on_title_changed(&mut host, &geometry);
        } else {
            self.sizing.on_allocation(&mut host, &geometry);
        }

        if let Some(applied) = host.applied {
            self.fit_to_window(applied);
        }
    }
}

/// A font spec may leave out the family or the size; those keep their
/// current values.
fn resolve_font(requested: FontDescriptor, current: &FontDescriptor) -> FontDescriptor {
    requested.or(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightnvim_common::{FontStyle, FontWeight};
    use lightnvim_config::LightNvimConfig;

    #[test]
    fn font_without_size_keeps_current_size() {
        let mut config = LightNvimConfig::default();
        config.font.size = 15.0;
        let current = config.font.descriptor();

        let font = resolve_font(FontDescriptor::parse("Hack"), &current);
        assert_eq!(font.family, "Hack");
        assert_eq!(font.size, Some(15.0));
    }

    #[test]
    fn font_without_family_keeps_current_family() {
        let current = FontDescriptor::new("Iosevka Term", 12.0);
        let font = resolve_font(FontDescriptor::parse(":h14:i"), &current);
        assert_eq!(font.family, "Iosevka Term");
        assert_eq!(font.size, Some(14.0));
        assert_eq!(font.style, FontStyle::Italic);
        assert_eq!(font.weight, FontWeight::Normal);
    }

    #[test]
    fn full_spec_replaces_current_font() {
        let current = FontDescriptor::new("Iosevka Term", 12.0);
        let font = resolve_font(FontDescriptor::parse("Hack:h9:b"), &current);
        assert_eq!(font, FontDescriptor::parse("Hack:h9:b"));
    }
}
