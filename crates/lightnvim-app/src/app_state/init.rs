//! Window creation, renderer initialization, and editor spawn.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use winit::dpi::LogicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Icon, Window, WindowAttributes};

use lightnvim_common::{Color, LightNvimError, PixelSize, PlatformError};
use lightnvim_config::paths::{runtime_dir, RUNTIME_DIR_NAME};
use lightnvim_config::LightNvimConfig;
use lightnvim_renderer::RenderState;
use lightnvim_terminal::{EditorCommand, Terminal, TerminalOptions, TerminalStyle};

use super::core::LightNvimApp;
use super::types::pty_wakeup;

// =============================================================================
// INITIALIZATION
// =============================================================================

impl LightNvimApp {
    /// Create the window, initialize the GPU renderer, and start the editor.
    /// Returns `false` if initialization failed and the event loop should exit.
    pub(super) fn initialize_window(&mut self, event_loop: &ActiveEventLoop) -> bool {
        let window_config = &self.config.window;
        let mut attrs = WindowAttributes::default()
            .with_title(window_config.title.clone())
            .with_inner_size(LogicalSize::new(
                f64::from(window_config.width),
                f64::from(window_config.height),
            ));

        if let Some(path) = window_config.icon.as_deref() {
            match load_icon(Path::new(path)) {
                Ok(icon) => attrs = attrs.with_window_icon(Some(icon)),
                Err(e) => tracing::warn!("Window icon not loaded: {e}"),
            }
        }

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                tracing::error!("Failed to create window: {e}");
                return false;
            }
        };

        let font = self.config.font.descriptor();
        let render_state = match pollster::block_on(RenderState::new(window.clone(), font)) {
            Ok(rs) => rs,
            Err(e) => {
                tracing::error!("Failed to initialize renderer: {e}");
                return false;
            }
        };

        match self.spawn_terminal(&window, &render_state) {
            Ok(terminal) => self.terminal = Some(terminal),
            Err(e) => {
                tracing::error!("Failed to start editor: {e}");
                return false;
            }
        }

        self.render_state = Some(render_state);
        self.window = Some(window);
        tracing::info!("Window created and renderer initialized");
        true
    }

    fn spawn_terminal(
        &self,
        window: &Window,
        render_state: &RenderState,
    ) -> Result<Terminal, LightNvimError> {
        let runtime_dir = runtime_dir(&self.config.editor).unwrap_or_else(|e| {
            tracing::warn!("Runtime directory not resolved, using ./{RUNTIME_DIR_NAME}: {e}");
            PathBuf::from(RUNTIME_DIR_NAME)
        });

        let command = EditorCommand {
            program: self.config.editor.program.clone(),
            runtime_dir,
            args: self.editor_args.clone(),
            listen_env: self.config.editor.listen_env.clone(),
            socket: self.session.socket().to_path_buf(),
        };
        tracing::info!(
            argv = ?command.argv(),
            socket = %command.socket.display(),
            "spawning editor"
        );

        let inner = window.inner_size();
        let options = TerminalOptions {
            cell: render_state.cell_size(),
            area: PixelSize::new(inner.width, inner.height),
            scale_factor: window.scale_factor(),
            background: config_color(
                "terminal.background",
                &self.config.terminal.background,
                Color::BLACK,
            ),
        };
        let wakeup = pty_wakeup(self.proxy.clone(), self.pty_pending.clone());

        Terminal::spawn(
            command.to_command_builder(),
            terminal_style(&self.config),
            options,
            Some(wakeup),
        )
        .map_err(|e| LightNvimError::Terminal(e.to_string()))
    }
}

/// The process-wide terminal style described by `config`.
pub(super) fn terminal_style(config: &LightNvimConfig) -> TerminalStyle {
    let terminal = &config.terminal;
    let defaults = TerminalStyle::default();
    TerminalStyle {
        cursor_blink: terminal.cursor_blink,
        blink_interval: Duration::from_millis(u64::from(terminal.cursor_blink_interval_ms)),
        cursor_aspect_ratio: terminal.cursor_aspect_ratio,
        mouse_autohide: terminal.mouse_autohide,
        padding: config.window.padding,
        foreground: config_color("terminal.foreground", &terminal.foreground, defaults.foreground),
        cursor_color: config_color(
            "terminal.cursor_color",
            &terminal.cursor_color,
            defaults.cursor_color,
        ),
        scrollback_lines: terminal.scrollback_lines as usize,
    }
}

fn config_color(field: &str, spec: &str, fallback: Color) -> Color {
    Color::parse(spec).unwrap_or_else(|| {
        tracing::warn!(field, spec, "unparseable color, using default");
        fallback
    })
}

/// Decode a PNG into a window icon.
fn load_icon(path: &Path) -> Result<Icon, PlatformError> {
    let image = image::open(path)
        .map_err(|e| PlatformError::IconError(format!("{}: {e}", path.display())))?
        .into_rgba8();
    let (width, height) = image.dimensions();
    Icon::from_rgba(image.into_raw(), width, height)
        .map_err(|e| PlatformError::IconError(e.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use lightnvim_common::Padding;

    #[test]
    fn style_follows_config() {
        let mut config = LightNvimConfig::default();
        config.terminal.cursor_blink = false;
        config.terminal.cursor_blink_interval_ms = 250;
        config.terminal.foreground = "white".into();
        config.terminal.scrollback_lines = 42;
        config.window.padding = Padding::uniform(3);

        let style = terminal_style(&config);
        assert!(!style.cursor_blink);
        assert_eq!(style.blink_interval, Duration::from_millis(250));
        assert_eq!(style.foreground, Color::WHITE);
        assert_eq!(style.scrollback_lines, 42);
        assert_eq!(style.padding, Padding::uniform(3));
    }

    #[test]
    fn default_config_gives_default_style() {
        assert_eq!(
            terminal_style(&LightNvimConfig::default()),
            TerminalStyle::default()
        );
    }

    #[test]
    fn bad_color_falls_back() {
        let mut config = LightNvimConfig::default();
        config.terminal.cursor_color = "not-a-color".into();
        assert_eq!(
            terminal_style(&config).cursor_color,
            TerminalStyle::default().cursor_color
        );
    }

    #[test]
    fn missing_icon_is_an_icon_error() {
        let result = load_icon(Path::new("/nonexistent/lightnvim-icon.png"));
        assert!(matches!(result, Err(PlatformError::IconError(_))));
    }
}
