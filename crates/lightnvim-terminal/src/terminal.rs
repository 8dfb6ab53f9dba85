//! The terminal widget: a [`Screen`] fed by a [`PtyManager`].

use alacritty_terminal::grid::Dimensions;
use alacritty_terminal::term::TermMode;
use lightnvim_common::{CellSize, Color, Padding, PixelSize};
use portable_pty::CommandBuilder;

use crate::color::Palette;
use crate::event::TerminalEvent;
use crate::pty::{PtyError, PtyManager, Wakeup};
use crate::screen::{GridSnapshot, Screen};
use crate::size::SizeInfo;
use crate::style::TerminalStyle;

#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error(transparent)]
    Pty(#[from] PtyError),
}

/// Something the GUI reacts to, produced while pumping child output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalSignal {
    CursorMoved,
    /// `None` when the child reset its title.
    TitleChanged(Option<String>),
    /// The child's exit code, if it could be read. Always the last signal.
    ChildExited(Option<u32>),
    Bell,
}

/// Initial geometry and colors.
#[derive(Debug, Clone, Copy)]
pub struct TerminalOptions {
    pub cell: CellSize,
    /// Pixel area the widget covers, padding included.
    pub area: PixelSize,
    pub scale_factor: f64,
    pub background: Color,
}

pub struct Terminal {
    screen: Screen,
    pty: PtyManager,
    style: &'static TerminalStyle,
    scale_factor: f64,
    title: Option<String>,
    exited: bool,
}

impl Terminal {
    /// Start `command` on a fresh PTY sized to fit `options.area`.
    ///
    /// The first terminal constructed installs `style` for the whole process.
    pub fn spawn(
        command: CommandBuilder,
        style: TerminalStyle,
        options: TerminalOptions,
        wakeup: Option<Wakeup>,
    ) -> Result<Self, TerminalError> {
        let style = TerminalStyle::install(style);
        let padding = style.padding.scaled(options.scale_factor);
        let size = SizeInfo::from_pixels(options.area, options.cell, padding);
        let palette = Palette {
            foreground: style.foreground,
            background: options.background,
            cursor: style.cursor_color,
        };

        let pty = PtyManager::spawn(command, size.columns_u16(), size.lines_u16(), wakeup)?;
        let screen = Screen::new(size, style.scrollback_lines, palette);

        Ok(Self {
            screen,
            pty,
            style,
            scale_factor: options.scale_factor,
            title: None,
            exited: false,
        })
    }

    /// Feed queued child output into the screen and collect the resulting
    /// signals. Terminal replies are written back to the child here.
    pub fn pump(&mut self) -> Vec<TerminalSignal> {
        let mut signals = Vec::new();

        // Read the exit status first: once it is set, all output is queued.
        let exit = if self.exited {
            None
        } else {
            self.pty.exit_status()
        };

        let output = self.pty.drain_output();
        if !output.is_empty() {
            self.screen.feed(&output);
        }

        for event in self.screen.take_events() {
            self.handle_event(event, &mut signals);
        }

        if self.screen.cursor_moved() {
            signals.push(TerminalSignal::CursorMoved);
        }

        if let Some(code) = exit {
            self.exited = true;
            signals.push(TerminalSignal::ChildExited(code));
        }

        signals
    }

    fn handle_event(&mut self, event: TerminalEvent, signals: &mut Vec<TerminalSignal>) {
        match event {
            TerminalEvent::Title(title) => {
                if self.title.as_deref() != Some(title.as_str()) {
                    self.title = Some(title.clone());
                    signals.push(TerminalSignal::TitleChanged(Some(title)));
                }
            }
            TerminalEvent::ResetTitle => {
                if self.title.take().is_some() {
                    signals.push(TerminalSignal::TitleChanged(None));
                }
            }
            TerminalEvent::PtyWrite(text) => self.reply(text.as_bytes()),
            TerminalEvent::ColorRequest(index, format) => {
                let reply = format(self.screen.request_color(index));
                self.reply(reply.as_bytes());
            }
            TerminalEvent::TextAreaSizeRequest(format) => {
                let reply = format(self.screen.size().window_size());
                self.reply(reply.as_bytes());
            }
            TerminalEvent::Bell => signals.push(TerminalSignal::Bell),
            TerminalEvent::CursorBlinkingChange => {}
        }
    }

    fn reply(&mut self, bytes: &[u8]) {
        if let Err(e) = self.pty.write_input(bytes) {
            tracing::debug!(error = %e, "terminal reply not delivered");
        }
    }

    /// Send keyboard input to the child.
    pub fn write_input(&mut self, bytes: &[u8]) -> Result<(), TerminalError> {
        self.pty.write_input(bytes)?;
        Ok(())
    }

    /// Fit the grid into a new pixel area. Returns `true` if the grid changed
    /// shape, in which case the child has been told about the new size.
    pub fn resize_to_pixels(&mut self, area: PixelSize) -> Result<bool, TerminalError> {
        let size = SizeInfo::from_pixels(area, self.cell_size(), self.padding());
        self.apply_size(size)
    }

    /// Use a new cell size, keeping the widget's pixel area.
    pub fn set_font(&mut self, cell: CellSize) -> Result<bool, TerminalError> {
        let size = SizeInfo::from_pixels(self.widget_size(), cell, self.padding());
        self.apply_size(size)
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) -> Result<bool, TerminalError> {
        self.scale_factor = scale_factor;
        let size = SizeInfo::from_pixels(self.widget_size(), self.cell_size(), self.padding());
        self.apply_size(size)
    }

    fn apply_size(&mut self, size: SizeInfo) -> Result<bool, TerminalError> {
        let reshaped = self.screen.resize(size);
        if reshaped {
            self.pty.resize(size.columns_u16(), size.lines_u16())?;
            tracing::debug!(
                cols = size.columns(),
                rows = size.screen_lines(),
                area = %size.area,
                "terminal grid resized"
            );
        }
        Ok(reshaped)
    }

    pub fn set_color_background(&mut self, color: Color) {
        self.screen.set_background(color);
    }

    pub fn background(&self) -> Color {
        self.screen.palette().background
    }

    pub fn char_width(&self) -> u32 {
        self.screen.size().cell.width
    }

    pub fn char_height(&self) -> u32 {
        self.screen.size().cell.height
    }

    pub fn cell_size(&self) -> CellSize {
        self.screen.size().cell
    }

    pub fn column_count(&self) -> usize {
        self.screen.size().columns()
    }

    pub fn row_count(&self) -> usize {
        self.screen.size().screen_lines()
    }

    /// Pixel area the widget was last given, padding included.
    pub fn widget_size(&self) -> PixelSize {
        self.screen.size().area
    }

    /// Style padding in physical pixels.
    pub fn padding(&self) -> Padding {
        self.style.padding.scaled(self.scale_factor)
    }

    pub fn style(&self) -> &'static TerminalStyle {
        self.style
    }

    pub fn mode(&self) -> TermMode {
        self.screen.mode()
    }

    pub fn cursor_blinking(&self) -> bool {
        self.screen.cursor_blinking()
    }

    /// Whether cursor keys should send application (SS3) sequences.
    pub fn app_cursor(&self) -> bool {
        self.mode().contains(TermMode::APP_CURSOR)
    }

    pub fn snapshot(&self) -> GridSnapshot {
        self.screen.snapshot()
    }
}
