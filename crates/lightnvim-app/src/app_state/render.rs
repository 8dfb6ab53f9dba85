//! Frame rendering and cursor blinking.

use std::time::{Duration, Instant};

use lightnvim_renderer::FrameInput;

use super::core::{Blink, LightNvimApp};

impl Blink {
    /// Show the cursor and restart the phase.
    pub(super) fn reset(&mut self, now: Instant, interval: Duration) {
        self.visible = true;
        self.next_toggle = now + interval;
    }

    /// Toggle if the phase has elapsed. Returns whether visibility changed.
    pub(super) fn advance(&mut self, now: Instant, interval: Duration) -> bool {
        if now < self.next_toggle {
            return false;
        }
        self.visible = !self.visible;
        self.next_toggle = now + interval;
        true
    }
}

impl LightNvimApp {
    /// Blink interval, or `None` when the cursor does not blink.
    fn blink_interval(&self) -> Option<Duration> {
        let terminal = self.terminal.as_ref()?;
        let style = terminal.style();
        let blinking = style.cursor_blink || terminal.cursor_blinking();
        blinking.then_some(style.blink_interval)
    }

    pub(super) fn reset_blink(&mut self) {
        if let Some(interval) = self.blink_interval() {
            self.blink.reset(Instant::now(), interval);
        }
    }

    /// Advance the blink phase. Returns when it next needs attention.
    pub(super) fn advance_blink(&mut self, now: Instant) -> Option<Instant> {
        let interval = self.blink_interval()?;
        if self.blink.advance(now, interval) {
            self.request_redraw();
        }
        Some(self.blink.next_toggle)
    }

    /// Render a single frame from the terminal's current contents.
    pub(super) fn render_frame(&mut self) {
        let cursor_visible = self.blink.visible || self.blink_interval().is_none();
        let (Some(rs), Some(terminal)) = (self.render_state.as_mut(), self.terminal.as_ref())
        else {
            return;
        };

        let snapshot = terminal.snapshot();
        let input = FrameInput {
            snapshot: &snapshot,
            padding: terminal.padding(),
            cursor_visible,
            cursor_aspect_ratio: terminal.style().cursor_aspect_ratio,
        };
        if let Err(e) = rs.render_frame(input) {
            tracing::error!("Render error: {e}");
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(600);

    #[test]
    fn blink_waits_for_its_phase() {
        let start = Instant::now();
        let mut blink = Blink {
            visible: true,
            next_toggle: start + INTERVAL,
        };
        assert!(!blink.advance(start, INTERVAL));
        assert!(blink.visible);

        assert!(blink.advance(start + INTERVAL, INTERVAL));
        assert!(!blink.visible);
        assert_eq!(blink.next_toggle, start + INTERVAL * 2);

        assert!(blink.advance(start + INTERVAL * 2, INTERVAL));
        assert!(blink.visible);
    }

    #[test]
    fn reset_shows_cursor_for_a_full_phase() {
        let start = Instant::now();
        let mut blink = Blink {
            visible: false,
            next_toggle: start,
        };
        blink.reset(start, INTERVAL);
        assert!(blink.visible);
        assert!(!blink.advance(start + INTERVAL / 2, INTERVAL));
        assert!(blink.visible);
    }
}
