//! Teardown: stop the editor, remove its socket, release the GPU.

use super::core::LightNvimApp;

// =============================================================================
// SHUTDOWN
// =============================================================================

impl LightNvimApp {
    /// Release everything the window owns. Safe to call more than once.
    ///
    /// Order matters:
    /// 1. Drop the terminal (kills the editor if it is still running)
    /// 2. Remove a socket the editor left behind
    /// 3. Release GPU resources
    pub(super) fn shutdown(&mut self) {
        if self.terminal.is_none() && self.render_state.is_none() {
            return;
        }
        tracing::info!(
            rpc_running = self.session.link().is_some_and(|bridge| bridge.is_running()),
            "Initiating shutdown"
        );

        self.terminal = None;

        let socket = self.session.socket();
        if socket.exists() {
            match std::fs::remove_file(socket) {
                Ok(()) => tracing::debug!(socket = %socket.display(), "removed stale socket"),
                Err(e) => tracing::debug!(socket = %socket.display(), "socket not removed: {e}"),
            }
        }

        self.render_state = None;

        tracing::info!("Shutdown complete");
    }
}
