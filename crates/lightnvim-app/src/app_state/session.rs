//! Per-window editor session: socket address, control channel, readiness.

use std::path::{Path, PathBuf};

use lightnvim_common::{socket_name, OneShot};
use lightnvim_rpc::{GuiSink, QuitOutcome, RpcBridge};

/// What the session needs from an attached control channel.
pub trait EditorLink {
    fn quit(&self) -> QuitOutcome;
    fn echo_font(&self, spec: &str);
}

impl<S: GuiSink> EditorLink for RpcBridge<S> {
    fn quit(&self) -> QuitOutcome {
        RpcBridge::quit(self)
    }

    fn echo_font(&self, spec: &str) {
        RpcBridge::echo_font(self, spec)
    }
}

/// How the window should respond to a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseAction {
    /// Nothing to wait for; destroy the window now.
    DestroyWindow,
    /// Quit was sent; the window goes away when the editor exits.
    AwaitEditorExit,
}

pub struct Session<L> {
    socket: PathBuf,
    link: Option<L>,
    attach: OneShot,
    initialized: bool,
}

impl<L: EditorLink> Session<L> {
    /// New session listening on `<tmp>/nvim_<uuid>`.
    pub fn new() -> Self {
        Self::with_socket(std::env::temp_dir().join(socket_name()))
    }

    pub fn with_socket(socket: PathBuf) -> Self {
        Self {
            socket,
            link: None,
            attach: OneShot::new(),
            initialized: false,
        }
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    pub fn link(&self) -> Option<&L> {
        self.link.as_ref()
    }

    /// Attach on the first call only. Returns `Ok(true)` when `connect` ran
    /// and succeeded; later calls return `Ok(false)` without running it.
    pub fn attach_once<E>(
        &mut self,
        connect: impl FnOnce(&Path) -> Result<L, E>,
    ) -> Result<bool, E> {
        if !self.attach.fire() {
            return Ok(false);
        }
        let link = connect(&self.socket)?;
        self.link = Some(link);
        tracing::info!(socket = %self.socket.display(), "attached to editor");
        Ok(true)
    }

    /// The readiness grace period after subscribing has elapsed.
    pub fn mark_ready(&mut self) {
        if !self.initialized {
            tracing::debug!("editor session ready");
        }
        self.initialized = true;
    }

    /// Decide what a window close does. Only a ready session contacts the
    /// editor.
    pub fn close(&self) -> CloseAction {
        let Some(link) = self.link.as_ref().filter(|_| self.initialized) else {
            tracing::debug!("closing before the editor is ready");
            return CloseAction::DestroyWindow;
        };
        match link.quit() {
            QuitOutcome::Scheduled => CloseAction::AwaitEditorExit,
            QuitOutcome::ConnectionClosed => CloseAction::DestroyWindow,
        }
    }

    pub fn echo_font(&self, spec: &str) {
        if let Some(link) = &self.link {
            link.echo_font(spec);
        }
    }
}

impl<L: EditorLink> Default for Session<L> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    struct FakeLink {
        outcome: QuitOutcome,
        quits: Cell<usize>,
        fonts: RefCell<Vec<String>>,
    }

    impl FakeLink {
        fn new(outcome: QuitOutcome) -> Self {
            Self {
                outcome,
                quits: Cell::new(0),
                fonts: RefCell::new(Vec::new()),
            }
        }
    }

    impl EditorLink for FakeLink {
        fn quit(&self) -> QuitOutcome {
            self.quits.set(self.quits.get() + 1);
            self.outcome
        }

        fn echo_font(&self, spec: &str) {
            self.fonts.borrow_mut().push(spec.to_owned());
        }
    }

    fn attached(outcome: QuitOutcome) -> Session<FakeLink> {
        let mut session = Session::with_socket(PathBuf::from("/tmp/nvim_test"));
        let attached = session
            .attach_once(|_| Ok::<_, ()>(FakeLink::new(outcome)))
            .unwrap();
        assert!(attached);
        session
    }

    #[test]
    fn socket_is_a_fresh_temp_path() {
        let a: Session<FakeLink> = Session::new();
        let b: Session<FakeLink> = Session::new();
        assert_ne!(a.socket(), b.socket());
        assert!(a.socket().starts_with(std::env::temp_dir()));
        let name = a.socket().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("nvim_"));
    }

    #[test]
    fn attach_runs_once_with_session_socket() {
        let mut session: Session<FakeLink> = Session::with_socket(PathBuf::from("/tmp/s"));
        let mut seen = Vec::new();
        let first = session.attach_once(|path| {
            seen.push(path.to_path_buf());
            Ok::<_, ()>(FakeLink::new(QuitOutcome::Scheduled))
        });
        let second = session.attach_once(|path| {
            seen.push(path.to_path_buf());
            Ok::<_, ()>(FakeLink::new(QuitOutcome::Scheduled))
        });
        assert_eq!(first, Ok(true));
        assert_eq!(second, Ok(false));
        assert_eq!(seen, vec![PathBuf::from("/tmp/s")]);
        assert!(session.link().is_some());
    }

    #[test]
    fn attach_failure_is_returned_and_not_retried() {
        let mut session: Session<FakeLink> = Session::with_socket(PathBuf::from("/tmp/s"));
        assert_eq!(session.attach_once(|_| Err("refused")), Err("refused"));
        assert!(session.link().is_none());
        assert_eq!(
            session.attach_once(|_| Ok::<_, &str>(FakeLink::new(QuitOutcome::Scheduled))),
            Ok(false)
        );
    }

    #[test]
    fn close_before_attach_destroys_window() {
        let session: Session<FakeLink> = Session::with_socket(PathBuf::from("/tmp/s"));
        assert_eq!(session.close(), CloseAction::DestroyWindow);
    }

    #[test]
    fn close_before_ready_does_not_contact_editor() {
        let session = attached(QuitOutcome::Scheduled);
        assert_eq!(session.close(), CloseAction::DestroyWindow);
        assert_eq!(session.link().unwrap().quits.get(), 0);
    }

    #[test]
    fn close_after_ready_quits_first() {
        let mut session = attached(QuitOutcome::Scheduled);
        session.mark_ready();
        assert_eq!(session.close(), CloseAction::AwaitEditorExit);
        assert_eq!(session.link().unwrap().quits.get(), 1);
    }

    #[test]
    fn quit_on_closed_connection_still_destroys_window() {
        let mut session = attached(QuitOutcome::ConnectionClosed);
        session.mark_ready();
        assert_eq!(session.close(), CloseAction::DestroyWindow);
        assert_eq!(session.link().unwrap().quits.get(), 1);
    }

    #[test]
    fn font_echo_needs_a_link() {
        let unattached: Session<FakeLink> = Session::with_socket(PathBuf::from("/tmp/s"));
        unattached.echo_font("Hack:h10");

        let session = attached(QuitOutcome::Scheduled);
        session.echo_font("Hack:h10");
        assert_eq!(*session.link().unwrap().fonts.borrow(), vec!["Hack:h10"]);
    }
}
