//! PTY management using the `portable-pty` crate.
//!
//! [`PtyManager`] owns the pseudo-terminal pair and the child process. Output
//! is read on a background thread and queued on a channel, so draining it
//! from the GUI thread never blocks. Once the child closes the terminal the
//! same thread reaps its exit status.

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use std::io::{Read, Write};
use std::sync::{mpsc, Arc, Mutex, OnceLock};
use std::time::Duration;

const PTY_READ_CHUNK: usize = 8192;
const REAP_INTERVAL: Duration = Duration::from_millis(10);

/// Callback run on the reader thread whenever new output is queued and once
/// more when the child has exited.
pub type Wakeup = Arc<dyn Fn() + Send + Sync>;

type SharedChild = Arc<Mutex<Box<dyn Child + Send + Sync>>>;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors originating from PTY operations.
#[derive(Debug, thiserror::Error)]
pub enum PtyError {
    #[error("failed to spawn process: {0}")]
    SpawnFailed(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("failed to resize PTY: {0}")]
    ResizeFailed(String),
}

// ---------------------------------------------------------------------------
// PtyManager
// ---------------------------------------------------------------------------

pub struct PtyManager {
    master: Box<dyn MasterPty + Send>,
    writer: Box<dyn Write + Send>,
    child: SharedChild,
    rx: mpsc::Receiver<Vec<u8>>,
    /// Set by the reader thread after the last output chunk was queued.
    exit_status: Arc<OnceLock<Option<u32>>>,
}

impl PtyManager {
    /// Spawn `command` inside a PTY of the given size.
    pub fn spawn(
        command: CommandBuilder,
        cols: u16,
        rows: u16,
        wakeup: Option<Wakeup>,
    ) -> Result<Self, PtyError> {
        let pair = native_pty_system()
            .openpty(pty_size(cols, rows))
            .map_err(|e| PtyError::SpawnFailed(e.to_string()))?;

        let child = pair
            .slave
            .spawn_command(command)
            .map_err(|e| PtyError::SpawnFailed(e.to_string()))?;
        // The child holds its own copy of the slave side.
        drop(pair.slave);

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| PtyError::SpawnFailed(e.to_string()))?;

        let writer = pair
            .master
            .take_writer()
            .map_err(|e| PtyError::SpawnFailed(e.to_string()))?;

        tracing::info!(pid = ?child.process_id(), cols, rows, "PTY child spawned");

        let child: SharedChild = Arc::new(Mutex::new(child));
        let exit_status = Arc::new(OnceLock::new());
        let (tx, rx) = mpsc::channel();

        let thread_child = Arc::clone(&child);
        let thread_status = Arc::clone(&exit_status);
        std::thread::Builder::new()
            .name("pty-reader".into())
            .spawn(move || {
                read_loop(reader, &tx, wakeup.as_deref());
                let status = reap(&thread_child);
                tracing::info!(code = ?status, "PTY child exited");
                let _ = thread_status.set(status);
                if let Some(wakeup) = &wakeup {
                    wakeup();
                }
            })
            .map_err(|e| PtyError::SpawnFailed(e.to_string()))?;

        Ok(Self {
            master: pair.master,
            writer,
            child,
            rx,
            exit_status,
        })
    }

    /// Take every output chunk queued so far.
    pub fn drain_output(&self) -> Vec<u8> {
        let mut output = Vec::new();
        while let Ok(chunk) = self.rx.try_recv() {
            output.extend_from_slice(&chunk);
        }
        output
    }

    /// Write data (keystrokes or terminal replies) to the child's stdin.
    pub fn write_input(&mut self, data: &[u8]) -> Result<(), PtyError> {
        self.writer.write_all(data)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Inform the kernel (and thus the child) that the terminal size changed.
    pub fn resize(&self, cols: u16, rows: u16) -> Result<(), PtyError> {
        self.master
            .resize(pty_size(cols, rows))
            .map_err(|e| PtyError::ResizeFailed(e.to_string()))
    }

    /// `Some(code)` once the child has exited and all of its output has been
    /// queued. The inner value is `None` if the status could not be read.
    pub fn exit_status(&self) -> Option<Option<u32>> {
        self.exit_status.get().copied()
    }

    pub fn is_finished(&self) -> bool {
        self.exit_status.get().is_some()
    }

    /// Send SIGKILL (or platform equivalent) to the child process.
    pub fn kill(&self) {
        if let Ok(mut child) = self.child.lock() {
            let _ = child.kill();
        }
    }
}

impl Drop for PtyManager {
    fn drop(&mut self) {
        if !self.is_finished() {
            self.kill();
        }
    }
}

fn pty_size(cols: u16, rows: u16) -> PtySize {
    PtySize {
        rows,
        cols,
        pixel_width: 0,
        pixel_height: 0,
    }
}

fn read_loop(
    mut reader: Box<dyn Read + Send>,
    tx: &mpsc::Sender<Vec<u8>>,
    wakeup: Option<&(dyn Fn() + Send + Sync)>,
) {
    let mut buf = [0u8; PTY_READ_CHUNK];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
                if let Some(wakeup) = wakeup {
                    wakeup();
                }
            }
            // EIO is how Linux reports a closed slave side.
            Err(e) => {
                tracing::debug!(error = %e, "PTY read ended");
                break;
            }
        }
    }
}

/// Poll until the child's exit status is available.
fn reap(child: &SharedChild) -> Option<u32> {
    loop {
        let polled = match child.lock() {
            Ok(mut child) => child.try_wait(),
            Err(_) => return None,
        };
        match polled {
            Ok(Some(status)) => return Some(status.exit_code()),
            Ok(None) => std::thread::sleep(REAP_INTERVAL),
            Err(e) => {
                tracing::debug!(error = %e, "could not read child exit status");
                return None;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    fn sh(script: &str) -> CommandBuilder {
        let mut cmd = CommandBuilder::new("/bin/sh");
        cmd.arg("-c");
        cmd.arg(script);
        cmd
    }

    fn wait_for_exit(mgr: &PtyManager) -> (String, Option<u32>) {
        let mut output = String::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let status = mgr.exit_status();
            output.push_str(&String::from_utf8_lossy(&mgr.drain_output()));
            if let Some(code) = status {
                return (output, code);
            }
            assert!(Instant::now() < deadline, "child never exited: {output:?}");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    #[cfg(unix)]
    fn spawn_and_echo() {
        let mut mgr = PtyManager::spawn(CommandBuilder::new("/bin/sh"), 80, 24, None).unwrap();
        mgr.write_input(b"echo hello\n").unwrap();
        mgr.write_input(b"exit\n").unwrap();

        let (output, code) = wait_for_exit(&mgr);
        assert!(output.contains("hello"), "got: {output:?}");
        assert_eq!(code, Some(0));
    }

    #[test]
    #[cfg(unix)]
    fn exit_code_is_reported_after_output() {
        let mgr = PtyManager::spawn(sh("printf done; exit 3"), 80, 24, None).unwrap();
        let (output, code) = wait_for_exit(&mgr);
        assert!(output.contains("done"), "got: {output:?}");
        assert_eq!(code, Some(3));
        assert!(mgr.is_finished());
    }

    #[test]
    #[cfg(unix)]
    fn wakeup_fires_for_output_and_exit() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let wakeup: Wakeup = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let mgr = PtyManager::spawn(sh("printf x"), 80, 24, Some(wakeup)).unwrap();
        wait_for_exit(&mgr);
        // At least one output chunk plus the exit notification.
        assert!(count.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    #[cfg(unix)]
    fn resize_reaches_child() {
        let mut mgr = PtyManager::spawn(CommandBuilder::new("/bin/sh"), 80, 24, None).unwrap();
        mgr.resize(100, 30).unwrap();
        mgr.write_input(b"stty size; exit\n").unwrap();
        let (output, _) = wait_for_exit(&mgr);
        assert!(output.contains("30 100"), "got: {output:?}");
    }

    #[test]
    fn pty_error_display() {
        let err = PtyError::ResizeFailed("bad size".into());
        assert_eq!(err.to_string(), "failed to resize PTY: bad size");
    }
}
