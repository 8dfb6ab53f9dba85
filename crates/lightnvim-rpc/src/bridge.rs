//! The editor control channel, as seen by the GUI.
//!
//! [`RpcBridge::start`] attaches to the editor, publishes this client's
//! channel id, subscribes to `Gui` notifications, sources the plugin
//! scripts, and starts the receive loop on its own thread. Notifications
//! never touch GUI state directly: they are posted through a [`GuiSink`]
//! to the GUI main loop.

use std::path::Path;
use std::thread::JoinHandle;
use std::time::Duration;

use lightnvim_common::{Color, FontDescriptor};
use rmpv::Value;

use crate::client::{attach, RpcClient, RpcHandler, RpcSession};
use crate::error::RpcError;

/// Event name the editor plugin notifies on.
pub const GUI_EVENT: &str = "Gui";
/// Editor global holding this client's channel id.
pub const CHANNEL_VAR: &str = "gui_channel";
/// Editor global echoing the last applied font spec.
pub const FONT_VAR: &str = "GuiFont";
/// Command sent on window close.
pub const QUIT_COMMAND: &str = "qa";

const FONT_COMMAND: &str = "Font";
const COLOR_COMMAND: &str = "Color";

/// Events posted from the receive thread to the GUI main loop.
#[derive(Debug, Clone, PartialEq)]
pub enum GuiEvent {
    Font { spec: String, font: FontDescriptor },
    Color { spec: String, color: Color },
    /// The readiness grace period has elapsed.
    Ready,
    /// A quit could not be delivered because the connection is gone.
    EditorGone,
}

/// Posts events onto the GUI main loop.
pub trait GuiSink: Clone + Send + 'static {
    fn post(&self, event: GuiEvent);
}

/// Script paths and timing for [`RpcBridge::start`].
#[derive(Debug, Clone)]
pub struct BridgeOptions {
    /// Sourced with `:runtime`.
    pub plugin_script: String,
    /// Sourced with `:runtime!`; missing files are fine.
    pub init_script: String,
    pub readiness_grace: Duration,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            plugin_script: "plugin/lightnvim.vim".into(),
            init_script: "ginit.vim".into(),
            readiness_grace: Duration::from_millis(100),
        }
    }
}

/// What [`RpcBridge::quit`] managed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOutcome {
    /// The quit command was queued on the receive loop.
    Scheduled,
    /// The receive loop had already exited.
    ConnectionClosed,
}

// =============================================================================
// Handshake
// =============================================================================

/// Publish this client's channel id and subscribe to `Gui` events.
pub fn announce_channel(session: &mut RpcSession) -> Result<u64, RpcError> {
    let channel_id = session.channel_id()?;
    session.request(
        "nvim_set_var",
        vec![Value::from(CHANNEL_VAR), Value::from(channel_id)],
    )?;
    match session.request("nvim_subscribe", vec![Value::from(GUI_EVENT)]) {
        Ok(_) => {}
        // Newer editors drop nvim_subscribe; rpcnotify to our channel still works.
        Err(RpcError::Editor(e)) => tracing::warn!(error = %e, "subscribe rejected"),
        Err(e) => return Err(e),
    }
    tracing::info!(channel_id, "announced gui channel");
    Ok(channel_id)
}

/// Source the plugin and user init scripts, fire-and-forget.
pub fn bootstrap(session: &mut RpcSession, options: &BridgeOptions) {
    let commands = [
        format!("runtime {}", options.plugin_script),
        format!("runtime! {}", options.init_script),
    ];
    for command in commands {
        if let Err(e) = session.notify("nvim_command", vec![Value::from(command.as_str())]) {
            tracing::debug!(%command, error = %e, "bootstrap command not sent");
        }
    }
}

// =============================================================================
// Notification routing
// =============================================================================

/// Decode a `Gui` notification. Anything unrecognized yields `None`.
pub fn parse_notification(event: &str, args: &[Value]) -> Option<GuiEvent> {
    if event != GUI_EVENT {
        return None;
    }
    let (command, rest) = args.split_first()?;
    let spec = rest.first().and_then(Value::as_str);

    match (command.as_str()?, spec) {
        (FONT_COMMAND, Some(spec)) => Some(GuiEvent::Font {
            spec: spec.to_owned(),
            font: FontDescriptor::parse(spec),
        }),
        (COLOR_COMMAND, Some(spec)) => match Color::parse(spec) {
            Some(color) => Some(GuiEvent::Color {
                spec: spec.to_owned(),
                color,
            }),
            None => {
                tracing::debug!(spec, "ignoring unparseable color");
                None
            }
        },
        _ => None,
    }
}

/// Post a recognized notification to `sink`. Returns whether it was posted.
pub fn dispatch_notification(sink: &impl GuiSink, event: &str, args: &[Value]) -> bool {
    match parse_notification(event, args) {
        Some(gui_event) => {
            sink.post(gui_event);
            true
        }
        None => {
            tracing::trace!(event, "dropping notification");
            false
        }
    }
}

/// [`RpcHandler`] that forwards `Gui` notifications to a [`GuiSink`].
pub struct NotificationRouter<S> {
    sink: S,
}

impl<S: GuiSink> NotificationRouter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }
}

impl<S: GuiSink> RpcHandler for NotificationRouter<S> {
    fn on_notification(&mut self, method: &str, params: Vec<Value>) {
        dispatch_notification(&self.sink, method, &params);
    }
}

/// Body of the receive thread.
pub fn run_receive_loop<H: RpcHandler>(session: RpcSession, handler: H) {
    match session.run_loop(handler) {
        Ok(()) => tracing::info!("editor closed the rpc connection"),
        Err(e) if e.is_disconnected() => tracing::info!(error = %e, "rpc connection lost"),
        Err(e) => tracing::warn!(error = %e, "rpc receive loop failed"),
    }
}

// =============================================================================
// RpcBridge
// =============================================================================

/// An attached, running control channel.
pub struct RpcBridge<S> {
    client: RpcClient,
    channel_id: u64,
    sink: S,
    receive_thread: JoinHandle<()>,
}

impl<S: GuiSink> RpcBridge<S> {
    /// Attach, announce, bootstrap, and start the receive thread.
    ///
    /// `GuiEvent::Ready` is posted once `options.readiness_grace` has
    /// elapsed. Attach failures are returned; there is no retry.
    pub fn start(socket: &Path, options: &BridgeOptions, sink: S) -> Result<Self, RpcError> {
        let mut session = attach(socket)?;
        let channel_id = announce_channel(&mut session)?;
        bootstrap(&mut session, options);

        let client = session.client();
        let router = NotificationRouter::new(sink.clone());
        let receive_thread = std::thread::Builder::new()
            .name("rpc-loop".into())
            .spawn(move || run_receive_loop(session, router))?;

        let ready = sink.clone();
        if let Err(e) = client.call_later(options.readiness_grace, move |_| {
            ready.post(GuiEvent::Ready);
        }) {
            tracing::warn!(error = %e, "readiness timer not scheduled");
        }

        Ok(Self {
            client,
            channel_id,
            sink,
            receive_thread,
        })
    }

    pub fn channel_id(&self) -> u64 {
        self.channel_id
    }

    /// Whether the receive thread is still serving the connection.
    pub fn is_running(&self) -> bool {
        !self.receive_thread.is_finished()
    }

    /// Ask the editor to quit, via the receive loop.
    ///
    /// A dead connection is not an error: it posts `GuiEvent::EditorGone`
    /// so the window can close. Editor-side refusals are only logged.
    pub fn quit(&self) -> QuitOutcome {
        let sink = self.sink.clone();
        let scheduled = self.client.async_call(move |client| {
            client.request_with(
                "nvim_command",
                vec![Value::from(QUIT_COMMAND)],
                move |result| match result {
                    Ok(_) => tracing::debug!("quit acknowledged"),
                    Err(e) if e.is_disconnected() => {
                        tracing::debug!("editor closed the connection while quitting");
                    }
                    Err(e) => tracing::info!(error = %e, "editor declined to quit"),
                },
            );
        });

        match scheduled {
            Ok(()) => QuitOutcome::Scheduled,
            Err(e) => {
                tracing::debug!(error = %e, "quit on a closed connection");
                sink.post(GuiEvent::EditorGone);
                QuitOutcome::ConnectionClosed
            }
        }
    }

    /// Tell the editor which font is now in use.
    pub fn echo_font(&self, spec: &str) {
        if let Err(e) = self.client.notify(
            "nvim_set_var",
            vec![Value::from(FONT_VAR), Value::from(spec)],
        ) {
            tracing::debug!(error = %e, "font echo not sent");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_editor::{FakeEditor, Received, Reply};
    use lightnvim_common::{FontStyle, FontWeight};
    use std::sync::mpsc::{channel, Receiver, Sender};
    use std::sync::{Arc, Mutex};

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[derive(Clone)]
    struct ChannelSink(Arc<Mutex<Sender<GuiEvent>>>);

    impl GuiSink for ChannelSink {
        fn post(&self, event: GuiEvent) {
            let _ = self.0.lock().unwrap().send(event);
        }
    }

    fn sink() -> (ChannelSink, Receiver<GuiEvent>) {
        let (tx, rx) = channel();
        (ChannelSink(Arc::new(Mutex::new(tx))), rx)
    }

    fn args(items: &[&str]) -> Vec<Value> {
        items.iter().map(|s| Value::from(*s)).collect()
    }

    #[test]
    fn font_notification_posts_one_decoded_event() {
        let (sink, rx) = sink();
        assert!(dispatch_notification(&sink, "Gui", &args(&["Font", "Monospace:h12"])));
        let event = rx.try_recv().unwrap();
        let GuiEvent::Font { spec, font } = event else {
            panic!("expected font event");
        };
        assert_eq!(spec, "Monospace:h12");
        assert_eq!(font.family, "Monospace");
        assert_eq!(font.size, Some(12.0));
        assert_eq!(font.weight, FontWeight::Normal);
        assert_eq!(font.style, FontStyle::Normal);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn color_notification_posts_parsed_color() {
        let (sink, rx) = sink();
        assert!(dispatch_notification(&sink, "Gui", &args(&["Color", "#102030"])));
        assert_eq!(
            rx.try_recv().unwrap(),
            GuiEvent::Color {
                spec: "#102030".into(),
                color: Color::from_rgba(0x10, 0x20, 0x30, 255),
            }
        );
    }

    #[test]
    fn unknown_and_malformed_notifications_are_dropped() {
        let (sink, rx) = sink();
        assert!(!dispatch_notification(&sink, "Gui", &args(&["Unknown", "x"])));
        assert!(!dispatch_notification(&sink, "Gui", &[]));
        assert!(!dispatch_notification(&sink, "Gui", &args(&["Font"])));
        assert!(!dispatch_notification(&sink, "Gui", &[Value::from(1), Value::from("x")]));
        assert!(!dispatch_notification(&sink, "Gui", &args(&["Color", "nope"])));
        assert!(!dispatch_notification(&sink, "Other", &args(&["Font", "Hack:h9"])));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn extra_font_args_are_ignored() {
        let event = parse_notification("Gui", &args(&["Font", "Hack:h9:b", "extra"])).unwrap();
        assert!(matches!(event, GuiEvent::Font { ref font, .. } if font.is_bold()));
    }

    #[test]
    fn start_announces_subscribes_and_bootstraps() {
        let editor = FakeEditor::spawn(|_, _| Reply::Ok(Value::Nil));
        let (sink, _rx) = sink();
        let options = BridgeOptions::default();
        let bridge = RpcBridge::start(editor.path(), &options, sink).unwrap();
        assert_eq!(bridge.channel_id(), FakeEditor::CHANNEL_ID);

        let seen: Vec<Received> = (0..5).map(|_| editor.next_received(TIMEOUT)).collect();
        assert_eq!(seen[0].method(), "nvim_get_api_info");
        assert_eq!(seen[1].method(), "nvim_set_var");
        assert_eq!(
            seen[1].params(),
            &[Value::from("gui_channel"), Value::from(FakeEditor::CHANNEL_ID)]
        );
        assert_eq!(seen[2].method(), "nvim_subscribe");
        assert_eq!(seen[2].params(), &[Value::from("Gui")]);
        assert!(matches!(seen[3], Received::Notification { .. }));
        assert_eq!(seen[3].params(), &[Value::from("runtime plugin/lightnvim.vim")]);
        assert_eq!(seen[4].params(), &[Value::from("runtime! ginit.vim")]);
    }

    #[test]
    fn rejected_subscribe_is_not_fatal() {
        let editor = FakeEditor::spawn(|method, _| match method {
            "nvim_subscribe" => Reply::Err("Invalid method: nvim_subscribe".into()),
            _ => Reply::Ok(Value::Nil),
        });
        let (sink, _rx) = sink();
        assert!(RpcBridge::start(editor.path(), &BridgeOptions::default(), sink).is_ok());
    }

    #[test]
    fn attach_failure_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let (sink, _rx) = sink();
        let socket = dir.path().join("nvim_none");
        let result = RpcBridge::start(&socket, &BridgeOptions::default(), sink);
        assert!(matches!(result, Err(RpcError::Attach { .. })));
    }

    #[test]
    fn ready_posts_after_grace_period() {
        let editor = FakeEditor::spawn(|_, _| Reply::Ok(Value::Nil));
        let (sink, rx) = sink();
        let options = BridgeOptions {
            readiness_grace: Duration::from_millis(50),
            ..BridgeOptions::default()
        };
        let started = std::time::Instant::now();
        let _bridge = RpcBridge::start(editor.path(), &options, sink).unwrap();
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), GuiEvent::Ready);
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn gui_notifications_reach_sink_in_order() {
        let editor = FakeEditor::spawn(|_, _| Reply::Ok(Value::Nil));
        let (sink, rx) = sink();
        let options = BridgeOptions {
            readiness_grace: Duration::from_secs(60),
            ..BridgeOptions::default()
        };
        let _bridge = RpcBridge::start(editor.path(), &options, sink).unwrap();

        editor.notify("Gui", args(&["Color", "black"]));
        editor.notify("Gui", args(&["Unknown"]));
        editor.notify("Gui", args(&["Font", "Monospace_10:h14:b:i"]));

        assert!(matches!(rx.recv_timeout(TIMEOUT).unwrap(), GuiEvent::Color { .. }));
        let GuiEvent::Font { font, .. } = rx.recv_timeout(TIMEOUT).unwrap() else {
            panic!("expected font event");
        };
        assert_eq!(font.family, "Monospace 10");
        assert_eq!(font.size, Some(14.0));
    }

    #[test]
    fn quit_sends_qa() {
        let editor = FakeEditor::spawn(|_, _| Reply::Ok(Value::Nil));
        let (sink, _rx) = sink();
        let bridge = RpcBridge::start(editor.path(), &BridgeOptions::default(), sink).unwrap();
        for _ in 0..5 {
            editor.next_received(TIMEOUT);
        }

        assert_eq!(bridge.quit(), QuitOutcome::Scheduled);
        let received = editor.next_received(TIMEOUT);
        assert_eq!(received.method(), "nvim_command");
        assert_eq!(received.params(), &[Value::from("qa")]);
    }

    #[test]
    fn quit_on_closed_connection_is_swallowed() {
        let editor = FakeEditor::spawn(|method, params| {
            if method == "nvim_command" && params == [Value::from("qa")] {
                Reply::Hangup
            } else {
                Reply::Ok(Value::Nil)
            }
        });
        let (sink, rx) = sink();
        let options = BridgeOptions {
            readiness_grace: Duration::from_secs(60),
            ..BridgeOptions::default()
        };
        let bridge = RpcBridge::start(editor.path(), &options, sink).unwrap();

        // First quit reaches the editor, which hangs up without replying.
        assert_eq!(bridge.quit(), QuitOutcome::Scheduled);
        let deadline = std::time::Instant::now() + TIMEOUT;
        while bridge.is_running() {
            assert!(std::time::Instant::now() < deadline, "loop did not exit");
            std::thread::sleep(Duration::from_millis(5));
        }

        // Second quit finds the connection gone and lets the window close.
        assert_eq!(bridge.quit(), QuitOutcome::ConnectionClosed);
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), GuiEvent::EditorGone);
    }

    #[test]
    fn editor_refusal_is_swallowed() {
        let editor = FakeEditor::spawn(|method, _| match method {
            "nvim_command" => Reply::Err("E37: No write since last change".into()),
            _ => Reply::Ok(Value::Nil),
        });
        let (sink, rx) = sink();
        let options = BridgeOptions {
            readiness_grace: Duration::from_secs(60),
            ..BridgeOptions::default()
        };
        let bridge = RpcBridge::start(editor.path(), &options, sink).unwrap();
        assert_eq!(bridge.quit(), QuitOutcome::Scheduled);
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        assert!(bridge.is_running());
    }

    #[test]
    fn echo_font_sets_editor_variable() {
        let editor = FakeEditor::spawn(|_, _| Reply::Ok(Value::Nil));
        let (sink, _rx) = sink();
        let bridge = RpcBridge::start(editor.path(), &BridgeOptions::default(), sink).unwrap();
        for _ in 0..5 {
            editor.next_received(TIMEOUT);
        }
        bridge.echo_font("Hack:h11");
        let received = editor.next_received(TIMEOUT);
        assert_eq!(received.method(), "nvim_set_var");
        assert_eq!(received.params(), &[Value::from("GuiFont"), Value::from("Hack:h11")]);
    }
}
