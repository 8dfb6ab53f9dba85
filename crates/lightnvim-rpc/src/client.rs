//! msgpack-rpc client over a Unix domain socket.
//!
//! [`attach`] returns an [`RpcSession`] that owns the connection. Before the
//! receive loop starts, the session issues requests inline on the calling
//! thread; notifications that arrive meanwhile are queued. [`RpcSession::run_loop`]
//! then blocks, serving the socket and the commands sent through cloned
//! [`RpcClient`] handles until the editor closes the connection.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::thread::ThreadId;
use std::time::Duration;

use rmpv::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::codec::{response_result, FrameDecoder, RpcMessage};
use crate::error::RpcError;

const READ_CHUNK: usize = 16 * 1024;

/// Reply continuation for an asynchronous request.
pub type ReplyCallback = Box<dyn FnOnce(Result<Value, RpcError>) + Send + 'static>;

/// Closure executed on the receive-loop thread.
pub type LoopCallback = Box<dyn FnOnce(&RpcClient) + Send + 'static>;

/// Receives traffic initiated by the editor.
pub trait RpcHandler: Send + 'static {
    fn on_notification(&mut self, method: &str, params: Vec<Value>);

    /// Answer an editor-initiated request. `Err` becomes the response error.
    fn on_request(&mut self, method: &str, params: Vec<Value>) -> Result<Value, Value> {
        tracing::debug!(method, params = params.len(), "unhandled rpc request");
        Ok(Value::Nil)
    }
}

// =============================================================================
// Commands
// =============================================================================

enum Command {
    Notify {
        method: String,
        params: Vec<Value>,
    },
    Request {
        method: String,
        params: Vec<Value>,
        reply: ReplyCallback,
    },
    Call(LoopCallback),
    CallLater(Duration, LoopCallback),
}

impl Command {
    /// Fail any reply this command carries; the loop is gone.
    fn abandon(self) {
        if let Command::Request { reply, .. } = self {
            reply(Err(RpcError::Disconnected));
        }
    }
}

#[derive(Default)]
struct Shared {
    loop_thread: OnceLock<ThreadId>,
    channel_id: OnceLock<u64>,
}

// =============================================================================
// RpcClient
// =============================================================================

/// Thread-safe handle to a session's receive loop.
///
/// Every call is queued to the loop thread; nothing here touches the socket
/// directly.
#[derive(Clone)]
pub struct RpcClient {
    commands: mpsc::UnboundedSender<Command>,
    shared: Arc<Shared>,
}

impl fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcClient")
            .field("channel_id", &self.channel_id())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl RpcClient {
    /// The editor-assigned channel id, once known.
    pub fn channel_id(&self) -> Option<u64> {
        self.shared.channel_id.get().copied()
    }

    /// Whether the receive loop has exited.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// Fire-and-forget notification.
    pub fn notify(&self, method: &str, params: Vec<Value>) -> Result<(), RpcError> {
        self.send(Command::Notify {
            method: method.to_owned(),
            params,
        })
    }

    /// Send a request; `on_reply` runs on the loop thread with the outcome.
    ///
    /// If the loop is already gone, `on_reply` runs immediately with
    /// [`RpcError::Disconnected`].
    pub fn request_with<F>(&self, method: &str, params: Vec<Value>, on_reply: F)
    where
        F: FnOnce(Result<Value, RpcError>) + Send + 'static,
    {
        let command = Command::Request {
            method: method.to_owned(),
            params,
            reply: Box::new(on_reply),
        };
        if let Err(mpsc::error::SendError(command)) = self.commands.send(command) {
            command.abandon();
        }
    }

    /// Send a request and block until the reply arrives.
    ///
    /// Must not be called from the loop thread, which would never get to
    /// read the reply.
    pub fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        if self.on_loop_thread() {
            return Err(RpcError::Protocol(
                "blocking request issued from the rpc loop thread".into(),
            ));
        }
        let (tx, rx) = std::sync::mpsc::channel();
        self.request_with(method, params, move |result| {
            let _ = tx.send(result);
        });
        rx.recv().unwrap_or(Err(RpcError::Disconnected))
    }

    /// Run `f` on the loop thread.
    pub fn async_call<F>(&self, f: F) -> Result<(), RpcError>
    where
        F: FnOnce(&RpcClient) + Send + 'static,
    {
        self.send(Command::Call(Box::new(f)))
    }

    /// Run `f` on the loop thread once `delay` has elapsed.
    pub fn call_later<F>(&self, delay: Duration, f: F) -> Result<(), RpcError>
    where
        F: FnOnce(&RpcClient) + Send + 'static,
    {
        self.send(Command::CallLater(delay, Box::new(f)))
    }

    fn send(&self, command: Command) -> Result<(), RpcError> {
        self.commands.send(command).map_err(|mpsc::error::SendError(command)| {
            command.abandon();
            RpcError::Disconnected
        })
    }

    fn on_loop_thread(&self) -> bool {
        self.shared.loop_thread.get() == Some(&std::thread::current().id())
    }
}

// =============================================================================
// Framed socket halves
// =============================================================================

struct FrameReader {
    half: OwnedReadHalf,
    decoder: FrameDecoder,
}

impl FrameReader {
    /// Next message, or `None` once the peer closed the socket.
    async fn recv(&mut self) -> Result<Option<RpcMessage>, RpcError> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(message) = self.decoder.next_message()? {
                return Ok(Some(message));
            }
            let n = self.half.read(&mut chunk).await?;
            if n == 0 {
                if self.decoder.buffered() > 0 {
                    tracing::debug!(
                        bytes = self.decoder.buffered(),
                        "rpc connection closed mid-message"
                    );
                }
                return Ok(None);
            }
            self.decoder.extend(&chunk[..n]);
        }
    }
}

struct FrameWriter {
    half: OwnedWriteHalf,
    next_id: u32,
}

impl FrameWriter {
    async fn send(&mut self, message: &RpcMessage) -> Result<(), RpcError> {
        let bytes = message.encode()?;
        self.half.write_all(&bytes).await?;
        Ok(())
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }
}

// =============================================================================
// RpcSession
// =============================================================================

/// An attached connection that has not started its receive loop yet.
pub struct RpcSession {
    runtime: Runtime,
    reader: FrameReader,
    writer: FrameWriter,
    backlog: VecDeque<(String, Vec<Value>)>,
    client: RpcClient,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl std::fmt::Debug for RpcSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcSession").finish_non_exhaustive()
    }
}

/// Connect to the editor's listen socket.
///
/// No retry: the caller waits for a readiness signal before attaching.
pub fn attach(path: &Path) -> Result<RpcSession, RpcError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let stream = runtime
        .block_on(UnixStream::connect(path))
        .map_err(|source| RpcError::Attach {
            path: path.to_path_buf(),
            source,
        })?;
    let (read_half, write_half) = stream.into_split();
    let (tx, rx) = mpsc::unbounded_channel();

    tracing::info!(socket = %path.display(), "attached to editor");

    Ok(RpcSession {
        runtime,
        reader: FrameReader {
            half: read_half,
            decoder: FrameDecoder::new(),
        },
        writer: FrameWriter {
            half: write_half,
            next_id: 0,
        },
        backlog: VecDeque::new(),
        client: RpcClient {
            commands: tx,
            shared: Arc::new(Shared::default()),
        },
        commands: rx,
    })
}

impl RpcSession {
    /// A handle for scheduling work once the loop runs.
    pub fn client(&self) -> RpcClient {
        self.client.clone()
    }

    /// Fire-and-forget notification, written immediately.
    pub fn notify(&mut self, method: &str, params: Vec<Value>) -> Result<(), RpcError> {
        let message = RpcMessage::Notification {
            method: method.to_owned(),
            params,
        };
        self.runtime.block_on(self.writer.send(&message))
    }

    /// Send a request and wait for its reply on the calling thread.
    pub fn request(&mut self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let Self {
            runtime,
            reader,
            writer,
            backlog,
            ..
        } = self;
        let id = writer.next_id();
        let message = RpcMessage::Request {
            id,
            method: method.to_owned(),
            params,
        };

        runtime.block_on(async {
            writer.send(&message).await?;
            loop {
                match reader.recv().await? {
                    None => return Err(RpcError::Disconnected),
                    Some(RpcMessage::Response {
                        id: reply_id,
                        error,
                        result,
                    }) if reply_id == id => return response_result(error, result),
                    Some(RpcMessage::Response { id: other, .. }) => {
                        tracing::debug!(id = other, "dropping unmatched rpc response");
                    }
                    Some(RpcMessage::Notification { method, params }) => {
                        backlog.push_back((method, params));
                    }
                    Some(RpcMessage::Request { id, method, .. }) => {
                        tracing::debug!(%method, "answering early editor request with nil");
                        let reply = RpcMessage::Response {
                            id,
                            error: Value::Nil,
                            result: Value::Nil,
                        };
                        writer.send(&reply).await?;
                    }
                }
            }
        })
    }

    /// This client's channel id, queried once via `nvim_get_api_info`.
    pub fn channel_id(&mut self) -> Result<u64, RpcError> {
        if let Some(id) = self.client.channel_id() {
            return Ok(id);
        }
        let info = self.request("nvim_get_api_info", Vec::new())?;
        let id = info
            .as_array()
            .and_then(|items| items.first())
            .and_then(Value::as_u64)
            .ok_or_else(|| RpcError::Protocol(format!("unexpected api info: {info}")))?;
        let _ = self.client.shared.channel_id.set(id);
        Ok(id)
    }

    /// Serve the connection until the editor closes it. Blocking.
    ///
    /// Queued notifications are delivered first. On exit every outstanding
    /// reply fails with [`RpcError::Disconnected`].
    pub fn run_loop<H: RpcHandler>(self, mut handler: H) -> Result<(), RpcError> {
        let RpcSession {
            runtime,
            mut reader,
            writer,
            backlog,
            client,
            mut commands,
        } = self;
        let _ = client.shared.loop_thread.set(std::thread::current().id());
        if !backlog.is_empty() {
            tracing::debug!(queued = backlog.len(), "delivering early notifications");
        }

        for (method, params) in backlog {
            handler.on_notification(&method, params);
        }

        let mut state = LoopState {
            writer,
            pending: HashMap::new(),
            client,
        };
        let result = runtime.block_on(state.drive(&mut reader, &mut commands, &mut handler));

        commands.close();
        while let Ok(command) = commands.try_recv() {
            command.abandon();
        }
        for (_, reply) in state.pending.drain() {
            reply(Err(RpcError::Disconnected));
        }
        result
    }
}

// =============================================================================
// Receive loop
// =============================================================================

struct LoopState {
    writer: FrameWriter,
    pending: HashMap<u32, ReplyCallback>,
    client: RpcClient,
}

impl LoopState {
    async fn drive<H: RpcHandler>(
        &mut self,
        reader: &mut FrameReader,
        commands: &mut mpsc::UnboundedReceiver<Command>,
        handler: &mut H,
    ) -> Result<(), RpcError> {
        loop {
            tokio::select! {
                incoming = reader.recv() => match incoming? {
                    Some(message) => self.handle_incoming(message, handler).await?,
                    None => return Ok(()),
                },
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await?,
                    None => return Ok(()),
                },
            }
        }
    }

    async fn handle_incoming<H: RpcHandler>(
        &mut self,
        message: RpcMessage,
        handler: &mut H,
    ) -> Result<(), RpcError> {
        match message {
            RpcMessage::Notification { method, params } => {
                handler.on_notification(&method, params);
            }
            RpcMessage::Request { id, method, params } => {
                let (error, result) = match handler.on_request(&method, params) {
                    Ok(result) => (Value::Nil, result),
                    Err(error) => (error, Value::Nil),
                };
                self.writer
                    .send(&RpcMessage::Response { id, error, result })
                    .await?;
            }
            RpcMessage::Response { id, error, result } => match self.pending.remove(&id) {
                Some(reply) => reply(response_result(error, result)),
                None => tracing::debug!(id, "dropping unmatched rpc response"),
            },
        }
        Ok(())
    }

    async fn handle_command(&mut self, command: Command) -> Result<(), RpcError> {
        match command {
            Command::Notify { method, params } => {
                self.writer
                    .send(&RpcMessage::Notification { method, params })
                    .await?;
            }
            Command::Request {
                method,
                params,
                reply,
            } => {
                let id = self.writer.next_id();
                self.pending.insert(id, reply);
                self.writer
                    .send(&RpcMessage::Request { id, method, params })
                    .await?;
            }
            Command::Call(f) => f(&self.client),
            Command::CallLater(delay, f) => {
                let client = self.client.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = client.send(Command::Call(f));
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
