//! A scripted msgpack-rpc peer standing in for the editor in tests.

use std::io::Write;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rmpv::Value;

use crate::codec::RpcMessage;

/// How the fake answers a request.
pub(crate) enum Reply {
    Ok(Value),
    Err(String),
    /// Close the socket without answering.
    Hangup,
    /// Send a notification first, then answer `nil`.
    NotifyThenOk(String, Vec<Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Received {
    Request { method: String, params: Vec<Value> },
    Notification { method: String, params: Vec<Value> },
}

impl Received {
    pub(crate) fn method(&self) -> &str {
        match self {
            Received::Request { method, .. } | Received::Notification { method, .. } => method,
        }
    }

    pub(crate) fn params(&self) -> &[Value] {
        match self {
            Received::Request { params, .. } | Received::Notification { params, .. } => params,
        }
    }
}

type Responder = dyn Fn(&str, &[Value]) -> Reply + Send + 'static;

pub(crate) struct FakeEditor {
    _dir: tempfile::TempDir,
    path: PathBuf,
    conn: Arc<Mutex<Option<UnixStream>>>,
    received: Receiver<Received>,
    responses: Receiver<(u32, Value, Value)>,
    next_id: Mutex<u32>,
}

impl FakeEditor {
    pub(crate) const CHANNEL_ID: u64 = 3;

    pub(crate) fn spawn<F>(responder: F) -> Self
    where
        F: Fn(&str, &[Value]) -> Reply + Send + 'static,
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(lightnvim_common::socket_name());
        let listener = UnixListener::bind(&path).unwrap();
        let conn = Arc::new(Mutex::new(None));
        let (received_tx, received) = mpsc::channel();
        let (responses_tx, responses) = mpsc::channel();

        let thread_conn = Arc::clone(&conn);
        let responder: Box<Responder> = Box::new(responder);
        std::thread::spawn(move || {
            let Ok((stream, _)) = listener.accept() else {
                return;
            };
            *thread_conn.lock().unwrap() = Some(stream.try_clone().unwrap());
            serve(stream, &thread_conn, &*responder, &received_tx, &responses_tx);
        });

        Self {
            _dir: dir,
            path,
            conn,
            received,
            responses,
            next_id: Mutex::new(100),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn next_received(&self, timeout: Duration) -> Received {
        self.try_next_received(timeout)
            .expect("editor received nothing before the timeout")
    }

    pub(crate) fn try_next_received(&self, timeout: Duration) -> Option<Received> {
        match self.received.recv_timeout(timeout) {
            Ok(received) => Some(received),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Editor-initiated notification.
    pub(crate) fn notify(&self, method: &str, params: Vec<Value>) {
        self.write(&RpcMessage::Notification {
            method: method.into(),
            params,
        });
    }

    /// Editor-initiated request; returns `(error, result)`.
    pub(crate) fn request(
        &self,
        method: &str,
        params: Vec<Value>,
        timeout: Duration,
    ) -> (Value, Value) {
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        self.write(&RpcMessage::Request {
            id,
            method: method.into(),
            params,
        });
        let deadline = Instant::now() + timeout;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            let (reply_id, error, result) = self.responses.recv_timeout(left).unwrap();
            if reply_id == id {
                return (error, result);
            }
        }
    }

    fn write(&self, message: &RpcMessage) {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(stream) = self.conn.lock().unwrap().as_mut() {
                stream.write_all(&message.encode().unwrap()).unwrap();
                return;
            }
            assert!(Instant::now() < deadline, "client never connected");
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}

fn serve(
    mut stream: UnixStream,
    conn: &Mutex<Option<UnixStream>>,
    responder: &Responder,
    received: &Sender<Received>,
    responses: &Sender<(u32, Value, Value)>,
) {
    let send = |message: RpcMessage| {
        if let Some(out) = conn.lock().unwrap().as_mut() {
            let _ = out.write_all(&message.encode().unwrap());
        }
    };

    while let Ok(value) = rmpv::decode::read_value(&mut stream) {
        let Ok(message) = RpcMessage::from_value(value) else {
            return;
        };
        match message {
            RpcMessage::Request { id, method, params } => {
                let reply = if method == "nvim_get_api_info" {
                    Reply::Ok(Value::Array(vec![
                        Value::from(FakeEditor::CHANNEL_ID),
                        Value::Map(Vec::new()),
                    ]))
                } else {
                    responder(&method, &params)
                };
                let _ = received.send(Received::Request { method, params });
                let ok = |result| RpcMessage::Response {
                    id,
                    error: Value::Nil,
                    result,
                };
                match reply {
                    Reply::Ok(result) => send(ok(result)),
                    Reply::Err(message) => send(RpcMessage::Response {
                        id,
                        error: Value::Array(vec![Value::from(0), Value::from(message)]),
                        result: Value::Nil,
                    }),
                    Reply::Hangup => {
                        if let Some(out) = conn.lock().unwrap().take() {
                            let _ = out.shutdown(std::net::Shutdown::Both);
                        }
                        return;
                    }
                    Reply::NotifyThenOk(method, params) => {
                        send(RpcMessage::Notification { method, params });
                        send(ok(Value::Nil));
                    }
                }
            }
            RpcMessage::Notification { method, params } => {
                let _ = received.send(Received::Notification { method, params });
            }
            RpcMessage::Response { id, error, result } => {
                let _ = responses.send((id, error, result));
            }
        }
    }
}
