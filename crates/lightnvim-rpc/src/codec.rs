//! msgpack-rpc message framing.
//!
//! - request: `[0, id, method, params]`
//! - response: `[1, id, error, result]`
//! - notification: `[2, method, params]`

use std::io::{Cursor, ErrorKind};

use rmpv::Value;

use crate::error::RpcError;

const REQUEST: u64 = 0;
const RESPONSE: u64 = 1;
const NOTIFICATION: u64 = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum RpcMessage {
    Request {
        id: u32,
        method: String,
        params: Vec<Value>,
    },
    Response {
        id: u32,
        error: Value,
        result: Value,
    },
    Notification {
        method: String,
        params: Vec<Value>,
    },
}

impl RpcMessage {
    pub fn to_value(&self) -> Value {
        match self {
            RpcMessage::Request { id, method, params } => Value::Array(vec![
                Value::from(REQUEST),
                Value::from(*id),
                Value::from(method.as_str()),
                Value::Array(params.clone()),
            ]),
            RpcMessage::Response { id, error, result } => Value::Array(vec![
                Value::from(RESPONSE),
                Value::from(*id),
                error.clone(),
                result.clone(),
            ]),
            RpcMessage::Notification { method, params } => Value::Array(vec![
                Value::from(NOTIFICATION),
                Value::from(method.as_str()),
                Value::Array(params.clone()),
            ]),
        }
    }

    pub fn from_value(value: Value) -> Result<Self, RpcError> {
        let mut items = match value {
            Value::Array(items) => items,
            other => {
                return Err(RpcError::Protocol(format!("message is not an array: {other}")));
            }
        };
        let kind = items.first().and_then(Value::as_u64);

        match (kind, items.len()) {
            (Some(REQUEST), 4) => {
                let params = take_params(items.pop())?;
                let method = take_method(items.pop())?;
                let id = take_id(&items[1])?;
                Ok(RpcMessage::Request { id, method, params })
            }
            (Some(RESPONSE), 4) => {
                let result = items.pop().unwrap_or(Value::Nil);
                let error = items.pop().unwrap_or(Value::Nil);
                let id = take_id(&items[1])?;
                Ok(RpcMessage::Response { id, error, result })
            }
            (Some(NOTIFICATION), 3) => {
                let params = take_params(items.pop())?;
                let method = take_method(items.pop())?;
                Ok(RpcMessage::Notification { method, params })
            }
            _ => Err(RpcError::Protocol(format!(
                "unrecognized message shape: {}",
                Value::Array(items)
            ))),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, RpcError> {
        let mut buf = Vec::new();
        rmpv::encode::write_value(&mut buf, &self.to_value())
            .map_err(|e| RpcError::Encode(e.to_string()))?;
        Ok(buf)
    }
}

fn take_id(value: &Value) -> Result<u32, RpcError> {
    value
        .as_u64()
        .and_then(|id| u32::try_from(id).ok())
        .ok_or_else(|| RpcError::Protocol(format!("invalid message id: {value}")))
}

fn take_method(value: Option<Value>) -> Result<String, RpcError> {
    match value {
        Some(Value::String(s)) => s
            .into_str()
            .ok_or_else(|| RpcError::Protocol("method name is not utf-8".into())),
        other => Err(RpcError::Protocol(format!("invalid method name: {other:?}"))),
    }
}

fn take_params(value: Option<Value>) -> Result<Vec<Value>, RpcError> {
    match value {
        Some(Value::Array(params)) => Ok(params),
        other => Err(RpcError::Protocol(format!("params are not an array: {other:?}"))),
    }
}

/// Convert a response's `(error, result)` pair into a `Result`.
pub fn response_result(error: Value, result: Value) -> Result<Value, RpcError> {
    if error.is_nil() {
        Ok(result)
    } else {
        Err(RpcError::Editor(editor_error_message(&error)))
    }
}

/// Editor errors arrive as `[type, message]`.
fn editor_error_message(error: &Value) -> String {
    match error {
        Value::Array(items) => items
            .get(1)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| error.to_string()),
        Value::String(s) => s.as_str().map(str::to_owned).unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}

/// Accumulates socket bytes and yields whole messages.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Decode the next complete message, or `None` if more bytes are needed.
    pub fn next_message(&mut self) -> Result<Option<RpcMessage>, RpcError> {
        if self.buf.is_empty() {
            return Ok(None);
        }

        let mut cursor = Cursor::new(self.buf.as_slice());
        match rmpv::decode::read_value(&mut cursor) {
            Ok(value) => {
                let consumed = cursor.position() as usize;
                self.buf.drain(..consumed);
                RpcMessage::from_value(value).map(Some)
            }
            Err(e) if is_incomplete(&e) => Ok(None),
            Err(e) => Err(RpcError::Decode(e.to_string())),
        }
    }
}

fn is_incomplete(err: &rmpv::decode::Error) -> bool {
    match err {
        rmpv::decode::Error::InvalidMarkerRead(e) | rmpv::decode::Error::InvalidDataRead(e) => {
            e.kind() == ErrorKind::UnexpectedEof
        }
        _ => false,
    }
}
