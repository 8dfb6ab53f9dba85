use std::io::ErrorKind;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("failed to attach to {}: {source}", path.display())]
    Attach {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rpc io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("msgpack encode error: {0}")]
    Encode(String),

    #[error("msgpack decode error: {0}")]
    Decode(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("editor error: {0}")]
    Editor(String),

    #[error("rpc connection closed")]
    Disconnected,
}

impl RpcError {
    /// Whether the failure means the connection is gone.
    pub fn is_disconnected(&self) -> bool {
        match self {
            RpcError::Disconnected => true,
            RpcError::Io(e) => matches!(
                e.kind(),
                ErrorKind::BrokenPipe
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::NotConnected
                    | ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnected_kinds() {
        assert!(RpcError::Disconnected.is_disconnected());
        assert!(RpcError::Io(std::io::Error::from(ErrorKind::BrokenPipe)).is_disconnected());
        assert!(RpcError::Io(std::io::Error::from(ErrorKind::ConnectionReset)).is_disconnected());
        assert!(!RpcError::Io(std::io::Error::from(ErrorKind::PermissionDenied)).is_disconnected());
        assert!(!RpcError::Editor("E37: No write since last change".into()).is_disconnected());
    }

    #[test]
    fn attach_error_display() {
        let err = RpcError::Attach {
            path: PathBuf::from("/tmp/nvim_x"),
            source: std::io::Error::from(ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("failed to attach to /tmp/nvim_x"));
        assert!(!err.is_disconnected());
    }
}
