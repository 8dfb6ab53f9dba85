//! msgpack-rpc client for the editor's control socket, and the bridge
//! that turns its `Gui` notifications into GUI-thread events.

pub mod bridge;
pub mod client;
pub mod codec;
pub mod error;

#[cfg(test)]
pub(crate) mod fake_editor;

pub use bridge::{BridgeOptions, GuiEvent, GuiSink, QuitOutcome, RpcBridge};
pub use client::{attach, RpcClient, RpcHandler, RpcSession};
pub use codec::RpcMessage;
pub use error::RpcError;
pub use rmpv::Value;
