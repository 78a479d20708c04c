//! Transport plumbing around the dispatcher.
//!
//! # Data Flow
//! ```text
//! Parent process (HTTP layer)
//!     → stdin: {"id":1,"data":{"route":"ping","payload":{}}}\n
//!     → codec.rs (decode frame)
//!     → service.rs (queue, permit, one task per request)
//!     → ipc::Dispatcher
//!     → codec.rs writer task (encode reply)
//!     → stdout: {"id":1,"data":{"success":true,"message":"pong"}}\n
//! ```
//!
//! # Design Decisions
//! - In-process callers use `DispatchHandle` directly; the codec is one client
//! - No network listener: the worker talks over its own stdio
//! - One reply per request, correlated by id, written in completion order

pub mod codec;
pub mod service;

pub use codec::{decode_frame, encode_frame, serve_lines, CodecError, InboundFrame, OutboundFrame};
pub use service::{
    spawn, DispatchHandle, DispatchPermit, DispatchRequest, DispatchService, ServiceError,
};
