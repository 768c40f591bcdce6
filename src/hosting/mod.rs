//! Process-level hosting: the room registry and the HTTP/WebSocket surface.
mod bridge;
mod handle;
mod registry;
mod server;

pub use handle::*;
pub use registry::*;
pub use server::*;
