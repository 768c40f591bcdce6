//! Per-room session coordination.
//!
//! [`Coordinator`] is the synchronous state machine: it validates signals,
//! advances [`Stage`]s, settles rounds, and queues [`Effect`]s. [`Room`] is
//! the async task that feeds it commands one at a time and carries those
//! effects out against the connection [`Table`], timers, and recorder.
mod config;
mod coordinator;
mod effect;
mod error;
mod message;
mod participant;
mod protocol;
mod readiness;
mod room;
mod stage;
mod table;
mod timer;


pub use config::*;
pub use coordinator::*;
pub use effect::*;
pub use error::*;
pub use message::*;
pub use participant::*;
pub use protocol::*;
pub use readiness::*;
pub use room::*;
pub use stage::*;
pub use table::*;
pub use timer::*;
