//! Append-only persistence of round and session records.
//!
//! Rooms never wait on a recorder: every record is handed off to a spawned
//! task and failures are only logged.
//!
//! - [`Record`]: A round payoff or a teardown summary
//! - [`Recorder`]: Async sink trait
//! - [`LogRecorder`], [`MemoryRecorder`], [`JsonlRecorder`]: Built-in sinks
//! - `PostgresRecorder`: Database sink (feature `database`)
mod record;
mod recorder;
#[cfg(feature = "database")]
mod postgres;

pub use record::*;
pub use recorder::*;
#[cfg(feature = "database")]
pub use postgres::*;
