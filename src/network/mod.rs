//! Social network over a room's participants.
//!
//! Edges say which pairs may still interact. They only ever disappear, and
//! only through an ostracism ballot in which either member can veto the tie.
//!
//! - [`NetworkGraph`]: Symmetric adjacency matrix with removal history
//! - [`Topology`]: Initial shape of the graph
//! - [`Matchmaker`]: Per-round pairing preferring stale or fresh pairs
//! - [`Ostracism`]: Maintain/break ballots for the current pairs
mod ballot;
mod graph;
mod pairing;
mod topology;

pub use ballot::*;
pub use graph::*;
pub use pairing::*;
pub use topology::*;
