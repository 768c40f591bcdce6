//! Reward models for a single round.
//!
//! Turns a sparse choice vector into a payoff vector aligned to slots.
//! Randomness enters only through an injected [`Noise`] source so that a
//! fixed seed reproduces every payoff of a session.
//!
//! - [`Condition`]: Distributive (shared) vs additive (independent) reward
//! - [`Outcome`]: Payoffs, frequencies, and noise draws of one group
//! - [`Environments`]: Per-option mean rewards scheduled over rounds
//! - [`PayoffRecord`]: Audit record of one participant's payoff
mod condition;
mod environment;
mod noise;
mod outcome;
mod record;

pub use condition::*;
pub use environment::*;
pub use noise::*;
pub use outcome::*;
pub use record::*;
