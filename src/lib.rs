//! Real-time coordination of multi-participant collective-reward trials.
//!
//! Independent clients are synchronized through a fixed sequence of stages,
//! paid from the group's collective choices, and optionally paired over a
//! social network whose edges they may cut between rounds.
//!
//! ## Modules
//!
//! - [`payoff`]: Reward models turning a round's choices into payoffs
//! - [`network`]: Interaction graph, pairing policy, and ostracism ballots
//! - [`gameroom`]: Per-room stage machine (functional core) and its async actor
//! - [`records`]: Append-only persistence sinks for audit
//! - [`hosting`]: Room registry and WebSocket server
pub mod gameroom;
#[cfg(feature = "server")]
pub mod hosting;
pub mod network;
pub mod payoff;
pub mod records;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Reward amounts in points.
pub type Points = f64;
/// Ordinal position of a participant in a room (assigned once, never reused).
pub type Slot = usize;
/// Zero-based round counter within a session.
pub type Round = u32;
/// Index into the option set a participant chooses from.
pub type OptionIndex = usize;
/// Stable external identity of a subject (assigned by the recruiting platform).
pub type SubjectId = String;

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
    /// Lower 64 bits, used to derive per-room seeds when none is configured.
    pub fn low(&self) -> u64 {
        self.inner.as_u64_pair().1
    }
}

impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> TryFrom<&str> for ID<T> {
    type Error = uuid::Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        uuid::Uuid::parse_str(s).map(Self::from)
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

// ============================================================================
// GROUP PARAMETERS
// ============================================================================
/// Smallest group that starts a grouped session.
pub const MIN_GROUP_SIZE: usize = 2;
/// Largest group a room admits.
pub const MAX_GROUP_SIZE: usize = 4;
/// Responders required for a round to pay out.
pub const RESPONSE_QUORUM: usize = 2;
/// Main-task rounds per session.
pub const ROUNDS: Round = 10;
/// Options offered each round.
pub const OPTION_COUNT: usize = 3;
/// Mean reward of every option when no environment is configured.
pub const MEAN_REWARD: Points = 100.0;
/// Standard deviation of the Gaussian payoff noise.
pub const NOISE_SD: Points = 10.0;

// ============================================================================
// TIMING
// ============================================================================
/// Seconds the first waiting room stays open for the group to fill.
pub const WAIT_DEADLINE: u64 = 120;
/// Seconds a participant has to choose in a main-task round.
pub const ROUND_TIMEOUT: u64 = 15;
/// Seconds pairs have to cast ostracism votes.
pub const VOTE_TIMEOUT: u64 = 20;
/// Points accrued per second spent in the first waiting room.
pub const WAITING_BONUS_PER_SEC: Points = 0.01;
/// Seconds a closed room's subjects are still answered as concluded.
pub const SUBJECT_RETENTION: u64 = 3600;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register Ctrl+C handler for immediate termination.
/// Rooms in flight are dropped; recorders are best-effort anyway.
#[cfg(feature = "server")]
pub fn kys() {
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        println!();
        log::warn!("interrupt received, exiting immediately");
        std::process::exit(0);
    });
}

/// Milliseconds since the Unix epoch, for audit timestamps.
pub fn epoch_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
