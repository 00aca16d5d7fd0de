//! # kart_core - Pilot/Car Rotation Engine for Kart Championships
//!
//! This library assigns cars to pilots race after race so that every pilot
//! cycles through distinct cars before driving one twice.
//!
//! ## Features
//! - Hopcroft-Karp maximum bipartite matching (pilots x cars)
//! - Optional randomization: a different maximum matching on each call
//! - Fallback pairing so every pilot gets a car even when no unused one is left
//! - Per-pilot preference sets that shrink as races are recorded
//! - Race history ledger with undo of the last race
//!
//! ## Example
//! ```
//! use kart_core::{ChampionshipSession, SessionConfig};
//!
//! let mut session = ChampionshipSession::new(SessionConfig::seeded(7));
//! session.reset_session(4, &[1, 2, 3, 4]).unwrap();
//!
//! let race = session.generate_race(1).unwrap();
//! assert!(race.perfect);
//! session.record_race(1, race).unwrap();
//! assert_eq!(session.next_race_number(1), 2);
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod matching;
pub mod preferences;
pub mod session;

pub use config::SessionConfig;
pub use error::{MatchingError, Result, SessionError};
pub use history::{RaceHistory, RaceRecord, RaceSummary};
pub use matching::{
    fallback_pairing, BipartiteGraph, CarAssignment, CarNumber, CarSet, MatchingEngine,
    MatchingOutcome, PilotId,
};
pub use preferences::PreferenceGraph;
pub use session::ChampionshipSession;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
