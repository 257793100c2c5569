//! # Bracketry
//!
//! Single-elimination bracket generation and progression for tournament
//! backends.
//!
//! Given a tournament and an ordered list of entrants, the crate lays out
//! every round of the bracket, leaves byes as empty first-round seats,
//! persists the matches and links each one to the match its winner feeds.
//! Recording a winner later carries them into that next match.
//!
//! ## Core Modules
//!
//! - [`bracket`]: Bracket layout, generation, winner progression and the storage trait
//! - [`db`]: PostgreSQL pool, configuration and the transactional match store
//!
//! ## Example
//!
//! ```
//! use bracketry::BracketBuilder;
//!
//! let layout = BracketBuilder::new(1, &[1, 2, 3, 4, 5, 6]).unwrap();
//! assert_eq!(layout.round_count(), 3);
//! assert_eq!(layout.bye_count(), 2);
//! ```

/// Bracket construction, linkage and progression.
pub mod bracket;
pub use bracket::{
    Advancement, Bracket, BracketBuilder, BracketError, BracketManager, BracketResult,
    InMemoryMatchStore, Match, MatchStore, build_bracket, record_winner,
};

/// PostgreSQL persistence.
pub mod db;
