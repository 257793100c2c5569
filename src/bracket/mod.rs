//! Single-elimination bracket generation and progression.
//!
//! Generation is two-phase: match drafts are laid out in memory and
//! inserted, then each non-final match is linked to the match its winner
//! feeds once the store has assigned identifiers. Both passes go through a
//! `MatchStore`, which is also the transaction boundary.
//!
//! ## Example
//!
//! ```
//! use bracketry::bracket::{build_bracket, InMemoryMatchStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = InMemoryMatchStore::new().with_tournament(1);
//!
//!     // Five entrants: three rounds, three byes in round 1
//!     let matches = build_bracket(&mut store, 1, &[11, 12, 13, 14, 15]).await?;
//!     assert_eq!(matches.len(), 7);
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod errors;
pub mod generate;
pub mod manager;
pub mod models;
pub mod progression;
pub mod store;

pub use builder::BracketBuilder;
pub use errors::{BracketError, BracketResult};
pub use generate::build_bracket;
pub use manager::BracketManager;
pub use models::{
    Bracket, EntrantId, Match, MatchDraft, MatchId, MatchLink, Slot, TournamentId,
};
pub use progression::{Advancement, record_winner};
pub use store::{InMemoryMatchStore, MatchStore};
