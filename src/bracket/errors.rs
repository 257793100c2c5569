//! Bracket error types.

use super::models::{EntrantId, MatchId, TournamentId};
use crate::db::timeouts::TimeoutError;
use thiserror::Error;

/// Bracket errors
#[derive(Debug, Error)]
pub enum BracketError {
    /// Fewer than two entrants supplied
    #[error("Insufficient entrants: need at least 2, have {0}")]
    InsufficientEntrants(usize),

    /// Same entrant listed more than once
    #[error("Entrant {0} listed more than once")]
    DuplicateEntrant(EntrantId),

    /// Tournament does not exist
    #[error("Tournament not found: {0}")]
    InvalidTournament(TournamentId),

    /// Tournament already has matches
    #[error("Bracket already generated for tournament {0}")]
    AlreadyGenerated(TournamentId),

    /// Match does not exist
    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    /// Match already has a winner
    #[error("Match {0} already decided")]
    MatchAlreadyDecided(MatchId),

    /// Winner is not seated in the match
    #[error("Entrant {winner} is not playing in match {match_id}")]
    InvalidWinner { match_id: MatchId, winner: EntrantId },

    /// An empty slot still waits on an undecided feeder match
    #[error("Match {match_id} is waiting on match {pending}")]
    MatchNotReady { match_id: MatchId, pending: MatchId },

    /// Next match slot already holds another entrant
    #[error("Slot in match {match_id} already holds entrant {occupant}")]
    SlotOccupied {
        match_id: MatchId,
        occupant: EntrantId,
    },

    /// Store returned records that do not line up with the drafts
    #[error("Store returned {actual} records for {expected} drafts")]
    UnexpectedRecords { expected: usize, actual: usize },

    /// Persistence round-trip failed
    #[error("Persistence failure: {0}")]
    Persistence(#[from] TimeoutError),
}

impl From<sqlx::Error> for BracketError {
    fn from(err: sqlx::Error) -> Self {
        BracketError::Persistence(TimeoutError::Database(err))
    }
}

impl BracketError {
    /// Get a client-safe error message that doesn't leak storage details
    pub fn client_message(&self) -> String {
        match self {
            BracketError::Persistence(_) | BracketError::UnexpectedRecords { .. } => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Whether retrying the same call could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, BracketError::Persistence(TimeoutError::Timeout(_)))
    }
}

/// Result type for bracket operations
pub type BracketResult<T> = Result<T, BracketError>;
