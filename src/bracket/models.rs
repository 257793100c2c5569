//! Bracket data models for single-elimination tournaments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tournament ID type
pub type TournamentId = i64;

/// Match ID type
pub type MatchId = i64;

/// Entrant (team or player) ID type
pub type EntrantId = i64;

/// One of the two seats in a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    /// First seat (`team1_id`)
    Team1,
    /// Second seat (`team2_id`)
    Team2,
}

impl Slot {
    /// Slot of the next-round match fed by the match at `match_number`.
    ///
    /// Odd match numbers feed `Team1`, even ones feed `Team2`.
    pub fn fed_by(match_number: u32) -> Self {
        if match_number % 2 == 1 {
            Slot::Team1
        } else {
            Slot::Team2
        }
    }

    /// Column name used by the SQL store
    pub fn column(self) -> &'static str {
        match self {
            Slot::Team1 => "team1_id",
            Slot::Team2 => "team2_id",
        }
    }
}

/// Match that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDraft {
    /// Owning tournament
    pub tournament_id: TournamentId,
    /// Round number (1-indexed, highest is the final)
    pub round: u32,
    /// Position within the round (1-indexed)
    pub match_number: u32,
    /// First entrant, if assigned
    pub team1_id: Option<EntrantId>,
    /// Second entrant, if assigned
    pub team2_id: Option<EntrantId>,
}

/// Persisted match record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Match ID
    pub id: MatchId,
    /// Owning tournament
    pub tournament_id: TournamentId,
    /// Round number (1-indexed, highest is the final)
    pub round: u32,
    /// Position within the round (1-indexed)
    pub match_number: u32,
    /// First entrant, if assigned
    pub team1_id: Option<EntrantId>,
    /// Second entrant, if assigned
    pub team2_id: Option<EntrantId>,
    /// Winner, once decided
    pub winner_id: Option<EntrantId>,
    /// Match the winner advances into (None for the final)
    pub next_match_id: Option<MatchId>,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// Build a record from a draft and its assigned identifier
    pub fn from_draft(id: MatchId, draft: &MatchDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            tournament_id: draft.tournament_id,
            round: draft.round,
            match_number: draft.match_number,
            team1_id: draft.team1_id,
            team2_id: draft.team2_id,
            winner_id: None,
            next_match_id: None,
            created_at,
        }
    }

    /// Entrant seated in `slot`
    pub fn entrant(&self, slot: Slot) -> Option<EntrantId> {
        match slot {
            Slot::Team1 => self.team1_id,
            Slot::Team2 => self.team2_id,
        }
    }

    /// Round-1 match with exactly one or zero entrants
    pub fn is_bye(&self) -> bool {
        self.round == 1 && (self.team1_id.is_none() || self.team2_id.is_none())
    }

    /// Whether `entrant` occupies either slot
    pub fn has_entrant(&self, entrant: EntrantId) -> bool {
        self.team1_id == Some(entrant) || self.team2_id == Some(entrant)
    }

    pub fn is_decided(&self) -> bool {
        self.winner_id.is_some()
    }
}

/// Forward pointer written during the second persistence pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchLink {
    /// Match being linked
    pub match_id: MatchId,
    /// Match its winner feeds
    pub next_match_id: MatchId,
}

/// Read view over all matches of one tournament
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bracket {
    /// Tournament ID
    pub tournament_id: TournamentId,
    /// Matches ordered by round, then match number
    pub matches: Vec<Match>,
}

impl Bracket {
    /// Create a view, ordering matches by round and match number
    pub fn new(tournament_id: TournamentId, mut matches: Vec<Match>) -> Self {
        matches.sort_by_key(|m| (m.round, m.match_number));
        Self {
            tournament_id,
            matches,
        }
    }

    /// Number of rounds (0 for an empty bracket)
    pub fn round_count(&self) -> u32 {
        self.matches.iter().map(|m| m.round).max().unwrap_or(0)
    }

    /// Matches of a single round, in match-number order
    pub fn round(&self, round: u32) -> Vec<&Match> {
        self.matches.iter().filter(|m| m.round == round).collect()
    }

    /// All rounds, first round first
    pub fn rounds(&self) -> Vec<Vec<&Match>> {
        (1..=self.round_count()).map(|r| self.round(r)).collect()
    }

    /// The match of the highest round
    pub fn final_match(&self) -> Option<&Match> {
        let last = self.round_count();
        self.matches
            .iter()
            .find(|m| m.round == last && m.next_match_id.is_none())
    }

    /// Winner of the final, once decided
    pub fn champion(&self) -> Option<EntrantId> {
        self.final_match().and_then(|m| m.winner_id)
    }

    pub fn is_complete(&self) -> bool {
        self.champion().is_some()
    }
}
