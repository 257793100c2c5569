//! Storage capability consumed by bracket generation and progression.
//!
//! Every method takes `&mut self` so that an implementation can be bound to
//! a single transaction; whoever owns the store owns the transaction scope.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};

use super::{
    errors::{BracketError, BracketResult},
    models::{EntrantId, Match, MatchDraft, MatchId, MatchLink, Slot, TournamentId},
};
use crate::db::timeouts::TimeoutError;

/// Trait for match persistence
#[async_trait]
pub trait MatchStore: Send {
    /// Check that a tournament exists
    async fn tournament_exists(&mut self, tournament_id: TournamentId) -> BracketResult<bool>;

    /// Count matches already stored for a tournament
    async fn count_matches(&mut self, tournament_id: TournamentId) -> BracketResult<i64>;

    /// Insert drafts and return one record per draft, in the same order
    async fn insert_matches(&mut self, drafts: &[MatchDraft]) -> BracketResult<Vec<Match>>;

    /// Write `next_match_id` for each link
    async fn update_matches(&mut self, links: &[MatchLink]) -> BracketResult<()>;

    /// Find a match by ID
    async fn get_match(&mut self, match_id: MatchId) -> BracketResult<Option<Match>>;

    /// All matches of a tournament, ordered by round then match number
    async fn list_matches(&mut self, tournament_id: TournamentId) -> BracketResult<Vec<Match>>;

    /// Set the winner of a match
    async fn set_winner(&mut self, match_id: MatchId, winner: EntrantId) -> BracketResult<()>;

    /// Seat an entrant in one slot of a match
    async fn assign_slot(
        &mut self,
        match_id: MatchId,
        slot: Slot,
        entrant: EntrantId,
    ) -> BracketResult<()>;
}

/// In-process `MatchStore`
///
/// Identifiers are assigned sequentially from 1. Failure injection lets
/// callers exercise the persistence error paths.
#[derive(Debug, Default)]
pub struct InMemoryMatchStore {
    tournaments: HashSet<TournamentId>,
    matches: BTreeMap<MatchId, Match>,
    next_id: MatchId,
    fail_inserts: bool,
    fail_updates: bool,
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tournament so that generation accepts it
    pub fn with_tournament(mut self, tournament_id: TournamentId) -> Self {
        self.tournaments.insert(tournament_id);
        self
    }

    /// Make every `insert_matches` call fail
    pub fn failing_inserts(mut self) -> Self {
        self.fail_inserts = true;
        self
    }

    /// Make every `update_matches` call fail
    pub fn failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    /// Number of stored matches across all tournaments
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    fn match_mut(&mut self, match_id: MatchId) -> BracketResult<&mut Match> {
        self.matches
            .get_mut(&match_id)
            .ok_or(BracketError::MatchNotFound(match_id))
    }
}

fn injected_failure() -> BracketError {
    BracketError::Persistence(TimeoutError::Database(sqlx::Error::PoolTimedOut))
}

#[async_trait]
impl MatchStore for InMemoryMatchStore {
    async fn tournament_exists(&mut self, tournament_id: TournamentId) -> BracketResult<bool> {
        Ok(self.tournaments.contains(&tournament_id))
    }

    async fn count_matches(&mut self, tournament_id: TournamentId) -> BracketResult<i64> {
        Ok(self
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .count() as i64)
    }

    async fn insert_matches(&mut self, drafts: &[MatchDraft]) -> BracketResult<Vec<Match>> {
        if self.fail_inserts {
            return Err(injected_failure());
        }

        let now = Utc::now();
        let mut records = Vec::with_capacity(drafts.len());
        for draft in drafts {
            self.next_id += 1;
            let id = self.next_id;

            let record = Match::from_draft(id, draft, now);
            self.matches.insert(id, record.clone());
            records.push(record);
        }

        Ok(records)
    }

    async fn update_matches(&mut self, links: &[MatchLink]) -> BracketResult<()> {
        if self.fail_updates {
            return Err(injected_failure());
        }

        // Validate all before touching anything
        if let Some(missing) = links
            .iter()
            .flat_map(|l| [l.match_id, l.next_match_id])
            .find(|id| !self.matches.contains_key(id))
        {
            return Err(BracketError::MatchNotFound(missing));
        }

        for link in links {
            self.match_mut(link.match_id)?.next_match_id = Some(link.next_match_id);
        }

        Ok(())
    }

    async fn get_match(&mut self, match_id: MatchId) -> BracketResult<Option<Match>> {
        Ok(self.matches.get(&match_id).cloned())
    }

    async fn list_matches(&mut self, tournament_id: TournamentId) -> BracketResult<Vec<Match>> {
        let mut matches: Vec<Match> = self
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect();
        matches.sort_by_key(|m| (m.round, m.match_number));
        Ok(matches)
    }

    async fn set_winner(&mut self, match_id: MatchId, winner: EntrantId) -> BracketResult<()> {
        self.match_mut(match_id)?.winner_id = Some(winner);
        Ok(())
    }

    async fn assign_slot(
        &mut self,
        match_id: MatchId,
        slot: Slot,
        entrant: EntrantId,
    ) -> BracketResult<()> {
        let record = self.match_mut(match_id)?;
        match slot {
            Slot::Team1 => record.team1_id = Some(entrant),
            Slot::Team2 => record.team2_id = Some(entrant),
        }
        Ok(())
    }
}
