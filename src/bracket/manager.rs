//! Bracket manager running each operation in its own database transaction.

use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use super::{
    errors::BracketResult,
    generate::build_bracket,
    models::{Bracket, EntrantId, Match, MatchId, TournamentId},
    progression::{Advancement, record_winner},
    store::MatchStore,
};
use crate::db::{PgMatchStore, timeouts::DEFAULT_QUERY_TIMEOUT};

/// Bracket manager
///
/// Generation and both of its persistence passes share one transaction, so
/// a failed link pass leaves no unlinked matches behind.
#[derive(Clone)]
pub struct BracketManager {
    pool: Arc<PgPool>,
    query_timeout: Duration,
}

impl BracketManager {
    /// Create a new bracket manager
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            pool,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Override the per-query timeout
    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    async fn store(&self) -> BracketResult<PgMatchStore> {
        PgMatchStore::begin_with_timeout(self.pool.as_ref(), self.query_timeout).await
    }

    /// Generate a linked bracket for a tournament
    ///
    /// Callers must still ensure only one generation per tournament runs at
    /// a time; the existing-matches check does not lock the tournament row.
    pub async fn generate_bracket(
        &self,
        tournament_id: TournamentId,
        entrants: &[EntrantId],
    ) -> BracketResult<Vec<Match>> {
        let mut store = self.store().await?;
        let records = build_bracket(&mut store, tournament_id, entrants).await?;
        store.commit().await?;
        Ok(records)
    }

    /// Record a match winner and advance them
    pub async fn record_winner(
        &self,
        match_id: MatchId,
        winner: EntrantId,
    ) -> BracketResult<Advancement> {
        let mut store = self.store().await?;
        let advancement = record_winner(&mut store, match_id, winner).await?;
        store.commit().await?;
        Ok(advancement)
    }

    /// Load the bracket of a tournament
    pub async fn get_bracket(&self, tournament_id: TournamentId) -> BracketResult<Bracket> {
        let mut store = self.store().await?;
        let matches = store.list_matches(tournament_id).await?;
        store.rollback().await?;
        Ok(Bracket::new(tournament_id, matches))
    }
}
