//! PostgreSQL implementation of `MatchStore`.
//!
//! A `PgMatchStore` owns one transaction. Nothing it writes is visible to
//! other connections until `commit` is called; dropping the store rolls
//! the transaction back.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction, postgres::PgRow};
use std::time::Duration;

use super::timeouts::with_timeout;
use crate::bracket::{
    BracketError, BracketResult, EntrantId, Match, MatchDraft, MatchId, MatchLink, MatchStore,
    Slot, TournamentId,
};

const MATCH_COLUMNS: &str = "id, tournament_id, round, match_number, team1_id, team2_id, \
                             winner_id, next_match_id, created_at";

/// Transaction-scoped PostgreSQL match store
pub struct PgMatchStore {
    tx: Transaction<'static, Postgres>,
    query_timeout: Duration,
}

impl PgMatchStore {
    /// Begin a transaction on `pool` with a per-query timeout
    pub async fn begin_with_timeout(pool: &PgPool, query_timeout: Duration) -> BracketResult<Self> {
        let tx = with_timeout(query_timeout, pool.begin()).await?;
        Ok(Self { tx, query_timeout })
    }

    /// Commit everything written through this store
    pub async fn commit(self) -> BracketResult<()> {
        with_timeout(self.query_timeout, self.tx.commit()).await?;
        Ok(())
    }

    /// Discard everything written through this store
    pub async fn rollback(self) -> BracketResult<()> {
        with_timeout(self.query_timeout, self.tx.rollback()).await?;
        Ok(())
    }
}

fn match_from_row(row: &PgRow) -> Match {
    Match {
        id: row.get("id"),
        tournament_id: row.get("tournament_id"),
        round: row.get::<i32, _>("round") as u32,
        match_number: row.get::<i32, _>("match_number") as u32,
        team1_id: row.get("team1_id"),
        team2_id: row.get("team2_id"),
        winner_id: row.get("winner_id"),
        next_match_id: row.get("next_match_id"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn tournament_exists(&mut self, tournament_id: TournamentId) -> BracketResult<bool> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query("SELECT EXISTS(SELECT 1 FROM tournaments WHERE id = $1) AS found")
                .bind(tournament_id)
                .fetch_one(&mut *self.tx),
        )
        .await?;

        Ok(row.get("found"))
    }

    async fn count_matches(&mut self, tournament_id: TournamentId) -> BracketResult<i64> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query("SELECT COUNT(*) AS total FROM matches WHERE tournament_id = $1")
                .bind(tournament_id)
                .fetch_one(&mut *self.tx),
        )
        .await?;

        Ok(row.get("total"))
    }

    async fn insert_matches(&mut self, drafts: &[MatchDraft]) -> BracketResult<Vec<Match>> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO matches (tournament_id, round, match_number, team1_id, team2_id) ",
        );
        builder.push_values(drafts, |mut b, draft| {
            b.push_bind(draft.tournament_id)
                .push_bind(draft.round as i32)
                .push_bind(draft.match_number as i32)
                .push_bind(draft.team1_id)
                .push_bind(draft.team2_id);
        });
        builder.push(" RETURNING ");
        builder.push(MATCH_COLUMNS);

        let rows = with_timeout(
            self.query_timeout,
            builder.build().fetch_all(&mut *self.tx),
        )
        .await?;

        // RETURNING order is not guaranteed; drafts are in (round, match_number) order
        let mut records: Vec<Match> = rows.iter().map(match_from_row).collect();
        records.sort_by_key(|m| (m.round, m.match_number));

        if records.len() != drafts.len() {
            return Err(BracketError::UnexpectedRecords {
                expected: drafts.len(),
                actual: records.len(),
            });
        }

        Ok(records)
    }

    async fn update_matches(&mut self, links: &[MatchLink]) -> BracketResult<()> {
        if links.is_empty() {
            return Ok(());
        }

        let ids: Vec<MatchId> = links.iter().map(|l| l.match_id).collect();
        let next_ids: Vec<MatchId> = links.iter().map(|l| l.next_match_id).collect();

        let result = with_timeout(
            self.query_timeout,
            sqlx::query(
                r#"
                UPDATE matches AS m
                SET next_match_id = v.next_match_id
                FROM UNNEST($1::BIGINT[], $2::BIGINT[]) AS v(id, next_match_id)
                WHERE m.id = v.id
                "#,
            )
            .bind(ids)
            .bind(next_ids)
            .execute(&mut *self.tx),
        )
        .await?;

        if result.rows_affected() != links.len() as u64 {
            return Err(BracketError::UnexpectedRecords {
                expected: links.len(),
                actual: result.rows_affected() as usize,
            });
        }

        Ok(())
    }

    async fn get_match(&mut self, match_id: MatchId) -> BracketResult<Option<Match>> {
        let query = format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1");
        let row = with_timeout(
            self.query_timeout,
            sqlx::query(&query)
                .bind(match_id)
                .fetch_optional(&mut *self.tx),
        )
        .await?;

        Ok(row.as_ref().map(match_from_row))
    }

    async fn list_matches(&mut self, tournament_id: TournamentId) -> BracketResult<Vec<Match>> {
        let query = format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE tournament_id = $1 \
             ORDER BY round, match_number"
        );
        let rows = with_timeout(
            self.query_timeout,
            sqlx::query(&query)
                .bind(tournament_id)
                .fetch_all(&mut *self.tx),
        )
        .await?;

        Ok(rows.iter().map(match_from_row).collect())
    }

    async fn set_winner(&mut self, match_id: MatchId, winner: EntrantId) -> BracketResult<()> {
        let result = with_timeout(
            self.query_timeout,
            sqlx::query("UPDATE matches SET winner_id = $1 WHERE id = $2")
                .bind(winner)
                .bind(match_id)
                .execute(&mut *self.tx),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(BracketError::MatchNotFound(match_id));
        }

        Ok(())
    }

    async fn assign_slot(
        &mut self,
        match_id: MatchId,
        slot: Slot,
        entrant: EntrantId,
    ) -> BracketResult<()> {
        let query = format!("UPDATE matches SET {} = $1 WHERE id = $2", slot.column());
        let result = with_timeout(
            self.query_timeout,
            sqlx::query(&query)
                .bind(entrant)
                .bind(match_id)
                .execute(&mut *self.tx),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(BracketError::MatchNotFound(match_id));
        }

        Ok(())
    }
}
