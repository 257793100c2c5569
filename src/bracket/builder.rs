//! Pure bracket construction: rounds, byes, slot assignment and linkage.

use super::{
    errors::{BracketError, BracketResult},
    models::{EntrantId, Match, MatchDraft, MatchLink, TournamentId},
};
use std::collections::HashSet;

/// Single-elimination bracket layout for one tournament
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketBuilder {
    tournament_id: TournamentId,
    entrant_count: usize,
    rounds: u32,
    drafts: Vec<MatchDraft>,
}

impl BracketBuilder {
    /// Lay out a bracket for `entrants`, kept in their given order
    ///
    /// # Arguments
    ///
    /// * `tournament_id` - Owning tournament
    /// * `entrants` - Entrants in seeding order
    ///
    /// # Returns
    ///
    /// * `BracketResult<BracketBuilder>` - Layout, or `InsufficientEntrants` / `DuplicateEntrant`
    pub fn new(tournament_id: TournamentId, entrants: &[EntrantId]) -> BracketResult<Self> {
        if entrants.len() < 2 {
            return Err(BracketError::InsufficientEntrants(entrants.len()));
        }

        let mut seen = HashSet::with_capacity(entrants.len());
        if let Some(dup) = entrants.iter().find(|id| !seen.insert(**id)) {
            return Err(BracketError::DuplicateEntrant(*dup));
        }

        let rounds = round_count(entrants.len());
        let mut drafts = Vec::with_capacity(total_matches(rounds));

        // Round 1: two entrants per match in input order, missing seats stay empty
        for i in 1..=matches_in_round(rounds, 1) {
            let first = (i as usize - 1) * 2;
            drafts.push(MatchDraft {
                tournament_id,
                round: 1,
                match_number: i,
                team1_id: entrants.get(first).copied(),
                team2_id: entrants.get(first + 1).copied(),
            });
        }

        for round in 2..=rounds {
            for i in 1..=matches_in_round(rounds, round) {
                drafts.push(MatchDraft {
                    tournament_id,
                    round,
                    match_number: i,
                    team1_id: None,
                    team2_id: None,
                });
            }
        }

        Ok(Self {
            tournament_id,
            entrant_count: entrants.len(),
            rounds,
            drafts,
        })
    }

    pub fn tournament_id(&self) -> TournamentId {
        self.tournament_id
    }

    pub fn entrant_count(&self) -> usize {
        self.entrant_count
    }

    /// Number of rounds, the final being the last
    pub fn round_count(&self) -> u32 {
        self.rounds
    }

    /// Empty first-round seats
    pub fn bye_count(&self) -> usize {
        (1usize << self.rounds) - self.entrant_count
    }

    /// Match count of `round` (0 outside `1..=round_count`)
    pub fn matches_in_round(&self, round: u32) -> u32 {
        if round == 0 || round > self.rounds {
            0
        } else {
            matches_in_round(self.rounds, round)
        }
    }

    /// Unlinked drafts, round 1 first, each round in match-number order
    pub fn drafts(&self) -> &[MatchDraft] {
        &self.drafts
    }

    /// Compute forward links from the records the store assigned IDs to.
    ///
    /// `records` must be in draft order. Match `i` of round `r` links to
    /// match `ceil(i / 2)` of round `r + 1`; the final gets no link.
    pub fn links(&self, records: &[Match]) -> BracketResult<Vec<MatchLink>> {
        if records.len() != self.drafts.len()
            || records
                .iter()
                .zip(&self.drafts)
                .any(|(r, d)| r.round != d.round || r.match_number != d.match_number)
        {
            return Err(BracketError::UnexpectedRecords {
                expected: self.drafts.len(),
                actual: records.len(),
            });
        }

        let mut links = Vec::with_capacity(records.len().saturating_sub(1));
        for record in records.iter().filter(|r| r.round < self.rounds) {
            let next = self.index_of(record.round + 1, record.match_number.div_ceil(2));
            links.push(MatchLink {
                match_id: record.id,
                next_match_id: records[next].id,
            });
        }

        Ok(links)
    }

    // Rounds are laid out back to back, so round r starts after
    // 2^R - 2^(R-r+1) earlier matches.
    fn index_of(&self, round: u32, match_number: u32) -> usize {
        let offset = (1usize << self.rounds) - (1usize << (self.rounds - round + 1));
        offset + match_number as usize - 1
    }
}

/// `ceil(log2(entrants))` for `entrants >= 2`
pub fn round_count(entrants: usize) -> u32 {
    entrants.next_power_of_two().trailing_zeros()
}

/// Matches in a full bracket of `rounds` rounds
pub fn total_matches(rounds: u32) -> usize {
    (1usize << rounds) - 1
}

fn matches_in_round(rounds: u32, round: u32) -> u32 {
    1 << (rounds - round)
}
