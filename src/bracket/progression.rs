//! Recording winners and carrying them into the next round.

use serde::{Deserialize, Serialize};

use super::{
    errors::{BracketError, BracketResult},
    models::{EntrantId, Match, MatchId, Slot},
    store::MatchStore,
};

/// Outcome of recording a winner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advancement {
    /// The decided match
    pub decided: Match,
    /// Next-round match the winner was seated in (None after the final)
    pub advanced_to: Option<Match>,
}

impl Advancement {
    /// Winner of the final, if this result decided it
    pub fn champion(&self) -> Option<EntrantId> {
        match self.advanced_to {
            None => self.decided.winner_id,
            Some(_) => None,
        }
    }
}

/// Record the winner of a match and seat them in the match it feeds
///
/// Byes are not advanced automatically. A caller that wants the lone
/// entrant of a bye to move on records them as winner through this call.
///
/// # Arguments
///
/// * `store` - Storage (and transaction scope) to write through
/// * `match_id` - Match being decided
/// * `winner` - Entrant that won; must occupy one of its slots
///
/// # Returns
///
/// * `BracketResult<Advancement>` - Updated match and its successor
pub async fn record_winner<S>(
    store: &mut S,
    match_id: MatchId,
    winner: EntrantId,
) -> BracketResult<Advancement>
where
    S: MatchStore + ?Sized,
{
    let mut decided = store
        .get_match(match_id)
        .await?
        .ok_or(BracketError::MatchNotFound(match_id))?;

    if decided.is_decided() {
        return Err(BracketError::MatchAlreadyDecided(match_id));
    }

    if !decided.has_entrant(winner) {
        return Err(BracketError::InvalidWinner { match_id, winner });
    }

    if decided.round > 1 && (decided.team1_id.is_none() || decided.team2_id.is_none()) {
        let bracket = store.list_matches(decided.tournament_id).await?;
        if let Some(pending) = pending_feeder(&decided, &bracket) {
            return Err(BracketError::MatchNotReady { match_id, pending });
        }
    }

    let mut advanced_to = None;
    if let Some(next_id) = decided.next_match_id {
        let mut next = store
            .get_match(next_id)
            .await?
            .ok_or(BracketError::MatchNotFound(next_id))?;

        if next.is_decided() {
            return Err(BracketError::MatchAlreadyDecided(next_id));
        }

        let slot = Slot::fed_by(decided.match_number);
        match next.entrant(slot) {
            Some(occupant) if occupant != winner => {
                return Err(BracketError::SlotOccupied {
                    match_id: next_id,
                    occupant,
                });
            }
            Some(_) => {}
            None => {
                store.assign_slot(next_id, slot, winner).await?;
                match slot {
                    Slot::Team1 => next.team1_id = Some(winner),
                    Slot::Team2 => next.team2_id = Some(winner),
                }
            }
        }
        advanced_to = Some(next);
    }

    store.set_winner(match_id, winner).await?;
    decided.winner_id = Some(winner);

    match &advanced_to {
        Some(next) => log::info!(
            "Entrant {} won match {} and advances to match {} (round {})",
            winner,
            match_id,
            next.id,
            next.round
        ),
        None => log::info!(
            "Entrant {} won final match {} of tournament {}",
            winner,
            match_id,
            decided.tournament_id
        ),
    }

    Ok(Advancement {
        decided,
        advanced_to,
    })
}

/// Undecided feeder still owing an entrant to an empty slot of `target`
fn pending_feeder(target: &Match, bracket: &[Match]) -> Option<MatchId> {
    [Slot::Team1, Slot::Team2]
        .into_iter()
        .filter(|slot| target.entrant(*slot).is_none())
        .filter_map(|slot| {
            bracket.iter().find(|f| {
                f.next_match_id == Some(target.id) && Slot::fed_by(f.match_number) == slot
            })
        })
        .find(|f| !f.is_decided() && !is_dead(f, bracket))
        .map(|f| f.id)
}

/// A match that can never produce a winner: no entrants in round 1, or
/// only such matches feeding it.
fn is_dead(m: &Match, bracket: &[Match]) -> bool {
    if m.is_decided() || m.team1_id.is_some() || m.team2_id.is_some() {
        return false;
    }
    if m.round == 1 {
        return true;
    }
    bracket
        .iter()
        .filter(|f| f.next_match_id == Some(m.id))
        .all(|f| is_dead(f, bracket))
}
