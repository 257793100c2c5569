//! Two-phase bracket generation against a `MatchStore`.

use super::{
    builder::BracketBuilder,
    errors::{BracketError, BracketResult},
    models::{EntrantId, Match, TournamentId},
    store::MatchStore,
};

/// Generate and persist a linked single-elimination bracket
///
/// Runs draft -> insert -> link -> update against `store`. Nothing is
/// undone if the second pass fails; callers wanting atomicity pass a
/// store bound to one transaction and drop it without committing.
///
/// # Arguments
///
/// * `store` - Storage (and transaction scope) to write through
/// * `tournament_id` - Owning tournament
/// * `entrants` - Entrants in seeding order
///
/// # Returns
///
/// * `BracketResult<Vec<Match>>` - Linked records, round 1 first
pub async fn build_bracket<S>(
    store: &mut S,
    tournament_id: TournamentId,
    entrants: &[EntrantId],
) -> BracketResult<Vec<Match>>
where
    S: MatchStore + ?Sized,
{
    let builder = BracketBuilder::new(tournament_id, entrants)?;

    if !store.tournament_exists(tournament_id).await? {
        log::warn!("Refusing bracket for unknown tournament {}", tournament_id);
        return Err(BracketError::InvalidTournament(tournament_id));
    }

    let existing = store.count_matches(tournament_id).await?;
    if existing > 0 {
        log::warn!(
            "Refusing bracket for tournament {}: {} matches already exist",
            tournament_id,
            existing
        );
        return Err(BracketError::AlreadyGenerated(tournament_id));
    }

    let mut records = store.insert_matches(builder.drafts()).await?;
    log::debug!(
        "Inserted {} matches for tournament {}",
        records.len(),
        tournament_id
    );

    let links = builder.links(&records)?;
    store.update_matches(&links).await?;
    log::debug!(
        "Linked {} matches for tournament {}",
        links.len(),
        tournament_id
    );

    // Links are emitted in record order for every non-final match
    for (record, link) in records.iter_mut().zip(&links) {
        record.next_match_id = Some(link.next_match_id);
    }

    log::info!(
        "Generated bracket for tournament {}: {} entrants, {} rounds, {} byes",
        tournament_id,
        builder.entrant_count(),
        builder.round_count(),
        builder.bye_count()
    );

    Ok(records)
}
