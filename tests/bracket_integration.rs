//! Integration tests for bracket generation and progression
//!
//! These tests run the full two-phase generation against the in-memory
//! store and walk brackets through to a champion.

use bracketry::bracket::{
    Bracket, BracketError, InMemoryMatchStore, Match, MatchStore, build_bracket, record_winner,
};

async fn generate(entrants: &[i64]) -> (InMemoryMatchStore, Vec<Match>) {
    let mut store = InMemoryMatchStore::new().with_tournament(1);
    let matches = build_bracket(&mut store, 1, entrants)
        .await
        .expect("bracket should build");
    (store, matches)
}

fn slots(m: &Match) -> (Option<i64>, Option<i64>) {
    (m.team1_id, m.team2_id)
}

// ============================================================================
// Concrete layouts
// ============================================================================

#[tokio::test]
async fn test_two_entrants_single_final() {
    let (_, matches) = generate(&[101, 102]).await;

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].round, 1);
    assert_eq!(matches[0].match_number, 1);
    assert_eq!(slots(&matches[0]), (Some(101), Some(102)));
    assert_eq!(matches[0].next_match_id, None);
    assert_eq!(matches[0].winner_id, None);
}

#[tokio::test]
async fn test_three_entrants_bye_and_linkage() {
    let (_, matches) = generate(&[1, 2, 3]).await;
    assert_eq!(matches.len(), 3);

    let (m1, m2, final_match) = (&matches[0], &matches[1], &matches[2]);
    assert_eq!((m1.round, m1.match_number), (1, 1));
    assert_eq!((m2.round, m2.match_number), (1, 2));
    assert_eq!((final_match.round, final_match.match_number), (2, 1));

    assert_eq!(slots(m1), (Some(1), Some(2)));
    assert_eq!(slots(m2), (Some(3), None));
    assert!(m2.is_bye());
    assert_eq!(slots(final_match), (None, None));

    assert_eq!(m1.next_match_id, Some(final_match.id));
    assert_eq!(m2.next_match_id, Some(final_match.id));
    assert_eq!(final_match.next_match_id, None);
}

#[tokio::test]
async fn test_four_entrants_full_first_round() {
    let (_, matches) = generate(&[1, 2, 3, 4]).await;
    assert_eq!(matches.len(), 3);

    assert_eq!(slots(&matches[0]), (Some(1), Some(2)));
    assert_eq!(slots(&matches[1]), (Some(3), Some(4)));
    assert!(!matches[0].is_bye() && !matches[1].is_bye());
    assert_eq!(matches[0].next_match_id, Some(matches[2].id));
    assert_eq!(matches[1].next_match_id, Some(matches[2].id));
}

#[tokio::test]
async fn test_five_entrants_byes_at_the_end() {
    let (_, matches) = generate(&[1, 2, 3, 4, 5]).await;
    assert_eq!(matches.len(), 7);

    let bracket = Bracket::new(1, matches);
    let round_one = bracket.round(1);
    assert_eq!(round_one.len(), 4);
    assert_eq!(bracket.round(2).len(), 2);
    assert_eq!(bracket.round(3).len(), 1);

    assert_eq!(slots(round_one[0]), (Some(1), Some(2)));
    assert_eq!(slots(round_one[1]), (Some(3), Some(4)));
    assert_eq!(slots(round_one[2]), (Some(5), None));
    assert_eq!(slots(round_one[3]), (None, None));
    assert_eq!(round_one.iter().filter(|m| m.is_bye()).count(), 2);
}

#[tokio::test]
async fn test_eight_entrants_linkage_per_level() {
    let entrants: Vec<i64> = (1..=8).collect();
    let (_, matches) = generate(&entrants).await;
    let bracket = Bracket::new(1, matches);

    assert_eq!(bracket.round_count(), 3);
    for round in 1..3 {
        let next_round = bracket.round(round + 1);
        for m in bracket.round(round) {
            let target = next_round[(m.match_number as usize).div_ceil(2) - 1];
            assert_eq!(m.next_match_id, Some(target.id));
            assert!(m.team1_id.is_some() || round > 1);
        }
    }

    let final_match = bracket.final_match().expect("final exists");
    assert_eq!(final_match.round, 3);
    assert_eq!(final_match.next_match_id, None);
}

// ============================================================================
// Error paths
// ============================================================================

#[tokio::test]
async fn test_too_few_entrants() {
    let mut store = InMemoryMatchStore::new().with_tournament(1);

    for entrants in [&[][..], &[7][..]] {
        let result = build_bracket(&mut store, 1, entrants).await;
        assert!(matches!(
            result,
            Err(BracketError::InsufficientEntrants(n)) if n == entrants.len()
        ));
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_unknown_tournament() {
    let mut store = InMemoryMatchStore::new().with_tournament(1);
    let result = build_bracket(&mut store, 2, &[1, 2]).await;
    assert!(matches!(result, Err(BracketError::InvalidTournament(2))));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_second_generation_is_rejected() {
    let (mut store, matches) = generate(&[1, 2, 3, 4]).await;

    let result = build_bracket(&mut store, 1, &[5, 6]).await;
    assert!(matches!(result, Err(BracketError::AlreadyGenerated(1))));
    assert_eq!(store.len(), matches.len());
}

#[tokio::test]
async fn test_insert_failure_is_propagated() {
    let mut store = InMemoryMatchStore::new().with_tournament(1).failing_inserts();
    let result = build_bracket(&mut store, 1, &[1, 2, 3]).await;

    let err = result.unwrap_err();
    assert!(matches!(err, BracketError::Persistence(_)));
    assert_eq!(err.client_message(), "Internal server error");
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_update_failure_leaves_unlinked_matches() {
    // No compensation: the first pass stays in place for the caller to roll back
    let mut store = InMemoryMatchStore::new().with_tournament(1).failing_updates();
    let result = build_bracket(&mut store, 1, &[1, 2, 3]).await;
    assert!(matches!(result, Err(BracketError::Persistence(_))));

    let stored = store.list_matches(1).await.unwrap();
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().all(|m| m.next_match_id.is_none()));
}

// ============================================================================
// Progression
// ============================================================================

#[tokio::test]
async fn test_play_out_five_entrant_bracket() {
    let (mut store, matches) = generate(&[1, 2, 3, 4, 5]).await;
    let ids: Vec<i64> = matches.iter().map(|m| m.id).collect();

    // Round 1: two played matches, one single-entrant bye advanced by the caller
    record_winner(&mut store, ids[0], 2).await.unwrap();
    record_winner(&mut store, ids[1], 3).await.unwrap();
    let bye = record_winner(&mut store, ids[2], 5).await.unwrap();
    assert_eq!(bye.advanced_to.as_ref().map(|m| m.team1_id), Some(Some(5)));

    // Round 2, match 2 still waits on the empty round-1 slot
    let semi = store.get_match(ids[5]).await.unwrap().unwrap();
    assert_eq!(slots(&semi), (Some(5), None));

    let first_semi = record_winner(&mut store, ids[4], 3).await.unwrap();
    assert_eq!(first_semi.advanced_to.map(|m| m.team1_id), Some(Some(3)));

    let walkover = record_winner(&mut store, ids[5], 5).await.unwrap();
    let final_match = walkover.advanced_to.unwrap();
    assert_eq!(slots(&final_match), (Some(3), Some(5)));

    let result = record_winner(&mut store, ids[6], 5).await.unwrap();
    assert_eq!(result.champion(), Some(5));

    let bracket = Bracket::new(1, store.list_matches(1).await.unwrap());
    assert!(bracket.is_complete());
    assert_eq!(bracket.champion(), Some(5));
}

#[tokio::test]
async fn test_final_cannot_be_decided_before_both_semis() {
    let (mut store, matches) = generate(&[10, 20, 30, 40]).await;
    let ids: Vec<i64> = matches.iter().map(|m| m.id).collect();

    record_winner(&mut store, ids[0], 10).await.unwrap();
    let result = record_winner(&mut store, ids[2], 10).await;
    assert!(matches!(
        result,
        Err(BracketError::MatchNotReady { match_id, pending })
            if match_id == ids[2] && pending == ids[1]
    ));

    // The open semifinal still plays out into an undecided final
    let semi = record_winner(&mut store, ids[1], 30).await.unwrap();
    let final_match = semi.advanced_to.unwrap();
    assert_eq!(slots(&final_match), (Some(10), Some(30)));
    assert_eq!(final_match.winner_id, None);

    let bracket = Bracket::new(1, store.list_matches(1).await.unwrap());
    assert_eq!(bracket.champion(), None);
}

#[tokio::test]
async fn test_winner_cannot_feed_decided_match() {
    let (mut store, matches) = generate(&[10, 20, 30, 40]).await;
    let ids: Vec<i64> = matches.iter().map(|m| m.id).collect();

    record_winner(&mut store, ids[0], 10).await.unwrap();
    store.set_winner(ids[2], 10).await.unwrap();

    let result = record_winner(&mut store, ids[1], 30).await;
    assert!(matches!(result, Err(BracketError::MatchAlreadyDecided(id)) if id == ids[2]));

    let final_match = store.get_match(ids[2]).await.unwrap().unwrap();
    assert_eq!(slots(&final_match), (Some(10), None));
}

#[tokio::test]
async fn test_brackets_are_isolated_per_tournament() {
    let mut store = InMemoryMatchStore::new()
        .with_tournament(1)
        .with_tournament(2);

    build_bracket(&mut store, 1, &[1, 2, 3, 4]).await.unwrap();
    build_bracket(&mut store, 2, &[1, 2]).await.unwrap();

    assert_eq!(store.count_matches(1).await.unwrap(), 3);
    assert_eq!(store.count_matches(2).await.unwrap(), 1);
    assert_eq!(store.len(), 4);
}
