//! Integration tests for the hall facade: live session actors,
//! serialized draws, preview purity, auto-play, and the finish path.

use bingo_hall::cartela::{Card, CartelaRegistry};
use bingo_hall::draw::DrawError;
use bingo_hall::hall::{HallConfig, HallManager};
use bingo_hall::patterns::{Combinator, PatternCatalog, PatternKind};
use bingo_hall::session::{MemorySettlementStore, SessionError, SessionParams};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

fn make_card(id: i64) -> Card {
    let mut grid = [[0u8; 5]; 5];
    for (r, row) in grid.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            if (r, c) == (2, 2) {
                continue;
            }
            *cell = c as u8 * 15 + 1 + ((r as i64 + id) % 15) as u8;
        }
    }
    Card::new(id, grid).expect("generated card is valid")
}

fn registry() -> Arc<CartelaRegistry> {
    let cards = (1..=20).map(make_card).collect();
    Arc::new(CartelaRegistry::from_cards(cards).expect("card book is valid"))
}

async fn setup() -> (HallManager<MemorySettlementStore>, Arc<MemorySettlementStore>) {
    let store = Arc::new(MemorySettlementStore::new());
    store.insert_wallet(1, 1_000_000).await;
    let hall = HallManager::new(
        store.clone(),
        registry(),
        Arc::new(PatternCatalog::builtin()),
        HallConfig::default(),
    );
    (hall, store)
}

fn params() -> SessionParams {
    SessionParams {
        house_id: 1,
        game_id: None,
        stake_amount: 1000,
        number_of_players: 5,
        cut_percentage: 20,
        cartela: BTreeSet::from([1, 2, 3]),
        dynamic_bonus: false,
    }
}

#[tokio::test]
async fn draws_are_unique_persisted_and_bounded() {
    let (hall, store) = setup().await;
    let session = hall.open_session(params()).await.unwrap();

    let mut seen = BTreeSet::new();
    for _ in 0..75 {
        let n = hall.draw(1, session.game_id).await.unwrap();
        assert!((1..=75).contains(&n));
        assert!(seen.insert(n), "number {n} drawn twice");
    }

    // The 76th draw reports exhaustion; the session stays usable.
    let err = hall.draw(1, session.game_id).await.unwrap_err();
    assert!(matches!(err, SessionError::Draw(DrawError::ExhaustedPool)));

    let stored = fetch_session(&store, 1, session.game_id).await;
    assert_eq!(stored.drawn_numbers.len(), 75);
    let stored_set: BTreeSet<u8> = stored.drawn_numbers.iter().copied().collect();
    assert_eq!(stored_set, seen);

    // Exhaustion does not block settlement or finish.
    let finished = hall.record_winner(1, session.game_id, 2).await.unwrap();
    assert!(finished.finished);
}

#[tokio::test]
async fn preview_shuffle_never_mutates() {
    let (hall, store) = setup().await;
    let session = hall.open_session(params()).await.unwrap();

    hall.draw(1, session.game_id).await.unwrap();
    for _ in 0..5 {
        let sample = hall.preview_shuffle(1, session.game_id).await.unwrap();
        assert_eq!(sample.len(), 5);
    }

    let stored = fetch_session(&store, 1, session.game_id).await;
    assert_eq!(stored.drawn_numbers.len(), 1);
}

#[tokio::test]
async fn evaluate_card_through_the_live_session() {
    let (hall, _store) = setup().await;
    let session = hall.open_session(params()).await.unwrap();

    // The free-space shape needs no draws at all.
    let decision = hall
        .evaluate_card(
            1,
            session.game_id,
            1,
            PatternKind::FreeSpace,
            None,
            Combinator::And,
        )
        .await
        .unwrap();
    assert!(decision.is_winner);

    // A card outside the cartela is refused even though the book
    // knows it.
    let err = hall
        .evaluate_card(
            1,
            session.game_id,
            7,
            PatternKind::AnyLine,
            None,
            Combinator::And,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::CardNotInSession { card_id: 7, .. }));
}

#[tokio::test]
async fn evaluation_is_stable_across_further_draws() {
    let (hall, _store) = setup().await;
    let session = hall.open_session(params()).await.unwrap();

    let before = hall
        .evaluate_card(1, session.game_id, 1, PatternKind::FreeSpace, None, Combinator::And)
        .await
        .unwrap();
    for _ in 0..10 {
        hall.draw(1, session.game_id).await.unwrap();
    }
    let after = hall
        .evaluate_card(1, session.game_id, 1, PatternKind::FreeSpace, None, Combinator::And)
        .await
        .unwrap();
    // More draws can only add satisfied patterns, never retract the
    // free-space win.
    assert!(after.is_winner);
    assert!(before.satisfied.is_subset(&after.satisfied));
}

#[tokio::test]
async fn record_winner_retires_the_session() {
    let (hall, store) = setup().await;
    let session = hall.open_session(params()).await.unwrap();
    hall.draw(1, session.game_id).await.unwrap();

    let finished = hall.record_winner(1, session.game_id, 3).await.unwrap();
    assert!(finished.finished);
    assert_eq!(finished.winner_card_id, Some(3));
    assert!(fetch_session(&store, 1, session.game_id).await.finished);

    // Draws and re-settlement are both refused afterwards.
    assert!(matches!(
        hall.draw(1, session.game_id).await,
        Err(SessionError::SessionFinished(_))
    ));
    let mut edit = params();
    edit.game_id = Some(session.game_id);
    edit.number_of_players = 9;
    assert!(matches!(
        hall.open_session(edit).await,
        Err(SessionError::SessionFinished(_))
    ));
}

#[tokio::test]
async fn auto_play_draws_until_stopped_and_stop_is_idempotent() {
    let (hall, store) = setup().await;
    let session = hall.open_session(params()).await.unwrap();

    hall.start_auto_play(1, session.game_id, Some(Duration::from_millis(20)))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(130)).await;
    hall.stop_auto_play(1, session.game_id).await.unwrap();

    // Let any in-flight draw complete, then the count must freeze.
    tokio::time::sleep(Duration::from_millis(60)).await;
    let after_stop = fetch_session(&store, 1, session.game_id).await.drawn_numbers.len();
    assert!(after_stop >= 1, "auto-play never drew");

    hall.stop_auto_play(1, session.game_id).await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    let later = fetch_session(&store, 1, session.game_id).await.drawn_numbers.len();
    assert_eq!(after_stop, later, "draws continued after stop");
}

#[tokio::test]
async fn stop_auto_play_without_a_live_session_is_a_noop() {
    let (hall, _store) = setup().await;
    assert!(hall.stop_auto_play(1, 42).await.is_ok());
}

#[tokio::test]
async fn sessions_reattach_after_a_restart() {
    let (hall, store) = setup().await;
    let session = hall.open_session(params()).await.unwrap();
    for _ in 0..3 {
        hall.draw(1, session.game_id).await.unwrap();
    }
    hall.close_session(1, session.game_id).await;

    // A fresh facade over the same store picks the session back up and
    // keeps drawing without repeats.
    let hall2 = HallManager::new(
        store.clone(),
        registry(),
        Arc::new(PatternCatalog::builtin()),
        HallConfig::default(),
    );
    let n = hall2.draw(1, session.game_id).await.unwrap();
    let stored = fetch_session(&store, 1, session.game_id).await;
    assert_eq!(stored.drawn_numbers.len(), 4);
    let set: BTreeSet<u8> = stored.drawn_numbers.iter().copied().collect();
    assert_eq!(set.len(), 4);
    assert!(stored.drawn_numbers.contains(&n));
}

/// Load a session straight from the store, bypassing the facade.
async fn fetch_session(
    store: &MemorySettlementStore,
    house_id: i64,
    game_id: i64,
) -> bingo_hall::session::GameSession {
    use bingo_hall::session::SettlementStore;
    store.fetch(house_id, game_id).await.expect("session exists")
}
