//! Tests for the exchange engine
//!
//! Covers the full listing → initiate → counter → accept flow, atomic
//! settlement, and the turn-order and terminal-state protocol rules.

use chemtrade_core_rs::{
    accept_offer, counter_offer, create_listing, initiate_negotiation, post_reaction,
    reject_offer, Chemical, ExchangeError, Inventory, ListingDirection, MarketState,
    NegotiationStatus, NegotiationType, Team,
};

fn two_team_market() -> MarketState {
    MarketState::new(vec![
        Team::new("TEAM_A".to_string(), Inventory::uniform(1000.0), 10_000.0),
        Team::new("TEAM_B".to_string(), Inventory::uniform(1000.0), 10_000.0),
    ])
}

#[test]
fn test_listing_negotiation_counter_accept_scenario() {
    let mut state = two_team_market();

    // Team A advertises 100 gal of C
    let listing_id = create_listing(
        &mut state,
        "TEAM_A",
        Chemical::C,
        ListingDirection::Sell,
        Some(100.0),
        Some(5.0),
        0,
    )
    .unwrap();

    // Team B opens a buy negotiation at 100 @ $5.00
    let negotiation_id = initiate_negotiation(
        &mut state,
        "TEAM_B",
        "TEAM_A",
        Chemical::C,
        NegotiationType::Buy,
        100.0,
        5.0,
        Some(listing_id.clone()),
        0,
    )
    .unwrap();

    // Team A counters at 100 @ $6.00
    counter_offer(&mut state, &negotiation_id, "TEAM_A", 100.0, 6.0).unwrap();

    // Team B accepts the counter
    let receipt = accept_offer(&mut state, &negotiation_id, "TEAM_B", 1).unwrap();
    assert_eq!(receipt.quantity, 100.0);
    assert_eq!(receipt.price, 6.0);
    assert_eq!(receipt.total, 600.0);

    let negotiation = state.get_negotiation(&negotiation_id).unwrap();
    assert_eq!(negotiation.status(), NegotiationStatus::Accepted { pass: 1 });

    let a = state.get_team("TEAM_A").unwrap();
    let b = state.get_team("TEAM_B").unwrap();
    assert!((a.inventory().get(Chemical::C) - 900.0).abs() < 1e-9);
    assert!((a.funds() - 10_600.0).abs() < 1e-9);
    assert!((b.inventory().get(Chemical::C) - 1100.0).abs() < 1e-9);
    assert!((b.funds() - 9_400.0).abs() < 1e-9);

    // The linked listing closed with the trade
    assert!(!state.get_listing(&listing_id).unwrap().is_open());
}

#[test]
fn test_double_accept_is_rejected_without_second_transfer() {
    let mut state = two_team_market();
    let id = initiate_negotiation(
        &mut state,
        "TEAM_B",
        "TEAM_A",
        Chemical::N,
        NegotiationType::Buy,
        10.0,
        2.0,
        None,
        0,
    )
    .unwrap();

    accept_offer(&mut state, &id, "TEAM_A", 1).unwrap();
    let funds_a = state.get_team("TEAM_A").unwrap().funds();
    let funds_b = state.get_team("TEAM_B").unwrap().funds();

    // Accepting again must fail and move nothing
    assert_eq!(
        accept_offer(&mut state, &id, "TEAM_A", 2),
        Err(ExchangeError::NotPending)
    );
    assert_eq!(
        accept_offer(&mut state, &id, "TEAM_B", 2),
        Err(ExchangeError::NotPending)
    );
    assert_eq!(state.get_team("TEAM_A").unwrap().funds(), funds_a);
    assert_eq!(state.get_team("TEAM_B").unwrap().funds(), funds_b);
}

#[test]
fn test_cannot_respond_to_own_latest_offer() {
    let mut state = two_team_market();
    let id = initiate_negotiation(
        &mut state,
        "TEAM_B",
        "TEAM_A",
        Chemical::D,
        NegotiationType::Buy,
        10.0,
        2.0,
        None,
        0,
    )
    .unwrap();

    // Initiator holds the latest offer: every response path must fail
    assert!(matches!(
        counter_offer(&mut state, &id, "TEAM_B", 10.0, 2.5),
        Err(ExchangeError::OwnLatestOffer { .. })
    ));
    assert!(matches!(
        accept_offer(&mut state, &id, "TEAM_B", 1),
        Err(ExchangeError::OwnLatestOffer { .. })
    ));
    assert!(matches!(
        reject_offer(&mut state, &id, "TEAM_B", 1),
        Err(ExchangeError::OwnLatestOffer { .. })
    ));

    // After A counters, the turn flips and B may act again
    counter_offer(&mut state, &id, "TEAM_A", 10.0, 2.5).unwrap();
    assert!(matches!(
        counter_offer(&mut state, &id, "TEAM_A", 10.0, 2.6),
        Err(ExchangeError::OwnLatestOffer { .. })
    ));
    accept_offer(&mut state, &id, "TEAM_B", 1).unwrap();
}

#[test]
fn test_reject_moves_nothing() {
    let mut state = two_team_market();
    let id = initiate_negotiation(
        &mut state,
        "TEAM_A",
        "TEAM_B",
        Chemical::Q,
        NegotiationType::Sell,
        500.0,
        9.0,
        None,
        0,
    )
    .unwrap();

    reject_offer(&mut state, &id, "TEAM_B", 1).unwrap();
    assert_eq!(
        state.get_negotiation(&id).unwrap().status(),
        NegotiationStatus::Rejected { pass: 1 }
    );

    let a = state.get_team("TEAM_A").unwrap();
    let b = state.get_team("TEAM_B").unwrap();
    assert_eq!(a.funds(), 10_000.0);
    assert_eq!(b.funds(), 10_000.0);
    assert_eq!(a.inventory().get(Chemical::Q), 1000.0);
    assert_eq!(b.inventory().get(Chemical::Q), 1000.0);
}

#[test]
fn test_accept_fails_cleanly_when_seller_cannot_deliver() {
    let mut state = MarketState::new(vec![
        Team::new("TEAM_A".to_string(), Inventory::uniform(10.0), 10_000.0),
        Team::new("TEAM_B".to_string(), Inventory::uniform(10.0), 10_000.0),
    ]);
    // A offers to sell 500 gal it does not hold
    let id = initiate_negotiation(
        &mut state,
        "TEAM_A",
        "TEAM_B",
        Chemical::C,
        NegotiationType::Sell,
        500.0,
        1.0,
        None,
        0,
    )
    .unwrap();

    let err = accept_offer(&mut state, &id, "TEAM_B", 1).unwrap_err();
    assert!(matches!(err, ExchangeError::InsufficientInventory { .. }));
    // Still pending, nothing moved
    assert!(state.get_negotiation(&id).unwrap().is_pending());
    assert_eq!(state.get_team("TEAM_B").unwrap().funds(), 10_000.0);
}

#[test]
fn test_funds_conserved_by_any_sequence_of_trades() {
    let mut state = two_team_market();
    let total = state.total_funds();

    for (pass, price) in [(1u64, 2.0), (2, 3.5), (3, 1.25)] {
        let id = initiate_negotiation(
            &mut state,
            "TEAM_B",
            "TEAM_A",
            Chemical::C,
            NegotiationType::Buy,
            20.0,
            price,
            None,
            pass,
        )
        .unwrap();
        accept_offer(&mut state, &id, "TEAM_A", pass).unwrap();
    }

    assert!((state.total_funds() - total).abs() < 1e-9);
    assert!((state.total_quantity(Chemical::C) - 2000.0).abs() < 1e-9);
}

#[test]
fn test_reactions_never_change_negotiation_state() {
    let mut state = two_team_market();
    let id = initiate_negotiation(
        &mut state,
        "TEAM_B",
        "TEAM_A",
        Chemical::N,
        NegotiationType::Buy,
        10.0,
        1.0,
        None,
        0,
    )
    .unwrap();

    post_reaction(&mut state, &id, "TEAM_A", 80, 1).unwrap();
    post_reaction(&mut state, &id, "TEAM_B", 200, 1).unwrap(); // Capped to 100

    let negotiation = state.get_negotiation(&id).unwrap();
    assert!(negotiation.is_pending());
    assert_eq!(negotiation.last_offer_by(), "TEAM_B");
    assert_eq!(negotiation.reactions().len(), 2);
    assert_eq!(negotiation.reactions()[1].intensity, 100);
}
