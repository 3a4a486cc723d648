//! Strategy contract tests
//!
//! Every skill level must return at most one action per call, decline
//! rather than fail on degenerate inventories, and decline outright when
//! shadow prices are unavailable.

use chemtrade_core_rs::strategy::StrategyContext;
use chemtrade_core_rs::{
    build_strategy, solver, Chemical, DeterministicRng, Inventory, Listing, ListingDirection,
    Negotiation, NegotiationType, NpcAgent, Offer, SkillLevel,
};

fn sample_listings() -> Vec<Listing> {
    vec![
        Listing::new(
            "TEAM_X".to_string(),
            Chemical::C,
            ListingDirection::Sell,
            Some(50.0),
            Some(3.0),
            1,
        ),
        Listing::new(
            "TEAM_Y".to_string(),
            Chemical::N,
            ListingDirection::Buy,
            Some(80.0),
            Some(400.0),
            1,
        ),
        Listing::new(
            "TEAM_X".to_string(),
            Chemical::Q,
            ListingDirection::Buy,
            None,
            Some(0.5),
            2,
        ),
    ]
}

fn sample_negotiation() -> Negotiation {
    // TEAM_X wants to buy D from us; we hold the turn
    Negotiation::new(
        "TEAM_X".to_string(),
        "TEAM_A".to_string(),
        Chemical::D,
        NegotiationType::Buy,
        Offer {
            quantity: 25.0,
            price: 2.0,
            proposed_by: "TEAM_X".to_string(),
        },
        None,
        1,
    )
}

#[test]
fn test_every_strategy_declines_without_shadow_prices() {
    let inventory = Inventory::uniform(1000.0);
    let negotiations = vec![sample_negotiation()];
    let listings = sample_listings();

    for &skill in SkillLevel::ALL.iter() {
        let agent = NpcAgent::new("npc".into(), "TEAM_A".into(), skill, 0.5);
        let mut strategy = build_strategy(&agent, &inventory);
        let mut rng = DeterministicRng::new(17);
        let mut ctx = StrategyContext {
            team_id: "TEAM_A",
            inventory: &inventory,
            funds: 10_000.0,
            shadow: None,
            plan: None,
            listings: &listings,
            negotiations: &negotiations,
            pass: 2,
            rng: &mut rng,
        };
        assert!(
            strategy.decide_trade(&mut ctx).is_none(),
            "{:?} must not trade without shadow prices",
            skill
        );
        assert!(
            strategy.respond_to_negotiations(&mut ctx).is_none(),
            "{:?} must not respond without shadow prices",
            skill
        );
    }
}

#[test]
fn test_every_strategy_survives_degenerate_inventories() {
    let degenerate = [
        Inventory::empty(),
        Inventory::from_quantities(0.0, 0.0, 0.0, 5000.0),
        Inventory::from_quantities(1.0, 0.0, 1.0, 0.0),
        Inventory::uniform(1e-12),
    ];
    let listings = sample_listings();
    let negotiations = vec![sample_negotiation()];

    for inventory in degenerate.iter() {
        let plan = solver::solve(inventory).unwrap();
        let shadows = solver::shadow_prices(inventory).unwrap();

        for &skill in SkillLevel::ALL.iter() {
            let agent = NpcAgent::new("npc".into(), "TEAM_A".into(), skill, 1.0);
            let mut strategy = build_strategy(&agent, inventory);
            let mut rng = DeterministicRng::new(23);
            let mut ctx = StrategyContext {
                team_id: "TEAM_A",
                inventory,
                funds: 0.0,
                shadow: Some(&shadows),
                plan: Some(&plan),
                listings: &listings,
                negotiations: &negotiations,
                pass: 2,
                rng: &mut rng,
            };
            // Must not panic; any single action or None is acceptable
            let _ = strategy.decide_trade(&mut ctx);
            let _ = strategy.respond_to_negotiations(&mut ctx);
        }
    }
}

#[test]
fn test_responses_target_a_respondable_negotiation() {
    let inventory = Inventory::uniform(1000.0);
    let plan = solver::solve(&inventory).unwrap();
    let shadows = solver::shadow_prices(&inventory).unwrap();
    let negotiation = sample_negotiation();
    let negotiation_id = negotiation.id().to_string();
    let negotiations = vec![negotiation];

    for &skill in SkillLevel::ALL.iter() {
        let agent = NpcAgent::new("npc".into(), "TEAM_A".into(), skill, 0.0);
        let mut strategy = build_strategy(&agent, &inventory);
        let mut rng = DeterministicRng::new(31);
        let mut ctx = StrategyContext {
            team_id: "TEAM_A",
            inventory: &inventory,
            funds: 10_000.0,
            shadow: Some(&shadows),
            plan: Some(&plan),
            listings: &[],
            negotiations: &negotiations,
            pass: 2,
            rng: &mut rng,
        };
        if let Some(response) = strategy.respond_to_negotiations(&mut ctx) {
            assert_eq!(
                response.negotiation_id, negotiation_id,
                "{:?} answered a negotiation it was not offered",
                skill
            );
            if let Some(intensity) = response.react_intensity {
                assert!(intensity <= 100);
            }
        }
    }
}

#[test]
fn test_same_seed_same_decisions() {
    let inventory = Inventory::uniform(500.0);
    let plan = solver::solve(&inventory).unwrap();
    let shadows = solver::shadow_prices(&inventory).unwrap();
    let listings = sample_listings();

    for &skill in SkillLevel::ALL.iter() {
        let agent = NpcAgent::new("npc".into(), "TEAM_A".into(), skill, 0.7);
        let mut decisions = Vec::new();
        for _ in 0..2 {
            let mut strategy = build_strategy(&agent, &inventory);
            let mut rng = DeterministicRng::new(4242);
            let mut ctx = StrategyContext {
                team_id: "TEAM_A",
                inventory: &inventory,
                funds: 5_000.0,
                shadow: Some(&shadows),
                plan: Some(&plan),
                listings: &listings,
                negotiations: &[],
                pass: 3,
                rng: &mut rng,
            };
            decisions.push(strategy.decide_trade(&mut ctx));
        }
        assert_eq!(
            decisions[0], decisions[1],
            "{:?} must be deterministic under a fixed seed",
            skill
        );
    }
}
