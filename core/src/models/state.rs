//! Market state container
//!
//! [`MarketState`] owns every team, listing, and negotiation in a session.
//! All mutation flows through the exchange engine; the accessors here are
//! deliberately narrow so invariants (balanced trades, turn order) cannot be
//! bypassed by direct map access.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::chemical::Chemical;
use crate::models::listing::{Listing, ListingDirection};
use crate::models::negotiation::Negotiation;
use crate::models::team::Team;

/// Container for all teams, listings, and negotiations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketState {
    /// All teams, keyed by team id
    teams: HashMap<String, Team>,

    /// All listings ever created, keyed by listing id
    listings: HashMap<String, Listing>,

    /// All negotiations ever opened, keyed by negotiation id
    negotiations: HashMap<String, Negotiation>,
}

impl MarketState {
    /// Create a market populated with the given teams
    ///
    /// # Panics
    /// Panics if two teams share an id.
    pub fn new(teams: Vec<Team>) -> Self {
        let mut map = HashMap::with_capacity(teams.len());
        for team in teams {
            let id = team.id().to_string();
            assert!(
                map.insert(id.clone(), team).is_none(),
                "Duplicate team id: {}",
                id
            );
        }
        Self {
            teams: map,
            listings: HashMap::new(),
            negotiations: HashMap::new(),
        }
    }

    /// Get a team by id
    pub fn get_team(&self, team_id: &str) -> Option<&Team> {
        self.teams.get(team_id)
    }

    /// Get a mutable team by id
    pub fn get_team_mut(&mut self, team_id: &str) -> Option<&mut Team> {
        self.teams.get_mut(team_id)
    }

    /// Iterate all teams (unordered)
    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.values()
    }

    /// Number of teams
    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// Record a new listing
    ///
    /// # Panics
    /// Panics if the listing id is already present.
    pub fn create_listing(&mut self, listing: Listing) {
        let id = listing.id().to_string();
        assert!(
            self.listings.insert(id.clone(), listing).is_none(),
            "Duplicate listing id: {}",
            id
        );
    }

    /// Get a listing by id
    pub fn get_listing(&self, listing_id: &str) -> Option<&Listing> {
        self.listings.get(listing_id)
    }

    /// Close a listing; no-op if already closed or unknown
    pub fn close_listing(&mut self, listing_id: &str) {
        if let Some(listing) = self.listings.get_mut(listing_id) {
            listing.close();
        }
    }

    /// Open sell listings for a chemical, oldest first
    ///
    /// Sorted by (creation pass, id) so iteration order is deterministic
    /// regardless of map layout.
    pub fn open_sell_listings(&self, chemical: Chemical) -> Vec<&Listing> {
        self.open_listings(chemical, ListingDirection::Sell)
    }

    /// Open buy listings for a chemical, oldest first
    pub fn open_buy_listings(&self, chemical: Chemical) -> Vec<&Listing> {
        self.open_listings(chemical, ListingDirection::Buy)
    }

    fn open_listings(&self, chemical: Chemical, direction: ListingDirection) -> Vec<&Listing> {
        let mut found: Vec<&Listing> = self
            .listings
            .values()
            .filter(|l| l.is_open() && l.chemical() == chemical && l.direction() == direction)
            .collect();
        found.sort_by(|a, b| {
            a.created_pass()
                .cmp(&b.created_pass())
                .then_with(|| a.id().cmp(b.id()))
        });
        found
    }

    /// All open listings, oldest first
    pub fn all_open_listings(&self) -> Vec<&Listing> {
        let mut found: Vec<&Listing> = self.listings.values().filter(|l| l.is_open()).collect();
        found.sort_by(|a, b| {
            a.created_pass()
                .cmp(&b.created_pass())
                .then_with(|| a.id().cmp(b.id()))
        });
        found
    }

    /// Record a new negotiation
    ///
    /// # Panics
    /// Panics if the negotiation id is already present.
    pub fn add_negotiation(&mut self, negotiation: Negotiation) {
        let id = negotiation.id().to_string();
        assert!(
            self.negotiations.insert(id.clone(), negotiation).is_none(),
            "Duplicate negotiation id: {}",
            id
        );
    }

    /// Get a negotiation by id
    pub fn get_negotiation(&self, negotiation_id: &str) -> Option<&Negotiation> {
        self.negotiations.get(negotiation_id)
    }

    /// Get a mutable negotiation by id
    pub fn get_negotiation_mut(&mut self, negotiation_id: &str) -> Option<&mut Negotiation> {
        self.negotiations.get_mut(negotiation_id)
    }

    /// Pending negotiations `team_id` is a party to, oldest first
    pub fn pending_negotiations_for(&self, team_id: &str) -> Vec<&Negotiation> {
        let mut found: Vec<&Negotiation> = self
            .negotiations
            .values()
            .filter(|n| n.is_pending() && n.is_party(team_id))
            .collect();
        found.sort_by(|a, b| {
            a.opened_pass()
                .cmp(&b.opened_pass())
                .then_with(|| a.id().cmp(b.id()))
        });
        found
    }

    /// Whether a pending negotiation already exists between two teams for a
    /// chemical, in either direction
    pub fn has_pending_between(&self, team_a: &str, team_b: &str, chemical: Chemical) -> bool {
        self.negotiations.values().any(|n| {
            n.is_pending()
                && n.chemical() == chemical
                && n.is_party(team_a)
                && n.is_party(team_b)
        })
    }

    /// Sum of funds across all teams
    ///
    /// Trades transfer funds between parties, so this is conserved by the
    /// exchange engine.
    pub fn total_funds(&self) -> f64 {
        self.teams.values().map(|t| t.funds()).sum()
    }

    /// Sum of one chemical's quantity across all team inventories
    pub fn total_quantity(&self, chemical: Chemical) -> f64 {
        self.teams.values().map(|t| t.inventory().get(chemical)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::Inventory;

    fn market() -> MarketState {
        MarketState::new(vec![
            Team::new("TEAM_A".to_string(), Inventory::uniform(1000.0), 10_000.0),
            Team::new("TEAM_B".to_string(), Inventory::uniform(500.0), 5_000.0),
        ])
    }

    #[test]
    #[should_panic(expected = "Duplicate team id")]
    fn test_duplicate_team_panics() {
        MarketState::new(vec![
            Team::new("TEAM_A".to_string(), Inventory::empty(), 0.0),
            Team::new("TEAM_A".to_string(), Inventory::empty(), 0.0),
        ]);
    }

    #[test]
    fn test_listing_filters_and_order() {
        let mut market = market();
        let sell_old = Listing::new(
            "TEAM_A".to_string(),
            Chemical::C,
            ListingDirection::Sell,
            Some(100.0),
            Some(4.0),
            1,
        );
        let sell_new = Listing::new(
            "TEAM_B".to_string(),
            Chemical::C,
            ListingDirection::Sell,
            Some(50.0),
            Some(4.5),
            3,
        );
        let buy = Listing::new(
            "TEAM_B".to_string(),
            Chemical::N,
            ListingDirection::Buy,
            None,
            Some(6.0),
            2,
        );
        let sell_old_id = sell_old.id().to_string();
        market.create_listing(sell_new);
        market.create_listing(sell_old);
        market.create_listing(buy);

        let sells = market.open_sell_listings(Chemical::C);
        assert_eq!(sells.len(), 2);
        assert_eq!(sells[0].id(), sell_old_id); // oldest first
        assert_eq!(market.open_buy_listings(Chemical::N).len(), 1);
        assert!(market.open_sell_listings(Chemical::Q).is_empty());

        market.close_listing(&sell_old_id);
        assert_eq!(market.open_sell_listings(Chemical::C).len(), 1);
    }

    #[test]
    fn test_pending_between_is_order_insensitive() {
        use crate::models::negotiation::{NegotiationType, Offer};

        let mut market = market();
        market.add_negotiation(Negotiation::new(
            "TEAM_B".to_string(),
            "TEAM_A".to_string(),
            Chemical::D,
            NegotiationType::Buy,
            Offer {
                quantity: 10.0,
                price: 2.0,
                proposed_by: "TEAM_B".to_string(),
            },
            None,
            0,
        ));
        assert!(market.has_pending_between("TEAM_A", "TEAM_B", Chemical::D));
        assert!(market.has_pending_between("TEAM_B", "TEAM_A", Chemical::D));
        assert!(!market.has_pending_between("TEAM_A", "TEAM_B", Chemical::C));
    }

    #[test]
    fn test_totals() {
        let market = market();
        assert!((market.total_funds() - 15_000.0).abs() < 1e-9);
        assert!((market.total_quantity(Chemical::C) - 1500.0).abs() < 1e-9);
    }
}
