//! Chemical and product identifiers
//!
//! The simulation trades four raw chemicals (C, N, D, Q) which teams
//! convert into two finished products (Deicer, Solvent) under a fixed
//! linear recipe. Recipe coefficients live in the solver module; this
//! module only defines the identifiers.

use serde::{Deserialize, Serialize};

/// Raw chemical identifier
///
/// Quantities are measured in gallons throughout the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Chemical {
    C,
    N,
    D,
    Q,
}

impl Chemical {
    /// All chemicals, in canonical order
    ///
    /// Strategies and the solver iterate this array instead of a map so
    /// that decision order is deterministic.
    pub const ALL: [Chemical; 4] = [Chemical::C, Chemical::N, Chemical::D, Chemical::Q];

    /// Short identifier string ("C", "N", "D", "Q")
    pub fn as_str(&self) -> &'static str {
        match self {
            Chemical::C => "C",
            Chemical::N => "N",
            Chemical::D => "D",
            Chemical::Q => "Q",
        }
    }
}

impl std::fmt::Display for Chemical {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finished product identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Product {
    Deicer,
    Solvent,
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Product::Deicer => f.write_str("Deicer"),
            Product::Solvent => f.write_str("Solvent"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_has_canonical_order() {
        assert_eq!(Chemical::ALL.len(), 4);
        assert_eq!(Chemical::ALL[0], Chemical::C);
        assert_eq!(Chemical::ALL[3], Chemical::Q);
    }

    #[test]
    fn test_display() {
        assert_eq!(Chemical::N.to_string(), "N");
        assert_eq!(Product::Solvent.to_string(), "Solvent");
    }
}
