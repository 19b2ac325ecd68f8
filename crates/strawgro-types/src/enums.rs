//! Enumeration types for the Strawgro model.
//!
//! [`Stage`] replaces a string-keyed stage list with an ordered enum carrying
//! its own thermal-time threshold and successor, so "next stage" is a total
//! function and stage comparisons are ordinal.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Phenological stage
// ---------------------------------------------------------------------------

/// A discrete, ordered developmental state of the strawberry plant.
///
/// Variants are declared in developmental order, so the derived `Ord`
/// matches phenological progression. Each stage is entered once the
/// accumulated thermal time reaches its [`threshold`](Self::threshold).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// Planting until the first shoots appear (0 degree-days).
    Germination,
    /// Shoots visible above the soil (50 degree-days).
    Emergence,
    /// Young plant establishing its first leaves (100 degree-days).
    Juvenile,
    /// Vigorous leaf, crown, and runner growth (200 degree-days).
    Vegetative,
    /// Flower buds initiated in the crowns (400 degree-days).
    FloralInduction,
    /// Open flowers; fruit initiation begins (600 degree-days).
    Flowering,
    /// Fertilised flowers setting fruit (700 degree-days).
    FruitSet,
    /// Fruit enlargement (800 degree-days).
    FruitDevelopment,
    /// Fruit ripening (1000 degree-days).
    FruitMaturity,
    /// End of the cycle; terminal (1500 degree-days).
    Senescence,
}

impl Stage {
    /// Every stage in developmental order.
    pub const ALL: [Self; 10] = [
        Self::Germination,
        Self::Emergence,
        Self::Juvenile,
        Self::Vegetative,
        Self::FloralInduction,
        Self::Flowering,
        Self::FruitSet,
        Self::FruitDevelopment,
        Self::FruitMaturity,
        Self::Senescence,
    ];

    /// Cumulative thermal time (degree-days) at which this stage begins.
    pub const fn threshold(self) -> f64 {
        match self {
            Self::Germination => 0.0,
            Self::Emergence => 50.0,
            Self::Juvenile => 100.0,
            Self::Vegetative => 200.0,
            Self::FloralInduction => 400.0,
            Self::Flowering => 600.0,
            Self::FruitSet => 700.0,
            Self::FruitDevelopment => 800.0,
            Self::FruitMaturity => 1000.0,
            Self::Senescence => 1500.0,
        }
    }

    /// The immediately following stage, or `None` for [`Stage::Senescence`].
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Germination => Some(Self::Emergence),
            Self::Emergence => Some(Self::Juvenile),
            Self::Juvenile => Some(Self::Vegetative),
            Self::Vegetative => Some(Self::FloralInduction),
            Self::FloralInduction => Some(Self::Flowering),
            Self::Flowering => Some(Self::FruitSet),
            Self::FruitSet => Some(Self::FruitDevelopment),
            Self::FruitDevelopment => Some(Self::FruitMaturity),
            Self::FruitMaturity => Some(Self::Senescence),
            Self::Senescence => None,
        }
    }

    /// Successor relation as a total function: the terminal stage maps to itself.
    pub const fn successor(self) -> Self {
        match self.next() {
            Some(next) => next,
            None => self,
        }
    }

    /// Whether no further transitions are possible.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Senescence)
    }

    /// Zero-based position in developmental order.
    pub const fn index(self) -> u8 {
        match self {
            Self::Germination => 0,
            Self::Emergence => 1,
            Self::Juvenile => 2,
            Self::Vegetative => 3,
            Self::FloralInduction => 4,
            Self::Flowering => 5,
            Self::FruitSet => 6,
            Self::FruitDevelopment => 7,
            Self::FruitMaturity => 8,
            Self::Senescence => 9,
        }
    }

    /// Upper-case label used in result tables (e.g. `FRUIT_SET`).
    pub const fn label(self) -> &'static str {
        match self {
            Self::Germination => "GERMINATION",
            Self::Emergence => "EMERGENCE",
            Self::Juvenile => "JUVENILE",
            Self::Vegetative => "VEGETATIVE",
            Self::FloralInduction => "FLORAL_INDUCTION",
            Self::Flowering => "FLOWERING",
            Self::FruitSet => "FRUIT_SET",
            Self::FruitDevelopment => "FRUIT_DEVELOPMENT",
            Self::FruitMaturity => "FRUIT_MATURITY",
            Self::Senescence => "SENESCENCE",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Transpiration method
// ---------------------------------------------------------------------------

/// Which transpiration formula the engine applies each day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranspirationMethod {
    /// Hargreaves reference ET scaled by a canopy crop coefficient.
    #[default]
    Hargreaves,
    /// Hargreaves estimate multiplied by a clamped wind-speed modifier.
    WindAdjusted,
}
