//! Stage-dependent allocation of daily assimilate and organ-count updates.
//!
//! [`partition_biomass`] is the only place organ pools grow. Total biomass
//! is recomputed from the pools after every allocation, so it can never
//! drift from their sum.

use strawgro_types::{CultivarParams, ModelParameters, PlantState, SoilProperties, Stage};

/// SLA multiplier once the canopy begins to senesce during fruit fill.
const SENESCENT_SLA_FACTOR: f64 = 0.8;

/// Daily compounding crown growth rate while branching.
const CROWN_GROWTH_RATE: f64 = 0.02;

/// Runners produced per crown per day during vegetative growth.
const RUNNERS_PER_CROWN: f64 = 0.1;

/// Fraction of the potential fruit load initiated per day while flowering.
const FLOWERING_FRUIT_RATE: f64 = 0.1;

/// Fraction of the potential fruit load initiated per day during fruit set.
const FRUIT_SET_FRUIT_RATE: f64 = 0.2;

// ---------------------------------------------------------------------------
// Partition table
// ---------------------------------------------------------------------------

/// Share of daily assimilate sent to each organ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartitionFractions {
    /// Root share.
    pub root: f64,
    /// Leaf share.
    pub leaf: f64,
    /// Stem share.
    pub stem: f64,
    /// Fruit share.
    pub fruit: f64,
}

impl PartitionFractions {
    /// Allocation table for a stage. Fractions sum to 1 except in
    /// senescence, where nothing is allocated.
    pub const fn for_stage(stage: Stage) -> Self {
        let (root, leaf, stem, fruit) = match stage {
            Stage::Germination | Stage::Emergence | Stage::Juvenile => (0.40, 0.40, 0.20, 0.00),
            Stage::Vegetative | Stage::FloralInduction => (0.20, 0.50, 0.30, 0.00),
            Stage::Flowering => (0.10, 0.40, 0.30, 0.20),
            Stage::FruitSet | Stage::FruitDevelopment => (0.05, 0.25, 0.20, 0.50),
            Stage::FruitMaturity => (0.00, 0.10, 0.10, 0.80),
            Stage::Senescence => (0.00, 0.00, 0.00, 0.00),
        };
        Self {
            root,
            leaf,
            stem,
            fruit,
        }
    }

    /// Sum of the four shares.
    pub const fn total(&self) -> f64 {
        self.root + self.leaf + self.stem + self.fruit
    }
}

// ---------------------------------------------------------------------------
// Biomass allocation
// ---------------------------------------------------------------------------

/// Allocate `daily_biomass` (g/plant) to the organ pools for the current
/// stage, then derive total biomass, LAI and root depth.
///
/// Negative input is treated as zero. Root depth only deepens, and only
/// while it is below the soil maximum.
pub fn partition_biomass(
    state: &mut PlantState,
    daily_biomass: f64,
    cultivar: &CultivarParams,
    soil: &SoilProperties,
    model: &ModelParameters,
) -> PartitionFractions {
    let fractions = PartitionFractions::for_stage(state.stage);
    let daily = daily_biomass.max(0.0);

    state.root_biomass += daily * fractions.root;
    state.leaf_biomass += daily * fractions.leaf;
    state.stem_biomass += daily * fractions.stem;
    state.fruit_biomass += daily * fractions.fruit;
    state.biomass = state.organ_total();

    let sla = if state.stage >= Stage::FruitDevelopment {
        cultivar.sla * SENESCENT_SLA_FACTOR
    } else {
        cultivar.sla
    };
    state.leaf_area_index = state.leaf_biomass * sla;

    if state.root_depth < soil.max_root_depth {
        let deeper = model.max_root_growth_rate.mul_add(fractions.root, state.root_depth);
        state.root_depth = deeper.min(soil.max_root_depth);
    }

    fractions
}

// ---------------------------------------------------------------------------
// Organ counts
// ---------------------------------------------------------------------------

/// Add runners in proportion to the crown count during vegetative growth.
pub const fn update_runners(state: &mut PlantState) {
    if matches!(state.stage, Stage::Vegetative | Stage::FloralInduction) {
        state.runner_number += RUNNERS_PER_CROWN * state.crown_number;
    }
}

/// Compound crown branching while the plant is vegetative or flowering.
pub const fn update_crowns(state: &mut PlantState) {
    if matches!(
        state.stage,
        Stage::Vegetative | Stage::FloralInduction | Stage::Flowering
    ) {
        state.crown_number += CROWN_GROWTH_RATE * state.crown_number;
    }
}

/// Initiate fruit during flowering and fruit set. Fruit count never drops.
pub const fn update_fruits(state: &mut PlantState, cultivar: &CultivarParams) {
    let rate = match state.stage {
        Stage::Flowering => FLOWERING_FRUIT_RATE,
        Stage::FruitSet => FRUIT_SET_FRUIT_RATE,
        _ => return,
    };
    state.fruit_number += cultivar.potential_fruits_per_crown * state.crown_number * rate;
}
