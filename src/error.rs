//! Error and warning types for layout computation

use serde::Serialize;
use thiserror::Error;

/// Fatal configuration problems. A plan is not computed when one of these is returned.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("material '{material}' has non-positive density {density}")]
    InvalidDensity { material: String, density: f64 },

    #[error("material '{material}' has share {share}% outside 0-100")]
    InvalidShare { material: String, share: f64 },

    #[error("material '{0}' appears more than once in the recipe")]
    DuplicateMaterial(String),

    #[error("{what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f64 },

    #[error("{what} must not be negative, got {value}")]
    Negative { what: &'static str, value: f64 },

    #[error("shape coefficient must be in (0, 1], got {0}")]
    InvalidShapeCoefficient(f64),

    #[error("working days must be at least 1")]
    NoWorkingDays,

    /// A divisor reached the footprint converter as zero. Validation should have caught it.
    #[error("cannot convert volume to footprint: {what} is {value}")]
    DegenerateDivisor { what: &'static str, value: f64 },

    #[error("invalid material spec '{0}' (expected Name=share@density[#rrggbb])")]
    InvalidMaterialSpec(String),

    #[error("invalid pair '{0}' (expected Left,Right)")]
    InvalidPair(String),

    #[error(transparent)]
    Pattern(#[from] regex::Error),

    #[error("failed to read preset: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed preset: {0}")]
    Json(#[from] serde_json::Error),
}

/// Advisory conditions. The plan is still computed with best-effort values.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigWarning {
    #[error("recipe total is {total}% instead of 100%")]
    RecipeTotal { total: f64 },

    #[error("central zone too wide: only {available:.2} m left per wing")]
    NarrowWing { available: f64 },

    #[error("wing pair {left}/{right} ignored: the one-aisle layout has a single wing")]
    PairUnsupported { left: String, right: String },

    #[error("wing pair {left}/{right} ignored: '{missing}' is not in the recipe")]
    PairUnknownMember {
        left: String,
        right: String,
        missing: String,
    },

    #[error("wing pair {left}/{right} ignored: '{member}' already belongs to another pair")]
    PairOverlap {
        left: String,
        right: String,
        member: String,
    },
}
