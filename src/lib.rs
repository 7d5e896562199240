//! Warehouse layout calculator
//!
//! Sizes drying lots and storage piles for a monthly throughput and a
//! material recipe, then places them along the length of a building laid
//! out with one or two circulation aisles. The result is a list of placed
//! rectangles plus area totals and an overflow verdict; drawing is left to
//! the caller.

pub mod calculator;
pub mod error;
pub mod models;
pub mod packer;
pub mod params;
pub mod recipe;
pub mod zones;

pub use calculator::calculate_layout;
pub use error::{ConfigWarning, LayoutError};
pub use models::{LayoutBlock, LayoutPlan, Material, Placement, PlacementMode};
pub use params::{Alignment, LayoutMode, LayoutParams, Scenario, WingPair};
