//! Data models for materials, piles and placed floor-plan geometry

use serde::{Deserialize, Serialize};

use crate::error::ConfigWarning;
use crate::params::LayoutMode;
use crate::zones::Zones;

/// Number of daily drying lots held per material (3-day rotation)
pub const DRYING_LOTS: u8 = 3;

/// One entry of the recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub share_pct: f64, // 0-100
    pub density: f64,   // t/m³
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    "#999999".to_string()
}

impl Material {
    pub fn new(name: &str, share_pct: f64, density: f64, color: &str) -> Self {
        Self {
            name: name.to_string(),
            share_pct,
            density,
            color: color.to_string(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.share_pct > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlacementMode {
    /// Full available width, depth follows from the area
    Full,
    /// Depth pinned to the minimum, width reduced
    Adapted,
}

/// Solved footprint of one pile or one drying lot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PileSpec {
    pub area: f64,
    pub width: f64,
    pub depth: f64,
    pub mode: PlacementMode,
}

/// Drying geometry of one material.
///
/// `lot` covers the mats of a single lot; in the two-aisle layout the mats
/// are split in two layers around a vehicle passage of depth `passage`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DryingSpec {
    /// Whole 3-day drying footprint, both wings together
    pub total_area: f64,
    /// Wings the lots are spread over (1 or 2)
    pub sides: u32,
    pub lot: PileSpec,
    pub passage: f64,
}

impl DryingSpec {
    /// Depth of one lot along the building length, passage included
    pub fn lot_depth(&self) -> f64 {
        self.lot.depth + self.passage
    }

    /// Extent of the three lots and the gaps between them
    pub fn block_extent(&self, inter_lot_gap: f64) -> f64 {
        let lots = f64::from(DRYING_LOTS);
        lots * self.lot_depth() + (lots - 1.0) * inter_lot_gap
    }
}

/// Result of sizing one material, before any placement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialSizing {
    pub name: String,
    pub color: String,
    pub share_pct: f64,
    pub daily_flow: f64, // t/day
    pub drying: DryingSpec,
    pub storage: PileSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlacementKind {
    /// Whole drying lot, no passage
    DryingLot { lot: u8 },
    /// One of the two mat layers of a lot split by a passage
    DryingLayer { lot: u8, layer: u8 },
    /// Vehicle passage between the two layers of a lot
    Passage { lot: u8 },
    Storage,
}

/// A rectangle on the floor plan. `x` runs across the building width,
/// `y` along its length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub material: String,
    pub color: String,
    pub kind: PlacementKind,
    pub side: Side,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub depth: f64,
    pub mode: PlacementMode,
    /// Far edge lies past the building length
    pub overflow: bool,
}

impl Placement {
    pub fn far_edge(&self) -> f64 {
        self.y + self.depth
    }
}

/// One material's full extent along the building length
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutBlock {
    pub sizing: MaterialSizing,
    /// Cursor position the block's row starts at
    pub start: f64,
    pub drying_extent: f64,
    pub storage_extent: f64,
    /// Length the row consumes
    pub extent: f64,
    pub placements: Vec<Placement>,
}

impl LayoutBlock {
    pub fn overflow(&self) -> bool {
        self.placements.iter().any(|p| p.overflow)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AreaTotals {
    pub drying: f64,
    pub storage: f64,
    pub aisles: f64,
    pub building: f64,
}

impl AreaTotals {
    /// Drying, storage and circulation together
    pub fn useful(&self) -> f64 {
        self.drying + self.storage + self.aisles
    }
}

/// Everything the rendering layer needs to draw the floor plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutPlan {
    pub layout: LayoutMode,
    pub daily_tonnage: f64,
    pub building_width: f64,
    pub building_length: f64,
    pub zones: Zones,
    pub blocks: Vec<LayoutBlock>,
    pub totals: AreaTotals,
    /// Final cursor position (no trailing inter-material gap)
    pub used_length: f64,
    pub overflow: bool,
    pub warnings: Vec<ConfigWarning>,
}

impl LayoutPlan {
    /// Length missing past the building end; negative means slack
    pub fn overrun(&self) -> f64 {
        self.used_length - self.building_length
    }

    pub fn block(&self, material: &str) -> Option<&LayoutBlock> {
        self.blocks.iter().find(|b| b.sizing.name == material)
    }

    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.blocks.iter().flat_map(|b| b.placements.iter())
    }
}
