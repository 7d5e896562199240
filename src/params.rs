//! Input parameter set: defaults, JSON presets and validation

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigWarning, LayoutError};
use crate::models::Material;

/// Operational floor for the depth of any lot or pile (m)
pub const MIN_LOT_DEPTH: f64 = 4.5;

const SHARE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    /// Single outer aisle, lots and storage stacked along the length
    OneAisle,
    /// Two aisles around a central storage strip, drying on both wings
    TwoAisle,
}

/// Where a pile narrower than its wing is pushed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Alignment {
    /// Against the aisle, empty space toward the wall
    AisleSide,
    /// Against the wall, empty space toward the aisle
    WallSide,
}

/// Monthly throughput scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Scenario {
    #[serde(rename = "3000")]
    #[value(name = "3000")]
    Reduced,
    #[serde(rename = "6000")]
    #[value(name = "6000")]
    Full,
}

impl Scenario {
    pub fn monthly_tonnage(self) -> f64 {
        match self {
            Scenario::Reduced => 3000.0,
            Scenario::Full => 6000.0,
        }
    }

    /// Days of flow held as storage buffer; the smaller volume keeps a longer buffer
    pub fn storage_days(self) -> f64 {
        match self {
            Scenario::Reduced => 15.0,
            Scenario::Full => 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Building {
    pub width: f64,
    pub length: f64,
}

impl Default for Building {
    fn default() -> Self {
        Self {
            width: 75.0,
            length: 57.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneParams {
    pub aisle_width: f64,
    /// Central storage strip (two-aisle layout only)
    pub central_storage_width: f64,
    pub safety_margin: f64,
    /// Vehicle passage splitting each drying lot (two-aisle layout only)
    pub vehicle_passage: f64,
    /// Optional cap on pile width (one-aisle layout only)
    pub usable_width: Option<f64>,
}

impl Default for ZoneParams {
    fn default() -> Self {
        Self {
            aisle_width: 10.0,
            central_storage_width: 16.0,
            safety_margin: 0.0,
            vehicle_passage: 0.0,
            usable_width: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessParams {
    pub drying_height: f64,
    pub storage_height: f64,
    /// Heap fill ratio for storage piles, in (0, 1]
    pub shape_coefficient: f64,
    pub min_depth: f64,
}

impl Default for ProcessParams {
    fn default() -> Self {
        Self {
            drying_height: 0.4,
            storage_height: 7.0,
            shape_coefficient: 0.5,
            min_depth: MIN_LOT_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spacing {
    pub inter_lot: f64,
    pub inter_material: f64,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            inter_lot: 0.5,
            inter_material: 0.3,
        }
    }
}

/// Two materials sharing one row: `left` dries on the left wing only,
/// `right` on the right wing, each storing in half of the central strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WingPair {
    pub left: String,
    pub right: String,
}

impl WingPair {
    pub fn new(left: &str, right: &str) -> Self {
        Self {
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    /// Parse `Left,Right`
    pub fn parse(spec: &str) -> Result<Self, LayoutError> {
        match spec.split_once(',') {
            Some((left, right)) if !left.trim().is_empty() && !right.trim().is_empty() => {
                Ok(Self::new(left.trim(), right.trim()))
            }
            _ => Err(LayoutError::InvalidPair(spec.to_string())),
        }
    }
}

/// Complete input of one layout computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    pub layout: LayoutMode,
    pub alignment: Alignment,
    pub scenario: Scenario,
    pub working_days: u32,
    pub recipe: Vec<Material>,
    pub building: Building,
    pub zones: ZoneParams,
    pub process: ProcessParams,
    pub spacing: Spacing,
    pub pairs: Vec<WingPair>,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            layout: LayoutMode::TwoAisle,
            alignment: Alignment::AisleSide,
            scenario: Scenario::Full,
            working_days: 20,
            recipe: vec![
                Material::new("Rebuts PAM", 18.0, 1.5, "#ff9933"),
                Material::new("Fontes Foug", 15.0, 1.0, "#ffcc66"),
                Material::new("Jets Blénod", 37.0, 1.0, "#0a82d3"),
                Material::new("Gueuset", 0.0, 1.0, "#aaaaaa"),
                Material::new("Ferraille", 30.0, 1.25, "#da1884"),
            ],
            building: Building::default(),
            zones: ZoneParams::default(),
            process: ProcessParams::default(),
            spacing: Spacing::default(),
            pairs: vec![WingPair::new("Rebuts PAM", "Fontes Foug")],
        }
    }
}

impl LayoutParams {
    /// Load a JSON preset; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn total_share(&self) -> f64 {
        self.recipe.iter().map(|m| m.share_pct).sum()
    }

    /// Reject inputs that would make the computation meaningless and
    /// return the advisory warnings for the rest.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, LayoutError> {
        positive("building width", self.building.width)?;
        positive("building length", self.building.length)?;
        positive("drying height", self.process.drying_height)?;
        positive("storage height", self.process.storage_height)?;
        positive("minimum depth", self.process.min_depth)?;

        let shape = self.process.shape_coefficient;
        if !(shape > 0.0 && shape <= 1.0) {
            return Err(LayoutError::InvalidShapeCoefficient(shape));
        }
        if self.working_days == 0 {
            return Err(LayoutError::NoWorkingDays);
        }

        non_negative("aisle width", self.zones.aisle_width)?;
        match self.layout {
            LayoutMode::TwoAisle => {
                positive("central storage width", self.zones.central_storage_width)?
            }
            LayoutMode::OneAisle => {
                non_negative("central storage width", self.zones.central_storage_width)?
            }
        }
        non_negative("safety margin", self.zones.safety_margin)?;
        non_negative("vehicle passage", self.zones.vehicle_passage)?;
        non_negative("inter-lot gap", self.spacing.inter_lot)?;
        non_negative("inter-material gap", self.spacing.inter_material)?;
        if let Some(usable) = self.zones.usable_width {
            positive("usable width", usable)?;
        }

        let mut seen = HashSet::new();
        for material in &self.recipe {
            if !seen.insert(material.name.as_str()) {
                return Err(LayoutError::DuplicateMaterial(material.name.clone()));
            }
            if !(0.0..=100.0).contains(&material.share_pct) {
                return Err(LayoutError::InvalidShare {
                    material: material.name.clone(),
                    share: material.share_pct,
                });
            }
            if material.is_active() && material.density <= 0.0 {
                return Err(LayoutError::InvalidDensity {
                    material: material.name.clone(),
                    density: material.density,
                });
            }
        }

        let mut warnings = Vec::new();
        let total = self.total_share();
        if (total - 100.0).abs() > SHARE_TOLERANCE {
            warnings.push(ConfigWarning::RecipeTotal { total });
        }
        Ok(warnings)
    }
}

fn positive(what: &'static str, value: f64) -> Result<(), LayoutError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::NonPositive { what, value })
    }
}

fn non_negative(what: &'static str, value: f64) -> Result<(), LayoutError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::Negative { what, value })
    }
}
