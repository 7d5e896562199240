//! Recipe and daily flux model
//!
//! Turns the monthly scenario into a daily tonnage and splits it across the
//! recipe. Also parses material specs given on the command line.

use regex::Regex;

use crate::error::LayoutError;
use crate::models::Material;
use crate::params::Scenario;

/// Colours handed out to materials given without one
const PALETTE: [&str; 6] = [
    "#ff9933", "#ffcc66", "#0a82d3", "#aaaaaa", "#da1884", "#4caf50",
];

/// Daily mass flow of one material
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialFlow {
    pub material: Material,
    pub daily_flow: f64, // t/day
}

/// The recipe resolved against a daily tonnage
#[derive(Debug, Clone)]
pub struct RecipeFlux {
    daily_tonnage: f64,
    flows: Vec<MaterialFlow>,
}

impl RecipeFlux {
    pub fn new(
        recipe: &[Material],
        scenario: Scenario,
        working_days: u32,
    ) -> Result<Self, LayoutError> {
        let daily_tonnage = daily_tonnage(scenario, working_days)?;
        let flows = recipe
            .iter()
            .map(|material| MaterialFlow {
                material: material.clone(),
                daily_flow: daily_tonnage * material.share_pct / 100.0,
            })
            .collect();

        Ok(Self {
            daily_tonnage,
            flows,
        })
    }

    pub fn daily_tonnage(&self) -> f64 {
        self.daily_tonnage
    }

    /// Materials with a non-zero share, in recipe order
    pub fn active(&self) -> impl Iterator<Item = &MaterialFlow> {
        self.flows.iter().filter(|f| f.material.is_active())
    }

    pub fn get(&self, name: &str) -> Option<&MaterialFlow> {
        self.flows.iter().find(|f| f.material.name == name)
    }

    pub fn total_share(&self) -> f64 {
        self.flows.iter().map(|f| f.material.share_pct).sum()
    }
}

/// Monthly tonnage spread over the working days
pub fn daily_tonnage(scenario: Scenario, working_days: u32) -> Result<f64, LayoutError> {
    if working_days == 0 {
        return Err(LayoutError::NoWorkingDays);
    }
    Ok(scenario.monthly_tonnage() / f64::from(working_days))
}

/// Parse `Name=share@density[#rrggbb]`, e.g. `Ferraille=30@1.25#da1884`.
///
/// The share may carry a trailing `%`. Materials without a colour get one
/// from a fixed palette by `index`.
pub fn parse_material_spec(spec: &str, index: usize) -> Result<Material, LayoutError> {
    let re = Regex::new(
        r"^\s*([^=]+?)\s*=\s*(\d+(?:\.\d+)?)\s*%?\s*@\s*(\d+(?:\.\d+)?)\s*(#[0-9A-Fa-f]{6})?\s*$",
    )?;
    let cap = re
        .captures(spec)
        .ok_or_else(|| LayoutError::InvalidMaterialSpec(spec.to_string()))?;

    let share_pct = cap[2]
        .parse::<f64>()
        .map_err(|_| LayoutError::InvalidMaterialSpec(spec.to_string()))?;
    let density = cap[3]
        .parse::<f64>()
        .map_err(|_| LayoutError::InvalidMaterialSpec(spec.to_string()))?;
    let color = match cap.get(4) {
        Some(c) => c.as_str().to_lowercase(),
        None => PALETTE[index % PALETTE.len()].to_string(),
    };

    Ok(Material {
        name: cap[1].to_string(),
        share_pct,
        density,
        color,
    })
}
