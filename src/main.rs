//! Warehouse layout calculator
//!
//! Command-line front end: builds the parameter set from a preset and flags,
//! runs the layout computation and prints the result.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use warehouse_layout::calculator::{self, format_placements};
use warehouse_layout::recipe::{self, RecipeFlux};
use warehouse_layout::{zones, Alignment, LayoutMode, LayoutParams, Scenario, WingPair};

#[derive(Parser)]
#[command(name = "warehouse-layout", version)]
#[command(about = "Floor-plan calculator for drying and storage piles")]
struct Cli {
    /// JSON preset with layout parameters (defaults when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit output as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the layout and report areas and the length check
    Plan {
        #[command(flatten)]
        overrides: Overrides,

        /// List every placed rectangle
        #[arg(short, long)]
        detailed: bool,
    },

    /// Show how the building width is split into aisles, strip and wings
    Zones {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// List the recipe with daily flows
    Materials {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print the default parameters as a JSON preset
    Sample,
}

/// Per-field overrides applied on top of the preset
#[derive(Args)]
struct Overrides {
    #[arg(long, value_enum)]
    layout: Option<LayoutMode>,

    #[arg(long, value_enum)]
    alignment: Option<Alignment>,

    /// Monthly volume in tonnes
    #[arg(long, value_enum)]
    scenario: Option<Scenario>,

    #[arg(long)]
    working_days: Option<u32>,

    /// Building width (m)
    #[arg(long)]
    width: Option<f64>,

    /// Building length (m)
    #[arg(long)]
    length: Option<f64>,

    #[arg(long)]
    aisle_width: Option<f64>,

    /// Central storage strip width (two-aisle layout)
    #[arg(long)]
    storage_width: Option<f64>,

    #[arg(long)]
    margin: Option<f64>,

    /// Vehicle passage inside each drying lot (two-aisle layout)
    #[arg(long)]
    passage: Option<f64>,

    /// Cap on pile width (one-aisle layout)
    #[arg(long)]
    usable_width: Option<f64>,

    #[arg(long)]
    drying_height: Option<f64>,

    #[arg(long)]
    storage_height: Option<f64>,

    /// Storage heap fill ratio, in (0, 1]
    #[arg(long)]
    shape: Option<f64>,

    #[arg(long)]
    min_depth: Option<f64>,

    /// Gap between the lots of one material (m)
    #[arg(long)]
    lot_gap: Option<f64>,

    /// Gap between materials (m)
    #[arg(long)]
    material_gap: Option<f64>,

    /// Replace the recipe: "Name=share@density[#rrggbb]", repeatable
    #[arg(long = "material", value_name = "SPEC")]
    materials: Vec<String>,

    /// Add a wing pair: "Left,Right", repeatable
    #[arg(long = "pair", value_name = "LEFT,RIGHT")]
    pairs: Vec<String>,

    /// Drop the wing pairs of the preset
    #[arg(long)]
    no_pairs: bool,
}

impl Overrides {
    fn apply(self, params: &mut LayoutParams) -> Result<()> {
        if let Some(v) = self.layout {
            params.layout = v;
        }
        if let Some(v) = self.alignment {
            params.alignment = v;
        }
        if let Some(v) = self.scenario {
            params.scenario = v;
        }
        if let Some(v) = self.working_days {
            params.working_days = v;
        }
        if let Some(v) = self.width {
            params.building.width = v;
        }
        if let Some(v) = self.length {
            params.building.length = v;
        }
        if let Some(v) = self.aisle_width {
            params.zones.aisle_width = v;
        }
        if let Some(v) = self.storage_width {
            params.zones.central_storage_width = v;
        }
        if let Some(v) = self.margin {
            params.zones.safety_margin = v;
        }
        if let Some(v) = self.passage {
            params.zones.vehicle_passage = v;
        }
        if self.usable_width.is_some() {
            params.zones.usable_width = self.usable_width;
        }
        if let Some(v) = self.drying_height {
            params.process.drying_height = v;
        }
        if let Some(v) = self.storage_height {
            params.process.storage_height = v;
        }
        if let Some(v) = self.shape {
            params.process.shape_coefficient = v;
        }
        if let Some(v) = self.min_depth {
            params.process.min_depth = v;
        }
        if let Some(v) = self.lot_gap {
            params.spacing.inter_lot = v;
        }
        if let Some(v) = self.material_gap {
            params.spacing.inter_material = v;
        }

        if !self.materials.is_empty() {
            params.recipe = self
                .materials
                .iter()
                .enumerate()
                .map(|(i, spec)| recipe::parse_material_spec(spec, i))
                .collect::<Result<_, _>>()?;
        }
        if self.no_pairs {
            params.pairs.clear();
        }
        for spec in &self.pairs {
            params.pairs.push(WingPair::parse(spec)?);
        }

        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log to stderr unless --json; --verbose enables debug; RUST_LOG overrides
    if !cli.json {
        let level = if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_module("warehouse_layout", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_target(false)
            .init();
    }

    let mut params = match &cli.config {
        Some(path) => LayoutParams::load(path)?,
        None => LayoutParams::default(),
    };

    match cli.command {
        Commands::Plan {
            overrides,
            detailed,
        } => {
            overrides.apply(&mut params)?;
            let plan = calculator::calculate_layout(&params)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                if detailed {
                    println!("Placements:\n");
                    println!("{}", format_placements(&plan));
                }
                println!("{}", plan);
            }
        }

        Commands::Zones { overrides } => {
            overrides.apply(&mut params)?;
            params.validate()?;
            let zones = zones::partition(&params);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&zones)?);
            } else {
                println!("{:<14} {:>10} {:>10}", "Zone", "From (m)", "Width (m)");
                println!("{}", "-".repeat(36));
                for (i, wing) in zones.wings.iter().enumerate() {
                    println!("{:<14} {:>10.2} {:>10.2}", format!("Wing {}", i + 1), wing.start, wing.width);
                }
                for (i, aisle) in zones.aisles.iter().enumerate() {
                    println!("{:<14} {:>10.2} {:>10.2}", format!("Aisle {}", i + 1), aisle.start, aisle.width);
                }
                if let Some(strip) = zones.storage_strip {
                    println!("{:<14} {:>10.2} {:>10.2}", "Storage strip", strip.start, strip.width);
                }
                println!();
                match zones.warning() {
                    Some(warning) => println!("{}", warning),
                    None => println!("Max pile width per wing: {:.2} m", zones.max_pile_width),
                }
            }
        }

        Commands::Materials { overrides } => {
            overrides.apply(&mut params)?;
            let flux = RecipeFlux::new(&params.recipe, params.scenario, params.working_days)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&params.recipe)?);
            } else {
                println!("Daily flux: {:.0} t/day", flux.daily_tonnage());
                println!();
                println!("{:<20} {:>8} {:>10} {:>10}", "Material", "Share %", "Density", "t/day");
                println!("{}", "-".repeat(51));
                for material in &params.recipe {
                    let daily = flux.get(&material.name).map_or(0.0, |f| f.daily_flow);
                    println!(
                        "{:<20} {:>8.1} {:>10.2} {:>10.1}",
                        material.name, material.share_pct, material.density, daily
                    );
                }
                let total = flux.total_share();
                if (total - 100.0).abs() > 1e-6 {
                    println!("\nRecipe total = {}%", total);
                }
            }
        }

        Commands::Sample => {
            println!("{}", LayoutParams::default().to_json()?);
        }
    }

    Ok(())
}
