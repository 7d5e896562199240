//! Layout calculator
//!
//! Converts daily flows into pile footprints, solves each footprint into
//! width x depth under the minimum-depth floor, and hands the sized
//! materials to the packer.

use std::collections::HashSet;

use log::{debug, info, warn};

use crate::error::{ConfigWarning, LayoutError};
use crate::models::{
    AreaTotals, DRYING_LOTS, DryingSpec, LayoutPlan, MaterialSizing, PileSpec, PlacementMode, Side,
};
use crate::packer::{Cursor, LayoutStrategy, Row, SizingLimits, WingShare, strategy_for};
use crate::params::{LayoutParams, WingPair};
use crate::recipe::{MaterialFlow, RecipeFlux};
use crate::zones;

/// Days a drying lot stays on the floor
pub const DRYING_DAYS: f64 = 3.0;

/// Thinnest mat layer kept when a passage eats into the lot depth
const MIN_MAT_DEPTH: f64 = 0.1;

/// Plan-view area of a pile holding `days` of flow.
///
/// `area = (flow × days / density) / (height × shape_coefficient)`
pub fn footprint_area(
    daily_flow: f64,
    days: f64,
    density: f64,
    height: f64,
    shape_coefficient: f64,
) -> Result<f64, LayoutError> {
    if density <= 0.0 {
        return Err(LayoutError::DegenerateDivisor {
            what: "density",
            value: density,
        });
    }
    if height <= 0.0 {
        return Err(LayoutError::DegenerateDivisor {
            what: "height",
            value: height,
        });
    }
    if shape_coefficient <= 0.0 {
        return Err(LayoutError::DegenerateDivisor {
            what: "shape coefficient",
            value: shape_coefficient,
        });
    }

    let volume = daily_flow * days / density;
    Ok(volume / (height * shape_coefficient))
}

/// Flat drying bed for the whole rotation; never uses the heap coefficient
pub fn drying_area(daily_flow: f64, density: f64, height: f64) -> Result<f64, LayoutError> {
    footprint_area(daily_flow, DRYING_DAYS, density, height, 1.0)
}

pub fn storage_area(
    daily_flow: f64,
    buffer_days: f64,
    density: f64,
    height: f64,
    shape_coefficient: f64,
) -> Result<f64, LayoutError> {
    footprint_area(daily_flow, buffer_days, density, height, shape_coefficient)
}

/// Fit `area` into at most `max_width`, keeping depth at or above `min_depth`.
///
/// Takes the full width when that leaves enough depth (ties included);
/// otherwise pins the depth to the floor and narrows the pile.
pub fn solve_dimensions(area: f64, max_width: f64, min_depth: f64) -> PileSpec {
    let depth_ideal = area / max_width;
    if max_width > 0.0 && depth_ideal >= min_depth {
        PileSpec {
            area,
            width: max_width,
            depth: depth_ideal,
            mode: PlacementMode::Full,
        }
    } else {
        PileSpec {
            area,
            width: area / min_depth,
            depth: min_depth,
            mode: PlacementMode::Adapted,
        }
    }
}

/// Solve one drying lot whose depth includes a vehicle passage.
///
/// The floor applies to mats plus passage; `lot.depth` holds the mats only.
fn solve_lot(area: f64, max_width: f64, min_depth: f64, passage: f64) -> PileSpec {
    let mat_floor = (min_depth - passage).max(MIN_MAT_DEPTH);
    solve_dimensions(area, max_width, mat_floor)
}

/// Size one material's drying lots and storage pile
pub fn size_material(
    flow: &MaterialFlow,
    limits: SizingLimits,
    params: &LayoutParams,
) -> Result<MaterialSizing, LayoutError> {
    let material = &flow.material;
    let process = &params.process;

    let drying_total = drying_area(flow.daily_flow, material.density, process.drying_height)?;
    let lot_area = drying_total / (f64::from(limits.sides) * f64::from(DRYING_LOTS));
    let lot = solve_lot(
        lot_area,
        limits.lot_max_width,
        process.min_depth,
        limits.passage,
    );

    let storage_total = storage_area(
        flow.daily_flow,
        params.scenario.storage_days(),
        material.density,
        process.storage_height,
        process.shape_coefficient,
    )?;
    let storage = solve_dimensions(storage_total, limits.storage_max_width, process.min_depth);

    debug!(
        "{}: {:.1} t/day, drying {:.0} m² ({:.2} x {:.2} per lot, {:?}), storage {:.0} m² ({:.2} x {:.2}, {:?})",
        material.name,
        flow.daily_flow,
        drying_total,
        lot.width,
        lot.depth,
        lot.mode,
        storage.area,
        storage.width,
        storage.depth,
        storage.mode
    );

    Ok(MaterialSizing {
        name: material.name.clone(),
        color: material.color.clone(),
        share_pct: material.share_pct,
        daily_flow: flow.daily_flow,
        drying: DryingSpec {
            total_area: drying_total,
            sides: limits.sides,
            lot,
            passage: limits.passage,
        },
        storage,
    })
}

/// Row arrangement decided before sizing
enum PlannedRow<'a> {
    Single(&'a MaterialFlow),
    Pair(&'a MaterialFlow, &'a MaterialFlow),
}

/// Apply the wing pairs to the active materials, keeping recipe order.
///
/// A pair row takes the position of its earlier member.
fn arrange_rows<'a>(
    flux: &'a RecipeFlux,
    pairs: &[WingPair],
    supports_pairs: bool,
    warnings: &mut Vec<ConfigWarning>,
) -> Vec<PlannedRow<'a>> {
    let mut paired: Vec<(&MaterialFlow, &MaterialFlow)> = Vec::new();
    let mut taken: HashSet<&str> = HashSet::new();

    for pair in pairs {
        if !supports_pairs {
            warnings.push(ConfigWarning::PairUnsupported {
                left: pair.left.clone(),
                right: pair.right.clone(),
            });
            continue;
        }

        let (left, right) = match (flux.get(&pair.left), flux.get(&pair.right)) {
            (Some(left), Some(right)) => (left, right),
            (left, _) => {
                let missing = if left.is_none() { &pair.left } else { &pair.right };
                warnings.push(ConfigWarning::PairUnknownMember {
                    left: pair.left.clone(),
                    right: pair.right.clone(),
                    missing: missing.clone(),
                });
                continue;
            }
        };

        // A pair only applies when both members are part of this run
        if !left.material.is_active() || !right.material.is_active() {
            debug!(
                "wing pair {}/{} inactive: a member has zero share",
                pair.left, pair.right
            );
            continue;
        }

        if let Some(member) = [&pair.left, &pair.right]
            .into_iter()
            .find(|m| taken.contains(m.as_str()) || pair.left == pair.right)
        {
            warnings.push(ConfigWarning::PairOverlap {
                left: pair.left.clone(),
                right: pair.right.clone(),
                member: member.clone(),
            });
            continue;
        }

        taken.insert(left.material.name.as_str());
        taken.insert(right.material.name.as_str());
        paired.push((left, right));
    }

    let mut rows = Vec::new();
    let mut emitted: HashSet<&str> = HashSet::new();
    for flow in flux.active() {
        let name = flow.material.name.as_str();
        if emitted.contains(name) {
            continue;
        }
        match paired
            .iter()
            .find(|(l, r)| l.material.name == name || r.material.name == name)
        {
            Some(&(left, right)) => {
                emitted.insert(left.material.name.as_str());
                emitted.insert(right.material.name.as_str());
                rows.push(PlannedRow::Pair(left, right));
            }
            None => {
                emitted.insert(name);
                rows.push(PlannedRow::Single(flow));
            }
        }
    }
    rows
}

fn size_row(
    planned: PlannedRow<'_>,
    strategy: &dyn LayoutStrategy,
    params: &LayoutParams,
) -> Result<Row, LayoutError> {
    match planned {
        PlannedRow::Single(flow) => Ok(Row::Single(size_material(
            flow,
            strategy.sizing_limits(WingShare::Split),
            params,
        )?)),
        PlannedRow::Pair(left, right) => Ok(Row::Pair {
            left: size_material(
                left,
                strategy.sizing_limits(WingShare::Exclusive(Side::Left)),
                params,
            )?,
            right: size_material(
                right,
                strategy.sizing_limits(WingShare::Exclusive(Side::Right)),
                params,
            )?,
        }),
    }
}

/// Compute the full layout from scratch.
///
/// Fatal configuration problems are returned as errors; advisory ones end
/// up in `LayoutPlan::warnings`. Overflow is part of the result.
pub fn calculate_layout(params: &LayoutParams) -> Result<LayoutPlan, LayoutError> {
    let mut warnings = params.validate()?;
    let flux = RecipeFlux::new(&params.recipe, params.scenario, params.working_days)?;

    let zones = zones::partition(params);
    warnings.extend(zones.warning());

    let strategy = strategy_for(params, &zones);
    let planned = arrange_rows(
        &flux,
        &params.pairs,
        strategy.supports_pairs(),
        &mut warnings,
    );

    let mut cursor = Cursor::new(params.spacing.inter_material);
    let mut blocks = Vec::new();
    for row in planned {
        let row = size_row(row, strategy.as_ref(), params)?;
        blocks.extend(strategy.pack_row(row, &mut cursor));
    }

    for warning in &warnings {
        warn!("{}", warning);
    }

    let length = params.building.length;
    let totals = AreaTotals {
        drying: blocks.iter().map(|b| b.sizing.drying.total_area).sum(),
        storage: blocks.iter().map(|b| b.sizing.storage.area).sum(),
        aisles: length * zones.aisle_width_total(),
        building: params.building.width * length,
    };
    let overflow = blocks.iter().any(|b| b.overflow());
    let used_length = cursor.position();

    if overflow {
        info!(
            "length exceeded: {:.1} m used of {:.1} m (+{:.1} m)",
            used_length,
            length,
            used_length - length
        );
    } else {
        info!(
            "length ok: {:.1} m used of {:.1} m ({:.1} m left)",
            used_length,
            length,
            length - used_length
        );
    }

    Ok(LayoutPlan {
        layout: strategy.mode(),
        daily_tonnage: flux.daily_tonnage(),
        building_width: params.building.width,
        building_length: length,
        zones,
        blocks,
        totals,
        used_length,
        overflow,
        warnings,
    })
}

/// Format every placed rectangle of a plan as a readable listing
pub fn format_placements(plan: &LayoutPlan) -> String {
    let mut output = String::new();

    for block in &plan.blocks {
        output.push_str(&format!(
            "{} (row {:.1} - {:.1} m)\n",
            block.sizing.name,
            block.start,
            block.start + block.extent
        ));
        for p in &block.placements {
            let flag = if p.overflow { "  OVERFLOW" } else { "" };
            output.push_str(&format!(
                "  {:<10} {:<18} x={:>6.2} y={:>6.2}  {:>5.2} x {:>5.2} m{}\n",
                format!("{:?}", p.side),
                format!("{:?}", p.kind),
                p.x,
                p.y,
                p.width,
                p.depth,
                flag
            ));
        }
    }

    output
}

impl std::fmt::Display for LayoutPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Layout Summary ===")?;
        writeln!(
            f,
            "Building: {:.1} x {:.1} m ({:?}), {:.0} t/day",
            self.building_width, self.building_length, self.layout, self.daily_tonnage
        )?;
        writeln!(f)?;

        writeln!(f, "Piles:")?;
        for block in &self.blocks {
            let s = &block.sizing;
            let lot = &s.drying.lot;
            writeln!(
                f,
                "  {:<14} lot {:>5.1} x {:>4.1} m {:<8} storage {:>5.1} x {:>5.1} m {:<8}",
                s.name,
                lot.width,
                s.drying.lot_depth(),
                format!("{:?}", lot.mode),
                s.storage.width,
                s.storage.depth,
                format!("{:?}", s.storage.mode),
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Areas:")?;
        writeln!(f, "  Drying:   {:>8.0} m²", self.totals.drying)?;
        writeln!(f, "  Storage:  {:>8.0} m²", self.totals.storage)?;
        writeln!(f, "  Aisles:   {:>8.0} m²", self.totals.aisles)?;
        writeln!(f, "  Useful:   {:>8.0} m²", self.totals.useful())?;
        writeln!(f, "  Building: {:>8.0} m²", self.totals.building)?;
        writeln!(f)?;

        writeln!(f, "Length:")?;
        writeln!(
            f,
            "  Used {:.1} m of {:.1} m",
            self.used_length, self.building_length
        )?;
        if self.overflow {
            writeln!(f, "  MISSING LENGTH: +{:.1} m", self.overrun())?;
        } else {
            writeln!(f, "  OK, {:.1} m left", -self.overrun())?;
        }

        if !self.warnings.is_empty() {
            writeln!(f)?;
            writeln!(f, "Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "  {}", warning)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Material;
    use crate::params::{LayoutMode, Scenario};

    const EPS: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    /// A 50/50 recipe at 100 t/day
    fn two_material_params() -> LayoutParams {
        let mut params = LayoutParams::default();
        params.scenario = Scenario::Reduced;
        params.working_days = 30;
        params.recipe = vec![
            Material::new("A", 50.0, 1.0, "#111111"),
            Material::new("B", 50.0, 1.0, "#222222"),
        ];
        params.pairs.clear();
        params.process.drying_height = 0.5;
        params
    }

    #[test]
    fn drying_area_of_three_days() {
        // 50 t/day * 3 days / 1.0 = 150 m³ over 0.5 m
        assert!(close(drying_area(50.0, 1.0, 0.5).unwrap(), 300.0));
    }

    #[test]
    fn storage_area_applies_shape_coefficient() {
        // 50 * 10 / 1.25 = 400 m³, over 7 m at 0.5 fill
        let area = storage_area(50.0, 10.0, 1.25, 7.0, 0.5).unwrap();
        assert!(close(area, 400.0 / 3.5));
        let cuboid = storage_area(50.0, 10.0, 1.25, 7.0, 1.0).unwrap();
        assert!(close(cuboid * 0.5, area));
    }

    #[test]
    fn zero_divisors_are_errors() {
        assert!(matches!(
            footprint_area(10.0, 3.0, 0.0, 1.0, 1.0),
            Err(LayoutError::DegenerateDivisor { what: "density", .. })
        ));
        assert!(matches!(
            footprint_area(10.0, 3.0, 1.0, 0.0, 1.0),
            Err(LayoutError::DegenerateDivisor { what: "height", .. })
        ));
        assert!(footprint_area(10.0, 3.0, 1.0, 1.0, 0.0).is_err());
    }

    #[test]
    fn solver_full_width_when_depth_allows() {
        // 300 m² over two sides at 20 m wide
        let pile = solve_dimensions(150.0, 20.0, 4.5);
        assert_eq!(pile.mode, PlacementMode::Full);
        assert_eq!(pile.width, 20.0);
        assert!(close(pile.depth, 7.5));

        let narrow = solve_dimensions(150.0, 2.0, 4.5);
        assert_eq!(narrow.mode, PlacementMode::Full);
        assert!(close(narrow.depth, 75.0));
    }

    #[test]
    fn solver_adapts_width_below_floor() {
        let pile = solve_dimensions(10.0, 20.0, 4.5);
        assert_eq!(pile.mode, PlacementMode::Adapted);
        assert_eq!(pile.depth, 4.5);
        assert!(close(pile.width, 10.0 / 4.5));
        assert!(pile.width < 20.0);
        assert!(close(pile.width * pile.depth, 10.0));
    }

    #[test]
    fn solver_tie_resolves_to_full() {
        let pile = solve_dimensions(45.0, 10.0, 4.5);
        assert_eq!(pile.mode, PlacementMode::Full);
        assert_eq!(pile.depth, 4.5);
        assert_eq!(pile.width, 10.0);
    }

    #[test]
    fn solver_properties_over_a_grid() {
        let mut previous: Option<PileSpec> = None;
        for step in 1..=60 {
            let max_width = f64::from(step) * 0.5;
            let pile = solve_dimensions(60.0, max_width, 4.5);

            assert!(pile.depth >= 4.5);
            assert!(pile.width <= max_width + EPS);
            assert!((pile.width * pile.depth - 60.0).abs() < 1e-6);
            if pile.depth == 4.5 && pile.mode == PlacementMode::Full {
                assert!(close(60.0 / max_width, 4.5));
            }

            if let Some(prev) = previous {
                assert!(pile.depth <= prev.depth + EPS);
                assert!(pile.width + EPS >= prev.width);
            }
            previous = Some(pile);
        }
    }

    #[test]
    fn passage_counts_toward_the_depth_floor() {
        // 30 m² at 10 m wide gives 3 m of mats; with a 2 m passage the lot is 5 m
        let lot = solve_lot(30.0, 10.0, 4.5, 2.0);
        assert_eq!(lot.mode, PlacementMode::Full);
        assert!(close(lot.depth, 3.0));

        // Without the passage the same mats fall below 4.5 m
        let lot = solve_lot(30.0, 10.0, 4.5, 0.0);
        assert_eq!(lot.mode, PlacementMode::Adapted);

        // A passage wider than the floor keeps a thin mat
        let lot = solve_lot(0.05, 10.0, 4.5, 6.0);
        assert_eq!(lot.depth, MIN_MAT_DEPTH);
    }

    #[test]
    fn two_side_split_matches_hand_computation() {
        let params = two_material_params();
        let plan = calculate_layout(&params).unwrap();
        let a = plan.block("A").unwrap();

        assert!(close(a.sizing.daily_flow, 50.0));
        assert!(close(a.sizing.drying.total_area, 300.0));
        assert_eq!(a.sizing.drying.sides, 2);
        assert!(close(a.sizing.drying.lot.area, 50.0));
        // Default wing: (75 - 36) / 2 = 19.5 m; 50 / 19.5 < 4.5 so the lot is adapted
        assert_eq!(a.sizing.drying.lot.mode, PlacementMode::Adapted);
        assert_eq!(a.sizing.drying.lot.depth, 4.5);
    }

    #[test]
    fn zero_share_materials_produce_no_block() {
        let mut params = two_material_params();
        params.recipe.push(Material::new("Z", 0.0, 1.0, "#333333"));
        let plan = calculate_layout(&params).unwrap();
        assert_eq!(plan.blocks.len(), 2);
        assert!(plan.block("Z").is_none());
        assert!(plan.placements().all(|p| p.material != "Z"));
    }

    #[test]
    fn totals_are_sums_of_blocks() {
        let plan = calculate_layout(&LayoutParams::default()).unwrap();
        let drying: f64 = plan.blocks.iter().map(|b| b.sizing.drying.total_area).sum();
        let storage: f64 = plan.blocks.iter().map(|b| b.sizing.storage.area).sum();
        assert!(close(plan.totals.drying, drying));
        assert!(close(plan.totals.storage, storage));
        assert!(close(plan.totals.aisles, 57.0 * 20.0));
        assert!(close(plan.totals.building, 75.0 * 57.0));
        assert!(close(
            plan.totals.useful(),
            plan.totals.drying + plan.totals.storage + plan.totals.aisles
        ));
    }

    #[test]
    fn cursor_is_row_extents_plus_gaps() {
        let mut params = two_material_params();
        params.spacing.inter_material = 1.5;
        let plan = calculate_layout(&params).unwrap();

        let extents: f64 = plan.blocks.iter().map(|b| b.extent).sum();
        assert!(close(plan.used_length, extents + 1.5));
        for block in &plan.blocks {
            assert!(close(
                block.extent,
                block.drying_extent.max(block.storage_extent)
            ));
        }
    }

    #[test]
    fn default_pair_shares_a_row() {
        let plan = calculate_layout(&LayoutParams::default()).unwrap();
        let pam = plan.block("Rebuts PAM").unwrap();
        let fontes = plan.block("Fontes Foug").unwrap();

        assert_eq!(pam.start, fontes.start);
        assert_eq!(pam.start, 0.0);
        assert_eq!(pam.sizing.drying.sides, 1);
        // 54 t/day * 3 / 1.5 / 0.4 = 270 m² in 3 lots on one wing
        assert!(close(pam.sizing.drying.lot.area, 90.0));
        assert!(pam.sizing.storage.width <= 8.0 + EPS);
        assert!(plan.warnings.is_empty());

        // Jets follows the paired row
        let jets = plan.block("Jets Blénod").unwrap();
        assert!(close(jets.start, pam.extent + 0.3));
    }

    #[test]
    fn pair_with_zero_share_member_is_inactive() {
        let mut params = LayoutParams::default();
        params.recipe[1].share_pct = 0.0; // Fontes Foug
        params.recipe[2].share_pct = 52.0;
        let plan = calculate_layout(&params).unwrap();
        let pam = plan.block("Rebuts PAM").unwrap();
        assert_eq!(pam.sizing.drying.sides, 2);
        assert!(plan.block("Fontes Foug").is_none());
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn pair_rules_report_problems() {
        let mut params = LayoutParams::default();
        params.pairs.push(WingPair::new("Ferraille", "Nope"));
        params.pairs.push(WingPair::new("Rebuts PAM", "Ferraille"));
        let plan = calculate_layout(&params).unwrap();
        assert_eq!(plan.warnings.len(), 2);
        assert!(matches!(
            &plan.warnings[0],
            ConfigWarning::PairUnknownMember { missing, .. } if missing == "Nope"
        ));
        assert!(matches!(
            &plan.warnings[1],
            ConfigWarning::PairOverlap { member, .. } if member == "Rebuts PAM"
        ));
        assert_eq!(plan.block("Ferraille").unwrap().sizing.drying.sides, 2);
    }

    #[test]
    fn one_aisle_ignores_pairs_with_warning() {
        let mut params = LayoutParams::default();
        params.layout = LayoutMode::OneAisle;
        params.building.width = 36.0;
        let plan = calculate_layout(&params).unwrap();
        assert_eq!(plan.layout, LayoutMode::OneAisle);
        assert!(matches!(
            plan.warnings[0],
            ConfigWarning::PairUnsupported { .. }
        ));
        assert!(plan.blocks.iter().all(|b| b.sizing.drying.sides == 1));
        assert_eq!(plan.blocks.len(), 4);
    }

    #[test]
    fn one_aisle_lot_is_one_day_of_flow() {
        let mut params = two_material_params();
        params.layout = LayoutMode::OneAisle;
        params.building.width = 36.0;
        let plan = calculate_layout(&params).unwrap();
        let a = plan.block("A").unwrap();
        // 50 t/day / 1.0 / 0.5 m = 100 m² per day lot, wing 26 m wide
        assert!(close(a.sizing.drying.lot.area, 100.0));
        assert_eq!(a.sizing.drying.lot.mode, PlacementMode::Adapted);
        assert!(close(a.sizing.drying.lot.width, 100.0 / 4.5));
    }

    #[test]
    fn overflow_is_reported_not_rejected() {
        let mut params = two_material_params();
        params.building.length = 5.0;
        let plan = calculate_layout(&params).unwrap();
        assert!(plan.overflow);
        assert!(plan.overrun() > 0.0);
        assert_eq!(plan.blocks.len(), 2);
        for p in plan.placements() {
            assert_eq!(p.overflow, p.far_edge() > 5.0);
        }
    }

    #[test]
    fn every_pile_respects_the_floor() {
        let mut params = LayoutParams::default();
        params.zones.vehicle_passage = 1.5;
        let plan = calculate_layout(&params).unwrap();
        for block in &plan.blocks {
            assert!(block.sizing.drying.lot_depth() >= 4.5 - EPS);
            assert!(block.sizing.storage.depth >= 4.5 - EPS);
            assert!(block.sizing.drying.lot.width <= plan.zones.max_pile_width + EPS);
        }
    }

    #[test]
    fn narrow_wing_still_computes() {
        let mut params = LayoutParams::default();
        params.building.width = 36.5;
        let plan = calculate_layout(&params).unwrap();
        assert!(matches!(
            plan.warnings[0],
            ConfigWarning::NarrowWing { .. }
        ));
        assert!(!plan.blocks.is_empty());
    }

    #[test]
    fn summary_mentions_length_verdict() {
        let mut params = two_material_params();
        params.building.length = 5.0;
        let text = calculate_layout(&params).unwrap().to_string();
        assert!(text.contains("MISSING LENGTH"));
        assert!(text.contains("=== Layout Summary ==="));
    }
}
