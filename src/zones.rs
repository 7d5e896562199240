//! Partition of the building width into aisles, central strip and wings

use serde::Serialize;

use crate::error::ConfigWarning;
use crate::params::{LayoutMode, LayoutParams};

/// A wing narrower than this is reported as a configuration problem
pub const MIN_WING_WIDTH: f64 = 1.0;

/// Width the solver falls back to when a wing has collapsed
const WING_WIDTH_FLOOR: f64 = 0.1;

/// A band across the building width, running its full length
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Span {
    pub start: f64,
    pub width: f64,
}

impl Span {
    pub fn new(start: f64, width: f64) -> Self {
        Self { start, width }
    }

    pub fn end(&self) -> f64 {
        self.start + self.width
    }

    /// One half of the span, `first` being the lower-x half
    pub fn half(&self, first: bool) -> Span {
        let width = self.width / 2.0;
        let start = if first { self.start } else { self.start + width };
        Span::new(start, width)
    }
}

/// Fixed x-offsets of every zone, computed before any material is placed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zones {
    pub aisles: Vec<Span>,
    pub storage_strip: Option<Span>,
    /// Drying wings, lowest x first
    pub wings: Vec<Span>,
    /// Raw width left per wing; may be tiny or negative
    pub available_wing_width: f64,
    /// Widest pile the solver may use in a wing
    pub max_pile_width: f64,
}

impl Zones {
    pub fn is_degenerate(&self) -> bool {
        self.available_wing_width <= MIN_WING_WIDTH
    }

    pub fn warning(&self) -> Option<ConfigWarning> {
        self.is_degenerate().then(|| ConfigWarning::NarrowWing {
            available: self.available_wing_width,
        })
    }

    pub fn aisle_width_total(&self) -> f64 {
        self.aisles.iter().map(|a| a.width).sum()
    }
}

pub fn partition(params: &LayoutParams) -> Zones {
    match params.layout {
        LayoutMode::TwoAisle => partition_two_aisles(params),
        LayoutMode::OneAisle => partition_one_aisle(params),
    }
}

/// Wing | margin | aisle | central strip | aisle | margin | wing
fn partition_two_aisles(params: &LayoutParams) -> Zones {
    let building_width = params.building.width;
    let z = &params.zones;

    let central_total = z.central_storage_width + 2.0 * z.aisle_width + 2.0 * z.safety_margin;
    let available = (building_width - central_total) / 2.0;

    let aisle_1 = Span::new(available + z.safety_margin, z.aisle_width);
    let strip = Span::new(aisle_1.end(), z.central_storage_width);
    let aisle_2 = Span::new(strip.end(), z.aisle_width);
    let right_start = aisle_2.end() + z.safety_margin;

    Zones {
        aisles: vec![aisle_1, aisle_2],
        storage_strip: Some(strip),
        wings: vec![
            Span::new(0.0, available),
            Span::new(right_start, building_width - right_start),
        ],
        available_wing_width: available,
        max_pile_width: available.max(WING_WIDTH_FLOOR),
    }
}

/// Aisle | margin | wing | margin
fn partition_one_aisle(params: &LayoutParams) -> Zones {
    let building_width = params.building.width;
    let z = &params.zones;

    let aisle = Span::new(0.0, z.aisle_width);
    let available = building_width - z.aisle_width - 2.0 * z.safety_margin;
    let wing = Span::new(aisle.end() + z.safety_margin, available);

    let capped = match z.usable_width {
        Some(usable) => available.min(usable),
        None => available,
    };

    Zones {
        aisles: vec![aisle],
        storage_strip: None,
        wings: vec![wing],
        available_wing_width: available,
        max_pile_width: capped.max(WING_WIDTH_FLOOR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_aisle_offsets() {
        let mut params = LayoutParams::default();
        params.building.width = 75.0;
        params.zones.central_storage_width = 16.0;
        params.zones.aisle_width = 10.0;
        params.zones.safety_margin = 1.0;

        let zones = partition(&params);
        // (75 - (16 + 20 + 2)) / 2
        assert_eq!(zones.available_wing_width, 18.5);
        assert_eq!(zones.aisles[0], Span::new(19.5, 10.0));
        assert_eq!(zones.storage_strip, Some(Span::new(29.5, 16.0)));
        assert_eq!(zones.aisles[1], Span::new(45.5, 10.0));
        assert_eq!(zones.wings[0], Span::new(0.0, 18.5));
        assert_eq!(zones.wings[1], Span::new(56.5, 18.5));
        assert_eq!(zones.aisle_width_total(), 20.0);
        assert!(zones.warning().is_none());
    }

    #[test]
    fn one_aisle_offsets_and_usable_cap() {
        let mut params = LayoutParams::default();
        params.layout = LayoutMode::OneAisle;
        params.building.width = 36.0;
        params.zones.aisle_width = 10.0;
        params.zones.safety_margin = 0.5;

        let zones = partition(&params);
        assert_eq!(zones.available_wing_width, 25.0);
        assert_eq!(zones.wings[0], Span::new(10.5, 25.0));
        assert_eq!(zones.max_pile_width, 25.0);
        assert!(zones.storage_strip.is_none());

        params.zones.usable_width = Some(12.0);
        assert_eq!(partition(&params).max_pile_width, 12.0);
    }

    #[test]
    fn narrow_wing_is_reported_not_clamped_silently() {
        let mut params = LayoutParams::default();
        params.building.width = 37.0;
        params.zones.central_storage_width = 16.0;
        params.zones.aisle_width = 10.0;

        let zones = partition(&params);
        assert_eq!(zones.available_wing_width, 0.5);
        assert!(zones.is_degenerate());
        assert_eq!(
            zones.warning(),
            Some(ConfigWarning::NarrowWing { available: 0.5 })
        );
        assert_eq!(zones.max_pile_width, 0.5);

        params.building.width = 30.0;
        let zones = partition(&params);
        assert!(zones.available_wing_width < 0.0);
        assert_eq!(zones.max_pile_width, WING_WIDTH_FLOOR);
    }

    #[test]
    fn span_halves() {
        let strip = Span::new(20.0, 16.0);
        assert_eq!(strip.half(true), Span::new(20.0, 8.0));
        assert_eq!(strip.half(false), Span::new(28.0, 8.0));
    }
}
