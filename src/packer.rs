//! Placement of sized materials along the building length
//!
//! A [`Cursor`] tracks the running position along the length axis. A
//! [`LayoutStrategy`] decides how one row (a material, or a wing pair) is
//! laid out across the width and how much length it consumes. Rows are
//! placed one after another; nothing is ever re-packed, overflow past the
//! building end is only flagged on the rectangles concerned.

use log::debug;

use crate::models::{
    DRYING_LOTS, LayoutBlock, MaterialSizing, Placement, PlacementKind, PlacementMode, Side,
};
use crate::params::{Alignment, LayoutMode, LayoutParams};
use crate::zones::{Span, Zones};

/// How a material's drying lots use the wings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WingShare {
    /// Spread evenly over every wing of the layout
    Split,
    /// Alone on one wing, as a member of a wing pair
    Exclusive(Side),
}

/// Bounds the sizing step works within for one material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingLimits {
    /// Wings the 3 lots are repeated on
    pub sides: u32,
    pub lot_max_width: f64,
    pub storage_max_width: f64,
    pub passage: f64,
}

/// One band of the plan along the length axis
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Single(MaterialSizing),
    Pair {
        left: MaterialSizing,
        right: MaterialSizing,
    },
}

/// Running position along the building length.
///
/// The inter-material gap is inserted between rows only, so after N rows
/// the position is the sum of the row extents plus N - 1 gaps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    position: f64,
    gap: f64,
    rows: usize,
}

impl Cursor {
    pub fn new(gap: f64) -> Self {
        Self {
            position: 0.0,
            gap,
            rows: 0,
        }
    }

    /// Reserve `extent` for the next row and return where it starts
    pub fn place(&mut self, extent: f64) -> f64 {
        if self.rows > 0 {
            self.position += self.gap;
        }
        let origin = self.position;
        self.position += extent;
        self.rows += 1;
        origin
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
}

pub trait LayoutStrategy {
    fn mode(&self) -> LayoutMode;

    fn sizing_limits(&self, share: WingShare) -> SizingLimits;

    /// Whether wing pairs can be honoured by this layout
    fn supports_pairs(&self) -> bool;

    /// Place one row at the cursor and advance it
    fn pack_row(&self, row: Row, cursor: &mut Cursor) -> Vec<LayoutBlock>;
}

pub fn strategy_for(params: &LayoutParams, zones: &Zones) -> Box<dyn LayoutStrategy> {
    let frame = Frame {
        alignment: params.alignment,
        inter_lot: params.spacing.inter_lot,
        length: params.building.length,
    };
    match (params.layout, zones.storage_strip) {
        (LayoutMode::TwoAisle, Some(strip)) if zones.wings.len() == 2 => Box::new(TwoAisle {
            left: zones.wings[0],
            right: zones.wings[1],
            strip,
            max_width: zones.max_pile_width,
            passage: params.zones.vehicle_passage,
            frame,
        }),
        _ => Box::new(OneAisle {
            wing: zones.wings.first().copied().unwrap_or(Span::new(0.0, 0.0)),
            max_width: zones.max_pile_width,
            frame,
        }),
    }
}

/// Settings shared by every strategy
#[derive(Debug, Clone, Copy)]
struct Frame {
    alignment: Alignment,
    inter_lot: f64,
    length: f64,
}

/// Stamps rectangles for one material on one side
struct Stamp<'a> {
    sizing: &'a MaterialSizing,
    side: Side,
    length: f64,
}

impl Stamp<'_> {
    fn rect(&self, kind: PlacementKind, x: f64, y: f64, width: f64, depth: f64) -> Placement {
        let mode = match kind {
            PlacementKind::Storage => self.sizing.storage.mode,
            _ => self.sizing.drying.lot.mode,
        };
        Placement {
            material: self.sizing.name.clone(),
            color: self.sizing.color.clone(),
            kind,
            side: self.side,
            x,
            y,
            width,
            depth,
            mode,
            overflow: y + depth > self.length,
        }
    }
}

/// Single outer aisle: day lots then the storage pile, stacked along the length
pub struct OneAisle {
    wing: Span,
    max_width: f64,
    frame: Frame,
}

impl OneAisle {
    fn x_for(&self, width: f64) -> f64 {
        match self.frame.alignment {
            Alignment::AisleSide => self.wing.start,
            Alignment::WallSide => self.wing.end() - width,
        }
    }

    fn pack_material(&self, sizing: MaterialSizing, cursor: &mut Cursor) -> LayoutBlock {
        let gap = self.frame.inter_lot;
        let lot_depth = sizing.drying.lot_depth();
        let drying_extent = sizing.drying.block_extent(gap);
        let storage_extent = sizing.storage.depth;
        let extent = drying_extent + gap + storage_extent;
        let origin = cursor.place(extent);

        // The single wing lies right of the aisle
        let stamp = Stamp {
            sizing: &sizing,
            side: Side::Right,
            length: self.frame.length,
        };
        let lot_width = sizing.drying.lot.width;
        let mut placements: Vec<Placement> = (0..DRYING_LOTS)
            .map(|lot| {
                let y = origin + f64::from(lot) * (lot_depth + gap);
                stamp.rect(
                    PlacementKind::DryingLot { lot: lot + 1 },
                    self.x_for(lot_width),
                    y,
                    lot_width,
                    lot_depth,
                )
            })
            .collect();

        let storage_width = sizing.storage.width;
        placements.push(stamp.rect(
            PlacementKind::Storage,
            self.x_for(storage_width),
            origin + drying_extent + gap,
            storage_width,
            storage_extent,
        ));

        LayoutBlock {
            start: origin,
            drying_extent,
            storage_extent,
            extent,
            placements,
            sizing,
        }
    }
}

impl LayoutStrategy for OneAisle {
    fn mode(&self) -> LayoutMode {
        LayoutMode::OneAisle
    }

    fn sizing_limits(&self, _share: WingShare) -> SizingLimits {
        SizingLimits {
            sides: 1,
            lot_max_width: self.max_width,
            storage_max_width: self.max_width,
            passage: 0.0,
        }
    }

    fn supports_pairs(&self) -> bool {
        false
    }

    fn pack_row(&self, row: Row, cursor: &mut Cursor) -> Vec<LayoutBlock> {
        let sizings = match row {
            Row::Single(sizing) => vec![sizing],
            Row::Pair { left, right } => vec![left, right],
        };
        sizings
            .into_iter()
            .map(|sizing| {
                let block = self.pack_material(sizing, cursor);
                debug!(
                    "{}: rows {:.2}..{:.2} m",
                    block.sizing.name,
                    block.start,
                    block.start + block.extent
                );
                block
            })
            .collect()
    }
}

/// Two aisles around a central storage strip, drying lots on both wings
pub struct TwoAisle {
    left: Span,
    right: Span,
    strip: Span,
    max_width: f64,
    passage: f64,
    frame: Frame,
}

impl TwoAisle {
    fn wing_x(&self, side: Side, width: f64) -> f64 {
        match (side, self.frame.alignment) {
            (Side::Left, Alignment::AisleSide) => self.left.end() - width,
            (Side::Left, Alignment::WallSide) => self.left.start,
            (_, Alignment::AisleSide) => self.right.start,
            (_, Alignment::WallSide) => self.right.end() - width,
        }
    }

    fn drying_lots(&self, sizing: &MaterialSizing, side: Side, origin: f64) -> Vec<Placement> {
        let stamp = Stamp {
            sizing,
            side,
            length: self.frame.length,
        };
        let drying = &sizing.drying;
        let width = drying.lot.width;
        let x = self.wing_x(side, width);
        let half_mat = drying.lot.depth / 2.0;

        let mut placements = Vec::new();
        for lot in 0..DRYING_LOTS {
            let y = origin + f64::from(lot) * (drying.lot_depth() + self.frame.inter_lot);
            let lot = lot + 1;
            if drying.passage > 0.0 {
                placements.push(stamp.rect(
                    PlacementKind::DryingLayer { lot, layer: 1 },
                    x,
                    y,
                    width,
                    half_mat,
                ));
                placements.push(stamp.rect(
                    PlacementKind::Passage { lot },
                    x,
                    y + half_mat,
                    width,
                    drying.passage,
                ));
                placements.push(stamp.rect(
                    PlacementKind::DryingLayer { lot, layer: 2 },
                    x,
                    y + half_mat + drying.passage,
                    width,
                    half_mat,
                ));
            } else {
                placements.push(stamp.rect(
                    PlacementKind::DryingLot { lot },
                    x,
                    y,
                    width,
                    drying.lot.depth,
                ));
            }
        }
        placements
    }

    /// Storage pile centred in `slot` and on `center_y`
    fn storage(&self, sizing: &MaterialSizing, slot: Span, center_y: f64) -> Placement {
        let stamp = Stamp {
            sizing,
            side: Side::Center,
            length: self.frame.length,
        };
        let pile = &sizing.storage;
        stamp.rect(
            PlacementKind::Storage,
            slot.start + (slot.width - pile.width) / 2.0,
            center_y - pile.depth / 2.0,
            pile.width,
            pile.depth,
        )
    }

    fn block(
        &self,
        sizing: MaterialSizing,
        origin: f64,
        extent: f64,
        placements: Vec<Placement>,
    ) -> LayoutBlock {
        LayoutBlock {
            start: origin,
            drying_extent: sizing.drying.block_extent(self.frame.inter_lot),
            storage_extent: sizing.storage.depth,
            extent,
            placements,
            sizing,
        }
    }
}

impl LayoutStrategy for TwoAisle {
    fn mode(&self) -> LayoutMode {
        LayoutMode::TwoAisle
    }

    fn sizing_limits(&self, share: WingShare) -> SizingLimits {
        let (sides, storage_max_width) = match share {
            WingShare::Split => (2, self.strip.width),
            WingShare::Exclusive(_) => (1, self.strip.width / 2.0),
        };
        SizingLimits {
            sides,
            lot_max_width: self.max_width,
            storage_max_width,
            passage: self.passage,
        }
    }

    fn supports_pairs(&self) -> bool {
        true
    }

    fn pack_row(&self, row: Row, cursor: &mut Cursor) -> Vec<LayoutBlock> {
        let gap = self.frame.inter_lot;
        match row {
            Row::Single(sizing) => {
                let extent = sizing
                    .drying
                    .block_extent(gap)
                    .max(sizing.storage.depth);
                let origin = cursor.place(extent);
                let center_y = origin + extent / 2.0;

                let mut placements = self.drying_lots(&sizing, Side::Left, origin);
                placements.extend(self.drying_lots(&sizing, Side::Right, origin));
                placements.push(self.storage(&sizing, self.strip, center_y));

                debug!(
                    "{}: row {:.2}..{:.2} m",
                    sizing.name,
                    origin,
                    origin + extent
                );
                vec![self.block(sizing, origin, extent, placements)]
            }
            Row::Pair { left, right } => {
                let extent = [
                    left.drying.block_extent(gap),
                    right.drying.block_extent(gap),
                    left.storage.depth,
                    right.storage.depth,
                ]
                .into_iter()
                .fold(0.0, f64::max);
                let origin = cursor.place(extent);
                let center_y = origin + extent / 2.0;

                let mut left_rects = self.drying_lots(&left, Side::Left, origin);
                left_rects.push(self.storage(&left, self.strip.half(true), center_y));
                let mut right_rects = self.drying_lots(&right, Side::Right, origin);
                right_rects.push(self.storage(&right, self.strip.half(false), center_y));

                debug!(
                    "{} / {}: paired row {:.2}..{:.2} m",
                    left.name,
                    right.name,
                    origin,
                    origin + extent
                );
                vec![
                    self.block(left, origin, extent, left_rects),
                    self.block(right, origin, extent, right_rects),
                ]
            }
        }
    }
}
