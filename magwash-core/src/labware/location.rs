//! Well references and symbolic locations
//!
//! A [`WellRef`] carries its column index as an explicit integer, so parity
//! decisions never depend on a display label. A [`Location`] is a well plus
//! an anchor and an offset in millimeters.

use core::fmt;
use core::ops::Add;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rows on a standard 96-well plate
pub const PLATE_ROWS: u8 = 8;

/// Columns on a standard 96-well plate
pub const PLATE_COLUMNS: u8 = 12;

/// Labware identifier (deck slot number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabwareId(pub u8);

impl LabwareId {
    /// Deck slot number
    pub const fn slot(&self) -> u8 {
        self.0
    }
}

/// Reference to a single well
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WellRef {
    /// Labware holding the well
    pub labware: LabwareId,
    /// Row index (0 = A)
    pub row: u8,
    /// Column index (0 = column 1)
    pub column: u8,
}

impl WellRef {
    /// Create a well reference
    pub const fn new(labware: LabwareId, row: u8, column: u8) -> Self {
        Self {
            labware,
            row,
            column,
        }
    }

    /// First well (A1) of a labware
    pub const fn first(labware: LabwareId) -> Self {
        Self::new(labware, 0, 0)
    }

    /// Well at a column-major index (A1, B1, ... H1, A2, ...)
    pub const fn column_major(labware: LabwareId, index: u8) -> Self {
        Self::new(labware, index % PLATE_ROWS, index / PLATE_ROWS)
    }

    /// Parity of the printed column number (1 for column 1, 0 for column 2)
    pub const fn parity(&self) -> u8 {
        (self.column + 1) % 2
    }

    /// Location at the well top, offset vertically by `z` mm
    pub const fn top(self, z: f32) -> Location {
        Location::new(self, Anchor::Top, Point::new(0.0, 0.0, z))
    }

    /// Location at the well bottom, offset vertically by `z` mm
    pub const fn bottom(self, z: f32) -> Location {
        Location::new(self, Anchor::Bottom, Point::new(0.0, 0.0, z))
    }

    /// Location at the well center
    pub const fn center(self) -> Location {
        Location::new(self, Anchor::Center, Point::ZERO)
    }
}

impl fmt::Display for WellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = (b'A' + self.row) as char;
        write!(f, "{}{} of slot {}", row, self.column + 1, self.labware.0)
    }
}

/// Offset in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point {
    /// No offset
    pub const ZERO: Point = Point::new(0.0, 0.0, 0.0);

    /// Create a point
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Pure lateral offset along x
    pub const fn x(x: f32) -> Self {
        Self::new(x, 0.0, 0.0)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// Reference point within a well
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Anchor {
    /// Rim of the well
    Top,
    /// Floor of the well
    Bottom,
    /// Geometric center
    Center,
}

/// Symbolic target position
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// Target well
    pub well: WellRef,
    /// Reference point within the well
    pub anchor: Anchor,
    /// Offset from the anchor (mm)
    pub offset: Point,
}

impl Location {
    /// Create a location
    pub const fn new(well: WellRef, anchor: Anchor, offset: Point) -> Self {
        Self {
            well,
            anchor,
            offset,
        }
    }

    /// Same anchor, shifted by `delta`
    pub fn moved(self, delta: Point) -> Self {
        Self {
            offset: self.offset + delta,
            ..self
        }
    }
}
