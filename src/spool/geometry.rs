//! Destination geometry for page placement

use serde::{Deserialize, Serialize};

// Corner coordinates in device-independent units, carried over from the
// original printer/driver mapping. Their DPI assumption is undocumented, so
// they are reproduced verbatim rather than derived from paper dimensions.
const HALF_LETTER_WIDTH: i32 = 568;
const HALF_LETTER_HEIGHT: i32 = 859;
const LETTER_WIDTH: i32 = 859;
const LETTER_HEIGHT: i32 = 1118;

/// A point on the device surface, in device-independent units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Caller-selected mode controlling how a page is mapped onto paper.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlacementPolicy {
    /// Native size, no transform.
    Original,
    /// Force onto 5.5 x 8.5 paper.
    ForceHalfLetter,
    /// Force onto 8.5 x 11 paper.
    #[default]
    ForceLetter,
}

impl PlacementPolicy {
    /// Resolve a caller-facing override string.
    ///
    /// Anything unrecognized selects the letter default, matching the
    /// original caller contract.
    #[must_use]
    pub fn from_override(raw: &str) -> Self {
        match raw {
            "Original" => Self::Original,
            "Force 5.5 X 8.5" => Self::ForceHalfLetter,
            _ => Self::ForceLetter,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::ForceHalfLetter => "Force 5.5 X 8.5",
            Self::ForceLetter => "Force 8.5 X 11",
        }
    }
}

/// Paper orientation for the job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Where a decoded page lands on the device surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Native size at a single origin point.
    Origin(Point),
    /// Scaled into a parallelogram: top-left, top-right, bottom-left.
    Parallelogram([Point; 3]),
}

/// Compute the destination geometry for one page draw.
///
/// Landscape swaps the width/height roles of the forced page sizes; the
/// corner coordinates themselves never change.
#[must_use]
pub fn destination_geometry(policy: PlacementPolicy, orientation: Orientation) -> Placement {
    let corners = |width: i32, height: i32| {
        Placement::Parallelogram([
            Point::new(0, 0),
            Point::new(width, 0),
            Point::new(0, height),
        ])
    };

    match (policy, orientation) {
        (PlacementPolicy::Original, _) => Placement::Origin(Point::new(0, 0)),
        (PlacementPolicy::ForceHalfLetter, Orientation::Portrait) => {
            corners(HALF_LETTER_WIDTH, HALF_LETTER_HEIGHT)
        }
        (PlacementPolicy::ForceHalfLetter, Orientation::Landscape) => {
            corners(HALF_LETTER_HEIGHT, HALF_LETTER_WIDTH)
        }
        (PlacementPolicy::ForceLetter, Orientation::Portrait) => {
            corners(LETTER_WIDTH, LETTER_HEIGHT)
        }
        (PlacementPolicy::ForceLetter, Orientation::Landscape) => {
            corners(LETTER_HEIGHT, LETTER_WIDTH)
        }
    }
}
