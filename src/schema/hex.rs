use serde::{Deserialize, Serialize};
use std::fmt;

/// Cube hex coordinate. Valid coordinates satisfy `q + r + s == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CubeCoord {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

/// Offset hex coordinate as supplied by the map collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OffsetCoord {
    pub row: i32,
    pub col: i32,
}

impl CubeCoord {
    /// Stand-in for conversions whose result does not fit in `i32`; never valid.
    const OUT_OF_RANGE: CubeCoord = CubeCoord {
        q: i32::MAX,
        r: i32::MAX,
        s: i32::MAX,
    };

    /// Build a cube coordinate, returning `None` when `q + r + s != 0`.
    pub fn new(q: i32, r: i32, s: i32) -> Option<CubeCoord> {
        let coord = CubeCoord { q, r, s };
        coord.is_valid().then_some(coord)
    }

    /// Build from axial `(q, r)`; `s` is derived. If `s` does not fit in
    /// `i32` the result fails `is_valid`.
    pub fn from_axial(q: i32, r: i32) -> CubeCoord {
        match i32::try_from(-i64::from(q) - i64::from(r)) {
            Ok(s) => CubeCoord { q, r, s },
            Err(_) => Self::OUT_OF_RANGE,
        }
    }

    /// Convert from "odd-r" offset layout. Out-of-range input yields a
    /// coordinate that fails `is_valid`.
    pub fn from_offset(offset: OffsetCoord) -> CubeCoord {
        let row = i64::from(offset.row);
        let q = i64::from(offset.col) - (row - (row & 1)) / 2;
        match i32::try_from(q) {
            Ok(q) => CubeCoord::from_axial(q, offset.row),
            Err(_) => Self::OUT_OF_RANGE,
        }
    }

    /// Only meaningful for valid coordinates.
    pub fn to_offset(self) -> OffsetCoord {
        let r = i64::from(self.r);
        let col = i64::from(self.q) + (r - (r & 1)) / 2;
        OffsetCoord {
            row: self.r,
            col: i32::try_from(col).unwrap_or(i32::MAX),
        }
    }

    pub fn is_valid(&self) -> bool {
        i64::from(self.q) + i64::from(self.r) + i64::from(self.s) == 0
    }

    /// Hex distance in steps.
    pub fn distance(&self, other: &CubeCoord) -> u32 {
        let dq = (i64::from(self.q) - i64::from(other.q)).unsigned_abs();
        let dr = (i64::from(self.r) - i64::from(other.r)).unsigned_abs();
        let ds = (i64::from(self.s) - i64::from(other.s)).unsigned_abs();
        u32::try_from(dq.max(dr).max(ds)).unwrap_or(u32::MAX)
    }
}

impl From<OffsetCoord> for CubeCoord {
    fn from(offset: OffsetCoord) -> Self {
        CubeCoord::from_offset(offset)
    }
}

impl fmt::Display for CubeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.q, self.r, self.s)
    }
}
