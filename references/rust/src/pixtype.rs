//! Pixel type descriptors and lookup.
//!
//! Descriptors are keyed by the 4-bit code stored in each band's flag byte.
//! Code 9 is unassigned.

use crate::matrix::ElementType;
use crate::{RasterError, RasterErrorCode, Result};

/// Wire encoding of one scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarFormat {
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float32,
    Float64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelType {
    pub code: u8,
    pub name: &'static str,
    /// Significant bits. Sub-byte types still occupy a full byte.
    pub bits: u8,
    pub byte_width: usize,
    pub scalar_format: ScalarFormat,
    pub element_type: ElementType,
}

const fn pixel_type(
    code: u8,
    name: &'static str,
    bits: u8,
    byte_width: usize,
    scalar_format: ScalarFormat,
    element_type: ElementType,
) -> PixelType {
    PixelType {
        code,
        name,
        bits,
        byte_width,
        scalar_format,
        element_type,
    }
}

pub const BOOL: PixelType = pixel_type(0, "1BB", 1, 1, ScalarFormat::Bool, ElementType::Bool);
pub const UINT2: PixelType = pixel_type(1, "2BUI", 2, 1, ScalarFormat::UInt8, ElementType::UInt8);
pub const UINT4: PixelType = pixel_type(2, "4BUI", 4, 1, ScalarFormat::UInt8, ElementType::UInt8);
pub const INT8: PixelType = pixel_type(3, "8BSI", 8, 1, ScalarFormat::Int8, ElementType::Int8);
pub const UINT8: PixelType = pixel_type(4, "8BUI", 8, 1, ScalarFormat::UInt8, ElementType::UInt8);
pub const INT16: PixelType = pixel_type(5, "16BSI", 16, 2, ScalarFormat::Int16, ElementType::Int16);
pub const UINT16: PixelType =
    pixel_type(6, "16BUI", 16, 2, ScalarFormat::UInt16, ElementType::UInt16);
pub const INT32: PixelType = pixel_type(7, "32BSI", 32, 4, ScalarFormat::Int32, ElementType::Int32);
pub const UINT32: PixelType =
    pixel_type(8, "32BUI", 32, 4, ScalarFormat::UInt32, ElementType::UInt32);
pub const FLOAT32: PixelType =
    pixel_type(10, "32BF", 32, 4, ScalarFormat::Float32, ElementType::Float32);
pub const FLOAT64: PixelType =
    pixel_type(11, "64BF", 64, 8, ScalarFormat::Float64, ElementType::Float64);

pub static PIXEL_TYPES: [PixelType; 11] = [
    BOOL, UINT2, UINT4, INT8, UINT8, INT16, UINT16, INT32, UINT32, FLOAT32, FLOAT64,
];

/// Preference order when a query matches more than one descriptor.
pub static PIXEL_TYPE_RANKING: [PixelType; 11] = [
    FLOAT64, FLOAT32, UINT32, INT32, UINT16, INT16, UINT8, INT8, BOOL, UINT4, UINT2,
];

/// Filters for [`lookup`]. A descriptor matches when it agrees with every
/// field that is set; a query with no fields set matches nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelTypeQuery {
    pub code: Option<u8>,
    pub byte_width: Option<usize>,
    pub scalar_format: Option<ScalarFormat>,
    pub element_type: Option<ElementType>,
}

impl PixelTypeQuery {
    pub fn code(code: u8) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.code.is_none()
            && self.byte_width.is_none()
            && self.scalar_format.is_none()
            && self.element_type.is_none()
    }

    fn matches(&self, candidate: &PixelType) -> bool {
        self.code.map_or(true, |v| v == candidate.code)
            && self.byte_width.map_or(true, |v| v == candidate.byte_width)
            && self.scalar_format.map_or(true, |v| v == candidate.scalar_format)
            && self.element_type.map_or(true, |v| v == candidate.element_type)
    }
}

/// Finds descriptors agreeing with `query`.
///
/// With `best_match`, at most one descriptor is returned: the sole match, or
/// else the highest-ranked one in [`PIXEL_TYPE_RANKING`]. Without it, every
/// match is returned in code order.
pub fn lookup(query: &PixelTypeQuery, best_match: bool) -> Vec<&'static PixelType> {
    if query.is_empty() {
        return Vec::new();
    }

    let matches: Vec<&'static PixelType> =
        PIXEL_TYPES.iter().filter(|v| query.matches(v)).collect();

    if !best_match || matches.len() <= 1 {
        return matches;
    }

    PIXEL_TYPE_RANKING
        .iter()
        .find_map(|rank| matches.iter().copied().find(|v| v.code == rank.code))
        .into_iter()
        .collect()
}

impl PixelType {
    /// Exact-code lookup used by the band codec.
    pub fn from_code(code: u8) -> Result<&'static PixelType> {
        lookup(&PixelTypeQuery::code(code), true)
            .into_iter()
            .next()
            .ok_or_else(|| {
                RasterError::new(
                    RasterErrorCode::UnknownPixelType,
                    format!("Unknown pixtype code {code}."),
                )
            })
    }

    /// Inclusive integer range of the type, `None` for floats.
    pub(crate) fn integer_range(&self) -> Option<(f64, f64)> {
        match self.scalar_format {
            ScalarFormat::Bool => Some((0.0, 1.0)),
            ScalarFormat::UInt8 => Some((0.0, f64::from((1_u16 << self.bits) - 1))),
            ScalarFormat::Int8 => Some((f64::from(i8::MIN), f64::from(i8::MAX))),
            ScalarFormat::Int16 => Some((f64::from(i16::MIN), f64::from(i16::MAX))),
            ScalarFormat::UInt16 => Some((0.0, f64::from(u16::MAX))),
            ScalarFormat::Int32 => Some((f64::from(i32::MIN), f64::from(i32::MAX))),
            ScalarFormat::UInt32 => Some((0.0, f64::from(u32::MAX))),
            ScalarFormat::Float32 | ScalarFormat::Float64 => None,
        }
    }
}
