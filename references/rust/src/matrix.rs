use crate::{RasterError, RasterErrorCode, Result};

/// Element type of an in-memory pixel matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
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

/// Row-major pixel storage. Index `row * width + col`.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    Bool(Vec<bool>),
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

impl PixelData {
    pub fn zeroed(element_type: ElementType, len: usize) -> Self {
        match element_type {
            ElementType::Bool => Self::Bool(vec![false; len]),
            ElementType::Int8 => Self::Int8(vec![0; len]),
            ElementType::UInt8 => Self::UInt8(vec![0; len]),
            ElementType::Int16 => Self::Int16(vec![0; len]),
            ElementType::UInt16 => Self::UInt16(vec![0; len]),
            ElementType::Int32 => Self::Int32(vec![0; len]),
            ElementType::UInt32 => Self::UInt32(vec![0; len]),
            ElementType::Float32 => Self::Float32(vec![0.0; len]),
            ElementType::Float64 => Self::Float64(vec![0.0; len]),
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Bool(_) => ElementType::Bool,
            Self::Int8(_) => ElementType::Int8,
            Self::UInt8(_) => ElementType::UInt8,
            Self::Int16(_) => ElementType::Int16,
            Self::UInt16(_) => ElementType::UInt16,
            Self::Int32(_) => ElementType::Int32,
            Self::UInt32(_) => ElementType::UInt32,
            Self::Float32(_) => ElementType::Float32,
            Self::Float64(_) => ElementType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Int8(v) => v.len(),
            Self::UInt8(v) => v.len(),
            Self::Int16(v) => v.len(),
            Self::UInt16(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::UInt32(v) => v.len(),
            Self::Float32(v) => v.len(),
            Self::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A `width` x `height` grid of one band's pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelMatrix {
    width: u16,
    height: u16,
    data: PixelData,
}

impl PixelMatrix {
    /// Zero-filled matrix.
    pub fn new(element_type: ElementType, width: u16, height: u16) -> Self {
        let len = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            data: PixelData::zeroed(element_type, len),
        }
    }

    pub fn from_data(width: u16, height: u16, data: PixelData) -> Result<Self> {
        let expected = usize::from(width) * usize::from(height);
        if data.len() != expected {
            return Err(RasterError::new(
                RasterErrorCode::DimensionMismatch,
                format!(
                    "Pixel data length mismatch. expected={expected} got={}",
                    data.len()
                ),
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    pub fn data(&self) -> &PixelData {
        &self.data
    }

    pub fn into_data(self) -> PixelData {
        self.data
    }

    /// Value at row-major `index`, widened to `f64`. Booleans read as 0 or 1.
    pub fn get(&self, index: usize) -> Option<f64> {
        match &self.data {
            PixelData::Bool(v) => v.get(index).map(|x| if *x { 1.0 } else { 0.0 }),
            PixelData::Int8(v) => v.get(index).map(|x| f64::from(*x)),
            PixelData::UInt8(v) => v.get(index).map(|x| f64::from(*x)),
            PixelData::Int16(v) => v.get(index).map(|x| f64::from(*x)),
            PixelData::UInt16(v) => v.get(index).map(|x| f64::from(*x)),
            PixelData::Int32(v) => v.get(index).map(|x| f64::from(*x)),
            PixelData::UInt32(v) => v.get(index).map(|x| f64::from(*x)),
            PixelData::Float32(v) => v.get(index).map(|x| f64::from(*x)),
            PixelData::Float64(v) => v.get(index).copied(),
        }
    }

    pub fn get_at(&self, row: u16, col: u16) -> Option<f64> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.get(usize::from(row) * usize::from(self.width) + usize::from(col))
    }

    /// Stores `value` at row-major `index`. Fails if the index is out of
    /// bounds or the value does not fit the element type.
    pub fn set(&mut self, index: usize, value: f64) -> Result<()> {
        let len = self.len();
        if index >= len {
            return Err(RasterError::new(
                RasterErrorCode::DimensionMismatch,
                format!("Pixel index {index} out of bounds for {len} pixels."),
            ));
        }

        match &mut self.data {
            PixelData::Bool(v) => v[index] = checked_integer(value, 0.0, 1.0)? != 0.0,
            PixelData::Int8(v) => {
                v[index] = checked_integer(value, f64::from(i8::MIN), f64::from(i8::MAX))? as i8
            }
            PixelData::UInt8(v) => {
                v[index] = checked_integer(value, 0.0, f64::from(u8::MAX))? as u8
            }
            PixelData::Int16(v) => {
                v[index] = checked_integer(value, f64::from(i16::MIN), f64::from(i16::MAX))? as i16
            }
            PixelData::UInt16(v) => {
                v[index] = checked_integer(value, 0.0, f64::from(u16::MAX))? as u16
            }
            PixelData::Int32(v) => {
                v[index] = checked_integer(value, f64::from(i32::MIN), f64::from(i32::MAX))? as i32
            }
            PixelData::UInt32(v) => {
                v[index] = checked_integer(value, 0.0, f64::from(u32::MAX))? as u32
            }
            PixelData::Float32(v) => {
                let narrowed = value as f32;
                if value.is_finite() && !narrowed.is_finite() {
                    return Err(RasterError::new(
                        RasterErrorCode::InvalidFieldValue,
                        format!("Out-of-range value for float32: {value}"),
                    ));
                }
                v[index] = narrowed;
            }
            PixelData::Float64(v) => v[index] = value,
        }
        Ok(())
    }
}

fn checked_integer(value: f64, min: f64, max: f64) -> Result<f64> {
    crate::common::validate_integer_range(value, min, max)
}
