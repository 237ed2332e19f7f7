//! Reader and writer for the PostGIS Raster Well-Known Binary format.
//!
//! A WKB raster is a fixed header (byte order, version, band count,
//! geo-transform, SRID, dimensions) followed by one record per band. Each
//! band carries its pixels inline or names a band of an external file.

use std::fmt;
use std::io;

mod band;
mod common;
mod consts;
mod decoder;
mod encoder;
mod header;
mod hexwkb;
mod matrix;
mod pixtype;

pub use consts::RASTER_HEADER_LENGTH;
pub use decoder::{inspect_raster, read, read_bytes};
pub use encoder::{write, write_to, write_with_endianness};
pub use hexwkb::{read_hex, write_hex};
pub use matrix::{ElementType, PixelData, PixelMatrix};
pub use pixtype::{
    lookup, PixelType, PixelTypeQuery, ScalarFormat, PIXEL_TYPES, PIXEL_TYPE_RANKING,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    /// Byte order of the host.
    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            Self::Little
        } else {
            Self::Big
        }
    }

    pub(crate) fn flag(self) -> u8 {
        match self {
            Self::Big => consts::ENDIAN_FLAG_BIG,
            Self::Little => consts::ENDIAN_FLAG_LITTLE,
        }
    }

    pub(crate) fn from_flag(flag: u8) -> Result<Self> {
        match flag {
            consts::ENDIAN_FLAG_BIG => Ok(Self::Big),
            consts::ENDIAN_FLAG_LITTLE => Ok(Self::Little),
            _ => Err(RasterError::new(
                RasterErrorCode::InvalidEndianFlag,
                format!("Invalid endianness flag {flag}."),
            )),
        }
    }
}

/// Everything in a raster that precedes the first band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterHeader {
    pub endianness: Endianness,
    pub version: u16,
    pub band_count: u16,
    pub scale_x: f64,
    pub scale_y: f64,
    pub ip_x: f64,
    pub ip_y: f64,
    pub skew_x: f64,
    pub skew_y: f64,
    pub srid: i32,
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub version: u16,
    pub scale_x: f64,
    pub scale_y: f64,
    pub ip_x: f64,
    pub ip_y: f64,
    pub skew_x: f64,
    pub skew_y: f64,
    pub srid: i32,
    pub width: u16,
    pub height: u16,
    /// Serialized in this order.
    pub bands: Vec<Band>,
}

impl Raster {
    /// Number of pixels in one inline band.
    pub fn pixel_count(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Checks every precondition of encoding without producing bytes.
    pub fn validate(&self) -> Result<()> {
        if u16::try_from(self.bands.len()).is_err() {
            return Err(RasterError::new(
                RasterErrorCode::BandCountMismatch,
                format!(
                    "Raster has {} bands, the format allows at most {}.",
                    self.bands.len(),
                    u16::MAX
                ),
            ));
        }

        for (idx, band) in self.bands.iter().enumerate() {
            band.validate(self.width, self.height).map_err(|err| {
                RasterError::new(err.code, format!("band {idx}: {}", err.message))
            })?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub has_nodata_value: bool,
    /// Dirty flag claiming every pixel equals `nodata`. Not verified.
    pub is_nodata_value: bool,
    pub pixtype: u8,
    /// Written even when `has_nodata_value` is false.
    pub nodata: f64,
    pub payload: BandPayload,
}

impl Band {
    pub fn is_offline(&self) -> bool {
        matches!(self.payload, BandPayload::Offline { .. })
    }

    pub fn pixel_type(&self) -> Result<&'static PixelType> {
        PixelType::from_code(self.pixtype)
    }

    fn validate(&self, width: u16, height: u16) -> Result<()> {
        let pixel_type = self.pixel_type()?;
        common::validate_scalar(pixel_type, self.nodata).map_err(|err| {
            RasterError::new(err.code, format!("nodata: {}", err.message))
        })?;

        match &self.payload {
            BandPayload::Offline { band_number, path } => {
                common::wire_band_number(*band_number)?;
                common::validate_path(path)
            }
            BandPayload::Inline(matrix) => {
                if matrix.width() != width || matrix.height() != height {
                    return Err(RasterError::new(
                        RasterErrorCode::DimensionMismatch,
                        format!(
                            "Matrix is {}x{}, raster is {width}x{height}.",
                            matrix.width(),
                            matrix.height()
                        ),
                    ));
                }
                if matrix.element_type() != pixel_type.element_type {
                    return Err(RasterError::new(
                        RasterErrorCode::ElementTypeMismatch,
                        format!(
                            "Matrix holds {:?}, pixtype {} expects {:?}.",
                            matrix.element_type(),
                            pixel_type.name,
                            pixel_type.element_type
                        ),
                    ));
                }
                common::validate_matrix(pixel_type, matrix)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BandPayload {
    /// Pixels stored in the stream, `width * height` of them.
    Inline(PixelMatrix),
    /// Pixels live in band `band_number` (1-based) of the file at `path`.
    Offline { band_number: u16, path: Vec<u8> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterErrorCode {
    InvalidEndianFlag,
    TruncatedStream,
    UnknownPixelType,
    MissingPathTerminator,
    InvalidPath,
    BandCountMismatch,
    DimensionMismatch,
    ElementTypeMismatch,
    InvalidFieldValue,
    InvalidBandNumber,
    TrailingData,
    InvalidHex,
    Io,
}

impl RasterErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidEndianFlag => "INVALID_ENDIAN_FLAG",
            Self::TruncatedStream => "TRUNCATED_STREAM",
            Self::UnknownPixelType => "UNKNOWN_PIXEL_TYPE",
            Self::MissingPathTerminator => "MISSING_PATH_TERMINATOR",
            Self::InvalidPath => "INVALID_PATH",
            Self::BandCountMismatch => "BAND_COUNT_MISMATCH",
            Self::DimensionMismatch => "DIMENSION_MISMATCH",
            Self::ElementTypeMismatch => "ELEMENT_TYPE_MISMATCH",
            Self::InvalidFieldValue => "INVALID_FIELD_VALUE",
            Self::InvalidBandNumber => "INVALID_BAND_NUMBER",
            Self::TrailingData => "TRAILING_DATA",
            Self::InvalidHex => "INVALID_HEX",
            Self::Io => "IO",
        }
    }
}

impl fmt::Display for RasterErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterError {
    pub code: RasterErrorCode,
    pub message: String,
}

impl RasterError {
    pub fn new(code: RasterErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for RasterError {}

impl From<io::Error> for RasterError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => {
                Self::new(RasterErrorCode::TruncatedStream, "Unexpected end of stream.")
            }
            _ => Self::new(RasterErrorCode::Io, format!("I/O failure: {err}")),
        }
    }
}

pub type Result<T> = std::result::Result<T, RasterError>;
