/// Endian flag through height: 1 + 2 + 2 + 6 * 8 + 4 + 2 + 2 bytes.
pub const RASTER_HEADER_LENGTH: usize = 61;

pub(crate) const ENDIAN_FLAG_BIG: u8 = 0;
pub(crate) const ENDIAN_FLAG_LITTLE: u8 = 1;

pub(crate) const BAND_FLAG_IS_OFFLINE: u8 = 0x80;
pub(crate) const BAND_FLAG_HAS_NODATA: u8 = 0x40;
pub(crate) const BAND_FLAG_IS_NODATA: u8 = 0x20;
pub(crate) const BAND_FLAG_RESERVED: u8 = 0x10;
pub(crate) const BAND_FLAG_PIXTYPE_MASK: u8 = 0x0f;

pub(crate) const PATH_TERMINATOR: u8 = 0x00;

/// Offline band numbers are stored 0-based in a single byte.
pub(crate) const MAX_OFFLINE_BAND_NUMBER: u16 = 256;
