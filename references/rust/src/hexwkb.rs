//! Hex text form of raster WKB, as printed by PostGIS for `raster` values.

use crate::{read_bytes, write, Raster, RasterError, RasterErrorCode, Result};

/// Decodes hex WKB. Either letter case is accepted.
pub fn read_hex(text: &str) -> Result<Raster> {
    let bytes = hex::decode(text.trim()).map_err(|err| {
        RasterError::new(
            RasterErrorCode::InvalidHex,
            format!("Could not decode hex WKB: {err}"),
        )
    })?;
    read_bytes(&bytes)
}

/// Encodes `raster` as upper-case hex WKB in the host byte order.
pub fn write_hex(raster: &Raster) -> Result<String> {
    Ok(hex::encode_upper(write(raster)?))
}
