use std::io::{Read, Write};

use byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt};

use crate::{Endianness, Raster, RasterError, RasterErrorCode, RasterHeader, Result};

/// Reads the endian flag that governs every later multi-byte field.
pub(crate) fn read_endianness<R: Read>(input: &mut R) -> Result<Endianness> {
    let flag = input.read_u8().map_err(|err| {
        let err = RasterError::from(err);
        RasterError::new(err.code, format!("endianness flag: {}", err.message))
    })?;
    Endianness::from_flag(flag)
}

/// Writes the flag byte and the fixed header fields in order `B`.
pub(crate) fn write_header<W: Write, B: ByteOrder>(
    out: &mut W,
    endianness: Endianness,
    raster: &Raster,
) -> Result<()> {
    let band_count = u16::try_from(raster.bands.len()).map_err(|_| {
        RasterError::new(
            RasterErrorCode::BandCountMismatch,
            format!("Band count {} does not fit uint16.", raster.bands.len()),
        )
    })?;

    out.write_u8(endianness.flag())?;
    out.write_u16::<B>(raster.version)?;
    out.write_u16::<B>(band_count)?;
    out.write_f64::<B>(raster.scale_x)?;
    out.write_f64::<B>(raster.scale_y)?;
    out.write_f64::<B>(raster.ip_x)?;
    out.write_f64::<B>(raster.ip_y)?;
    out.write_f64::<B>(raster.skew_x)?;
    out.write_f64::<B>(raster.skew_y)?;
    out.write_i32::<B>(raster.srid)?;
    out.write_u16::<B>(raster.width)?;
    out.write_u16::<B>(raster.height)?;
    Ok(())
}

/// Reads the header fields that follow an already consumed endian flag.
pub(crate) fn read_header<R: Read, B: ByteOrder>(
    input: &mut R,
    endianness: Endianness,
) -> Result<RasterHeader> {
    Ok(RasterHeader {
        endianness,
        version: input.read_u16::<B>()?,
        band_count: input.read_u16::<B>()?,
        scale_x: input.read_f64::<B>()?,
        scale_y: input.read_f64::<B>()?,
        ip_x: input.read_f64::<B>()?,
        ip_y: input.read_f64::<B>()?,
        skew_x: input.read_f64::<B>()?,
        skew_y: input.read_f64::<B>()?,
        srid: input.read_i32::<B>()?,
        width: input.read_u16::<B>()?,
        height: input.read_u16::<B>()?,
    })
}
