use std::io::Read;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::debug;

use crate::band::read_band;
use crate::header::{read_endianness, read_header};
use crate::{Endianness, Raster, RasterError, RasterErrorCode, RasterHeader, Result};

/// Decodes one raster from `input`.
///
/// Bytes past the last band are left unconsumed. Paths are scanned one byte
/// at a time, so wrap unbuffered sources in a `BufReader`.
pub fn read<R: Read>(mut input: R) -> Result<Raster> {
    let endianness = read_endianness(&mut input)?;
    match endianness {
        Endianness::Little => read_raster::<R, LittleEndian>(&mut input, endianness),
        Endianness::Big => read_raster::<R, BigEndian>(&mut input, endianness),
    }
}

/// Decodes a buffer holding exactly one raster.
pub fn read_bytes(bytes: &[u8]) -> Result<Raster> {
    let mut input = bytes;
    let raster = read(&mut input)?;
    if !input.is_empty() {
        return Err(RasterError::new(
            RasterErrorCode::TrailingData,
            format!("{} bytes follow the last band.", input.len()),
        ));
    }
    Ok(raster)
}

/// Decodes only the fixed header.
pub fn inspect_raster(bytes: &[u8]) -> Result<RasterHeader> {
    let mut input = bytes;
    let endianness = read_endianness(&mut input)?;
    match endianness {
        Endianness::Little => read_header::<_, LittleEndian>(&mut input, endianness),
        Endianness::Big => read_header::<_, BigEndian>(&mut input, endianness),
    }
}

fn read_raster<R: Read, B: ByteOrder>(input: &mut R, endianness: Endianness) -> Result<Raster> {
    let header = read_header::<R, B>(input, endianness)?;
    debug!(
        "reading {}x{} raster with {} bands, {:?} endian",
        header.width, header.height, header.band_count, endianness
    );

    let mut bands = Vec::with_capacity(usize::from(header.band_count));
    for idx in 0..header.band_count {
        let band = read_band::<R, B>(input, header.width, header.height).map_err(|err| {
            RasterError::new(err.code, format!("band {idx}: {}", err.message))
        })?;
        bands.push(band);
    }

    Ok(Raster {
        version: header.version,
        scale_x: header.scale_x,
        scale_y: header.scale_y,
        ip_x: header.ip_x,
        ip_y: header.ip_y,
        skew_x: header.skew_x,
        skew_y: header.skew_y,
        srid: header.srid,
        width: header.width,
        height: header.height,
        bands,
    })
}
