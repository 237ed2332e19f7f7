use std::io::Write;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::debug;

use crate::band::write_band;
use crate::consts::RASTER_HEADER_LENGTH;
use crate::header::write_header;
use crate::{BandPayload, Endianness, Raster, Result};

/// Encodes `raster` in the host byte order.
pub fn write(raster: &Raster) -> Result<Vec<u8>> {
    write_with_endianness(raster, Endianness::native())
}

pub fn write_with_endianness(raster: &Raster, endianness: Endianness) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(estimated_length(raster));
    write_to(&mut bytes, raster, endianness)?;
    Ok(bytes)
}

/// Streams `raster` into `out`. Nothing is written unless the whole raster
/// validates.
pub fn write_to<W: Write>(out: &mut W, raster: &Raster, endianness: Endianness) -> Result<()> {
    raster.validate()?;
    debug!(
        "writing {}x{} raster with {} bands, {:?} endian",
        raster.width,
        raster.height,
        raster.bands.len(),
        endianness
    );

    match endianness {
        Endianness::Little => write_raster::<W, LittleEndian>(out, raster, endianness),
        Endianness::Big => write_raster::<W, BigEndian>(out, raster, endianness),
    }
}

fn write_raster<W: Write, B: ByteOrder>(
    out: &mut W,
    raster: &Raster,
    endianness: Endianness,
) -> Result<()> {
    write_header::<W, B>(out, endianness, raster)?;
    for band in &raster.bands {
        write_band::<W, B>(out, band)?;
    }
    Ok(())
}

fn estimated_length(raster: &Raster) -> usize {
    let bands: usize = raster
        .bands
        .iter()
        .map(|band| {
            let scalar = band.pixel_type().map_or(0, |v| v.byte_width);
            let body = match &band.payload {
                BandPayload::Inline(matrix) => matrix.len() * scalar,
                BandPayload::Offline { path, .. } => path.len() + 2,
            };
            1 + scalar + body
        })
        .sum();
    RASTER_HEADER_LENGTH + bands
}
