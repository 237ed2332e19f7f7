//! One band record: flag byte, nodata scalar, then either the inline pixels
//! or an external band reference.

use std::io::{Read, Write};

use byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt};
use log::{trace, warn};

use crate::common::{
    read_path, read_pixels, read_scalar, wire_band_number, write_pixels, write_scalar,
};
use crate::consts::{
    BAND_FLAG_HAS_NODATA, BAND_FLAG_IS_NODATA, BAND_FLAG_IS_OFFLINE, BAND_FLAG_PIXTYPE_MASK,
    BAND_FLAG_RESERVED, PATH_TERMINATOR,
};
use crate::matrix::PixelMatrix;
use crate::pixtype::PixelType;
use crate::{Band, BandPayload, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BandFlags {
    pub is_offline: bool,
    pub has_nodata_value: bool,
    pub is_nodata_value: bool,
    pub pixtype: u8,
}

impl BandFlags {
    pub(crate) fn pack(self) -> u8 {
        let mut value = self.pixtype & BAND_FLAG_PIXTYPE_MASK;
        if self.is_offline {
            value |= BAND_FLAG_IS_OFFLINE;
        }
        if self.has_nodata_value {
            value |= BAND_FLAG_HAS_NODATA;
        }
        if self.is_nodata_value {
            value |= BAND_FLAG_IS_NODATA;
        }
        value
    }

    pub(crate) fn unpack(value: u8) -> Self {
        Self {
            is_offline: value & BAND_FLAG_IS_OFFLINE != 0,
            has_nodata_value: value & BAND_FLAG_HAS_NODATA != 0,
            is_nodata_value: value & BAND_FLAG_IS_NODATA != 0,
            pixtype: value & BAND_FLAG_PIXTYPE_MASK,
        }
    }
}

/// Writes `band` in order `B`. The enclosing raster must already validate.
pub(crate) fn write_band<W: Write, B: ByteOrder>(out: &mut W, band: &Band) -> Result<()> {
    let pixel_type = PixelType::from_code(band.pixtype)?;

    let flags = BandFlags {
        is_offline: band.is_offline(),
        has_nodata_value: band.has_nodata_value,
        is_nodata_value: band.is_nodata_value,
        pixtype: pixel_type.code,
    };
    out.write_u8(flags.pack())?;
    write_scalar::<W, B>(out, pixel_type, band.nodata)?;

    match &band.payload {
        BandPayload::Offline { band_number, path } => {
            out.write_u8(wire_band_number(*band_number)?)?;
            out.write_all(path)?;
            out.write_u8(PATH_TERMINATOR)?;
        }
        BandPayload::Inline(matrix) => write_pixels::<W, B>(out, matrix.data())?,
    }
    Ok(())
}

/// Reads one band of a `width` x `height` raster in order `B`.
pub(crate) fn read_band<R: Read, B: ByteOrder>(
    input: &mut R,
    width: u16,
    height: u16,
) -> Result<Band> {
    let raw_flags = input.read_u8()?;
    if raw_flags & BAND_FLAG_RESERVED != 0 {
        warn!("band flag byte {raw_flags:#04x} has the reserved bit set");
    }
    let flags = BandFlags::unpack(raw_flags);

    let pixel_type = PixelType::from_code(flags.pixtype)?;
    let nodata = read_scalar::<R, B>(input, pixel_type)?;

    let payload = if flags.is_offline {
        let band_number = u16::from(input.read_u8()?) + 1;
        let path = read_path(input)?;
        trace!(
            "offline {} band {band_number}, path of {} bytes",
            pixel_type.name,
            path.len()
        );
        BandPayload::Offline { band_number, path }
    } else {
        let count = usize::from(width) * usize::from(height);
        let data = read_pixels::<R, B>(input, pixel_type, count)?;
        trace!("inline {} band, {count} pixels", pixel_type.name);
        BandPayload::Inline(PixelMatrix::from_data(width, height, data)?)
    };

    Ok(Band {
        has_nodata_value: flags.has_nodata_value,
        is_nodata_value: flags.is_nodata_value,
        pixtype: pixel_type.code,
        nodata,
        payload,
    })
}
