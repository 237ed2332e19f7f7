use std::io::{Read, Write};

use byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt};

use crate::consts::{MAX_OFFLINE_BAND_NUMBER, PATH_TERMINATOR};
use crate::matrix::{PixelData, PixelMatrix};
use crate::pixtype::{PixelType, ScalarFormat};
use crate::{RasterError, RasterErrorCode, Result};

pub(crate) fn validate_integer_range(value: f64, min: f64, max: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(RasterError::new(
            RasterErrorCode::InvalidFieldValue,
            format!("Non-finite value: {value}"),
        ));
    }
    if value.fract() != 0.0 {
        return Err(RasterError::new(
            RasterErrorCode::InvalidFieldValue,
            format!("Non-integer value: {value}"),
        ));
    }
    if value < min || value > max {
        return Err(RasterError::new(
            RasterErrorCode::InvalidFieldValue,
            format!("Out-of-range value: {value}"),
        ));
    }
    Ok(value)
}

/// Checks that `value` can be packed as one scalar of `pixel_type`.
pub(crate) fn validate_scalar(pixel_type: &PixelType, value: f64) -> Result<()> {
    if let Some((min, max)) = pixel_type.integer_range() {
        validate_integer_range(value, min, max)?;
        return Ok(());
    }

    // NaN and infinities pass through a float32 unchanged in meaning.
    if pixel_type.scalar_format == ScalarFormat::Float32
        && value.is_finite()
        && f64::from(value as f32) != value
    {
        return Err(RasterError::new(
            RasterErrorCode::InvalidFieldValue,
            format!("Value {value} is not exactly representable as float32."),
        ));
    }
    Ok(())
}

/// Sub-byte types share `u8` storage, so their upper bits need checking.
pub(crate) fn validate_matrix(pixel_type: &PixelType, matrix: &PixelMatrix) -> Result<()> {
    let PixelData::UInt8(values) = matrix.data() else {
        return Ok(());
    };
    if pixel_type.bits >= 8 {
        return Ok(());
    }

    let max = (1_u16 << pixel_type.bits) - 1;
    if let Some((idx, value)) = values
        .iter()
        .enumerate()
        .find(|(_, v)| u16::from(**v) > max)
    {
        return Err(RasterError::new(
            RasterErrorCode::InvalidFieldValue,
            format!(
                "Pixel {idx} value {value} exceeds {} maximum {max}.",
                pixel_type.name
            ),
        ));
    }
    Ok(())
}

pub(crate) fn validate_path(path: &[u8]) -> Result<()> {
    if let Some(pos) = path.iter().position(|b| *b == PATH_TERMINATOR) {
        return Err(RasterError::new(
            RasterErrorCode::InvalidPath,
            format!("Offline band path contains NUL at byte {pos}."),
        ));
    }
    Ok(())
}

/// Converts a 1-based band number to the 0-based wire byte.
pub(crate) fn wire_band_number(band_number: u16) -> Result<u8> {
    if band_number == 0 || band_number > MAX_OFFLINE_BAND_NUMBER {
        return Err(RasterError::new(
            RasterErrorCode::InvalidBandNumber,
            format!(
                "Offline band number must be in 1..={MAX_OFFLINE_BAND_NUMBER}, got {band_number}."
            ),
        ));
    }
    Ok((band_number - 1) as u8)
}

pub(crate) fn write_scalar<W: Write, B: ByteOrder>(
    out: &mut W,
    pixel_type: &PixelType,
    value: f64,
) -> Result<()> {
    validate_scalar(pixel_type, value)?;

    match pixel_type.scalar_format {
        ScalarFormat::Bool | ScalarFormat::UInt8 => out.write_u8(value as u8)?,
        ScalarFormat::Int8 => out.write_i8(value as i8)?,
        ScalarFormat::Int16 => out.write_i16::<B>(value as i16)?,
        ScalarFormat::UInt16 => out.write_u16::<B>(value as u16)?,
        ScalarFormat::Int32 => out.write_i32::<B>(value as i32)?,
        ScalarFormat::UInt32 => out.write_u32::<B>(value as u32)?,
        ScalarFormat::Float32 => out.write_f32::<B>(value as f32)?,
        ScalarFormat::Float64 => out.write_f64::<B>(value)?,
    }
    Ok(())
}

pub(crate) fn read_scalar<R: Read, B: ByteOrder>(
    input: &mut R,
    pixel_type: &PixelType,
) -> Result<f64> {
    let value = match pixel_type.scalar_format {
        ScalarFormat::Bool | ScalarFormat::UInt8 => f64::from(input.read_u8()?),
        ScalarFormat::Int8 => f64::from(input.read_i8()?),
        ScalarFormat::Int16 => f64::from(input.read_i16::<B>()?),
        ScalarFormat::UInt16 => f64::from(input.read_u16::<B>()?),
        ScalarFormat::Int32 => f64::from(input.read_i32::<B>()?),
        ScalarFormat::UInt32 => f64::from(input.read_u32::<B>()?),
        ScalarFormat::Float32 => f64::from(input.read_f32::<B>()?),
        ScalarFormat::Float64 => input.read_f64::<B>()?,
    };

    if let Some((_, max)) = pixel_type.integer_range() {
        if pixel_type.byte_width == 1 && value > max {
            return Err(RasterError::new(
                RasterErrorCode::InvalidFieldValue,
                format!("Value {value} exceeds {} maximum {max}.", pixel_type.name),
            ));
        }
    }
    Ok(value)
}

/// Writes every pixel in row-major order. Callers validate the matrix first.
pub(crate) fn write_pixels<W: Write, B: ByteOrder>(out: &mut W, data: &PixelData) -> Result<()> {
    match data {
        PixelData::Bool(v) => {
            let bytes: Vec<u8> = v.iter().map(|x| u8::from(*x)).collect();
            out.write_all(&bytes)?;
        }
        PixelData::Int8(v) => {
            let bytes: Vec<u8> = v.iter().map(|x| *x as u8).collect();
            out.write_all(&bytes)?;
        }
        PixelData::UInt8(v) => out.write_all(v)?,
        PixelData::Int16(v) => {
            let mut bytes = vec![0_u8; v.len() * 2];
            B::write_i16_into(v, &mut bytes);
            out.write_all(&bytes)?;
        }
        PixelData::UInt16(v) => {
            let mut bytes = vec![0_u8; v.len() * 2];
            B::write_u16_into(v, &mut bytes);
            out.write_all(&bytes)?;
        }
        PixelData::Int32(v) => {
            let mut bytes = vec![0_u8; v.len() * 4];
            B::write_i32_into(v, &mut bytes);
            out.write_all(&bytes)?;
        }
        PixelData::UInt32(v) => {
            let mut bytes = vec![0_u8; v.len() * 4];
            B::write_u32_into(v, &mut bytes);
            out.write_all(&bytes)?;
        }
        PixelData::Float32(v) => {
            let mut bytes = vec![0_u8; v.len() * 4];
            B::write_f32_into(v, &mut bytes);
            out.write_all(&bytes)?;
        }
        PixelData::Float64(v) => {
            let mut bytes = vec![0_u8; v.len() * 8];
            B::write_f64_into(v, &mut bytes);
            out.write_all(&bytes)?;
        }
    }
    Ok(())
}

/// Reads `count` row-major pixels of `pixel_type`.
pub(crate) fn read_pixels<R: Read, B: ByteOrder>(
    input: &mut R,
    pixel_type: &PixelType,
    count: usize,
) -> Result<PixelData> {
    let bytes = read_exact_vec(input, count, pixel_type.byte_width)?;

    let data = match pixel_type.element_type {
        crate::ElementType::Bool => {
            if let Some(pos) = bytes.iter().position(|b| *b > 1) {
                return Err(RasterError::new(
                    RasterErrorCode::InvalidFieldValue,
                    format!("Pixel {pos} holds {} in a boolean band.", bytes[pos]),
                ));
            }
            PixelData::Bool(bytes.iter().map(|b| *b == 1).collect())
        }
        crate::ElementType::Int8 => PixelData::Int8(bytes.iter().map(|b| *b as i8).collect()),
        crate::ElementType::UInt8 => {
            let max = (1_u16 << pixel_type.bits.min(8)) - 1;
            if let Some(pos) = bytes.iter().position(|b| u16::from(*b) > max) {
                return Err(RasterError::new(
                    RasterErrorCode::InvalidFieldValue,
                    format!(
                        "Pixel {pos} value {} exceeds {} maximum {max}.",
                        bytes[pos], pixel_type.name
                    ),
                ));
            }
            PixelData::UInt8(bytes)
        }
        crate::ElementType::Int16 => {
            let mut values = vec![0_i16; count];
            B::read_i16_into(&bytes, &mut values);
            PixelData::Int16(values)
        }
        crate::ElementType::UInt16 => {
            let mut values = vec![0_u16; count];
            B::read_u16_into(&bytes, &mut values);
            PixelData::UInt16(values)
        }
        crate::ElementType::Int32 => {
            let mut values = vec![0_i32; count];
            B::read_i32_into(&bytes, &mut values);
            PixelData::Int32(values)
        }
        crate::ElementType::UInt32 => {
            let mut values = vec![0_u32; count];
            B::read_u32_into(&bytes, &mut values);
            PixelData::UInt32(values)
        }
        crate::ElementType::Float32 => {
            let mut values = vec![0_f32; count];
            B::read_f32_into(&bytes, &mut values);
            PixelData::Float32(values)
        }
        crate::ElementType::Float64 => {
            let mut values = vec![0_f64; count];
            B::read_f64_into(&bytes, &mut values);
            PixelData::Float64(values)
        }
    };
    Ok(data)
}

/// Reads `count * width` bytes without trusting the count for the initial
/// allocation, so a truncated stream fails before a huge buffer is made.
fn read_exact_vec<R: Read>(input: &mut R, count: usize, width: usize) -> Result<Vec<u8>> {
    let byte_len = count.checked_mul(width).ok_or_else(|| {
        RasterError::new(
            RasterErrorCode::InvalidFieldValue,
            "Pixel payload length overflow.",
        )
    })?;

    let mut bytes = Vec::new();
    input.by_ref().take(byte_len as u64).read_to_end(&mut bytes)?;
    if bytes.len() != byte_len {
        return Err(RasterError::new(
            RasterErrorCode::TruncatedStream,
            format!(
                "Pixel payload truncated. expected={byte_len} got={}",
                bytes.len()
            ),
        ));
    }
    Ok(bytes)
}

/// Reads a NUL-terminated path, consuming the terminator.
pub(crate) fn read_path<R: Read>(input: &mut R) -> Result<Vec<u8>> {
    let mut path = Vec::new();
    loop {
        let byte = match input.read_u8() {
            Ok(byte) => byte,
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(RasterError::new(
                    RasterErrorCode::MissingPathTerminator,
                    format!("Stream ended after {} path bytes without NUL.", path.len()),
                ));
            }
            Err(err) => return Err(err.into()),
        };
        if byte == PATH_TERMINATOR {
            return Ok(path);
        }
        path.push(byte);
    }
}

#[cfg(test)]
mod tests {
    use byteorder::{BigEndian, LittleEndian};

    use super::*;
    use crate::pixtype::PIXEL_TYPES;

    fn by_code(code: u8) -> &'static PixelType {
        PixelType::from_code(code).expect("known code")
    }

    #[test]
    fn scalar_honours_byte_order() {
        let mut le = Vec::new();
        write_scalar::<_, LittleEndian>(&mut le, by_code(6), 0x1234 as f64).expect("write");
        assert_eq!(le, vec![0x34, 0x12]);

        let mut be = Vec::new();
        write_scalar::<_, BigEndian>(&mut be, by_code(6), 0x1234 as f64).expect("write");
        assert_eq!(be, vec![0x12, 0x34]);
    }

    #[test]
    fn scalar_boundaries_survive_every_type() {
        for pixel_type in PIXEL_TYPES.iter() {
            let mut candidates = vec![0.0];
            match pixel_type.integer_range() {
                Some((min, max)) => {
                    candidates.push(min);
                    candidates.push(max);
                }
                None => candidates.push(-0.375),
            }

            for value in candidates {
                let mut bytes = Vec::new();
                write_scalar::<_, BigEndian>(&mut bytes, pixel_type, value).expect("write");
                assert_eq!(bytes.len(), pixel_type.byte_width);

                let decoded =
                    read_scalar::<_, BigEndian>(&mut bytes.as_slice(), pixel_type).expect("read");
                assert_eq!(decoded, value, "{}", pixel_type.name);
            }
        }
    }

    #[test]
    fn scalar_rejects_overflowing_values() {
        let mut out = Vec::new();
        for (code, value) in [(0, 2.0), (1, 4.0), (2, 16.0), (3, -129.0), (8, -1.0), (7, 0.5)] {
            let error = write_scalar::<_, LittleEndian>(&mut out, by_code(code), value)
                .expect_err("should reject");
            assert_eq!(error.code, RasterErrorCode::InvalidFieldValue);
        }
        assert!(out.is_empty());
    }

    #[test]
    fn float32_scalar_must_be_exact() {
        let float32 = by_code(10);
        for value in [0.1, 1.0e-50, f64::MAX, 16_777_217.0] {
            let error = validate_scalar(float32, value).expect_err("inexact float32");
            assert_eq!(error.code, RasterErrorCode::InvalidFieldValue, "{value}");
        }
        for value in [f64::from(0.1_f32), 16_777_216.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(validate_scalar(float32, value).is_ok(), "{value}");
        }
        assert!(validate_scalar(by_code(11), 0.1).is_ok());
    }

    #[test]
    fn read_scalar_rejects_sub_byte_overflow() {
        let error =
            read_scalar::<_, LittleEndian>(&mut [4_u8].as_slice(), by_code(1)).expect_err("uint2");
        assert_eq!(error.code, RasterErrorCode::InvalidFieldValue);
    }

    #[test]
    fn read_scalar_reports_truncation() {
        let error =
            read_scalar::<_, LittleEndian>(&mut [1_u8, 2].as_slice(), by_code(11)).expect_err("f64");
        assert_eq!(error.code, RasterErrorCode::TruncatedStream);
    }

    #[test]
    fn pixels_roundtrip_row_major() {
        let data = PixelData::Int16(vec![-2, -1, 0, 1, 2, i16::MAX]);
        let mut bytes = Vec::new();
        write_pixels::<_, BigEndian>(&mut bytes, &data).expect("write");
        assert_eq!(&bytes[..4], &[0xff, 0xfe, 0xff, 0xff]);

        let decoded =
            read_pixels::<_, BigEndian>(&mut bytes.as_slice(), by_code(5), 6).expect("read");
        assert_eq!(decoded, data);
    }

    #[test]
    fn read_pixels_reports_truncation() {
        let error = read_pixels::<_, LittleEndian>(&mut [0_u8; 7].as_slice(), by_code(7), 2)
            .expect_err("short");
        assert_eq!(error.code, RasterErrorCode::TruncatedStream);
    }

    #[test]
    fn read_pixels_rejects_invalid_bool() {
        let error = read_pixels::<_, LittleEndian>(&mut [0_u8, 1, 2].as_slice(), by_code(0), 3)
            .expect_err("bool");
        assert_eq!(error.code, RasterErrorCode::InvalidFieldValue);
    }

    #[test]
    fn path_reading_stops_at_nul() {
        let mut input: &[u8] = b"/tmp/a.tif\0rest";
        assert_eq!(read_path(&mut input).expect("path"), b"/tmp/a.tif".to_vec());
        assert_eq!(input, b"rest");

        let error = read_path(&mut &b"/tmp/no-end"[..]).expect_err("no nul");
        assert_eq!(error.code, RasterErrorCode::MissingPathTerminator);
    }

    #[test]
    fn band_numbers_convert_to_zero_based() {
        assert_eq!(wire_band_number(1).expect("first"), 0);
        assert_eq!(wire_band_number(256).expect("last"), 255);
        assert!(wire_band_number(0).is_err());
        assert!(wire_band_number(257).is_err());
    }

    #[test]
    fn path_with_nul_is_rejected() {
        let error = validate_path(b"a\0b").expect_err("nul");
        assert_eq!(error.code, RasterErrorCode::InvalidPath);
        assert!(validate_path("/données/é.tif".as_bytes()).is_ok());
    }
}
