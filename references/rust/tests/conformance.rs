use std::fs;
use std::path::PathBuf;

use wkb_raster::{
    inspect_raster, read, read_hex, write_hex, write_with_endianness, Band, BandPayload,
    ElementType, Endianness, PixelData, PixelMatrix, Raster, RasterErrorCode,
};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from("../../test/fixtures").join(name)
}

fn fixture_bytes(name: &str) -> Vec<u8> {
    let text = fs::read_to_string(fixture_path(name)).expect("read fixture");
    hex::decode(text.trim()).expect("fixture is hex")
}

fn scenario() -> Raster {
    let matrix = PixelMatrix::from_data(2, 2, PixelData::UInt8(vec![1, 2, 3, 4])).expect("matrix");
    Raster {
        version: 0,
        scale_x: 1.0,
        scale_y: -1.0,
        ip_x: 0.0,
        ip_y: 0.0,
        skew_x: 0.0,
        skew_y: 0.0,
        srid: 4326,
        width: 2,
        height: 2,
        bands: vec![Band {
            has_nodata_value: false,
            is_nodata_value: false,
            pixtype: 4,
            nodata: 0.0,
            payload: BandPayload::Inline(matrix),
        }],
    }
}

#[test]
fn scenario_fixtures_match_encoder_in_both_orders() {
    let le = fixture_bytes("scenario-le.hex");
    let be = fixture_bytes("scenario-be.hex");

    assert_eq!(write_with_endianness(&scenario(), Endianness::Little).expect("le"), le);
    assert_eq!(write_with_endianness(&scenario(), Endianness::Big).expect("be"), be);

    assert_eq!(read(le.as_slice()).expect("decode le"), scenario());
    assert_eq!(read(be.as_slice()).expect("decode be"), scenario());
}

#[test]
fn decodes_offline_fixture() {
    let bytes = fixture_bytes("offline-be.hex");
    let raster = read(bytes.as_slice()).expect("decode offline fixture");

    assert_eq!((raster.width, raster.height), (256, 256));
    assert_eq!(raster.bands.len(), 1);
    let band = &raster.bands[0];
    assert!(band.is_offline());
    assert!(band.has_nodata_value);
    assert_eq!(band.pixtype, 6);
    assert_eq!(band.nodata, 65535.0);
    assert_eq!(
        band.payload,
        BandPayload::Offline {
            band_number: 1,
            path: "/data/rasters/ñandú.tif".as_bytes().to_vec(),
        }
    );

    let reencoded = write_with_endianness(&raster, Endianness::Big).expect("re-encode");
    assert_eq!(reencoded, bytes);
}

#[test]
fn decodes_multiband_fixture() {
    let bytes = fixture_bytes("multiband-le.hex");
    let header = inspect_raster(&bytes).expect("inspect");
    assert_eq!(header.endianness, Endianness::Little);
    assert_eq!(header.band_count, 4);
    assert_eq!(header.srid, 6668);
    assert_eq!((header.skew_x, header.skew_y), (0.001, -0.002));

    let raster = read(bytes.as_slice()).expect("decode multiband fixture");
    let kinds: Vec<Option<ElementType>> = raster
        .bands
        .iter()
        .map(|band| match &band.payload {
            BandPayload::Inline(matrix) => Some(matrix.element_type()),
            BandPayload::Offline { .. } => None,
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            Some(ElementType::Int16),
            Some(ElementType::Float64),
            Some(ElementType::UInt8),
            None,
        ]
    );

    let BandPayload::Inline(int16) = &raster.bands[0].payload else {
        panic!("band 0 is inline");
    };
    assert_eq!(
        int16.data(),
        &PixelData::Int16(vec![-32768, -1, 0, 1, 1000, 32767])
    );
    assert_eq!(raster.bands[0].nodata, -32768.0);

    let BandPayload::Inline(float64) = &raster.bands[1].payload else {
        panic!("band 1 is inline");
    };
    assert_eq!(float64.get_at(0, 0), Some(0.1));
    assert_eq!(float64.get_at(0, 2), Some(1e300));
    assert_eq!(float64.get_at(1, 0), Some(-1e-300));

    let BandPayload::Inline(uint4) = &raster.bands[2].payload else {
        panic!("band 2 is inline");
    };
    assert_eq!(raster.bands[2].pixtype, 2);
    assert_eq!(uint4.data(), &PixelData::UInt8(vec![0, 1, 7, 8, 14, 15]));

    let offline = &raster.bands[3];
    assert!(offline.has_nodata_value && offline.is_nodata_value);
    assert_eq!(offline.nodata, -9999.0);
    assert_eq!(
        offline.payload,
        BandPayload::Offline {
            band_number: 5,
            path: b"/vsis3/bucket/tile.tif".to_vec(),
        }
    );

    let reencoded = write_with_endianness(&raster, Endianness::Little).expect("re-encode");
    assert_eq!(reencoded, bytes);
}

#[test]
fn hex_fixture_text_roundtrips() {
    let text = fs::read_to_string(fixture_path("scenario-le.hex")).expect("read fixture");
    let raster = read_hex(&text).expect("decode hex");
    assert_eq!(raster, scenario());

    let native = write_hex(&raster).expect("encode hex");
    assert_eq!(read_hex(&native).expect("decode native hex"), scenario());
}

#[test]
fn every_pixel_type_roundtrips_single_pixel() {
    let cases: [(u8, PixelData, f64); 11] = [
        (0, PixelData::Bool(vec![true]), 1.0),
        (1, PixelData::UInt8(vec![3]), 3.0),
        (2, PixelData::UInt8(vec![15]), 15.0),
        (3, PixelData::Int8(vec![i8::MIN]), f64::from(i8::MAX)),
        (4, PixelData::UInt8(vec![u8::MAX]), 0.0),
        (5, PixelData::Int16(vec![i16::MIN]), f64::from(i16::MAX)),
        (6, PixelData::UInt16(vec![u16::MAX]), 0.0),
        (7, PixelData::Int32(vec![i32::MIN]), f64::from(i32::MAX)),
        (8, PixelData::UInt32(vec![u32::MAX]), f64::from(u32::MAX)),
        (10, PixelData::Float32(vec![0.1]), f64::from(0.1_f32)),
        (11, PixelData::Float64(vec![0.1]), std::f64::consts::PI),
    ];

    for (pixtype, data, nodata) in cases {
        let raster = Raster {
            width: 1,
            height: 1,
            bands: vec![Band {
                has_nodata_value: true,
                is_nodata_value: false,
                pixtype,
                nodata,
                payload: BandPayload::Inline(
                    PixelMatrix::from_data(1, 1, data).expect("matrix"),
                ),
            }],
            ..scenario()
        };

        for endianness in [Endianness::Little, Endianness::Big] {
            let bytes = write_with_endianness(&raster, endianness).expect("encode");
            let decoded = read(bytes.as_slice()).expect("decode");
            assert_eq!(decoded, raster, "pixtype {pixtype} {endianness:?}");
        }
    }
}

#[test]
fn float64_nodata_is_not_narrowed() {
    let mut raster = scenario();
    raster.bands[0] = Band {
        has_nodata_value: true,
        is_nodata_value: false,
        pixtype: 11,
        nodata: 0.1,
        payload: BandPayload::Inline(PixelMatrix::new(ElementType::Float64, 2, 2)),
    };
    let bytes = write_with_endianness(&raster, Endianness::Big).expect("encode");
    let decoded = read(bytes.as_slice()).expect("decode");
    assert_eq!(decoded.bands[0].nodata, 0.1);
    assert_ne!(decoded.bands[0].nodata, f64::from(0.1_f32));
}

#[test]
fn rejects_unknown_pixtype_fixture_corruption() {
    let mut bytes = fixture_bytes("scenario-le.hex");
    bytes[wkb_raster::RASTER_HEADER_LENGTH] = 0x09;
    let error = read(bytes.as_slice()).expect_err("pixtype 9");
    assert_eq!(error.code, RasterErrorCode::UnknownPixelType);
}
