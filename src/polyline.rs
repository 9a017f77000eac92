//! Encoded-polyline codec (delta-coded base-32 character stream).
//!
//! Directions providers ship step geometries at precision 6; decoding is
//! lossless at that precision and `encode` reproduces the exact input string
//! for any string produced by a conforming encoder.

use thiserror::Error;

use crate::models::Coordinate;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid polyline character {byte:#04x} at offset {offset}")]
    InvalidCharacter { byte: u8, offset: usize },
    /// The string ended in the middle of a varint or after a latitude
    /// without its longitude.
    #[error("polyline ended prematurely at offset {offset}")]
    UnexpectedEnd { offset: usize },
    /// A continuation run longer than a 64-bit delta can hold.
    #[error("delta at offset {offset} exceeds the value range")]
    OverlongDelta { offset: usize },
}

/// Decode an encoded polyline into ordered (lat, lon) pairs.
pub fn decode(encoded: &str, precision: u32) -> Result<Vec<Coordinate>, DecodeError> {
    let factor = 10f64.powi(precision as i32);
    let bytes = encoded.as_bytes();
    let mut offset = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;
    let mut coordinates = Vec::new();

    while offset < bytes.len() {
        lat += read_delta(bytes, &mut offset)?;
        lon += read_delta(bytes, &mut offset)?;
        coordinates.push(Coordinate {
            lat: lat as f64 / factor,
            lon: lon as f64 / factor,
        });
    }

    Ok(coordinates)
}

/// Encode coordinates at the given precision. `decode(encode(c)) == c` for
/// coordinates that are exact multiples of the precision unit.
pub fn encode(coordinates: &[Coordinate], precision: u32) -> String {
    let factor = 10f64.powi(precision as i32);
    let mut output = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lon: i64 = 0;

    for coordinate in coordinates {
        let lat = (coordinate.lat * factor).round() as i64;
        let lon = (coordinate.lon * factor).round() as i64;
        write_delta(lat - prev_lat, &mut output);
        write_delta(lon - prev_lon, &mut output);
        prev_lat = lat;
        prev_lon = lon;
    }

    output
}

fn read_delta(bytes: &[u8], offset: &mut usize) -> Result<i64, DecodeError> {
    let mut shift = 0u32;
    let mut accumulator: i64 = 0;

    loop {
        let Some(&byte) = bytes.get(*offset) else {
            return Err(DecodeError::UnexpectedEnd { offset: *offset });
        };
        if !(63..=127).contains(&byte) {
            return Err(DecodeError::InvalidCharacter {
                byte,
                offset: *offset,
            });
        }
        *offset += 1;

        let chunk = (byte - 63) as i64;
        accumulator |= (chunk & 0x1f) << shift;
        if chunk < 0x20 {
            break;
        }
        shift += 5;
        if shift > 63 {
            return Err(DecodeError::OverlongDelta { offset: *offset });
        }
    }

    // Zigzag: lowest bit carries the sign.
    if accumulator & 1 == 1 {
        Ok(!(accumulator >> 1))
    } else {
        Ok(accumulator >> 1)
    }
}

fn write_delta(value: i64, output: &mut String) {
    let mut value = if value < 0 { !(value << 1) } else { value << 1 };
    while value >= 0x20 {
        output.push((((value & 0x1f) | 0x20) as u8 + 63) as char);
        value >>= 5;
    }
    output.push((value as u8 + 63) as char);
}
