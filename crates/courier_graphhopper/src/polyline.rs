//! Decoder for the encoded polyline format returned by GraphHopper when
//! `points_encoded` is enabled.
//!
//! Values are stored as `lat, lng` pairs of zig-zag encoded deltas, five bits
//! per character. The scaling factor defaults to `1e5` but GraphHopper reports
//! it as `points_encoded_multiplier`.

use geo_types::Coord;
use thiserror::Error;

pub const DEFAULT_MULTIPLIER: f64 = 1e5;

#[derive(Debug, Error, PartialEq)]
pub enum PolylineError {
    #[error("invalid character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("polyline ends in the middle of a value at position {0}")]
    Truncated(usize),

    #[error("value starting at position {0} overflows")]
    Overflow(usize),

    #[error("invalid multiplier {0}")]
    InvalidMultiplier(f64),
}

/// Decodes `encoded` into coordinates where `x` is the longitude and `y` the
/// latitude.
pub fn decode(encoded: &str, multiplier: f64) -> Result<Vec<Coord<f64>>, PolylineError> {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(PolylineError::InvalidMultiplier(multiplier));
    }

    let bytes = encoded.as_bytes();
    let mut coords = Vec::with_capacity(bytes.len() / 4);
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < bytes.len() {
        lat = accumulate(lat, bytes, &mut index)?;
        lng = accumulate(lng, bytes, &mut index)?;

        coords.push(Coord {
            x: lng as f64 / multiplier,
            y: lat as f64 / multiplier,
        });
    }

    Ok(coords)
}

fn accumulate(total: i64, bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let start = *index;
    total
        .checked_add(next_value(bytes, index)?)
        .ok_or(PolylineError::Overflow(start))
}

fn next_value(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let start = *index;
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let byte = *bytes.get(*index).ok_or(PolylineError::Truncated(*index))?;
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidCharacter {
                character: byte as char,
                position: *index,
            });
        }
        if shift > 60 {
            return Err(PolylineError::Overflow(start));
        }

        *index += 1;
        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}
