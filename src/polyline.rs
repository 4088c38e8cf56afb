//! Polyline Codec Module
//!
//! Lossless conversion between the compact encoded polyline format and a
//! coordinate path. Interoperates byte-for-byte with the common Google
//! polyline algorithm: signed deltas, zig-zag encoded, 1e5 scale factor,
//! 6-bit groups offset by 63.
//!
//! Decoding is lenient by default: malformed input stops decoding early and
//! the partial result carries a `truncated` flag. `decode_strict` is the
//! validating variant.

use thiserror::Error;

use crate::models::LatLng;

/// Scale factor between degrees and encoded integer units.
const SCALE: f64 = 1e5;

// == Decode Error ==
/// Strict-mode decoding failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The string ended in the middle of a coordinate value
    #[error("Encoded polyline ends mid-coordinate at offset {0}")]
    UnexpectedEnd(usize),

    /// A byte below the encoding's 63 offset appeared in the input
    #[error("Invalid polyline byte {byte:#04x} at offset {offset}")]
    InvalidByte { byte: u8, offset: usize },
}

// == Decoded Polyline ==
/// Result of a lenient decode.
///
/// `truncated` is set when decoding stopped before consuming the whole
/// input; `points` then holds the prefix decoded so far.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPolyline {
    pub points: Vec<LatLng>,
    pub truncated: bool,
}

// == Decode ==
/// Decodes an encoded polyline, best-effort.
///
/// Never fails: an empty string yields zero points, and a truncated or
/// malformed tail simply stops decoding early with `truncated` set.
pub fn decode(encoded: &str) -> DecodedPolyline {
    let (points, error) = decode_inner(encoded);
    DecodedPolyline {
        points,
        truncated: error.is_some(),
    }
}

/// Decodes an encoded polyline, failing on malformed input.
pub fn decode_strict(encoded: &str) -> Result<Vec<LatLng>, DecodeError> {
    let (points, error) = decode_inner(encoded);
    match error {
        None => Ok(points),
        Some(error) => Err(error),
    }
}

fn decode_inner(encoded: &str) -> (Vec<LatLng>, Option<DecodeError>) {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut points = Vec::new();

    while index < bytes.len() {
        let delta_lat = match read_delta(bytes, &mut index) {
            Ok(delta) => delta,
            Err(error) => return (points, Some(error)),
        };
        lat += delta_lat;

        let delta_lng = match read_delta(bytes, &mut index) {
            Ok(delta) => delta,
            Err(error) => return (points, Some(error)),
        };
        lng += delta_lng;

        points.push(LatLng {
            lat: lat as f64 / SCALE,
            lng: lng as f64 / SCALE,
        });
    }

    (points, None)
}

/// Reads one zig-zag encoded delta: successive 6-bit groups (byte minus 63),
/// low 5 bits of each group contributing to the value, bit 5 signalling
/// continuation. Latitude is read before longitude for each point.
fn read_delta(bytes: &[u8], index: &mut usize) -> Result<i64, DecodeError> {
    let mut value: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = match bytes.get(*index) {
            Some(byte) => *byte,
            None => return Err(DecodeError::UnexpectedEnd(*index)),
        };
        if byte < 63 {
            return Err(DecodeError::InvalidByte {
                byte,
                offset: *index,
            });
        }
        *index += 1;

        let group = (byte - 63) as i64;
        value |= (group & 0x1f) << shift;
        shift += 5;

        if group & 0x20 == 0 {
            break;
        }
        // A coordinate delta never needs more than 12 groups; treat a longer
        // run as a malformed tail rather than shifting past 64 bits.
        if shift >= 60 {
            return Err(DecodeError::UnexpectedEnd(*index));
        }
    }

    // Zig-zag: low bit is the sign.
    if value & 1 == 1 {
        Ok(!(value >> 1))
    } else {
        Ok(value >> 1)
    }
}

// == Encode ==
/// Encodes a coordinate path into the compact polyline format.
pub fn encode(points: &[LatLng]) -> String {
    let mut output = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for point in points {
        let lat = (point.lat * SCALE).round() as i64;
        let lng = (point.lng * SCALE).round() as i64;
        write_delta(lat - prev_lat, &mut output);
        write_delta(lng - prev_lng, &mut output);
        prev_lat = lat;
        prev_lng = lng;
    }

    output
}

fn write_delta(delta: i64, output: &mut String) {
    // Zig-zag: fold the sign into the low bit.
    let zigzag = if delta < 0 { !(delta << 1) } else { delta << 1 };
    let mut value = zigzag as u64;

    loop {
        let mut group = (value & 0x1f) as u8;
        value >>= 5;
        if value > 0 {
            group |= 0x20;
        }
        output.push((group + 63) as char);
        if value == 0 {
            break;
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Reference vector from the polyline algorithm documentation.
    const REFERENCE_ENCODED: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn reference_points() -> Vec<LatLng> {
        vec![
            LatLng { lat: 38.5, lng: -120.2 },
            LatLng { lat: 40.7, lng: -120.95 },
            LatLng { lat: 43.252, lng: -126.453 },
        ]
    }

    fn assert_close(a: &[LatLng], b: &[LatLng]) {
        assert_eq!(a.len(), b.len());
        for (left, right) in a.iter().zip(b) {
            assert!((left.lat - right.lat).abs() <= 1e-5, "{left:?} vs {right:?}");
            assert!((left.lng - right.lng).abs() <= 1e-5, "{left:?} vs {right:?}");
        }
    }

    #[test]
    fn test_decode_reference_vector() {
        let decoded = decode(REFERENCE_ENCODED);
        assert!(!decoded.truncated);
        assert_close(&decoded.points, &reference_points());
    }

    #[test]
    fn test_encode_reference_vector() {
        assert_eq!(encode(&reference_points()), REFERENCE_ENCODED);
    }

    #[test]
    fn test_decode_empty_string() {
        let decoded = decode("");
        assert!(decoded.points.is_empty());
        assert!(!decoded.truncated);
    }

    #[test]
    fn test_encode_empty_path() {
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn test_decode_truncated_returns_prefix() {
        // Dropping the final byte leaves the last longitude mid-value.
        let truncated_input = &REFERENCE_ENCODED[..REFERENCE_ENCODED.len() - 1];
        let decoded = decode(truncated_input);

        assert!(decoded.truncated);
        assert_close(&decoded.points, &reference_points()[..2]);
    }

    #[test]
    fn test_decode_strict_truncated_fails() {
        let truncated_input = &REFERENCE_ENCODED[..REFERENCE_ENCODED.len() - 1];
        assert!(matches!(
            decode_strict(truncated_input),
            Err(DecodeError::UnexpectedEnd(_))
        ));
    }

    #[test]
    fn test_decode_invalid_byte_stops_early() {
        // A space is below the 63 offset and cannot occur in valid input.
        let input = format!("{} {}", REFERENCE_ENCODED, REFERENCE_ENCODED);
        let decoded = decode(&input);

        assert!(decoded.truncated);
        assert_close(&decoded.points, &reference_points());

        assert!(matches!(
            decode_strict(&input),
            Err(DecodeError::InvalidByte { byte: b' ', .. })
        ));
    }

    #[test]
    fn test_decode_strict_reference_vector() {
        let points = decode_strict(REFERENCE_ENCODED).unwrap();
        assert_close(&points, &reference_points());
    }

    #[test]
    fn test_roundtrip_single_point() {
        let path = vec![LatLng { lat: -0.00001, lng: 0.00001 }];
        let decoded = decode(&encode(&path));
        assert!(!decoded.truncated);
        assert_close(&decoded.points, &path);
    }

    proptest! {
        // Round-trip: for any finite path within coordinate bounds, decoding
        // an encoded path reproduces it to 1e-5 precision with no truncation.
        #[test]
        fn prop_roundtrip(
            path in prop::collection::vec(
                (-90.0f64..90.0, -180.0f64..180.0)
                    .prop_map(|(lat, lng)| LatLng { lat, lng }),
                0..40
            )
        ) {
            let decoded = decode(&encode(&path));
            prop_assert!(!decoded.truncated);
            prop_assert_eq!(decoded.points.len(), path.len());
            for (left, right) in decoded.points.iter().zip(&path) {
                prop_assert!((left.lat - right.lat).abs() <= 1e-5);
                prop_assert!((left.lng - right.lng).abs() <= 1e-5);
            }
        }

        // Lenient decode never panics and only reports truncation on
        // arbitrary input.
        #[test]
        fn prop_decode_never_panics(input in "\\PC*") {
            let _ = decode(&input);
        }
    }
}
