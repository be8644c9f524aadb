/*!
 * Tests for the HH:MM:SS,mmm timestamp codec
 */

use voicemation::errors::TimelineError;
use voicemation::timeline::{decode, encode};

use crate::common::assert_close;

#[test]
fn test_encode_withHoursMinutesAndFraction_shouldFormatAllFields() {
    assert_eq!(encode(3725.4), "01:02:05,400");
}

#[test]
fn test_encode_withZero_shouldFormatZeroTimestamp() {
    assert_eq!(encode(0.0), "00:00:00,000");
}

#[test]
fn test_encode_withFractionNearNextSecond_shouldTruncateNotCarry() {
    assert_eq!(encode(1.9996), "00:00:01,999");
    assert_eq!(encode(3599.9999), "00:59:59,999");
}

#[test]
fn test_encode_withMoreThanADay_shouldKeepCountingHours() {
    assert_eq!(encode(100.0 * 3600.0 + 1.5), "100:00:01,500");
}

#[test]
fn test_encode_withInfinity_shouldFormatZero() {
    assert_eq!(encode(f64::NEG_INFINITY), "00:00:00,000");
}

#[test]
fn test_decode_withValidTimestamp_shouldReturnSeconds() {
    assert_close(decode("01:02:05,400").unwrap(), 3725.4);
    assert_close(decode("123:00:00,001").unwrap(), 123.0 * 3600.0 + 0.001);
    assert_eq!(decode("00:00:00,000").unwrap(), 0.0);
}

#[test]
fn test_decode_withMalformedInput_shouldReturnMalformedTimestamp() {
    let bad = [
        "",
        "garbage",
        "00:00:05.000",
        "0:0:5,000",
        "00:00:05,00",
        "00:00:05",
        "-1:00:00,000",
    ];

    for input in bad {
        match decode(input) {
            Err(TimelineError::MalformedTimestamp(raw)) => assert_eq!(raw, input),
            other => panic!("expected MalformedTimestamp for {:?}, got {:?}", input, other),
        }
    }
}

#[test]
fn test_encodeDecode_withMillisecondValues_shouldRoundTripWithinOneMillisecond() {
    for millis in [0_u64, 1, 999, 1_000, 59_999, 61_001, 3_725_400, 86_399_999] {
        let seconds = millis as f64 / 1000.0;
        let decoded = decode(&encode(seconds)).unwrap();
        assert!(
            (decoded - seconds).abs() <= 0.001 + 1e-9,
            "{} decoded as {}",
            seconds,
            decoded
        );
    }
}
