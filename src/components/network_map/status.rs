//! Online/offline evaluation from last-seen timestamps.

use super::types::{Device, TimeInfo};

/// A device not heard from for this many seconds is shown offline.
pub const OFFLINE_TIMEOUT: f64 = 3600.0 * 2.0;

/// Whether `device` counts as online at `time`.
///
/// Missing information is not evidence of being offline: without a time
/// reference or a last-seen value the device is online. A last-seen value
/// with no leading digits parses to NaN, which fails the comparison, so such
/// devices are reported offline.
pub fn is_online(device: &Device, time: Option<&TimeInfo>) -> bool {
	let (Some(time), Some(last_seen)) = (time, device.last_seen.as_deref()) else {
		return true;
	};
	if last_seen.is_empty() {
		return true;
	}
	time.ts - parse_int(last_seen) < OFFLINE_TIMEOUT
}

/// Base-10 integer prefix of `text`, or NaN when there is none.
///
/// Leading whitespace and a single sign are accepted; parsing stops at the
/// first non-digit, so `"12.9"` is 12 and `"42abc"` is 42.
fn parse_int(text: &str) -> f64 {
	let text = text.trim_start();
	let (negative, digits) = match text.as_bytes().first() {
		Some(b'-') => (true, &text[1..]),
		Some(b'+') => (false, &text[1..]),
		_ => (false, text),
	};
	let mut value: Option<f64> = None;
	for b in digits.bytes().take_while(u8::is_ascii_digit) {
		value = Some(value.unwrap_or(0.0) * 10.0 + f64::from(b - b'0'));
	}
	match value {
		Some(v) if negative => -v,
		Some(v) => v,
		None => f64::NAN,
	}
}
