//! Safe percent-decoding of UTF-16 text.
//!
//! This crate provides a drop-in replacement for JavaScript's
//! `decodeURIComponent` working on UTF-16 code units, that never fails.
//! Percent-encoded UTF-8 sequences are decoded as usual, but escape runs that
//! are not made of hex digits, or that do not form valid UTF-8, are left in
//! the output verbatim instead of raising an error.
//!
//! # Basic usage
//!
//! ```
//! use safe_pct_decode::decode;
//!
//! let input: Vec<u16> = "a%20%zzb%41".encode_utf16().collect();
//! let output = decode(&input);
//!
//! assert_eq!(String::from_utf16_lossy(&output), "a %zzbA");
//! ```
//!
//! Rust strings can be decoded directly with [`decode_str`].
//!
//! ```
//! use safe_pct_decode::decode_str;
//!
//! assert_eq!(decode_str("caf%C3%A9%E0%A4"), "café%E0%A4");
//! assert_eq!(decode_str("%F0%9F%98%80"), "😀");
//! ```
//!
//! When the input contains nothing to decode, the input itself is returned
//! and no allocation takes place.
//!
//! ```
//! use std::borrow::Cow;
//! use safe_pct_decode::decode_str;
//!
//! assert!(matches!(decode_str("100%"), Cow::Borrowed("100%")));
//! ```
//!
//! Buffers owned by the caller can be decoded in place, without any
//! allocation.
//!
//! ```
//! use safe_pct_decode::decode_vec_in_place;
//!
//! let mut buffer: Vec<u16> = "%E2%82%AC 10".encode_utf16().collect();
//! assert!(decode_vec_in_place(&mut buffer));
//! assert_eq!(String::from_utf16_lossy(&buffer), "€ 10");
//! ```
use std::borrow::Cow;
use std::collections::TryReserveError;

mod decoder;
pub mod utf8;

use decoder::{decode_from, find_percent};

/// Error raised when the decoding buffer cannot be allocated.
///
/// Decoding itself never fails: this is only returned by [`try_decode`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unable to allocate a buffer of {len} code units")]
	Allocation {
		len: usize,

		#[source]
		source: TryReserveError,
	},
}

/// Result of a fallible decoding function.
pub type Result<T> = std::result::Result<T, Error>;

/// Decode `buf` in place.
///
/// Returns the decoded length if at least one escape sequence has been
/// decoded, in which case the decoded text is `buf[..len]`. Returns `None`
/// if there was nothing to decode, leaving `buf` untouched.
///
/// # Example
///
/// ```
/// use safe_pct_decode::decode_in_place;
///
/// let mut buffer: Vec<u16> = "%7Bx%7D".encode_utf16().collect();
/// let len = decode_in_place(&mut buffer).unwrap();
/// assert_eq!(String::from_utf16_lossy(&buffer[..len]), "{x}");
///
/// let mut buffer: Vec<u16> = "%7".encode_utf16().collect();
/// assert_eq!(decode_in_place(&mut buffer), None);
/// ```
pub fn decode_in_place(buf: &mut [u16]) -> Option<usize> {
	decoder::decode_in_place(buf)
}

/// Decode `buf` in place, truncating it to the decoded length.
///
/// Returns `true` if anything has been decoded.
pub fn decode_vec_in_place(buf: &mut Vec<u16>) -> bool {
	match decode_in_place(buf) {
		Some(len) => {
			buf.truncate(len);
			true
		}
		None => false,
	}
}

/// Decoding.
///
/// Return the input with every valid percent-encoded UTF-8 sequence
/// decoded. The input is borrowed back if nothing was decoded.
pub fn decode(input: &[u16]) -> Cow<'_, [u16]> {
	let Some(first) = find_percent(input, 0, input.len()) else {
		return Cow::Borrowed(input);
	};

	decode_copy(input, first, input.to_vec())
}

/// Fallible decoding.
///
/// Same as [`decode`], but the working buffer is allocated fallibly and an
/// [`Error`] is returned if that allocation fails.
pub fn try_decode(input: &[u16]) -> Result<Cow<'_, [u16]>> {
	let Some(first) = find_percent(input, 0, input.len()) else {
		return Ok(Cow::Borrowed(input));
	};

	let mut buf = Vec::new();
	buf.try_reserve_exact(input.len())
		.map_err(|source| Error::Allocation {
			len: input.len(),
			source,
		})?;
	buf.extend_from_slice(input);

	Ok(decode_copy(input, first, buf))
}

/// Decode `buf`, a copy of `input`, starting at the `first` percent sign.
fn decode_copy(input: &[u16], first: usize, mut buf: Vec<u16>) -> Cow<'_, [u16]> {
	debug_assert_eq!(input, &buf[..]);
	match decode_from(&mut buf, first) {
		Some(len) => {
			debug_assert!(len <= input.len());
			log::debug!("decoded {} code units into {}", input.len(), len);
			buf.truncate(len);
			Cow::Owned(buf)
		}
		None => {
			log::debug!("nothing to decode in {} code units", input.len());
			Cow::Borrowed(input)
		}
	}
}

/// Decode a Rust string.
///
/// The input is borrowed back if nothing was decoded.
pub fn decode_str(input: &str) -> Cow<'_, str> {
	if !input.contains('%') {
		return Cow::Borrowed(input);
	}

	let mut buf: Vec<u16> = input.encode_utf16().collect();
	if !decode_vec_in_place(&mut buf) {
		return Cow::Borrowed(input);
	}

	// Literal text is copied as is and decoded escapes are whole scalar
	// values, so `buf` is well-formed UTF-16.
	Cow::Owned(
		char::decode_utf16(buf)
			.map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
			.collect(),
	)
}

#[cfg(test)]
mod tests {
	use std::fmt::Write;

	use quickcheck::{Arbitrary, Gen, QuickCheck};
	use rstest::rstest;

	use super::*;

	fn units(s: &str) -> Vec<u16> {
		s.encode_utf16().collect()
	}

	/// Percent-encode every character of `s`.
	fn encode_all(s: &str) -> String {
		let mut encoded = String::with_capacity(s.len() * 3);
		for byte in s.bytes() {
			write!(encoded, "%{:02X}", byte).unwrap();
		}

		encoded
	}

	/// Percent-encode the non-alphanumeric characters of `s`, in lowercase.
	fn encode_some(s: &str) -> String {
		let mut buf = [0; 4];
		let mut encoded = String::new();
		for c in s.chars() {
			if c.is_ascii_alphanumeric() {
				encoded.push(c)
			} else {
				for byte in c.encode_utf8(&mut buf).bytes() {
					write!(encoded, "%{:02x}", byte).unwrap();
				}
			}
		}

		encoded
	}

	/// Straightforward decoder: at each `%`, collect the bytes of the
	/// following escapes and decode the first character if valid.
	fn reference_decode(input: &[u16]) -> Vec<u16> {
		fn hex(c: u16) -> Option<u8> {
			char::from_u32(c as u32)?.to_digit(16).map(|d| d as u8)
		}

		let mut output = Vec::new();
		let mut i = 0;
		while i < input.len() {
			if input[i] == b'%' as u16 {
				let mut bytes = Vec::new();
				let mut j = i;
				while bytes.len() < 4 && j + 2 < input.len() && input[j] == b'%' as u16 {
					match (hex(input[j + 1]), hex(input[j + 2])) {
						(Some(hi), Some(lo)) => bytes.push(hi << 4 | lo),
						_ => break,
					}
					j += 3;
				}

				let c = (1..=bytes.len())
					.find_map(|n| std::str::from_utf8(&bytes[..n]).ok())
					.and_then(|s| s.chars().next());
				if let Some(c) = c {
					let mut buf = [0; 2];
					output.extend_from_slice(c.encode_utf16(&mut buf));
					i += 3 * c.len_utf8();
					continue;
				}
			}

			output.push(input[i]);
			i += 1;
		}

		output
	}

	/// Code units drawn from a small alphabet rich in escapes.
	#[derive(Debug, Clone)]
	struct EscapeSoup(Vec<u16>);

	impl Arbitrary for EscapeSoup {
		fn arbitrary(g: &mut Gen) -> Self {
			const PIECES: &[&str] = &[
				"%", "%", "%", "0", "4", "7", "8", "9", "a", "B", "c", "d", "E", "e", "f", "F",
				"z", " ", "é", "😀", "%41", "%C3", "%A9", "%E2", "%82", "%AC", "%F0", "%9F",
				"%98", "%80", "%ED", "%A0", "%FF", "%C0",
			];

			let len = usize::arbitrary(g) % (g.size() + 1);
			let mut units = Vec::new();
			for _ in 0..len {
				if u8::arbitrary(g) % 16 == 0 {
					// Lone surrogate.
					units.push(0xD800 | (u16::arbitrary(g) & 0x7FF));
				} else if let Some(piece) = g.choose(PIECES) {
					units.extend(piece.encode_utf16());
				}
			}

			Self(units)
		}

		fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
			Box::new(self.0.shrink().map(Self))
		}
	}

	#[rstest]
	#[case("%zz", "%zz")]
	#[case("%4", "%4")]
	#[case("%", "%")]
	#[case("a%20%zzb%41", "a %zzbA")]
	#[case("%F0%9F%98%80", "\u{1F600}")]
	#[case("t%C3%A9st%F0%9F%92%A9", "tést💩")]
	#[case("%E0%A4%A", "%E0%A4%A")]
	#[case("%ED%A0%80", "%ED%A0%80")]
	fn decode_examples(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(decode(&units(input)), &units(expected)[..]);
		assert_eq!(try_decode(&units(input)).unwrap(), &units(expected)[..]);
		assert_eq!(decode_str(input), expected);
	}

	#[test]
	fn unchanged_input_is_borrowed() {
		for s in ["", "abcd", "%", "%zz", "%C3%", "50%"] {
			let input = units(s);
			assert!(matches!(decode(&input), Cow::Borrowed(_)), "{s:?}");
			assert!(matches!(try_decode(&input), Ok(Cow::Borrowed(_))), "{s:?}");
			assert!(matches!(decode_str(s), Cow::Borrowed(_)), "{s:?}");
		}
	}

	#[test]
	fn decode_vec_in_place_truncates() {
		let mut buf = units("%E2%82%AC%E2%82%AC!");
		assert!(decode_vec_in_place(&mut buf));
		assert_eq!(buf, units("€€!"));

		let mut buf = units("%E2%82");
		assert!(!decode_vec_in_place(&mut buf));
		assert_eq!(buf, units("%E2%82"));
	}

	#[test]
	fn shrinks_long_escape_runs() {
		let plain = "😀é€a".repeat(64);
		let input = format!("{}trailing text", encode_all(&plain));
		assert_eq!(decode_str(&input), format!("{}trailing text", plain));
	}

	#[test]
	fn percent_at_the_end_is_never_overread() {
		for s in ["%", "a%", "%4", "a%4", "%41%", "%41%4", "%E2%82%"] {
			let mut buf = units(s);
			// Decode a prefix only, so that reading past it would see a valid escape.
			buf.extend(units("%41"));
			let prefix = s.encode_utf16().count();
			let expected = reference_decode(&buf[..prefix]);
			let len = decode_in_place(&mut buf[..prefix]).unwrap_or(prefix);
			assert_eq!(&buf[..len], &expected[..], "{s:?}");
		}
	}

	#[test]
	fn error_message() {
		let source = Vec::<u16>::new().try_reserve_exact(usize::MAX).unwrap_err();
		let e = Error::Allocation { len: 7, source };
		assert_eq!(e.to_string(), "unable to allocate a buffer of 7 code units");
		assert!(std::error::Error::source(&e).is_some());
	}

	#[test]
	fn plain_text_is_unchanged_quickcheck() {
		fn prop(s: String) -> bool {
			let s = s.replace('%', "");
			let input = units(&s);
			let mut buf = input.clone();
			decode_in_place(&mut buf).is_none()
				&& buf == input
				&& matches!(decode(&input), Cow::Borrowed(_))
		}

		QuickCheck::new()
			.tests(500)
			.quickcheck(prop as fn(String) -> bool);
	}

	#[test]
	fn roundtrip_quickcheck() {
		fn prop(s: String) -> bool {
			decode_str(&encode_all(&s)) == s && decode_str(&encode_some(&s)) == s
		}

		QuickCheck::new()
			.tests(500)
			.quickcheck(prop as fn(String) -> bool);
	}

	#[test]
	fn matches_reference_quickcheck() {
		fn prop(soup: EscapeSoup) -> bool {
			let expected = reference_decode(&soup.0);
			let output = decode(&soup.0);
			output.len() <= soup.0.len() && output[..] == expected[..]
		}

		QuickCheck::new()
			.tests(2000)
			.quickcheck(prop as fn(EscapeSoup) -> bool);
	}
}
