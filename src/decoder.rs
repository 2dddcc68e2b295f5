//! In-place, never-failing percent-decoding of UTF-16 code units.
//!
//! Valid escape runs are replaced by the code units of the character they
//! encode. Everything else, including escapes that do not form a valid UTF-8
//! sequence, is kept as is. Decoding never makes the text longer: the
//! longest UTF-8 sequence (4 escapes, 12 code units) decodes into a
//! surrogate pair, so the output is compacted leftward as the scan goes.
use crate::utf8::{Status, Utf8Dfa};

const PERCENT: u16 = b'%' as u16;

/// Value of an invalid hex digit.
///
/// Any byte built with it is `0xFF`, a byte the UTF-8 automaton rejects from
/// every state.
pub(crate) const INVALID_NIBBLE: u8 = 0xFF;

#[inline(always)]
pub(crate) fn nibble(c: u16) -> u8 {
	match c {
		// ASCII 0..=9
		0x30..=0x39 => (c - 0x30) as u8,
		// ASCII A..=F
		0x41..=0x46 => (c - 0x37) as u8,
		// ASCII a..=f
		0x61..=0x66 => (c - 0x57) as u8,
		_ => INVALID_NIBBLE,
	}
}

/// Byte encoded by the two hex digits of an escape.
#[inline(always)]
fn escaped_byte(hi: u16, lo: u16) -> u8 {
	match nibble(hi) {
		INVALID_NIBBLE => INVALID_NIBBLE,
		hi => hi << 4 | nibble(lo),
	}
}

/// Position of the first `%` in `buf[from..to]`.
#[inline]
pub(crate) fn find_percent(buf: &[u16], from: usize, to: usize) -> Option<usize> {
	buf[from..to]
		.iter()
		.position(|&c| c == PERCENT)
		.map(|i| from + i)
}

/// Move the literal run `buf[start..end]` down to `write`, returning the
/// position right after it.
#[inline]
pub(crate) fn flush(buf: &mut [u16], write: usize, start: usize, end: usize) -> usize {
	debug_assert!(write <= start && start <= end);
	if write < start {
		buf.copy_within(start..end, write);
	}

	write + (end - start)
}

/// Write the UTF-16 form of `code_point` at `write`.
#[inline(always)]
fn emit(buf: &mut [u16], write: usize, code_point: u32) -> usize {
	if code_point <= 0xFFFF {
		buf[write] = code_point as u16;
		write + 1
	} else {
		buf[write] = (0xD7C0 + (code_point >> 10)) as u16;
		buf[write + 1] = (0xDC00 + (code_point & 0x3FF)) as u16;
		write + 2
	}
}

/// Decode `buf` in place, starting the search for escapes at `from`.
///
/// Returns the decoded length, or `None` if no escape was decoded, in which
/// case `buf` is left untouched.
pub(crate) fn decode_from(buf: &mut [u16], from: usize) -> Option<usize> {
	let end = buf.len();

	// `end` stands for "no `%` left".
	let mut scan = find_percent(buf, from, end).unwrap_or(end);
	// First `%` of the escape run being decoded.
	let mut escape_start = scan;
	// First code unit of the literal run not yet moved to `write`.
	let mut flush_start = 0;
	let mut write = 0;
	let mut dfa = Utf8Dfa::new();
	let mut decoded = false;

	while scan + 2 < end {
		debug_assert!(write <= flush_start && flush_start <= escape_start && escape_start <= scan);
		let byte = escaped_byte(buf[scan + 1], buf[scan + 2]);

		// End of the escape run that could not be decoded, if any.
		let rejected = match dfa.push(byte) {
			Status::Accept => {
				write = flush(buf, write, flush_start, escape_start);
				write = emit(buf, write, dfa.code_point());
				dfa.reset();
				decoded = true;

				flush_start = scan + 3;
				scan = find_percent(buf, flush_start, end).unwrap_or(end);
				escape_start = scan;
				None
			}
			Status::Mid => {
				scan += 3;
				// The sequence goes on only if another escape follows.
				if scan < end && buf[scan] == PERCENT {
					None
				} else {
					Some(scan.min(end))
				}
			}
			Status::Reject => Some(scan + 3),
		};

		if let Some(run_end) = rejected {
			log::trace!("leaving escape run {}..{} undecoded", escape_start, run_end);
			dfa.reset();
			scan = find_percent(buf, escape_start + 1, end).unwrap_or(end);
			escape_start = scan;
		}
	}

	if !decoded {
		return None;
	}

	Some(flush(buf, write, flush_start, end))
}

/// Decode `buf` in place.
///
/// Returns the decoded length, or `None` if no escape was decoded.
pub(crate) fn decode_in_place(buf: &mut [u16]) -> Option<usize> {
	decode_from(buf, 0)
}
