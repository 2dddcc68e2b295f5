//! Validating UTF-8 automaton.
//!
//! This is Bjoern Hoehrmann's DFA decoder
//! (<http://bjoern.hoehrmann.de/utf-8/decoder/dfa/>), with its flat data
//! array split into three named tables. States are numbered by row instead
//! of by row offset (Hoehrmann's `state * 12`), which leaves the automaton
//! itself unchanged.

/// Automaton state.
///
/// Every state other than [`State::Accept`] and [`State::Reject`] is
/// midway through a multi-byte sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum State {
	/// No sequence pending.
	Accept,

	/// The bytes seen so far cannot start a valid sequence.
	Reject,

	/// One continuation byte `80..=BF` left.
	Tail1,

	/// Two continuation bytes `80..=BF` left.
	Tail2,

	/// After `E0`: `A0..=BF` then one more (excludes overlong forms).
	AfterE0,

	/// After `ED`: `80..=9F` then one more (excludes surrogates).
	AfterEd,

	/// After `F0`: `90..=BF` then two more (excludes overlong forms).
	AfterF0,

	/// After `F1..=F3`: `80..=BF` then two more.
	AfterF1F3,

	/// After `F4`: `80..=8F` then two more (stays below `U+110000`).
	AfterF4,
}

/// Coarse classification of a [`State`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
	/// A complete code point has just been formed, or nothing started yet.
	Accept,

	/// More continuation bytes are needed.
	Mid,

	/// The sequence is invalid.
	Reject,
}

impl State {
	#[inline(always)]
	pub fn status(self) -> Status {
		match self {
			State::Accept => Status::Accept,
			State::Reject => Status::Reject,
			_ => Status::Mid,
		}
	}
}

/// Byte equivalence class, an index into [`TRANSITIONS`] rows and [`MASKS`].
type Class = u8;

/// Maps every byte to its class.
///
/// | class | bytes |
/// |-------|-------|
/// | 0 | `00..=7F` |
/// | 1 | `80..=8F` |
/// | 9 | `90..=9F` |
/// | 7 | `A0..=BF` |
/// | 8 | `C0`, `C1`, `F5..=FF` |
/// | 2 | `C2..=DF` |
/// | 10 | `E0` |
/// | 3 | `E1..=EC`, `EE`, `EF` |
/// | 4 | `ED` |
/// | 11 | `F0` |
/// | 6 | `F1..=F3` |
/// | 5 | `F4` |
#[rustfmt::skip]
const CLASSES: [Class; 256] = [
	0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 00
	0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 10
	0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 20
	0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 30
	0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 40
	0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 50
	0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 60
	0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 70
	1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, // 80
	9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, // 90
	7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, // A0
	7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, // B0
	8, 8, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, // C0
	2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, // D0
	10, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 4, 3, 3, // E0
	11, 6, 6, 6, 5, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, // F0
];

/// Next state, indexed by current state then byte class.
#[rustfmt::skip]
const TRANSITIONS: [[State; 12]; 9] = {
	use State::*;
	const R: State = Reject;
	[
		// 0       1      2      3      4        5        6          7      8  9      10       11
		[Accept,   R,     Tail1, Tail2, AfterEd, AfterF4, AfterF1F3, R,     R, R,     AfterE0, AfterF0], // Accept
		[R,        R,     R,     R,     R,       R,       R,         R,     R, R,     R,       R      ], // Reject
		[R,        Accept, R,    R,     R,       R,       R,         Accept, R, Accept, R,     R      ], // Tail1
		[R,        Tail1, R,     R,     R,       R,       R,         Tail1, R, Tail1, R,       R      ], // Tail2
		[R,        R,     R,     R,     R,       R,       R,         Tail1, R, R,     R,       R      ], // AfterE0
		[R,        Tail1, R,     R,     R,       R,       R,         R,     R, Tail1, R,       R      ], // AfterEd
		[R,        R,     R,     R,     R,       R,       R,         Tail2, R, Tail2, R,       R      ], // AfterF0
		[R,        Tail2, R,     R,     R,       R,       R,         Tail2, R, Tail2, R,       R      ], // AfterF1F3
		[R,        Tail2, R,     R,     R,       R,       R,         R,     R, R,     R,       R      ], // AfterF4
	]
};

/// Payload bits of a byte, indexed by byte class.
const MASKS: [u8; 12] = [
	0x7F, 0x3F, 0x1F, 0x0F, 0x0F, 0x07, 0x07, 0x3F, 0x00, 0x3F, 0x0F, 0x07,
];

/// Feed one byte to the automaton.
///
/// Returns the next state and the code point accumulated so far. The code
/// point is only meaningful once the returned state is [`State::Accept`].
#[inline(always)]
pub fn step(state: State, code_point: u32, byte: u8) -> (State, u32) {
	let class = CLASSES[byte as usize];
	let next = TRANSITIONS[state as usize][class as usize];
	let code_point = (code_point << 6) | u32::from(byte & MASKS[class as usize]);
	(next, code_point)
}

/// Running UTF-8 decoder over a stream of bytes.
#[derive(Debug, Clone, Copy)]
pub struct Utf8Dfa {
	state: State,
	code_point: u32,
}

impl Default for Utf8Dfa {
	fn default() -> Self {
		Self::new()
	}
}

impl Utf8Dfa {
	pub fn new() -> Self {
		Self {
			state: State::Accept,
			code_point: 0,
		}
	}

	/// Advance by one byte.
	#[inline(always)]
	pub fn push(&mut self, byte: u8) -> Status {
		let (state, code_point) = step(self.state, self.code_point, byte);
		self.state = state;
		self.code_point = code_point;
		state.status()
	}

	#[inline(always)]
	pub fn code_point(&self) -> u32 {
		self.code_point
	}

	/// Forget any pending sequence.
	#[inline(always)]
	pub fn reset(&mut self) {
		*self = Self::new()
	}
}
