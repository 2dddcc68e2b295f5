extern crate safe_pct_decode;

use std::borrow::Cow;

use safe_pct_decode::{decode, decode_vec_in_place, try_decode};

fn main() -> safe_pct_decode::Result<()> {
	// Set `RUST_LOG=trace` to see which escape runs are left undecoded.
	env_logger::init();

	// [`decode`] works on UTF-16 code units, like JavaScript strings.
	let input: Vec<u16> = "t%C3%A9st%F0%9F%92%A9%zz%E0%A4%A".encode_utf16().collect();
	let output = decode(&input);
	println!("{}", String::from_utf16_lossy(&output));
	// => tést💩%zz%E0%A4%A

	// The input is given back when there is nothing to decode.
	let input: Vec<u16> = "100%".encode_utf16().collect();
	assert!(matches!(decode(&input), Cow::Borrowed(_)));

	// [`try_decode`] reports allocation failures instead of aborting.
	let input: Vec<u16> = "%E2%82%AC%2010".encode_utf16().collect();
	let output = try_decode(&input)?;
	println!("{}", String::from_utf16_lossy(&output));
	// => € 10

	// Buffers can also be decoded in place.
	let mut buffer = input;
	if decode_vec_in_place(&mut buffer) {
		println!("{} code units left", buffer.len());
	}
	// => 4 code units left

	Ok(())
}
