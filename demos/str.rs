extern crate safe_pct_decode;

use safe_pct_decode::decode_str;

fn main() {
	env_logger::init();

	// Unlike `decodeURIComponent`, malformed escapes are kept as they are.
	for input in ["Hello%20World%21", "100%", "%E0%A4%A", "caf%C3%A9%C3", "%F0%9F%98%80"] {
		println!("{:>20} => {}", input, decode_str(input));
	}
	// =>     Hello%20World%21 => Hello World!
	// =>                 100% => 100%
	// =>             %E0%A4%A => %E0%A4%A
	// =>         caf%C3%A9%C3 => café%C3
	// =>         %F0%9F%98%80 => 😀
}
