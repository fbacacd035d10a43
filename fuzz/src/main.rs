#[macro_use]
extern crate afl;
extern crate skimxml;

use skimxml::{Event, ParserOptions, RawParser, SanitizerOptions};

fn parse_chunked(data: &[u8], chunk: usize) -> Vec<Event> {
	let mut parser = RawParser::with_options(
		ParserOptions::default()
			.emit_comments(true)
			.emit_pi(true)
			.emit_cdata(true),
	);
	let mut out = Vec::new();
	if chunk >= data.len().max(1) {
		parser.feed(data);
	} else {
		for piece in data.chunks(chunk) {
			parser.feed(piece);
			parser.read_all(|ev| out.push(ev));
		}
	}
	parser.finish();
	parser.read_all(|ev| out.push(ev));
	out
}

fn main() {
	fuzz!(|data: &[u8]| {
		// the event sequence must not depend on chunking, and parsing
		// must terminate no matter how broken the input is
		let whole = parse_chunked(data, usize::MAX);
		for chunk in [1usize, 7] {
			assert_eq!(parse_chunked(data, chunk), whole);
		}

		// the sanitizer must accept any raw sequence without panicking
		let mut fp = skimxml::FeedParser::with_options(
			ParserOptions::default(),
			SanitizerOptions::default().max_depth(64),
		);
		fp.feed(data);
		fp.finish();
		fp.read_all(|_| ());
	});
}
