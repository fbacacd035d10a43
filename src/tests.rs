use super::*;

use bytes::Bytes;

// note that these are integration tests over the whole pipeline... the
// components are tested extensively in their modules.

fn s(name: &'static [u8]) -> Event {
	Event::ElementStart(Bytes::from_static(name), Origin::Explicit)
}

fn a(name: &'static [u8], value: &'static [u8]) -> Event {
	Event::Attribute(Bytes::from_static(name), Bytes::from_static(value))
}

fn e(name: &'static [u8]) -> Event {
	Event::ElementEnd(Bytes::from_static(name), Origin::Explicit)
}

fn t(text: &'static [u8]) -> Event {
	Event::Text(Bytes::from_static(text))
}

fn raw_options() -> ParserOptions {
	ParserOptions::default()
		.emit_comments(true)
		.emit_pi(true)
		.emit_cdata(true)
}

/// Feed `doc` to a raw parser in `chunk`-sized pieces, draining between
/// chunks, and collect every non-control event.
fn raw_events_chunked(doc: &[u8], chunk: usize) -> Vec<Event> {
	let mut p = RawParser::with_options(raw_options());
	let mut out = Vec::new();
	for piece in doc.chunks(chunk) {
		p.feed(piece);
		loop {
			match p.next_event() {
				Event::NeedMoreInput => break,
				Event::EndOfStream => panic!("end of stream before finish"),
				ev => out.push(ev),
			}
		}
	}
	p.finish();
	loop {
		match p.next_event() {
			Event::EndOfStream => return out,
			Event::NeedMoreInput => panic!("NeedMoreInput on a finished stream"),
			ev => out.push(ev),
		}
	}
}

fn sanitized_events(doc: &[u8], opts: SanitizerOptions) -> Vec<Event> {
	let mut fp = FeedParser::with_options(ParserOptions::default(), opts);
	fp.feed(doc);
	fp.finish();
	let mut out = Vec::new();
	assert!(fp.read_all(|ev| out.push(ev)));
	out
}

#[test]
fn pipeline_parses_simple_document() {
	// `<a b="c">hi</a>`
	assert_eq!(
		sanitized_events(b"<a b=\"c\">hi</a>", SanitizerOptions::default()),
		vec![s(b"a"), a(b"b", b"c"), t(b"hi"), e(b"a")]
	);
}

#[test]
fn pipeline_halts_on_duplicate_attribute_with_fail_fast() {
	// `<a x="1" x="2"/>` under fail-fast: the duplicate stops all
	// further non-error output, including the finish checks
	let opts = SanitizerOptions::default().fail_fast(true);
	let out = sanitized_events(b"<a x=\"1\" x=\"2\"/>", opts);
	assert_eq!(out.len(), 3);
	assert_eq!(out[0], s(b"a"));
	assert_eq!(out[1], a(b"x", b"1"));
	match &out[2] {
		Event::Error(err) => {
			assert_eq!(err.kind(), ErrorKind::MalformedMarkup);
			assert_eq!(err.message(), "duplicate attribute");
		}
		other => panic!("unexpected event: {:?}", other),
	}
}

#[test]
fn pipeline_reports_mismatched_end_tag() {
	// `<a><b></a>`
	let out = sanitized_events(b"<a><b></a>", SanitizerOptions::default());
	assert!(out.iter().any(|ev| matches!(
		ev,
		Event::Error(err) if err.kind() == ErrorKind::MalformedMarkup
			&& err.message() == "mismatched end tag"
	)));
}

#[test]
fn pipeline_reports_text_outside_root() {
	// `oops<a/>`
	let out = sanitized_events(b"oops<a/>", SanitizerOptions::default());
	assert!(out.iter().any(|ev| matches!(
		ev,
		Event::Error(err) if err.kind() == ErrorKind::MalformedMarkup
			&& err.message() == "text outside root"
	)));
}

#[test]
fn pipeline_passes_surrounding_whitespace() {
	// ` \n<a/> \n`
	let out = sanitized_events(b" \n<a/> \n", SanitizerOptions::default());
	assert_eq!(out, vec![t(b" \n"), s(b"a"), e(b"a"), t(b" \n")]);
}

#[test]
fn raw_parser_reports_truncated_tag_at_eof() {
	// `<a` + finish
	let mut p = RawParser::new();
	p.feed(b"<a");
	p.finish();
	match p.next_event() {
		Event::Error(err) => {
			assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
			assert_eq!(err.offset(), 0);
		}
		other => panic!("unexpected event: {:?}", other),
	}
	assert_eq!(p.next_event(), Event::EndOfStream);
}

static GNARLY_DOC: &'static [u8] = b"<?xml version='1.0'?>\n\
	<book id=\"b-1\" lang='en'>\n\
	<!-- front matter -->\n\
	<title>caf\xc3\xa9 society \xf0\x9f\x8e\x89</title>\n\
	<blurb><![CDATA[1 < 2 ]] > still cdata]]></blurb>\n\
	text with ]] brackets and > signs\n\
	<empty/><empty2 a='1' b=\"2\"/>\n\
	</book>\n";

#[test]
fn raw_parser_is_chunk_invariant_across_granularities() {
	let whole = raw_events_chunked(GNARLY_DOC, GNARLY_DOC.len());
	for chunk in [1usize, 2, 3, 5, 7] {
		assert_eq!(
			raw_events_chunked(GNARLY_DOC, chunk),
			whole,
			"chunk size {} diverged",
			chunk
		);
	}
}

#[test]
fn raw_parser_is_chunk_invariant_on_malformed_input() {
	let doc: &[u8] = b"<a b=c><!DOCTYPE x>text<unclosed";
	let whole = raw_events_chunked(doc, doc.len());
	assert!(whole.iter().any(|ev| matches!(ev, Event::Error(_))));
	for chunk in [1usize, 3, 7] {
		assert_eq!(raw_events_chunked(doc, chunk), whole);
	}
}

#[test]
fn raw_parser_keeps_attributes_adjacent_to_their_start_tag() {
	let evs = raw_events_chunked(GNARLY_DOC, 4);
	for (i, ev) in evs.iter().enumerate() {
		if let Event::Attribute(..) = ev {
			assert!(
				matches!(evs[i - 1], Event::ElementStart(..) | Event::Attribute(..)),
				"attribute at {} not adjacent to its start tag",
				i
			);
		}
	}
}

#[test]
fn raw_parser_expands_self_close_without_intervening_events() {
	let evs = raw_events_chunked(b"<x one='1' two='2'/>", 1);
	assert_eq!(
		evs,
		vec![s(b"x"), a(b"one", b"1"), a(b"two", b"2"), e(b"x")]
	);
}

#[test]
fn sanitized_error_free_output_is_balanced_with_one_root() {
	let out = sanitized_events(GNARLY_DOC, SanitizerOptions::default());
	assert!(!out.iter().any(|ev| matches!(ev, Event::Error(_))));
	let mut depth = 0usize;
	let mut roots = 0usize;
	for ev in &out {
		match ev {
			Event::ElementStart(..) => {
				if depth == 0 {
					roots += 1;
				}
				depth += 1;
			}
			Event::ElementEnd(..) => {
				assert!(depth > 0);
				depth -= 1;
			}
			Event::Text(text) if depth == 0 => {
				assert!(text
					.iter()
					.all(|&b| b == b' ' || b == b'\t' || b == b'\n' || b == b'\r'));
			}
			_ => (),
		}
	}
	assert_eq!(depth, 0);
	assert_eq!(roots, 1);
}

#[test]
fn raw_parser_makes_forward_progress_on_error_soup() {
	let doc: &[u8] = b"<<!&&>]]><?<a b=!><//><1>\x00<a b='";
	let mut p = RawParser::new();
	p.feed(doc);
	p.finish();
	let mut offsets = Vec::new();
	let mut steps = 0usize;
	loop {
		match p.next_event() {
			Event::EndOfStream => break,
			Event::NeedMoreInput => panic!("NeedMoreInput on a finished stream"),
			Event::Error(err) => offsets.push(err.offset()),
			_ => (),
		}
		steps += 1;
		// termination backstop: every error consumes at least one byte
		assert!(steps <= doc.len() * 2);
	}
	assert!(!offsets.is_empty());
	for w in offsets.windows(2) {
		assert!(w[0] <= w[1], "error offsets regressed: {:?}", offsets);
	}
}

#[test]
fn pipeline_survives_reset_between_documents() {
	let mut fp = FeedParser::new();
	for _ in 0..3 {
		fp.feed(b"<doc><p>x</p></doc>");
		fp.finish();
		let mut out = Vec::new();
		assert!(fp.read_all(|ev| out.push(ev)));
		assert_eq!(out, vec![s(b"doc"), s(b"p"), t(b"x"), e(b"p"), e(b"doc")]);
		fp.reset();
	}
}

#[test]
fn pipeline_text_splitting_respects_multibyte_payload() {
	// force tiny text chunks over multi-byte content and make sure the
	// reassembled text is unchanged
	let text = "käsekuchen mit 🎉 und noch mehr text dazu";
	let doc = format!("<d>{}</d>", text);
	let opts = ParserOptions::default().max_text_chunk(5);
	let mut fp = FeedParser::with_options(opts, SanitizerOptions::default());
	fp.feed(doc.as_bytes());
	fp.finish();
	let mut collected = Vec::new();
	assert!(fp.read_all(|ev| {
		if let Event::Text(chunk) = ev {
			// every chunk is valid UTF-8 on its own
			std::str::from_utf8(&chunk).unwrap();
			collected.extend_from_slice(&chunk);
		}
	}));
	assert_eq!(collected, text.as_bytes());
}

#[cfg(feature = "async")]
mod async_tests {
	use super::*;

	#[tokio::test]
	async fn asyncparser_can_read_document() {
		let doc = &b"<root a=\"foo\"><child>with some text</child></root>"[..];
		let mut ap = AsyncParser::new(doc);
		let mut out = Vec::new();
		ap.read_all(|ev| out.push(ev)).await.unwrap();
		assert_eq!(
			out,
			vec![
				s(b"root"),
				a(b"a", b"foo"),
				s(b"child"),
				t(b"with some text"),
				e(b"child"),
				e(b"root")
			]
		);
	}

	#[tokio::test]
	async fn asyncparser_can_handle_chunked_input() {
		let doc = &b"<root a=\"foo\"><child>with some text</child></root>"[..];
		let reader = tokio::io::BufReader::with_capacity(4, doc);
		let mut ap = AsyncParser::new(reader);
		let mut out = Vec::new();
		ap.read_all(|ev| out.push(ev)).await.unwrap();
		assert_eq!(
			out,
			vec![
				s(b"root"),
				a(b"a", b"foo"),
				s(b"child"),
				t(b"with some text"),
				e(b"child"),
				e(b"root")
			]
		);
	}
}
