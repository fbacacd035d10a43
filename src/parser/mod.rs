/*!
# Raw element parser

The raw parser recognizes markup constructs in a byte stream delivered in
arbitrary chunks and emits a lazy sequence of [`Event`]s. It is the first
of the two pipeline stages; global well-formedness is not its business
(see [`Sanitizer`](crate::Sanitizer)).

Bytes are pushed in with [`RawParser::feed()`]; [`RawParser::next_event()`]
advances the state machine until exactly one event can be returned. When
the buffered bytes end inside a construct, the construct is left alone and
[`Event::NeedMoreInput`] is returned — the cursor only moves once a whole
construct has been recognized, which makes the event sequence independent
of how the input was chunked.

Malformed input is reported through [`Event::Error`] and never stalls the
parser: after every error at most one byte is consumed and scanning
continues, so a finite input always drains to [`Event::EndOfStream`].
*/
use std::collections::VecDeque;

pub(crate) mod scan;
mod utf8;

use crate::buffer::InputBuffer;
use crate::error::{ErrorKind, ParseError};
use crate::event::{Event, Origin};
use crate::payload::PayloadArena;

use self::scan::NameScan;

const COMMENT_START: &'static [u8] = b"<!--";
const COMMENT_END: &'static [u8] = b"-->";
const CDATA_START: &'static [u8] = b"<![CDATA[";
const CDATA_END: &'static [u8] = b"]]>";
const PI_END: &'static [u8] = b"?>";

/// Markup dialect selector.
///
/// Only [`ParserMode::Xml`] is implemented. The other modes exist so that
/// callers can wire up dialect negotiation today; selecting one surfaces
/// an [`ErrorKind::Unsupported`] error from the first event on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserMode {
	/// XML-shaped markup. The default.
	Xml,
	/// HTML dialect. Not implemented.
	Html,
	/// Sniff the dialect from the input. Not implemented.
	Auto,
}

/**
Options for a [`RawParser`].

All options are static per parser instance. The size limits bound the
allocation performed for any single event; the `emit_*` switches control
whether ancillary constructs are reported or silently consumed.

The defaults are implementation-defined and should not be relied upon.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
	/// Dialect selector; only [`ParserMode::Xml`] is supported.
	pub mode: ParserMode,
	/// Byte cap on element, attribute and PI target names.
	pub max_name_len: usize,
	/// Byte cap on a single attribute value.
	pub max_attr_len: usize,
	/// Soft cap on the length of one [`Event::Text`]; longer runs are
	/// split on codepoint boundaries.
	pub max_text_chunk: usize,
	/// Hard cap on the number of attributes in one start tag.
	pub max_attrs_per_element: usize,
	/// Emit [`Event::Comment`] instead of consuming comments silently.
	pub emit_comments: bool,
	/// Emit [`Event::ProcessingInstruction`] instead of consuming PIs
	/// silently.
	pub emit_pi: bool,
	/// Emit [`Event::Cdata`] instead of consuming CDATA sections
	/// silently.
	pub emit_cdata: bool,
}

impl ParserOptions {
	/// Set [`ParserOptions::mode`].
	pub fn mode(mut self, v: ParserMode) -> ParserOptions {
		self.mode = v;
		self
	}

	/// Set [`ParserOptions::max_name_len`].
	pub fn max_name_len(mut self, v: usize) -> ParserOptions {
		self.max_name_len = v;
		self
	}

	/// Set [`ParserOptions::max_attr_len`].
	pub fn max_attr_len(mut self, v: usize) -> ParserOptions {
		self.max_attr_len = v;
		self
	}

	/// Set [`ParserOptions::max_text_chunk`].
	pub fn max_text_chunk(mut self, v: usize) -> ParserOptions {
		self.max_text_chunk = v;
		self
	}

	/// Set [`ParserOptions::max_attrs_per_element`].
	pub fn max_attrs_per_element(mut self, v: usize) -> ParserOptions {
		self.max_attrs_per_element = v;
		self
	}

	/// Set [`ParserOptions::emit_comments`].
	pub fn emit_comments(mut self, v: bool) -> ParserOptions {
		self.emit_comments = v;
		self
	}

	/// Set [`ParserOptions::emit_pi`].
	pub fn emit_pi(mut self, v: bool) -> ParserOptions {
		self.emit_pi = v;
		self
	}

	/// Set [`ParserOptions::emit_cdata`].
	pub fn emit_cdata(mut self, v: bool) -> ParserOptions {
		self.emit_cdata = v;
		self
	}
}

impl Default for ParserOptions {
	fn default() -> Self {
		Self {
			mode: ParserMode::Xml,
			max_name_len: 1024,
			max_attr_len: 8192,
			max_text_chunk: 8192,
			max_attrs_per_element: 256,
			emit_comments: false,
			emit_pi: false,
			emit_cdata: true,
		}
	}
}

/// Outcome of running one construct scanner.
enum Scan {
	/// The construct was fully handled; events may have been enqueued and
	/// the cursor has been advanced past it.
	Done,
	/// The buffered bytes end inside the construct; nothing was consumed.
	Incomplete,
	/// The construct is malformed. The dispatcher reports the error at
	/// the construct start and consumes a single byte.
	Fault(ErrorKind, &'static str),
}

/**
# Chunk-resumable markup parser

See the [module documentation](self) for the operating model.

## Example

```
use skimxml::{Event, RawParser};
let mut p = RawParser::new();
p.feed(b"<hello kind='big'>World!</hello>");
p.finish();
loop {
	match p.next_event() {
		Event::EndOfStream => break,
		ev => println!("got event: {:?}", ev),
	}
}
```

## Payload lifetime

Payload bytes inside emitted events live in an arena owned by this parser
and remain valid until [`RawParser::reset()`] is called or the parser is
dropped, independent of further feeding.
*/
pub struct RawParser {
	opts: ParserOptions,
	buf: InputBuffer,
	arena: PayloadArena,
	eventq: VecDeque<Event>,
	finished: bool,
	mode_rejected: bool,
}

impl RawParser {
	/// Create a parser with [`ParserOptions::default()`].
	pub fn new() -> RawParser {
		Self::with_options(ParserOptions::default())
	}

	/// Create a parser with the given options.
	pub fn with_options(opts: ParserOptions) -> RawParser {
		RawParser {
			opts: opts,
			buf: InputBuffer::new(),
			arena: PayloadArena::new(),
			eventq: VecDeque::new(),
			finished: false,
			mode_rejected: false,
		}
	}

	/// Return the options the parser was built with.
	pub fn options(&self) -> &ParserOptions {
		&self.opts
	}

	/// Append a chunk of input.
	///
	/// This never emits events; call [`RawParser::next_event()`] to
	/// process the data.
	///
	/// # Panics
	///
	/// If [`RawParser::finish()`] has been called since the last reset.
	pub fn feed(&mut self, bytes: &[u8]) {
		self.buf.feed(bytes);
	}

	/// Mark the end of the stream.
	///
	/// Subsequent [`RawParser::next_event()`] calls convert incomplete
	/// constructs into [`ErrorKind::UnexpectedEof`] errors, drain the
	/// buffer and finally return [`Event::EndOfStream`] indefinitely.
	pub fn finish(&mut self) {
		self.buf.push_eof();
		self.finished = true;
	}

	/// Return the parser to its initial state.
	///
	/// The arena is reclaimed while retaining capacity, so parsing many
	/// documents in sequence does not reallocate per document.
	pub fn reset(&mut self) {
		self.buf.reset();
		self.arena.reset();
		self.eventq.clear();
		self.finished = false;
		self.mode_rejected = false;
	}

	/// Shrink internal queues. Sensible to call when no more data is
	/// expected for a while and the memory is better used elsewhere.
	pub fn release_temporaries(&mut self) {
		self.eventq.shrink_to_fit();
	}

	/// Advance the state machine until exactly one event is available and
	/// return it.
	///
	/// Returns [`Event::NeedMoreInput`] only while the stream is open and
	/// [`Event::EndOfStream`] only once the stream is finished, all bytes
	/// are consumed and the queue has drained.
	pub fn next_event(&mut self) -> Event {
		loop {
			if let Some(ev) = self.eventq.pop_front() {
				return ev;
			}
			if self.opts.mode != ParserMode::Xml {
				return self.reject_mode();
			}
			let (first, second) = {
				let rest = self.buf.remaining();
				match rest.first() {
					None => {
						return if self.finished {
							Event::EndOfStream
						} else {
							Event::NeedMoreInput
						};
					}
					Some(&b) => (b, rest.get(1).copied()),
				}
			};
			let outcome = if first != b'<' {
				self.scan_text()
			} else {
				match second {
					None => Scan::Incomplete,
					Some(b'/') => self.scan_end_tag(),
					Some(b'!') => self.scan_bang(),
					Some(b'?') => self.scan_pi(),
					Some(_) => self.scan_start_tag(),
				}
			};
			match outcome {
				Scan::Done => (),
				Scan::Incomplete => {
					if !self.finished {
						return Event::NeedMoreInput;
					}
					// partial construct at the end of the stream: report
					// it once, then drain so the stream can terminate
					let err = ParseError::new(
						ErrorKind::UnexpectedEof,
						"truncated construct at end of stream",
						self.buf.offset(),
					);
					let n = self.buf.remaining().len();
					self.buf.consume(n);
					return Event::Error(err);
				}
				Scan::Fault(kind, message) => {
					let err = ParseError::new(kind, message, self.buf.offset());
					self.buf.consume(1);
					return Event::Error(err);
				}
			}
		}
	}

	/// Drain all currently producible events into `cb`.
	///
	/// Returns true if the end of the stream was reached, false if more
	/// input is needed first.
	pub fn read_all<F: FnMut(Event)>(&mut self, mut cb: F) -> bool {
		loop {
			match self.next_event() {
				Event::NeedMoreInput => return false,
				Event::EndOfStream => return true,
				ev => cb(ev),
			}
		}
	}

	fn reject_mode(&mut self) -> Event {
		if !self.mode_rejected {
			self.mode_rejected = true;
			return Event::Error(ParseError::new(
				ErrorKind::Unsupported,
				"dialect not supported",
				self.buf.offset(),
			));
		}
		let n = self.buf.remaining().len();
		self.buf.consume(n);
		if self.finished {
			Event::EndOfStream
		} else {
			Event::NeedMoreInput
		}
	}

	/// Character data up to the next `<` or the soft cap, whichever comes
	/// first.
	fn scan_text(&mut self) -> Scan {
		let rest = self.buf.remaining();
		let window = rest.len().min(self.opts.max_text_chunk);
		let cut = match scan::find_byte(&rest[..window], b'<') {
			Some(lt) => {
				debug_assert!(lt > 0);
				lt
			}
			None if window == self.opts.max_text_chunk => {
				// soft cap: do not cut a codepoint in half
				let cut = utf8::floor_char_boundary(rest, window);
				if cut == 0 {
					// cap sits inside the very first codepoint; emit the
					// raw byte to keep making progress
					1
				} else {
					cut
				}
			}
			// end of stream terminates the run
			None if self.finished => window,
			None => return Scan::Incomplete,
		};
		let text = self.arena.dupe(&rest[..cut]);
		self.eventq.push_back(Event::Text(text));
		self.buf.consume(cut);
		Scan::Done
	}

	/// `<name (attr = "value")* >` or the self-closing form.
	fn scan_start_tag(&mut self) -> Scan {
		let rest = self.buf.remaining();
		let name_end = match scan::scan_name(rest, 1, self.opts.max_name_len) {
			NameScan::Done(end) => end,
			NameScan::Incomplete => return Scan::Incomplete,
			NameScan::Invalid => return Scan::Fault(ErrorKind::InvalidName, "invalid element name"),
			NameScan::TooLong => {
				return Scan::Fault(ErrorKind::LimitExceeded, "element name too long")
			}
		};
		// attribute spans in window coordinates; copied into the arena
		// only once the whole tag has been recognized
		let mut attrs: Vec<(std::ops::Range<usize>, std::ops::Range<usize>)> = Vec::new();
		let mut self_closing = false;
		let mut at = name_end;
		loop {
			at = scan::skip_spaces(rest, at);
			let b = match rest.get(at) {
				None => return Scan::Incomplete,
				Some(&b) => b,
			};
			match b {
				b'>' => {
					at += 1;
					break;
				}
				b'/' => match rest.get(at + 1) {
					None => return Scan::Incomplete,
					Some(b'>') => {
						self_closing = true;
						at += 2;
						break;
					}
					Some(_) => {
						return Scan::Fault(ErrorKind::MalformedMarkup, "expected '>' after '/'")
					}
				},
				_ => {
					if attrs.len() >= self.opts.max_attrs_per_element {
						return Scan::Fault(ErrorKind::LimitExceeded, "too many attributes");
					}
					let aname_end = match scan::scan_name(rest, at, self.opts.max_name_len) {
						NameScan::Done(end) => end,
						NameScan::Incomplete => return Scan::Incomplete,
						NameScan::Invalid => {
							return Scan::Fault(ErrorKind::InvalidName, "invalid attribute name")
						}
						NameScan::TooLong => {
							return Scan::Fault(ErrorKind::LimitExceeded, "attribute name too long")
						}
					};
					let aname = at..aname_end;
					at = scan::skip_spaces(rest, aname_end);
					match rest.get(at) {
						None => return Scan::Incomplete,
						Some(b'=') => at += 1,
						Some(_) => {
							return Scan::Fault(
								ErrorKind::MalformedMarkup,
								"expected '=' after attribute name",
							)
						}
					}
					at = scan::skip_spaces(rest, at);
					let quote = match rest.get(at) {
						None => return Scan::Incomplete,
						Some(&b'"') => b'"',
						Some(&b'\'') => b'\'',
						Some(_) => {
							return Scan::Fault(
								ErrorKind::MalformedMarkup,
								"attribute value must be quoted",
							)
						}
					};
					at += 1;
					let vstart = at;
					loop {
						match rest.get(at) {
							None => return Scan::Incomplete,
							Some(&b) if b == quote => break,
							Some(_) => {
								at += 1;
								if at - vstart > self.opts.max_attr_len {
									return Scan::Fault(
										ErrorKind::LimitExceeded,
										"attribute value too long",
									);
								}
							}
						}
					}
					attrs.push((aname, vstart..at));
					at += 1;
				}
			}
		}
		let name = self.arena.dupe(&rest[1..name_end]);
		self.eventq
			.push_back(Event::ElementStart(name.clone(), Origin::Explicit));
		for (aname, avalue) in attrs {
			let aname = self.arena.dupe(&rest[aname]);
			let avalue = self.arena.dupe(&rest[avalue]);
			self.eventq.push_back(Event::Attribute(aname, avalue));
		}
		if self_closing {
			self.eventq
				.push_back(Event::ElementEnd(name, Origin::Explicit));
		}
		self.buf.consume(at);
		Scan::Done
	}

	/// `</name >`.
	fn scan_end_tag(&mut self) -> Scan {
		let rest = self.buf.remaining();
		let name_end = match scan::scan_name(rest, 2, self.opts.max_name_len) {
			NameScan::Done(end) => end,
			NameScan::Incomplete => return Scan::Incomplete,
			NameScan::Invalid => return Scan::Fault(ErrorKind::InvalidName, "invalid end tag name"),
			NameScan::TooLong => {
				return Scan::Fault(ErrorKind::LimitExceeded, "element name too long")
			}
		};
		let at = scan::skip_spaces(rest, name_end);
		match rest.get(at) {
			None => Scan::Incomplete,
			Some(b'>') => {
				let name = self.arena.dupe(&rest[2..name_end]);
				self.eventq
					.push_back(Event::ElementEnd(name, Origin::Explicit));
				self.buf.consume(at + 1);
				Scan::Done
			}
			Some(_) => Scan::Fault(ErrorKind::MalformedMarkup, "expected '>' in end tag"),
		}
	}

	/// `<!-- ... -->`, `<![CDATA[ ... ]]>` or an unsupported declaration.
	fn scan_bang(&mut self) -> Scan {
		let rest = self.buf.remaining();
		if rest.starts_with(COMMENT_START) {
			return match scan::find_seq(rest, COMMENT_START.len(), COMMENT_END) {
				Some(end) => {
					if self.opts.emit_comments {
						let body = self.arena.dupe(&rest[COMMENT_START.len()..end]);
						self.eventq.push_back(Event::Comment(body));
					}
					self.buf.consume(end + COMMENT_END.len());
					Scan::Done
				}
				None => Scan::Incomplete,
			};
		}
		if rest.starts_with(CDATA_START) {
			return match scan::find_seq(rest, CDATA_START.len(), CDATA_END) {
				Some(end) => {
					if self.opts.emit_cdata {
						let body = self.arena.dupe(&rest[CDATA_START.len()..end]);
						self.eventq.push_back(Event::Cdata(body));
					}
					self.buf.consume(end + CDATA_END.len());
					Scan::Done
				}
				None => Scan::Incomplete,
			};
		}
		if COMMENT_START.starts_with(rest) || CDATA_START.starts_with(rest) {
			// not enough bytes to tell the construct apart yet
			return Scan::Incomplete;
		}
		Scan::Fault(ErrorKind::Unsupported, "markup declaration not supported")
	}

	/// `<?target data?>`.
	fn scan_pi(&mut self) -> Scan {
		let rest = self.buf.remaining();
		let end = match scan::find_seq(rest, 2, PI_END) {
			Some(end) => end,
			None => return Scan::Incomplete,
		};
		if self.opts.emit_pi {
			let interior = &rest[2..end];
			let target_end = match scan::scan_name(interior, 0, self.opts.max_name_len) {
				NameScan::Done(e) => e,
				// the interior is fully buffered, so a name running to
				// its end is complete, delimited by the terminator
				NameScan::Incomplete if !interior.is_empty() => interior.len(),
				NameScan::Incomplete => {
					return Scan::Fault(
						ErrorKind::InvalidName,
						"missing processing instruction target",
					)
				}
				NameScan::Invalid => {
					return Scan::Fault(
						ErrorKind::InvalidName,
						"invalid processing instruction target",
					)
				}
				NameScan::TooLong => {
					return Scan::Fault(
						ErrorKind::LimitExceeded,
						"processing instruction target too long",
					)
				}
			};
			let data_start = scan::skip_spaces(interior, target_end);
			let target = self.arena.dupe(&interior[..target_end]);
			let data = self.arena.dupe(&interior[data_start..]);
			self.eventq
				.push_back(Event::ProcessingInstruction(target, data));
		}
		self.buf.consume(end + PI_END.len());
		Scan::Done
	}
}

impl Default for RawParser {
	fn default() -> Self {
		Self::new()
	}
}
