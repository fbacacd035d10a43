/*!
Frontends that tie the raw parser and the sanitizer together.

For high-level parsing, [`FeedParser`] and [`PullParser`] are the things
to look at. Both compose a [`RawParser`] with a [`Sanitizer`] and expose
the sanitized event sequence; callers who want the raw sequence use
[`RawParser`] directly.
*/
use std::io;

use crate::event::Event;
use crate::parser::{ParserOptions, RawParser};
use crate::sanitizer::{Sanitizer, SanitizerOptions};

/**
# Push-based parsing

The [`FeedParser`] allows parsing documents as their bytes arrive in the
application, giving back control immediately when not enough data is
available. This is especially useful when streaming from sockets or out
of a decompressor.

## Example

```
use skimxml::{Event, FeedParser};
let doc = b"<hello kind='big'>World!</hello>";
let mut fp = FeedParser::new();
fp.feed(&doc[..10]);
// the start tag is not complete yet
assert_eq!(fp.next_event(), Event::NeedMoreInput);
fp.feed(&doc[10..]);
fp.finish();
let mut names = Vec::new();
fp.read_all(|ev| {
	if let Event::ElementStart(name, _) = ev {
		names.push(name);
	}
});
assert_eq!(names, vec![&b"hello"[..]]);
```
*/
pub struct FeedParser {
	parser: RawParser,
	sanitizer: Sanitizer,
}

impl FeedParser {
	/// Create a feed parser with default options for both stages.
	pub fn new() -> FeedParser {
		Self::with_options(ParserOptions::default(), SanitizerOptions::default())
	}

	/// Create a feed parser with the given options.
	pub fn with_options(parser: ParserOptions, sanitizer: SanitizerOptions) -> FeedParser {
		Self::wrap(RawParser::with_options(parser), Sanitizer::with_options(sanitizer))
	}

	/// Compose a feed parser from parts.
	pub fn wrap(parser: RawParser, sanitizer: Sanitizer) -> FeedParser {
		FeedParser {
			parser: parser,
			sanitizer: sanitizer,
		}
	}

	/// Feed a chunk of data.
	///
	/// This enqueues the data for processing, but does not process it
	/// right away. To process, call [`FeedParser::next_event()`] or
	/// [`FeedParser::read_all()`].
	///
	/// # Panics
	///
	/// If [`FeedParser::finish()`] has been called since the last reset.
	pub fn feed(&mut self, bytes: &[u8]) {
		self.parser.feed(bytes);
	}

	/// Mark the end of the stream.
	///
	/// This is a prerequisite for the event sequence to terminate with
	/// [`Event::EndOfStream`]; without it, [`Event::NeedMoreInput`] is
	/// returned indefinitely once the buffered data is exhausted.
	pub fn finish(&mut self) {
		self.parser.finish();
	}

	/// Return the next sanitized event.
	pub fn next_event(&mut self) -> Event {
		loop {
			match self.sanitizer.next_event() {
				Event::NeedMoreInput => (),
				ev => return ev,
			}
			match self.parser.next_event() {
				Event::NeedMoreInput => return Event::NeedMoreInput,
				ev => self.sanitizer.push(ev),
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

	/// Return both stages to their initial state, retaining capacity.
	pub fn reset(&mut self) {
		self.parser.reset();
		self.sanitizer.reset();
	}

	/// Access the raw parser stage.
	pub fn parser(&self) -> &RawParser {
		&self.parser
	}

	/// Access the raw parser stage, mutably.
	pub fn parser_mut(&mut self) -> &mut RawParser {
		&mut self.parser
	}

	/// Access the sanitizer stage.
	pub fn sanitizer(&self) -> &Sanitizer {
		&self.sanitizer
	}

	/// Access the sanitizer stage, mutably.
	pub fn sanitizer_mut(&mut self) -> &mut Sanitizer {
		&mut self.sanitizer
	}

	/// Release all temporary buffers of both stages.
	pub fn release_temporaries(&mut self) {
		self.parser.release_temporaries();
		self.sanitizer.release_temporaries();
	}
}

impl Default for FeedParser {
	fn default() -> Self {
		Self::new()
	}
}

/**
# Blocking parsing

The [`PullParser`] reads from any [`io::BufRead`] and refills the
pipeline whenever it runs dry, so [`PullParser::next_event()`] never
returns [`Event::NeedMoreInput`]. Reader end-of-file is converted into
`finish`, after which the remaining events and finally
[`Event::EndOfStream`] are returned.

I/O errors are returned as-is and may be retried; in particular a source
returning [`io::ErrorKind::WouldBlock`] leaves the parser state intact.

## Example

```
use skimxml::{Event, PullParser};
let mut doc = &b"<hello>World!</hello>"[..];
let mut pp = PullParser::new(&mut doc);
let mut kinds = Vec::new();
pp.read_all(|ev| kinds.push(ev)).unwrap();
assert_eq!(kinds.len(), 3);
```
*/
pub struct PullParser<R: io::BufRead> {
	inner: FeedParser,
	src: R,
}

impl<R: io::BufRead> PullParser<R> {
	/// Create a pull parser with default options, wrapping the given
	/// reader.
	pub fn new(src: R) -> PullParser<R> {
		Self::with_options(src, ParserOptions::default(), SanitizerOptions::default())
	}

	/// Create a pull parser with the given options.
	pub fn with_options(
		src: R,
		parser: ParserOptions,
		sanitizer: SanitizerOptions,
	) -> PullParser<R> {
		PullParser {
			inner: FeedParser::with_options(parser, sanitizer),
			src: src,
		}
	}

	/// Access the wrapped reader.
	pub fn get_ref(&self) -> &R {
		&self.src
	}

	/// Access the wrapped reader, mutably.
	pub fn get_mut(&mut self) -> &mut R {
		&mut self.src
	}

	/// Consume self and return the wrapped reader.
	pub fn into_inner(self) -> R {
		self.src
	}

	/// Return the next sanitized event, reading from the source as
	/// needed.
	pub fn next_event(&mut self) -> io::Result<Event> {
		loop {
			match self.inner.next_event() {
				Event::NeedMoreInput => {
					let buf = self.src.fill_buf()?;
					if buf.is_empty() {
						self.inner.finish();
						continue;
					}
					let n = buf.len();
					self.inner.feed(buf);
					self.src.consume(n);
				}
				ev => return Ok(ev),
			}
		}
	}

	/// Read events until the end of the stream, invoking `cb` for each.
	pub fn read_all<F: FnMut(Event)>(&mut self, mut cb: F) -> io::Result<()> {
		loop {
			match self.next_event()? {
				Event::EndOfStream => return Ok(()),
				ev => cb(ev),
			}
		}
	}
}
