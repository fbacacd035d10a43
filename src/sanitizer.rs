/*!
# Well-formedness sanitizer

The sanitizer consumes the raw event sequence and enforces the global
structural invariants the raw parser deliberately ignores: a single root
element, balanced nesting, unique attribute names per element and no
significant text outside the root. It operates at event granularity and
never looks at document bytes.

Events are pushed in with [`Sanitizer::push()`] and drained in order with
[`Sanitizer::next_event()`]. Payload slices are forwarded as-is — the
sanitizer holds [`Bytes`] views into the upstream parser's arena and must
therefore not outlive that arena's current document.

Violations are reported through [`Event::Error`] with offset 0, since
byte positions are not visible at this layer. With
[`SanitizerOptions::fail_fast`] set, the first error stops the stream:
subsequent events other than errors and the end-of-stream signal are
dropped, and the finish checks are skipped.
*/
use std::collections::{HashSet, VecDeque};

use bytes::Bytes;

use crate::error::{ErrorKind, ParseError};
use crate::event::Event;
use crate::parser::scan::is_space_byte;

/**
Options for a [`Sanitizer`].

The defaults are implementation-defined and should not be relied upon.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizerOptions {
	/// After the first error has been emitted, suppress all further
	/// output except errors and the end-of-stream signal.
	pub fail_fast: bool,
	/// Maximum element nesting depth.
	pub max_depth: usize,
}

impl SanitizerOptions {
	/// Set [`SanitizerOptions::fail_fast`].
	pub fn fail_fast(mut self, v: bool) -> SanitizerOptions {
		self.fail_fast = v;
		self
	}

	/// Set [`SanitizerOptions::max_depth`].
	pub fn max_depth(mut self, v: usize) -> SanitizerOptions {
		self.max_depth = v;
		self
	}
}

impl Default for SanitizerOptions {
	fn default() -> Self {
		Self {
			fail_fast: false,
			max_depth: 256,
		}
	}
}

/**
# Structural well-formedness filter over an event stream

See the [module documentation](self) for the operating model.

## Example

```
use skimxml::{Event, RawParser, Sanitizer};
let mut p = RawParser::new();
let mut san = Sanitizer::new();
p.feed(b"<a><b></a>");
p.finish();
loop {
	match p.next_event() {
		Event::EndOfStream => break,
		ev => san.push(ev),
	}
}
san.finish();
loop {
	match san.next_event() {
		Event::EndOfStream => break,
		ev => println!("got event: {:?}", ev),
	}
}
```
*/
pub struct Sanitizer {
	opts: SanitizerOptions,
	/// Open-element names, borrowed from the upstream arena.
	stack: Vec<Bytes>,
	seen_root: bool,
	root_closed: bool,
	/// Whether the last forwarded event admits attributes.
	in_attrs: bool,
	attr_names: HashSet<Bytes>,
	outq: VecDeque<Event>,
	stopped: bool,
	finished: bool,
}

impl Sanitizer {
	/// Create a sanitizer with [`SanitizerOptions::default()`].
	pub fn new() -> Sanitizer {
		Self::with_options(SanitizerOptions::default())
	}

	/// Create a sanitizer with the given options.
	pub fn with_options(opts: SanitizerOptions) -> Sanitizer {
		Sanitizer {
			opts: opts,
			stack: Vec::new(),
			seen_root: false,
			root_closed: false,
			in_attrs: false,
			attr_names: HashSet::new(),
			outq: VecDeque::new(),
			stopped: false,
			finished: false,
		}
	}

	/// Return the options the sanitizer was built with.
	pub fn options(&self) -> &SanitizerOptions {
		&self.opts
	}

	/// Current element nesting depth.
	pub fn depth(&self) -> usize {
		self.stack.len()
	}

	/// Accept one upstream event.
	///
	/// [`Event::NeedMoreInput`] is ignored; [`Event::EndOfStream`]
	/// triggers the same logic as [`Sanitizer::finish()`]. Events pushed
	/// after the stream has finished are dropped.
	pub fn push(&mut self, ev: Event) {
		match ev {
			Event::NeedMoreInput => return,
			Event::EndOfStream => return self.finish(),
			Event::Error(err) => {
				if self.finished {
					return;
				}
				// upstream errors pass through even when stopped
				self.outq.push_back(Event::Error(err));
				if self.opts.fail_fast {
					self.stopped = true;
				}
				return;
			}
			_ => (),
		}
		if self.stopped || self.finished {
			return;
		}
		match ev {
			Event::ElementStart(name, origin) => {
				self.leave_attrs();
				if self.root_closed {
					return self.fail(ErrorKind::MalformedMarkup, "multiple root elements");
				}
				if self.stack.len() >= self.opts.max_depth {
					return self.fail(ErrorKind::LimitExceeded, "element nesting too deep");
				}
				self.stack.push(name.clone());
				if self.stack.len() == 1 {
					self.seen_root = true;
				}
				self.in_attrs = true;
				self.outq.push_back(Event::ElementStart(name, origin));
			}
			Event::Attribute(name, value) => {
				if !self.in_attrs {
					return self.fail(ErrorKind::MalformedMarkup, "attribute without start tag");
				}
				if !self.attr_names.insert(name.clone()) {
					return self.fail(ErrorKind::MalformedMarkup, "duplicate attribute");
				}
				self.outq.push_back(Event::Attribute(name, value));
			}
			Event::ElementEnd(name, origin) => {
				self.leave_attrs();
				let top_matches = match self.stack.last() {
					None => None,
					Some(top) => Some(*top == name),
				};
				match top_matches {
					None => self.fail(ErrorKind::MalformedMarkup, "end tag without start"),
					Some(false) => self.fail(ErrorKind::MalformedMarkup, "mismatched end tag"),
					Some(true) => {
						self.stack.pop();
						if self.stack.is_empty() && self.seen_root {
							self.root_closed = true;
						}
						self.outq.push_back(Event::ElementEnd(name, origin));
					}
				}
			}
			Event::Text(text) => {
				self.leave_attrs();
				if self.stack.is_empty() && !text.iter().all(|&b| is_space_byte(b)) {
					return self.fail(ErrorKind::MalformedMarkup, "text outside root");
				}
				self.outq.push_back(Event::Text(text));
			}
			// the control signals and errors returned above
			Event::Error(_) | Event::NeedMoreInput | Event::EndOfStream => unreachable!(),
			// Comment, Cdata, ProcessingInstruction
			other => {
				self.leave_attrs();
				self.outq.push_back(other);
			}
		}
	}

	/// Signal that no further events will arrive.
	///
	/// Reports a still-open element or a missing root, then transitions
	/// to the finished state. Once stopped by a fail-fast error, the
	/// checks are skipped: a stopped stream stays stopped.
	pub fn finish(&mut self) {
		if self.finished {
			return;
		}
		self.leave_attrs();
		if !self.stopped {
			if !self.stack.is_empty() {
				self.fail(ErrorKind::UnexpectedEof, "unclosed element");
			} else if !self.seen_root {
				self.fail(ErrorKind::MalformedMarkup, "missing root");
			}
		}
		self.finished = true;
	}

	/// Drain one sanitized event.
	///
	/// Returns [`Event::NeedMoreInput`] while the queue is empty and
	/// [`Sanitizer::finish()`] has not been called, and
	/// [`Event::EndOfStream`] once it has and the queue has drained.
	pub fn next_event(&mut self) -> Event {
		match self.outq.pop_front() {
			Some(ev) => ev,
			None if self.finished => Event::EndOfStream,
			None => Event::NeedMoreInput,
		}
	}

	/// Return the sanitizer to its initial state.
	pub fn reset(&mut self) {
		self.stack.clear();
		self.seen_root = false;
		self.root_closed = false;
		self.in_attrs = false;
		self.attr_names.clear();
		self.outq.clear();
		self.stopped = false;
		self.finished = false;
	}

	/// Shrink internal queues. Sensible to call when no more data is
	/// expected for a while and the memory is better used elsewhere.
	pub fn release_temporaries(&mut self) {
		self.stack.shrink_to_fit();
		self.attr_names.shrink_to_fit();
		self.outq.shrink_to_fit();
	}

	fn leave_attrs(&mut self) {
		self.in_attrs = false;
		self.attr_names.clear();
	}

	fn fail(&mut self, kind: ErrorKind, message: &'static str) {
		// no byte positions at this layer
		self.outq
			.push_back(Event::Error(ParseError::new(kind, message, 0)));
		if self.opts.fail_fast {
			self.stopped = true;
		}
	}
}

impl Default for Sanitizer {
	fn default() -> Self {
		Self::new()
	}
}
