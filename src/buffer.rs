use std::fmt;

/// Compaction does not run before this many bytes have been consumed, so
/// that small documents never pay for a copy.
const COMPACT_MIN_CONSUMED: usize = 4096;

pub const ERR_FEED_AFTER_EOF: &'static str = "cannot feed after end of stream";
pub const ERR_CONSUME_BEYOND_END: &'static str = "attempt to consume beyond end of buffer";

/**
# Append-only input buffer with a read cursor

The `InputBuffer` holds the bytes which have been fed to a parser but not
consumed yet. Data is appended with [`InputBuffer::feed()`], inspected
through [`InputBuffer::remaining()`] and released with
[`InputBuffer::consume()`].

The buffer keeps an absolute offset counter: the number of bytes consumed
since construction or the last [`InputBuffer::reset()`]. The counter is
used for diagnostics and is unaffected by compaction.

Compaction is deliberately lazy. A consumed prefix is only copied away once
it is at least 4096 bytes long *and* larger than the unconsumed suffix, so
copies are amortized over many small constructs.

## Example

```
use skimxml::InputBuffer;
let mut buf = InputBuffer::new();
buf.feed(b"<doc>rest");
assert_eq!(buf.remaining(), b"<doc>rest");
buf.consume(5);
assert_eq!(buf.remaining(), b"rest");
assert_eq!(buf.offset(), 5);
```
*/
pub struct InputBuffer {
	data: Vec<u8>,
	cursor: usize,
	offset: u64,
	eof: bool,
}

impl InputBuffer {
	/// Create a new, empty input buffer.
	pub fn new() -> InputBuffer {
		InputBuffer {
			data: Vec::new(),
			cursor: 0,
			offset: 0,
			eof: false,
		}
	}

	/// Append bytes to the end of the buffer.
	///
	/// Runs a compaction pass first if the consumed prefix has grown large
	/// enough (see [`InputBuffer::compact()`]).
	///
	/// # Panics
	///
	/// If [`InputBuffer::push_eof()`] has been called.
	pub fn feed(&mut self, bytes: &[u8]) {
		if self.eof {
			panic!("{}", ERR_FEED_AFTER_EOF);
		}
		self.compact();
		self.data.extend_from_slice(bytes);
	}

	/// Mark the end of the stream.
	///
	/// After the marker has been set, no further data can be fed. Calling
	/// this more than once has no effect.
	pub fn push_eof(&mut self) {
		self.eof = true;
	}

	/// Return whether the end-of-stream marker has been set.
	pub fn eof_pushed(&self) -> bool {
		self.eof
	}

	/// Return the unconsumed bytes, from the cursor to the end.
	pub fn remaining(&self) -> &[u8] {
		&self.data[self.cursor..]
	}

	/// Advance the cursor by `n` bytes and account them to the absolute
	/// offset counter.
	///
	/// # Panics
	///
	/// If `n` is larger than what [`InputBuffer::remaining()`] holds.
	pub fn consume(&mut self, n: usize) {
		if n > self.data.len() - self.cursor {
			panic!("{}", ERR_CONSUME_BEYOND_END);
		}
		self.cursor += n;
		self.offset += n as u64;
	}

	/// Number of bytes consumed since construction or the last reset.
	///
	/// This is the offset carried by error events; it is not affected by
	/// compaction.
	pub fn offset(&self) -> u64 {
		self.offset
	}

	/// Move the unconsumed suffix to the front of the allocation and reset
	/// the cursor.
	///
	/// This is a no-op until the consumed prefix is at least 4096 bytes
	/// long and larger than the suffix.
	pub fn compact(&mut self) {
		if self.cursor < COMPACT_MIN_CONSUMED || self.cursor <= self.data.len() - self.cursor {
			return;
		}
		let tail = self.data.len() - self.cursor;
		self.data.copy_within(self.cursor.., 0);
		self.data.truncate(tail);
		self.cursor = 0;
	}

	/// Drop all contents and counters, retaining the allocation.
	pub fn reset(&mut self) {
		self.data.clear();
		self.cursor = 0;
		self.offset = 0;
		self.eof = false;
	}
}

impl fmt::Debug for InputBuffer {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("InputBuffer")
			.field("remaining", &(self.data.len() - self.cursor))
			.field("offset", &self.offset)
			.field("eof", &self.eof)
			.finish()
	}
}
