/*!
# Error types

Parse failures are recoverable and travel inside the event stream as
[`Event::Error`](crate::Event::Error); this module holds their payload.
The pipeline is required to make forward progress after every such event,
so none of these types are fatal.
*/
use std::error;
use std::fmt;

/// Classification of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// A byte sequence was not valid UTF-8 where a consumer required it
	/// to be.
	///
	/// The raw parser itself only preserves codepoint boundaries at text
	/// cuts and does not validate sequences; this kind is reserved for
	/// layers that do.
	InvalidUtf8,

	/// A construct violated the markup grammar.
	MalformedMarkup,

	/// An element, attribute or processing instruction target name
	/// started with a byte that cannot begin a name.
	InvalidName,

	/// The stream ended inside an unfinished construct.
	UnexpectedEof,

	/// A configured size or count limit was exceeded.
	LimitExceeded,

	/// The construct or dialect is recognized but not supported.
	Unsupported,
}

impl fmt::Display for ErrorKind {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str(match self {
			Self::InvalidUtf8 => "invalid utf-8",
			Self::MalformedMarkup => "malformed markup",
			Self::InvalidName => "invalid name",
			Self::UnexpectedEof => "unexpected end of stream",
			Self::LimitExceeded => "limit exceeded",
			Self::Unsupported => "unsupported feature",
		})
	}
}

/**
Recoverable parse failure, delivered as [`Event::Error`](crate::Event::Error).

Errors reported by the raw parser carry the absolute byte offset of the
start of the offending construct. Offsets on successive raw-parser errors
are non-decreasing. The sanitizer does not see byte positions; its own
errors carry offset 0.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
	kind: ErrorKind,
	message: &'static str,
	offset: u64,
}

impl ParseError {
	pub(crate) fn new(kind: ErrorKind, message: &'static str, offset: u64) -> ParseError {
		ParseError {
			kind: kind,
			message: message,
			offset: offset,
		}
	}

	/// Classification of the failure.
	pub fn kind(&self) -> ErrorKind {
		self.kind
	}

	/// Short, static description of the failure.
	pub fn message(&self) -> &'static str {
		self.message
	}

	/// Absolute byte offset of the start of the offending construct, or 0
	/// for errors raised by the sanitizer.
	pub fn offset(&self) -> u64 {
		self.offset
	}
}

impl fmt::Display for ParseError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}: {} at byte {}", self.kind, self.message, self.offset)
	}
}

impl error::Error for ParseError {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn error_display_carries_kind_message_and_offset() {
		let e = ParseError::new(ErrorKind::MalformedMarkup, "duplicate attribute", 17);
		assert_eq!(
			format!("{}", e),
			"malformed markup: duplicate attribute at byte 17"
		);
	}

	#[test]
	fn error_accessors_return_the_parts() {
		let e = ParseError::new(ErrorKind::LimitExceeded, "too many attributes", 4);
		assert_eq!(e.kind(), ErrorKind::LimitExceeded);
		assert_eq!(e.message(), "too many attributes");
		assert_eq!(e.offset(), 4);
	}
}
