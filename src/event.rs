/*!
# Event data model

The term *event* is borrowed from SAX terminology: one logical bit of the
document which has been parsed. Both pipeline stages — the raw element
parser and the sanitizer — speak the same [`Event`] type, so additional
normalization layers can be slotted in between without translation.
*/
use std::fmt;

use bytes::Bytes;

use crate::error::ParseError;

/// Whether an element boundary was present in the source or synthesized
/// by a normalization layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
	/// The boundary is spelled out in the document.
	Explicit,
	/// The boundary was injected on behalf of a dialect rule.
	///
	/// The raw parser never produces this value; it is reserved for
	/// normalizers layered between the parser and the sanitizer. The
	/// sanitizer forwards it unchanged.
	Implied,
}

/**
# One unit of parser output

All payload slices are [`Bytes`] views into the arena owned by the raw
parser which produced them; cloning an event or forwarding it through the
sanitizer copies no payload bytes.

## Document event sequence

A well-formed document produces, between optional whitespace-only
[`Event::Text`] events:

1. One [`Event::ElementStart`]
2. Zero or more [`Event::Attribute`] — always immediately following the
   `ElementStart` they belong to, with no other event kind in between
3. Arbitrarily mixed [`Event::Text`], ancillary constructs and nested
   element sequences
4. One [`Event::ElementEnd`] with the same name

A self-closing tag `<n .../>` expands to exactly one `ElementStart`, its
attributes in source order, and one `ElementEnd` with the same name.

[`Event::NeedMoreInput`] and [`Event::EndOfStream`] are control signals,
not document content: the former invites the caller to feed more bytes,
the latter is returned indefinitely once the stream has been fully
processed after `finish`.
*/
#[derive(Clone, PartialEq, Eq)]
pub enum Event {
	/// An opening tag was recognized. Carries the element name.
	ElementStart(Bytes, Origin),

	/// Attribute name/value pair belonging to the most recent unclosed
	/// [`Event::ElementStart`].
	///
	/// The value is the raw byte content between the quotes; no entity
	/// expansion or whitespace normalization takes place.
	Attribute(Bytes, Bytes),

	/// A closing tag, explicit or synthesized from a self-closing form.
	ElementEnd(Bytes, Origin),

	/// Character data outside markup.
	///
	/// Long runs are split into multiple events at a configurable soft
	/// cap; splits always fall on UTF-8 codepoint boundaries (unless the
	/// input itself is not UTF-8).
	Text(Bytes),

	/// Interior of a `<!-- ... -->` construct. Only emitted when enabled.
	Comment(Bytes),

	/// Target and data of a `<? ... ?>` construct. Only emitted when
	/// enabled.
	ProcessingInstruction(Bytes, Bytes),

	/// Interior of a `<![CDATA[ ... ]]>` section. Only emitted when
	/// enabled.
	Cdata(Bytes),

	/// A recoverable parse failure. The pipeline keeps making progress
	/// after emitting this.
	Error(ParseError),

	/// The cursor sits at a partial construct; feed more bytes.
	NeedMoreInput,

	/// `finish` has been called and every buffered byte was processed.
	EndOfStream,
}

impl Event {
	/// Return true for the control signals [`Event::NeedMoreInput`] and
	/// [`Event::EndOfStream`], false for document content and errors.
	pub fn is_control(&self) -> bool {
		matches!(self, Self::NeedMoreInput | Self::EndOfStream)
	}
}

fn escape_byte<'f>(v: u8, f: &'f mut fmt::Formatter) -> fmt::Result {
	if v >= 0x20u8 && v < 0x80u8 && v != b'"' {
		write!(f, "{}", v as char)
	} else {
		write!(f, "\\x{:02x}", v)
	}
}

struct DebugBytes<'a>(&'a [u8]);

impl<'a> fmt::Debug for DebugBytes<'a> {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str("\"")?;
		for b in self.0.iter() {
			escape_byte(*b, f)?;
		}
		f.write_str("\"")?;
		Ok(())
	}
}

impl fmt::Debug for Event {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::ElementStart(name, origin) => f
				.debug_tuple("ElementStart")
				.field(&DebugBytes(name))
				.field(origin)
				.finish(),
			Self::Attribute(name, value) => f
				.debug_tuple("Attribute")
				.field(&DebugBytes(name))
				.field(&DebugBytes(value))
				.finish(),
			Self::ElementEnd(name, origin) => f
				.debug_tuple("ElementEnd")
				.field(&DebugBytes(name))
				.field(origin)
				.finish(),
			Self::Text(text) => f.debug_tuple("Text").field(&DebugBytes(text)).finish(),
			Self::Comment(body) => f.debug_tuple("Comment").field(&DebugBytes(body)).finish(),
			Self::ProcessingInstruction(target, data) => f
				.debug_tuple("ProcessingInstruction")
				.field(&DebugBytes(target))
				.field(&DebugBytes(data))
				.finish(),
			Self::Cdata(body) => f.debug_tuple("Cdata").field(&DebugBytes(body)).finish(),
			Self::Error(e) => f.debug_tuple("Error").field(e).finish(),
			Self::NeedMoreInput => f.write_str("NeedMoreInput"),
			Self::EndOfStream => f.write_str("EndOfStream"),
		}
	}
}
