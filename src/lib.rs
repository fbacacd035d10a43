/*!
# Incremental parsing of XML-shaped markup

This crate converts a stream of UTF-8 bytes into a well-formed sequence
of structural events, without ever materializing a document tree. It is
built for embedded and memory-constrained consumers — document-rendering
and indexing pipelines that must keep going as bytes arrive from the
network or out of a decompressor.

## Features (some call them restrictions)

* Byte-chunk-resumable: feed input in arbitrary pieces, down to one byte
  at a time, and get the identical event sequence
* Strict, configurable byte limits on names, attribute values and text
  chunks
* Bounded allocation: event payloads live in an arena reclaimed per
  document, the input buffer compacts itself
* Recoverable errors delivered in-band as events; the parser never stalls
  on malformed input
* Well-formedness (single root, balanced nesting, unique attributes,
  no stray text) enforced by a separate, composable sanitizer stage
* No DTD, no entity expansion, no namespace resolution, no encodings
  other than UTF-8
* Parser can be driven push- and pull-based; Tokio-based asynchronicity
  supported via the `async` feature and [`AsyncParser`]

## Example

```
use skimxml::{Event, FeedParser};
let doc = b"<hello kind='big'>World!</hello>";
let mut fp = FeedParser::new();
fp.feed(doc);
fp.finish();
let eof = fp.read_all(|ev| {
	println!("got event: {:?}", ev);
});
// true indicates that the end of the stream was reached
assert_eq!(eof, true);
```

## The two stages

The [`RawParser`] recognizes constructs — tags, text, comments, CDATA
sections, processing instructions — and emits them as [`Event`]s without
judging document structure. The [`Sanitizer`] consumes that sequence and
enforces the global invariants. [`FeedParser`], [`PullParser`] and
[`AsyncParser`] compose the two; each stage can also be used on its own,
for instance to slot a normalization layer in between.
*/
#![cfg_attr(docsrs, feature(doc_cfg))]

mod buffer;
mod driver;
pub mod error;
pub mod event;
pub mod parser;
mod payload;
pub mod sanitizer;

#[cfg(test)]
mod tests;

#[doc(inline)]
pub use buffer::InputBuffer;
#[doc(inline)]
pub use driver::{FeedParser, PullParser};
pub use error::{ErrorKind, ParseError};
pub use event::{Event, Origin};
#[doc(inline)]
pub use parser::{ParserMode, ParserOptions, RawParser};
#[doc(inline)]
pub use payload::PayloadArena;
#[doc(inline)]
pub use sanitizer::{Sanitizer, SanitizerOptions};

#[cfg(feature = "async")]
mod future;

#[cfg(feature = "async")]
#[doc(inline)]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub use future::{AsyncParser, NextEvent};

/// Package version
pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");
