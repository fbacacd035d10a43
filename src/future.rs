/*!
Tokio-compatible asynchronous frontend, available with the `async`
feature.

The [`AsyncParser`] operates like the blocking
[`PullParser`](crate::PullParser), but instead of blocking the task while
the source has no data, it yields control to other tasks.
*/
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::AsyncBufRead;

#[cfg(feature = "stream")]
use futures_core::stream::Stream;

use pin_project_lite::pin_project;

use crate::driver::FeedParser;
use crate::event::Event;
use crate::parser::ParserOptions;
use crate::sanitizer::SanitizerOptions;

pin_project! {
	/**
	# Asynchronous parsing

	Wraps a [`tokio::io::AsyncBufRead`] and refills the pipeline whenever
	it runs dry, so the returned events never include
	[`Event::NeedMoreInput`]. Source end-of-file finishes the stream,
	after which the remaining events and finally [`Event::EndOfStream`]
	are produced.

	With the `stream` feature enabled, `AsyncParser` also implements
	[`futures_core::Stream`], yielding events until the end of the
	stream.
	*/
	pub struct AsyncParser<T> {
		#[pin]
		src: T,
		inner: FeedParser,
	}
}

impl<T: AsyncBufRead> AsyncParser<T> {
	/// Create an async parser with default options, wrapping the given
	/// reader.
	pub fn new(src: T) -> AsyncParser<T> {
		Self::with_options(src, ParserOptions::default(), SanitizerOptions::default())
	}

	/// Create an async parser with the given options.
	pub fn with_options(
		src: T,
		parser: ParserOptions,
		sanitizer: SanitizerOptions,
	) -> AsyncParser<T> {
		AsyncParser {
			src: src,
			inner: FeedParser::with_options(parser, sanitizer),
		}
	}

	/// Access the wrapped reader.
	pub fn get_ref(&self) -> &T {
		&self.src
	}

	/// Consume self and return the wrapped reader.
	pub fn into_inner(self) -> T {
		self.src
	}

	/// Poll for the next sanitized event, reading from the source as
	/// needed.
	pub fn poll_next_event(
		self: Pin<&mut Self>,
		cx: &mut Context<'_>,
	) -> Poll<io::Result<Event>> {
		let mut this = self.project();
		loop {
			match this.inner.next_event() {
				Event::NeedMoreInput => {
					let buf = match this.src.as_mut().poll_fill_buf(cx) {
						Poll::Pending => return Poll::Pending,
						Poll::Ready(Ok(buf)) => buf,
						Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
					};
					if buf.is_empty() {
						this.inner.finish();
						continue;
					}
					let n = buf.len();
					this.inner.feed(buf);
					this.src.as_mut().consume(n);
				}
				ev => return Poll::Ready(Ok(ev)),
			}
		}
	}
}

impl<T: AsyncBufRead + Unpin> AsyncParser<T> {
	/// Read a single event from the parser.
	///
	/// Equivalent to:
	///
	/// ```ignore
	/// async fn next_event(&mut self) -> io::Result<Event>;
	/// ```
	pub fn next_event(&mut self) -> NextEvent<'_, T> {
		NextEvent { parser: self }
	}

	/// Read events until the end of the stream, invoking `cb` for each.
	///
	/// Equivalent to:
	///
	/// ```ignore
	/// async fn read_all<F: FnMut(Event)>(&mut self, cb: F) -> io::Result<()>;
	/// ```
	pub async fn read_all<F: FnMut(Event)>(&mut self, mut cb: F) -> io::Result<()> {
		loop {
			match self.next_event().await? {
				Event::EndOfStream => return Ok(()),
				ev => cb(ev),
			}
		}
	}
}

/// Future returned by [`AsyncParser::next_event()`].
pub struct NextEvent<'a, T> {
	parser: &'a mut AsyncParser<T>,
}

impl<'a, T: AsyncBufRead + Unpin> Future for NextEvent<'a, T> {
	type Output = io::Result<Event>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		let this = self.get_mut();
		Pin::new(&mut *this.parser).poll_next_event(cx)
	}
}

#[cfg(feature = "stream")]
#[cfg_attr(docsrs, doc(cfg(all(feature = "async", feature = "stream"))))]
impl<T: AsyncBufRead> Stream for AsyncParser<T> {
	type Item = io::Result<Event>;

	fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		match self.poll_next_event(cx) {
			Poll::Pending => Poll::Pending,
			Poll::Ready(Ok(Event::EndOfStream)) => Poll::Ready(None),
			Poll::Ready(Ok(ev)) => Poll::Ready(Some(Ok(ev))),
			Poll::Ready(Err(e)) => Poll::Ready(Some(Err(e))),
		}
	}
}
