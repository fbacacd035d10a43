use bytes::{Bytes, BytesMut};

/// Granularity of the backing regions. Payloads larger than this get a
/// region of their own.
const REGION_SIZE: usize = 8192;

/**
# Bulk allocator for event payloads

All byte slices carried by events are copied into regions owned by the
arena. [`PayloadArena::dupe()`] appends the source bytes to the current
region and returns a frozen [`Bytes`] view of the copy; handing that view
to an event, or from the parser to the sanitizer, moves no bytes.

Reclamation is coarse: individual payloads are never freed, the whole
arena is recycled by [`PayloadArena::reset()`] (or by dropping it). Once
the consumer has released all views into a region, `reset` reuses the
allocation for the next document instead of returning it to the allocator.
*/
pub struct PayloadArena {
	region: BytesMut,
}

impl PayloadArena {
	/// Create an arena with one empty region.
	pub fn new() -> PayloadArena {
		PayloadArena {
			region: BytesMut::with_capacity(REGION_SIZE),
		}
	}

	/// Copy `src` into the arena and return the copy.
	///
	/// The returned [`Bytes`] stays valid for as long as the caller holds
	/// it; the arena only reuses its storage once all outstanding copies
	/// have been dropped.
	pub fn dupe(&mut self, src: &[u8]) -> Bytes {
		if src.is_empty() {
			return Bytes::new();
		}
		if self.region.capacity() < src.len() {
			self.region.reserve(src.len().max(REGION_SIZE));
		}
		self.region.extend_from_slice(src);
		self.region.split().freeze()
	}

	/// Start a fresh document.
	///
	/// Makes sure a full region is available again. If the previous
	/// document's payloads have all been dropped, the old allocation is
	/// reused.
	pub fn reset(&mut self) {
		self.region.reserve(REGION_SIZE);
	}
}
