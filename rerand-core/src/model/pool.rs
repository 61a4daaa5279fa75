use std::sync::{Mutex, PoisonError};

/// Buffers kept around at most, extra ones are dropped.
const MAX_POOLED: usize = 64;

/// Pool of reusable output buffers.
///
/// A buffer is owned by exactly one generation between `take` and `give`,
/// and comes back cleared.
#[derive(Debug, Default)]
pub(crate) struct BufferPool {
	free: Mutex<Vec<String>>,
}

impl BufferPool {
	/// Claims an empty buffer, allocating one if the pool is empty.
	pub(crate) fn take(&self) -> String {
		self.free
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.pop()
			.unwrap_or_default()
	}

	/// Returns a buffer once its content has been copied out.
	pub(crate) fn give(&self, mut buffer: String) {
		buffer.clear();
		let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
		if free.len() < MAX_POOLED {
			free.push(buffer);
		}
	}
}
