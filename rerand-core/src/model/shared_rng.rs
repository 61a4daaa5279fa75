use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random source shared by every caller of a generator.
///
/// Each draw takes the lock for its own duration only, so concurrent
/// generations interleave at draw granularity.
#[derive(Debug)]
pub struct SharedRng<R> {
	inner: Mutex<R>,
}

impl<R: Rng> SharedRng<R> {
	pub fn new(rng: R) -> Self {
		Self { inner: Mutex::new(rng) }
	}

	/// Runs one draw with exclusive access to the source.
	///
	/// A poisoned lock is recovered: a panic in another draw leaves the source
	/// in a usable state.
	pub fn draw<T>(&self, f: impl FnOnce(&mut R) -> T) -> T {
		let mut rng = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
		f(&mut *rng)
	}
}

impl SharedRng<StdRng> {
	/// `StdRng` seeded from the current time.
	pub fn from_time() -> Self {
		let nanos = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|elapsed| elapsed.as_nanos() as u64)
			.unwrap_or_default();
		Self::new(StdRng::seed_from_u64(nanos))
	}
}
