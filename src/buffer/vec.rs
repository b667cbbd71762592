use crate::Result;

/**
Growth policy: given current capacity and the requested total size, return the new capacity.

Returning less than requested is allowed and means partial growth.
*/
pub type GrowthPolicy = fn(capacity: usize, requested: usize) -> usize;

// double the size just like rust's vec/raw_vec do
fn double(capacity: usize, requested: usize) -> usize {
	std::cmp::max(requested, capacity.saturating_mul(2))
}

/// Heap-backed buffer that owns its storage
pub struct VecBuffer<T> {
	// initialized up to its full length, which is our capacity
	buf: Vec<T>,
	len: usize,
	incr: Option<usize>,
	max: usize,
	policy: GrowthPolicy,
}

/// Buffer for the usual byte output of the formatting functions
pub type MemoryBuffer = VecBuffer<u8>;

pub struct VecBufferBuilder {
	bufsize: usize,
	incr: Option<usize>,
	max: usize,
	policy: GrowthPolicy,
}
impl VecBufferBuilder {
	pub fn new() -> Self {
		VecBufferBuilder {
			bufsize: 0,
			incr: None,
			max: usize::MAX,
			policy: double,
		}
	}

	pub fn capacity(mut self, bufsize: usize) -> Self {
		self.bufsize = bufsize;
		self
	}

	/// Grow in fixed steps of `incr` elements instead of doubling
	pub fn increment(mut self, incr: usize) -> Self {
		if incr == 0 {
			panic!("non-positive buffer increments requested")
		}
		self.incr = Some(incr);
		self
	}

	/// Never grow past `max` elements; requests beyond that are partially satisfied
	pub fn max_capacity(mut self, max: usize) -> Self {
		self.max = max;
		self
	}

	/// Replace the growth policy altogether
	pub fn policy(mut self, policy: GrowthPolicy) -> Self {
		self.policy = policy;
		self
	}

	pub fn build<T: Copy + Default>(self) -> VecBuffer<T> {
		let bufsize = std::cmp::min(self.bufsize, self.max);
		VecBuffer {
			buf: vec![T::default(); bufsize],
			len: 0,
			incr: self.incr,
			max: self.max,
			policy: self.policy,
		}
	}
}
impl Default for VecBufferBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Copy + Default> VecBuffer<T> {
	pub fn new() -> Self {
		VecBufferBuilder::new().build()
	}
	pub fn with_capacity(cap: usize) -> Self {
		VecBufferBuilder::new().capacity(cap).build()
	}
	pub fn into_vec(mut self) -> Vec<T> {
		self.buf.truncate(self.len);
		self.buf
	}
}
impl<T: Copy + Default> Default for VecBuffer<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryBuffer {
	pub fn into_string(self) -> Result<String> {
		Ok(String::from_utf8(self.into_vec())?)
	}
}

impl<T: Copy + Default> super::Buffer<T> for VecBuffer<T> {
	fn storage(&self) -> &[T] {
		&self.buf
	}
	fn storage_mut(&mut self) -> &mut [T] {
		&mut self.buf
	}
	fn len(&self) -> usize {
		self.len
	}
	fn set_len(&mut self, len: usize) {
		debug_assert!(len <= self.buf.len());
		self.len = len;
	}
	fn grow(&mut self, requested: usize) -> Result<()> {
		let cap = self.buf.len();
		let new_cap = match self.incr {
			// smallest multiple of increments that covers the request
			Some(incr) => cap + (requested.saturating_sub(cap) + incr - 1) / incr * incr,
			None => (self.policy)(cap, requested),
		};
		let new_cap = std::cmp::min(new_cap, self.max);
		if new_cap > cap {
			log::trace!("growing buffer from {} to {} elements ({} requested)", cap, new_cap, requested);
			self.buf.resize(new_cap, T::default());
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Buffer;

	#[test]
	fn doubles() {
		let mut buf = VecBufferBuilder::new().capacity(4).build::<u8>();
		buf.append(b"abcde").unwrap();
		assert_eq!(buf.capacity(), 8);
		buf.append(b"fghijklmnopqrstuvwxyz").unwrap();
		assert_eq!(buf.capacity(), 26);
		assert_eq!(buf.as_slice(), b"abcdefghijklmnopqrstuvwxyz");
	}

	#[test]
	fn increments() {
		let mut buf = VecBufferBuilder::new().capacity(4).increment(4).build::<u8>();
		buf.append(b"lorem ipsum").unwrap();
		assert_eq!(buf.capacity(), 12);
		assert_eq!(buf.as_slice(), b"lorem ipsum");
	}

	#[test]
	#[should_panic]
	fn zero_increment() {
		let _ = VecBufferBuilder::new().increment(0);
	}

	#[test]
	fn partial_growth() {
		let mut buf = VecBufferBuilder::new().capacity(4).max_capacity(6).build::<u8>();
		assert_eq!(buf.append(b"lorem ipsum").unwrap(), 6);
		assert_eq!(buf.as_slice(), b"lorem ");
		buf.try_resize(100).unwrap();
		assert_eq!(buf.len(), 6);
		assert_eq!(buf.capacity(), 6);
	}

	#[test]
	fn custom_policy() {
		fn exact(_: usize, requested: usize) -> usize { requested }
		let mut buf = VecBufferBuilder::new().policy(exact).build::<u32>();
		buf.append(&[1, 2, 3]).unwrap();
		assert_eq!(buf.capacity(), 3);
		buf.push(4).unwrap();
		assert_eq!(buf.capacity(), 4);
		assert_eq!(buf.into_vec(), vec![1, 2, 3, 4]);
	}

	#[test]
	fn clear_keeps_capacity() {
		let mut buf = MemoryBuffer::with_capacity(2);
		buf.append(b"lorem").unwrap();
		let cap = buf.capacity();
		buf.clear();
		assert_eq!(buf.len(), 0);
		assert_eq!(buf.capacity(), cap);
		buf.append(b"ok").unwrap();
		assert_eq!(buf.into_string().unwrap(), "ok");
	}
}
