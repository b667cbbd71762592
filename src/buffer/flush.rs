use crate::Result;

const STAGING_SIZE: usize = 256;

/// Destination of elements staged in a [`FlushBuffer`]
pub trait Flush<T> {
	/// Takes all of `data`; failures abort the write in progress
	fn flush(&mut self, data: &[T]) -> Result<()>;
}

/**
Small on-stack staging area in front of some [`Flush`] target.

Its growth policy never reallocates: it empties itself into the target instead,
so that appends of any size go through in chunks.
Whatever is left over must be pushed out with [`finish()`](#method.finish).
*/
pub struct FlushBuffer<T, F> {
	data: [T; STAGING_SIZE],
	len: usize,
	// elements handed to `target` so far
	count: usize,
	target: F,
}

impl<T: Copy + Default, F: Flush<T>> FlushBuffer<T, F> {
	pub fn new(target: F) -> Self {
		FlushBuffer {
			data: [T::default(); STAGING_SIZE],
			len: 0, count: 0,
			target,
		}
	}

	/// Number of elements written so far, flushed or not
	pub fn count(&self) -> usize {
		self.count + self.len
	}

	fn flush(&mut self) -> Result<()> {
		if self.len == 0 {
			return Ok(());
		}
		log::trace!("flushing {} staged elements", self.len);
		let len = self.len;
		// nothing staged survives a failed flush
		self.len = 0;
		self.target.flush(&self.data[..len])?;
		self.count += len;
		Ok(())
	}

	pub fn finish(mut self) -> Result<F> {
		self.flush()?;
		Ok(self.target)
	}
}

impl<T: Copy + Default, F: Flush<T>> super::Buffer<T> for FlushBuffer<T, F> {
	fn storage(&self) -> &[T] {
		&self.data
	}
	fn storage_mut(&mut self) -> &mut [T] {
		&mut self.data
	}
	fn len(&self) -> usize {
		self.len
	}
	fn set_len(&mut self, len: usize) {
		self.len = len;
	}
	fn grow(&mut self, _requested: usize) -> Result<()> {
		self.flush()
	}
}
