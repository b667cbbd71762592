use crate::Result;

/**
Buffer viewing caller-owned memory: never reallocates.

Asking it to grow past the end of the viewed slice is not an error,
the request is remembered and the excess gets dropped by the caller (see [`Buffer::append()`](trait.Buffer.html#method.append)).
*/
pub struct FixedBuffer<'a, T> {
	buf: &'a mut [T],
	len: usize,
	// largest size anyone asked for past the end
	wanted: usize,
}

impl<'a, T: Copy> FixedBuffer<'a, T> {
	pub fn new(buf: &'a mut [T]) -> Self {
		FixedBuffer { buf, len: 0, wanted: 0 }
	}
	/// Whether anything had to be dropped for lack of room
	pub fn is_truncated(&self) -> bool {
		self.wanted > self.buf.len()
	}
	pub fn into_inner(self) -> &'a mut [T] {
		self.buf
	}
}

impl<T: Copy> super::Buffer<T> for FixedBuffer<'_, T> {
	fn storage(&self) -> &[T] {
		self.buf
	}
	fn storage_mut(&mut self) -> &mut [T] {
		self.buf
	}
	fn len(&self) -> usize {
		self.len
	}
	fn set_len(&mut self, len: usize) {
		self.len = len;
	}
	fn grow(&mut self, requested: usize) -> Result<()> {
		if requested > self.wanted {
			self.wanted = requested;
		}
		Ok(())
	}
}
