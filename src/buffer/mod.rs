use crate::Result;
use std::ops::{Index, IndexMut};

/**
This trait abstracts a contiguous, growable output buffer from the details of where its storage lives

Implementors only describe their storage (`storage()` is the whole capacity, `len()` is the filled part)
and their growth policy (`grow()`); appending, resizing and indexing are provided on top of that.

The trait is meant to be used through `&mut dyn Buffer<T>` or a generic `B: Buffer<T>`:
whoever owns the storage (a `VecBuffer`, a `FixedBuffer` over caller memory, ...)
is the only one creating and dropping it.

## Example usage

```
use buf_fmt::{Buffer, VecBuffer};

# fn main() -> buf_fmt::Result<()> {
let mut buf = VecBuffer::<u8>::new();
let buf: &mut dyn Buffer<u8> = &mut buf;

buf.append(b"hello")?;
buf.push(b'!')?;
assert_eq!(buf.as_slice(), b"hello!");

// shrinking keeps both capacity and stale bytes around
buf.try_resize(2)?;
assert_eq!(buf.as_slice(), b"he");
buf.try_resize(5)?;
assert_eq!(buf.as_slice(), b"hello");
# Ok(())
# }
```
*/
pub trait Buffer<T: Copy> {
	/// Whole storage of the buffer, i.e. `capacity()` elements, filled or not
	fn storage(&self) -> &[T];
	fn storage_mut(&mut self) -> &mut [T];
	/// Size of the filled part of the buffer
	fn len(&self) -> usize;
	/// Callers guarantee that `len <= capacity()`.
	fn set_len(&mut self, len: usize);
	/**
	Growth policy: make room for `requested` elements in total.

	Policies may give less than requested (or nothing at all),
	in which case callers clamp to whatever `capacity()` reports afterwards.
	Flushing buffers are allowed to empty themselves here.
	*/
	fn grow(&mut self, requested: usize) -> Result<()>;

	fn capacity(&self) -> usize {
		self.storage().len()
	}
	fn is_empty(&self) -> bool {
		self.len() == 0
	}
	/// Filled part of the buffer
	fn as_slice(&self) -> &[T] {
		&self.storage()[..self.len()]
	}
	fn data(&self) -> &[T] {
		self.as_slice()
	}

	/// Asks the growth policy for `n` elements of capacity, unless there are enough already.
	fn try_reserve(&mut self, n: usize) -> Result<()> {
		if n > self.capacity() {
			self.grow(n)?;
		}
		Ok(())
	}

	/**
	Sets the size of the filled part to `n`, or to as much as the policy could provide.

	Nothing is cleared: shrinking and then growing back within capacity exposes previous contents.
	*/
	fn try_resize(&mut self, n: usize) -> Result<()> {
		self.try_reserve(n)?;
		let n = std::cmp::min(n, self.capacity());
		self.set_len(n);
		Ok(())
	}

	fn clear(&mut self) {
		self.set_len(0);
	}

	/// Appends one element, silently dropping it if the policy could not make room.
	fn push(&mut self, value: T) -> Result<()> {
		let len = self.len();
		self.try_reserve(len + 1)?;
		// flushing buffers might have moved `len` back
		let len = self.len();
		if len < self.capacity() {
			self.storage_mut()[len] = value;
			self.set_len(len + 1);
		}
		Ok(())
	}

	/**
	Appends `values`, returning how many of them were actually retained.

	Every round asks the policy for the total prospective size,
	copies whatever fits, and gives up as soon as a round yields no room.
	*/
	fn append(&mut self, values: &[T]) -> Result<usize> {
		let mut rest = values;
		while !rest.is_empty() {
			let len = self.len();
			self.try_reserve(len + rest.len())?;
			let len = self.len();
			let n = std::cmp::min(rest.len(), self.capacity().saturating_sub(len));
			if n == 0 {
				break;
			}
			self.storage_mut()[len .. len+n].copy_from_slice(&rest[..n]);
			self.set_len(len + n);
			rest = &rest[n..];
		}
		Ok(values.len() - rest.len())
	}

	/// Element at `index`; bounded by capacity, not by `len()`
	fn get(&self, index: usize) -> &T {
		&self.storage()[index]
	}
	fn get_mut(&mut self, index: usize) -> &mut T {
		&mut self.storage_mut()[index]
	}
}

impl<T: Copy> Index<usize> for dyn Buffer<T> + '_ {
	type Output = T;
	fn index(&self, index: usize) -> &T {
		self.get(index)
	}
}
impl<T: Copy> IndexMut<usize> for dyn Buffer<T> + '_ {
	fn index_mut(&mut self, index: usize) -> &mut T {
		self.get_mut(index)
	}
}

mod vec;
pub use vec::*;

mod fixed;
pub use fixed::*;

mod flush;
pub use flush::*;
