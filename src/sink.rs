/*!
Destinations for formatted output.

Every [`Sink`] gets turned into a [`Buffer`] for the duration of one formatting call,
in the cheapest way it allows:

- an [`Appender`] already is one;
- a byte slice is wrapped in a [`FixedBuffer`], and whatever does not fit is dropped and reported;
- containers and writers get a [`FlushBuffer`] staging area in front of them.
*/

use crate::{Buffer, FixedBuffer, Flush, FlushBuffer, Result};
use std::collections::VecDeque;
use std::io;

/// Something formatted output can be written to
pub trait Sink {
	/// What a formatting call hands back once it is done with the sink
	type Output;
	/// Runs `f` on a buffer standing in for the sink, then settles whatever `f` wrote
	fn write_with<F>(self, f: F) -> Result<Self::Output>
	where
		F: FnOnce(&mut dyn Buffer<u8>) -> Result<()>;
}

/// Sink appending straight to an existing buffer, so that several calls can build up one output
pub struct Appender<'a> {
	buf: &'a mut dyn Buffer<u8>,
}

impl<'a> Appender<'a> {
	pub fn new(buf: &'a mut dyn Buffer<u8>) -> Self {
		Appender { buf }
	}
	pub fn buffer(&mut self) -> &mut dyn Buffer<u8> {
		&mut *self.buf
	}
	pub fn into_buffer(self) -> &'a mut dyn Buffer<u8> {
		self.buf
	}
}

impl<'a> Sink for Appender<'a> {
	type Output = Appender<'a>;
	fn write_with<F>(self, f: F) -> Result<Self::Output>
	where
		F: FnOnce(&mut dyn Buffer<u8>) -> Result<()>,
	{
		f(&mut *self.buf)?;
		Ok(self)
	}
}

/// Outcome of formatting into a byte slice
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatToResult {
	/// Bytes actually stored, never more than the slice holds
	pub written: usize,
	/// Whether the output had to be cut short
	pub truncated: bool,
}

impl FormatToResult {
	/// End of the output within the slice; refused for truncated output, which has no meaningful end
	pub fn out(&self) -> Result<usize> {
		if self.truncated {
			return Err(crate::Error::Truncated);
		}
		Ok(self.written)
	}
}

impl TryFrom<FormatToResult> for usize {
	type Error = crate::Error;
	fn try_from(res: FormatToResult) -> Result<usize> {
		res.out()
	}
}

impl Sink for &mut [u8] {
	type Output = FormatToResult;
	fn write_with<F>(self, f: F) -> Result<Self::Output>
	where
		F: FnOnce(&mut dyn Buffer<u8>) -> Result<()>,
	{
		let mut buf = FixedBuffer::new(self);
		f(&mut buf)?;
		let res = FormatToResult { written: buf.len(), truncated: buf.is_truncated() };
		if res.truncated {
			log::debug!("output truncated to {} bytes", res.written);
		}
		Ok(res)
	}
}

impl<const N: usize> Sink for &mut [u8; N] {
	type Output = FormatToResult;
	fn write_with<F>(self, f: F) -> Result<Self::Output>
	where
		F: FnOnce(&mut dyn Buffer<u8>) -> Result<()>,
	{
		(&mut self[..]).write_with(f)
	}
}

/// Collection that can take elements at its end
pub trait Container {
	type Value;
	fn push_back(&mut self, value: Self::Value);
	/// Bulk version of [`push_back()`](#tymethod.push_back), for containers that can do better than a loop
	fn extend_back(&mut self, values: &[Self::Value]) where Self::Value: Copy {
		for &v in values {
			self.push_back(v);
		}
	}
}

impl<T> Container for Vec<T> {
	type Value = T;
	fn push_back(&mut self, value: T) {
		self.push(value);
	}
	fn extend_back(&mut self, values: &[T]) where T: Copy {
		self.extend_from_slice(values);
	}
}

impl<T> Container for VecDeque<T> {
	type Value = T;
	fn push_back(&mut self, value: T) {
		VecDeque::push_back(self, value);
	}
}

/// Sink pushing bytes onto the end of a [`Container`] of bytes
pub struct BackInserter<'a, C> {
	container: &'a mut C,
}

pub fn back_inserter<C: Container<Value = u8>>(container: &mut C) -> BackInserter<'_, C> {
	BackInserter { container }
}

impl<'a, C: Container<Value = u8>> BackInserter<'a, C> {
	pub fn container(&mut self) -> &mut C {
		self.container
	}
}

impl<C: Container<Value = u8>> Flush<u8> for BackInserter<'_, C> {
	fn flush(&mut self, data: &[u8]) -> Result<()> {
		self.container.extend_back(data);
		Ok(())
	}
}

impl<'a, C: Container<Value = u8>> Sink for BackInserter<'a, C> {
	type Output = BackInserter<'a, C>;
	fn write_with<F>(self, f: F) -> Result<Self::Output>
	where
		F: FnOnce(&mut dyn Buffer<u8>) -> Result<()>,
	{
		let mut buf = FlushBuffer::new(self);
		f(&mut buf)?;
		buf.finish()
	}
}

/// Sink writing to an [`io::Write`]; I/O failures abort formatting with [`Error::Io`](crate::Error::Io)
pub struct IoSink<W> {
	w: W,
}

impl<W: io::Write> IoSink<W> {
	pub fn new(w: W) -> Self {
		IoSink { w }
	}
	pub fn into_inner(self) -> W {
		self.w
	}
}

impl<W: io::Write> Flush<u8> for IoSink<W> {
	fn flush(&mut self, data: &[u8]) -> Result<()> {
		self.w.write_all(data)?;
		Ok(())
	}
}

impl<W: io::Write> Sink for IoSink<W> {
	type Output = W;
	fn write_with<F>(self, f: F) -> Result<W>
	where
		F: FnOnce(&mut dyn Buffer<u8>) -> Result<()>,
	{
		let mut buf = FlushBuffer::new(self);
		f(&mut buf)?;
		Ok(buf.finish()?.w)
	}
}

/// Flush target keeping nothing, for measuring output
pub(crate) struct Discard;

impl Flush<u8> for Discard {
	fn flush(&mut self, _: &[u8]) -> Result<()> {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Error, MemoryBuffer};

	fn hello(buf: &mut dyn Buffer<u8>) -> Result<()> {
		buf.append(b"hello")?;
		Ok(())
	}

	#[test]
	fn appender() {
		let mut buf = MemoryBuffer::new();
		let mut app = Appender::new(&mut buf).write_with(hello).unwrap();
		app.buffer().push(b'!').unwrap();
		let app = app.write_with(hello).unwrap();
		assert_eq!(app.into_buffer().as_slice(), b"hello!hello");
	}

	#[test]
	fn slices() {
		let mut data = [0u8; 8];
		let res = (&mut data[..]).write_with(hello).unwrap();
		assert_eq!(res, FormatToResult { written: 5, truncated: false });
		assert_eq!(res.out().unwrap(), 5);
		assert_eq!(&data[..5], b"hello");

		let mut data = [0u8; 3];
		let res = (&mut data).write_with(hello).unwrap();
		assert_eq!(res, FormatToResult { written: 3, truncated: true });
		assert!(matches!(res.out(), Err(Error::Truncated)));
		assert!(usize::try_from(res).is_err());
		assert_eq!(&data, b"hel");
	}

	#[test]
	fn exact_fit_is_not_truncation() {
		let mut data = [0u8; 5];
		let res = (&mut data).write_with(hello).unwrap();
		assert_eq!(res, FormatToResult { written: 5, truncated: false });
	}

	#[test]
	fn containers() {
		let mut v = vec![b'>'];
		back_inserter(&mut v).write_with(hello).unwrap();
		assert_eq!(v, b">hello");

		let mut d = VecDeque::new();
		let mut ins = back_inserter(&mut d).write_with(hello).unwrap();
		ins.container().push_back(b'!');
		assert_eq!(d.iter().copied().collect::<Vec<_>>(), b"hello!");

		// longer than the staging area
		let mut v = Vec::new();
		back_inserter(&mut v).write_with(|buf| {
			buf.append(&[b'*'; 1000])?;
			Ok(())
		}).unwrap();
		assert_eq!(v, vec![b'*'; 1000]);
	}

	#[test]
	fn writers() {
		let out = IoSink::new(Vec::new()).write_with(hello).unwrap();
		assert_eq!(out, b"hello");
	}

	struct Failing;
	impl io::Write for Failing {
		fn write(&mut self, _: &[u8]) -> io::Result<usize> {
			Err(io::Error::new(io::ErrorKind::Other, "nope"))
		}
		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}

	#[test]
	fn failing_writer() {
		// small outputs fail on the final flush
		assert!(matches!(IoSink::new(Failing).write_with(hello), Err(Error::Io(_))));
		// large ones fail mid-way, and the error is what comes out
		let res = IoSink::new(Failing).write_with(|buf| {
			buf.append(&[0; 1000])?;
			Ok(())
		});
		assert!(matches!(res, Err(Error::Io(_))));
	}
}
