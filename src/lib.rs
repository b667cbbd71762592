/*!
Type-safe formatting into growable buffers, caller memory, or any append-capable sink.

Templates follow the familiar `{}` replacement-field grammar
(`{index-or-name:[[fill]align][sign][#][0][width][.precision][L][type]}`),
arguments are captured by reference into a closed set of [`Arg`] kinds,
and output goes through a [`Buffer`], so nothing needs to touch the heap
unless the destination itself wants to grow.

```
use buf_fmt::{format, format_to, MemoryBuffer, Appender, Buffer};

# fn main() -> buf_fmt::Result<()> {
// templates given to the macros are checked when the crate is built
assert_eq!(format!("{:>6.2f}|{name:<4}|", 3.14159, name = "ab")?, "  3.14|ab  |");

// bounded output reports truncation instead of overflowing
let mut arr = [0u8; 4];
let res = format_to!(&mut arr[..], "{}", 12345)?;
assert!(res.truncated);
assert_eq!(&arr, b"1234");

// or write straight into a buffer
let mut buf = MemoryBuffer::new();
format_to!(Appender::new(&mut buf), "{}-{}", 'a', true)?;
assert_eq!(buf.as_slice(), b"a-true");
# Ok(())
# }
```
*/

use quick_error::quick_error;

mod view;
pub use view::*;

mod buffer;
pub use buffer::*;

mod sink;
pub use sink::*;

mod arg;
pub use arg::*;

mod format;
pub use format::*;

pub mod parse;
pub use parse::{ParseContext, ParseError};

mod context;
pub use context::*;

mod render;

mod engine;
pub use engine::*;

mod macros;
#[doc(hidden)]
pub use macros::__private;

quick_error! {
	#[derive(Debug)]
	pub enum Error {
		Io(err: std::io::Error) {
			from()
			display("I/O error: {}", err)
			cause(err)
		}
		/// Malformed template or format spec
		Syntax(pos: usize, msg: &'static str) {
			from(err: ParseError) -> (err.pos, err.msg)
			display("{} (at byte {})", msg, pos)
		}
		/// Named argument that is not in the argument list
		ArgNotFound(name: String) {
			display("argument not found: {}", name)
		}
		/// Replacement field referring past the end of the argument list
		MissingArgument(index: usize) {
			display("argument not found: #{}", index)
		}
		/// Argument that does not fit what the template asks of it
		Format(msg: &'static str) {
			display("{}", msg)
		}
		/// End position of a bounded write that did not fit
		Truncated {
			display("output was truncated")
		}
		Utf8(err: std::string::FromUtf8Error) {
			from()
			display("formatted output is not valid UTF-8: {}", err)
			cause(err)
		}
	}
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
