use crate::parse::{parse_format_string, ArgRef, Handler, ParseContext};
use crate::sink::Discard;
use crate::{Arg, Buffer, Context, FlushBuffer, FormatArgs, MemoryBuffer, Result, Sink};

/**
Template text as accepted by the formatting entry points.

Anything convertible into one will do; the conversion happens exactly once per call,
before any output is produced.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Template<'a>(&'a str);

impl<'a> Template<'a> {
	pub const fn new(s: &'a str) -> Self {
		Template(s)
	}
	pub const fn as_str(&self) -> &'a str {
		self.0
	}
}

impl<'a> From<&'a str> for Template<'a> {
	fn from(s: &'a str) -> Self {
		Template(s)
	}
}

impl<'a> From<&'a String> for Template<'a> {
	fn from(s: &'a String) -> Self {
		Template(s)
	}
}

/// Marks a template only known at run time; it is checked as it gets formatted
pub fn runtime(s: &str) -> Template<'_> {
	Template(s)
}

struct FormatHandler<'b, 'a> {
	ctx: Context<'b, 'a>,
}

impl<'t> Handler<'t> for FormatHandler<'_, '_> {
	fn on_text(&mut self, text: &'t str) -> Result<()> {
		self.ctx.write_str(text)
	}
	fn on_arg_id(&mut self, id: ArgRef<'t>) -> Result<usize> {
		self.ctx.arg_id(id)
	}
	fn on_replacement_field(&mut self, id: usize) -> Result<()> {
		match self.ctx.arg(id)? {
			// custom formatters see an empty spec, as if the field were `{:}`
			Arg::Custom(h) => h.format(&mut ParseContext::new("}"), &mut self.ctx),
			arg => self.ctx.format_value(arg, &Default::default()),
		}
	}
	fn on_format_specs(&mut self, id: usize, parse_ctx: &mut ParseContext<'t>) -> Result<()> {
		let arg = self.ctx.arg(id)?;
		match arg {
			Arg::Custom(h) => h.format(parse_ctx, &mut self.ctx),
			_ => {
				let spec = parse_ctx.parse_format_specs(arg.kind().category())?;
				self.ctx.format_value(arg, &spec)
			}
		}
	}
}

/// Formats `template` into `buf`, checking the template as it goes
pub fn vformat_to(buf: &mut dyn Buffer<u8>, template: &str, args: &FormatArgs<'_>) -> Result<()> {
	let mut handler = FormatHandler { ctx: Context::new(buf, *args) };
	parse_format_string(template, &mut handler)
}

/**
Formats into any [`Sink`], returning whatever the sink hands back
(the sink itself, or a [`FormatToResult`](crate::FormatToResult) for byte slices).

The macros wrap this with a build-time check of the template;
calling it directly (typically with [`runtime()`]) defers all checks to formatting time.
*/
pub fn format_to<'t, S, T>(sink: S, template: T, args: &FormatArgs<'_>) -> Result<S::Output>
where
	S: Sink,
	T: Into<Template<'t>>,
{
	let template = template.into();
	sink.write_with(|buf| vformat_to(buf, template.as_str(), args))
}

/// Formats into a new `String`
pub fn format<'t, T: Into<Template<'t>>>(template: T, args: &FormatArgs<'_>) -> Result<String> {
	let template = template.into();
	let mut buf = MemoryBuffer::new();
	vformat_to(&mut buf, template.as_str(), args)?;
	buf.into_string()
}

/// Number of bytes the output would take, without storing it anywhere
pub fn formatted_size<'t, T: Into<Template<'t>>>(template: T, args: &FormatArgs<'_>) -> Result<usize> {
	let template = template.into();
	let mut buf = FlushBuffer::new(Discard);
	vformat_to(&mut buf, template.as_str(), args)?;
	Ok(buf.count())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{back_inserter, ArgEntry, Error, FormatToResult, IoSink};
	use std::cell::Cell;

	fn args<'a>(entries: &'a [ArgEntry<'a>]) -> FormatArgs<'a> {
		FormatArgs::new(entries)
	}

	#[test]
	fn bounded() {
		let entries = [ArgEntry::positional(Arg::new(&12345))];
		let mut data = [0u8; 4];
		let res = format_to(&mut data, "{}", &args(&entries)).unwrap();
		assert_eq!(res, FormatToResult { written: 4, truncated: true });
		assert_eq!(&data, b"1234");
	}

	#[test]
	fn bounded_exact_fit() {
		let entries = [ArgEntry::positional(Arg::new(&'B')), ArgEntry::positional(Arg::new(&'C'))];
		let mut data = [0u8; 3];
		let res = format_to(&mut data, "{}{} ", &args(&entries)).unwrap();
		assert_eq!(res, FormatToResult { written: 3, truncated: false });
		assert_eq!(res.out().unwrap(), 3);
		assert_eq!(&data, b"BC ");

		// room to spare: nothing past the output is touched
		let mut data = *b"____";
		let res = format_to(&mut data, "{}{} ", &args(&entries)).unwrap();
		assert_eq!(res, FormatToResult { written: 3, truncated: false });
		assert_eq!(&data, b"BC _");
	}

	#[test]
	fn bounded_keeps_the_rest() {
		let mut data = *b"xxxx";
		let res = format_to(&mut data, "A", &FormatArgs::default()).unwrap();
		assert_eq!(res.written, 1);
		assert_eq!(&data, b"Axxx");

		let entries = [ArgEntry::positional(Arg::new(&"foobar"))];
		let mut data = [0u8; 4];
		format_to(&mut data, "{}", &args(&entries)).unwrap();
		assert_eq!(&data, b"foob");

		let mut data = [0u8; 4];
		format_to(&mut data, "ABCDEF", &FormatArgs::default()).unwrap();
		assert_eq!(&data, b"ABCD");
	}

	#[test]
	fn empty_slice() {
		let entries = [ArgEntry::positional(Arg::new(&42))];
		let mut empty: [u8; 0] = [];
		let res = format_to(&mut empty[..], "{}", &args(&entries)).unwrap();
		assert_eq!(res, FormatToResult { written: 0, truncated: true });
	}

	#[test]
	fn long_outputs() {
		let entries = [ArgEntry::positional(Arg::new(&'*'))];
		let s = format("{:*^1000}", &args(&entries)).unwrap();
		assert_eq!(s, "*".repeat(1000));

		let mut v = Vec::new();
		format_to(back_inserter(&mut v), "{:*^1000}", &args(&entries)).unwrap();
		assert_eq!(v, vec![b'*'; 1000]);

		assert_eq!(formatted_size("{:*^1000}", &args(&entries)).unwrap(), 1000);
	}

	#[test]
	fn appending() {
		let entries = [ArgEntry::positional(Arg::new(&42))];
		let mut buf = MemoryBuffer::new();
		vformat_to(&mut buf, "a{}", &args(&entries)).unwrap();
		vformat_to(&mut buf, "b{}", &args(&entries)).unwrap();
		assert_eq!(buf.as_slice(), b"a42b42");
	}

	// converts into a different template every time
	struct Fickle(Cell<bool>);
	impl<'a> From<&'a Fickle> for Template<'static> {
		fn from(f: &'a Fickle) -> Self {
			if f.0.replace(true) {
				Template::new("{}")
			} else {
				Template::new("")
			}
		}
	}

	#[test]
	fn template_converted_once() {
		let fickle = Fickle(Cell::new(false));
		let mut data = [0u8; 10];
		// a second conversion would ask for a missing argument
		let res = format_to(&mut data, &fickle, &FormatArgs::default()).unwrap();
		assert_eq!(res.written, 0);
		assert!(fickle.0.get());
	}

	#[test]
	fn runtime_templates() {
		let t = String::from("{:>4}|{x}");
		let entries = [ArgEntry::positional(Arg::new(&7)), ArgEntry::named("x", Arg::new(&"y"))];
		assert_eq!(format(runtime(&t), &args(&entries)).unwrap(), "   7|y");
		assert_eq!(format(&t, &args(&entries)).unwrap(), "   7|y");
	}

	#[test]
	fn io() {
		let entries = [ArgEntry::positional(Arg::new(&1.5))];
		let out = format_to(IoSink::new(Vec::new()), "{:.2f}\n", &args(&entries)).unwrap();
		assert_eq!(out, b"1.50\n");
	}

	#[test]
	fn io_errors() {
		struct Failing;
		impl std::io::Write for Failing {
			fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
				Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
			}
			fn flush(&mut self) -> std::io::Result<()> {
				Ok(())
			}
		}
		let entries = [ArgEntry::positional(Arg::new(&"text"))];
		let res = format_to(IoSink::new(Failing), "{}", &args(&entries));
		assert!(matches!(res, Err(Error::Io(e)) if e.to_string() == "disk full"));
	}

	#[test]
	fn errors() {
		let entries = [ArgEntry::positional(Arg::new(&42))];
		assert!(matches!(format("{1}", &args(&entries)), Err(Error::MissingArgument(1))));
		assert!(matches!(format("{}{}", &args(&entries)), Err(Error::MissingArgument(1))));
		assert!(matches!(format("{x}", &args(&entries)), Err(Error::ArgNotFound(n)) if n == "x"));
		assert!(matches!(format("{:s}", &args(&entries)), Err(Error::Syntax(_, "invalid type specifier"))));
		assert!(matches!(format("{:d", &args(&entries)), Err(Error::Syntax(_, _))));
		assert!(matches!(format("}", &args(&entries)), Err(Error::Syntax(0, "unmatched '}' in format string"))));
	}

	#[test]
	fn bool_and_char_flags() {
		let entries = [ArgEntry::positional(Arg::new(&true)), ArgEntry::positional(Arg::new(&'a'))];
		let invalid = |t: &str| matches!(format(t, &args(&entries)), Err(Error::Syntax(_, "invalid format specifier")));
		assert!(invalid("{0:c}"));
		assert!(invalid("{0:05}"));
		assert!(invalid("{1:#}"));
		assert!(invalid("{1:05}"));
		assert_eq!(format("{0:03d} {1:#x}", &args(&entries)).unwrap(), "001 0x61");
	}

	#[test]
	fn size() {
		let entries = [ArgEntry::positional(Arg::new(&-1)), ArgEntry::positional(Arg::new(&"ab"))];
		assert_eq!(formatted_size("{}{:>5}", &args(&entries)).unwrap(), 7);
		assert_eq!(formatted_size("", &FormatArgs::default()).unwrap(), 0);
	}
}
