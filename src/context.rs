use crate::parse::{ArgRef, Count, FormatSpec};
use crate::render::{self, Specs};
use crate::{Arg, Buffer, Error, FormatArgs, ParseContext, Result};
use std::fmt;

/**
Output side of a formatting call: where the text goes, and the arguments fields may refer to.

Custom [`Format`](crate::Format) impls write through it, either directly,
with [`write!`], or by handing a value and a spec back to the built-in formatters.
*/
pub struct Context<'b, 'a> {
	out: &'b mut dyn Buffer<u8>,
	args: FormatArgs<'a>,
}

impl<'b, 'a> Context<'b, 'a> {
	pub fn new(out: &'b mut dyn Buffer<u8>, args: FormatArgs<'a>) -> Self {
		Context { out, args }
	}

	pub fn out(&mut self) -> &mut dyn Buffer<u8> {
		&mut *self.out
	}
	pub fn args(&self) -> FormatArgs<'a> {
		self.args
	}
	/// Argument `index`, which has to be there
	pub fn arg(&self, index: usize) -> Result<Arg<'a>> {
		match self.args.get(index) {
			Arg::None => Err(Error::MissingArgument(index)),
			arg => Ok(arg),
		}
	}
	/// Index of the argument referred to by `arg`, which has to be there
	pub fn arg_id(&self, arg: ArgRef<'_>) -> Result<usize> {
		match arg {
			ArgRef::Index(i) => Ok(i),
			ArgRef::Name(name) => self.args.find(name).ok_or_else(|| Error::ArgNotFound(name.to_owned())),
		}
	}

	pub fn write_str(&mut self, s: &str) -> Result<()> {
		self.out.append(s.as_bytes())?;
		Ok(())
	}

	/// Target of [`write!`]; unlike [`fmt::Write`], errors of the underlying buffer come out intact
	pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<()> {
		let mut w = Writer { out: &mut *self.out, err: None };
		match fmt::write(&mut w, args) {
			Ok(()) => Ok(()),
			Err(_) => Err(w.err.unwrap_or(Error::Format("formatter error"))),
		}
	}

	/// Formats a built-in argument according to `spec`, taking dynamic width and precision from the arguments.
	pub fn format_value(&mut self, arg: Arg<'_>, spec: &FormatSpec<'_>) -> Result<()> {
		let specs = Specs {
			fill: spec.fill,
			align: spec.align,
			sign: spec.sign,
			alt: spec.alt,
			width: self.resolve(spec.width)?.unwrap_or(0),
			precision: self.resolve(spec.precision)?,
			ty: spec.ty,
		};
		match arg {
			Arg::None => Err(Error::Format("argument not found")),
			// with no spec of their own to go by, custom values see an empty field, as in `{}`
			Arg::Custom(h) => h.format(&mut ParseContext::new("}"), self),
			_ => render::render(&mut *self.out, arg, &specs),
		}
	}

	fn resolve(&self, count: Count<'_>) -> Result<Option<usize>> {
		let arg = match count {
			Count::None => return Ok(None),
			Count::Literal(n) => return Ok(Some(n)),
			Count::Arg(arg) => self.arg(self.arg_id(arg)?)?,
		};
		let value: i128 = match arg {
			Arg::Int(v) => v.into(),
			Arg::UInt(v) => v.into(),
			Arg::LongLong(v) => v.into(),
			Arg::ULongLong(v) => v.into(),
			Arg::Int128(v) => v,
			Arg::UInt128(v) => i128::try_from(v).map_err(|_| Error::Format("number is too big"))?,
			_ => return Err(Error::Format("width/precision is not integer")),
		};
		if value < 0 {
			return Err(Error::Format("negative width/precision"));
		}
		if value > i32::MAX as i128 {
			return Err(Error::Format("number is too big"));
		}
		Ok(Some(value as usize))
	}
}

// `fmt::Write` for a buffer, holding on to the first real error
struct Writer<'w> {
	out: &'w mut dyn Buffer<u8>,
	err: Option<Error>,
}

impl fmt::Write for Writer<'_> {
	fn write_str(&mut self, s: &str) -> fmt::Result {
		match self.out.append(s.as_bytes()) {
			Ok(_) => Ok(()),
			Err(e) => {
				self.err = Some(e);
				Err(fmt::Error)
			}
		}
	}
}
