/*!
Template grammar.

There is exactly one grammar, written as `const fn`s on [`ParseContext`],
and two front ends driving it:

- [`parse_format_string()`] walks a template at run time and reports what it finds to a [`Handler`];
- [`check_format()`] walks a template during constant evaluation,
  which is how the formatting macros reject bad templates when the crate gets built.
*/

use crate::{Error, Kind, Result};
use memchr::memchr2;

mod spec;
pub use spec::*;

macro_rules! tri {
	($e:expr) => {
		match $e {
			Ok(v) => v,
			Err(e) => return Err(e),
		}
	};
}

/// Grammar violation; `pos` is the byte offset in the template where it was noticed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseError {
	pub pos: usize,
	pub msg: &'static str,
}

/// Argument reference as written in a replacement field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgId<'a> {
	/// `{}` or `{:...}`
	Auto,
	Index(usize),
	Name(&'a str),
}

/// Argument reference once automatic numbering has been applied
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgRef<'a> {
	Index(usize),
	Name(&'a str),
}

/// What a brace in the template turned out to be
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Brace<'a> {
	/// `{{` or `}}`, standing for the given brace
	Escaped(u8),
	/**
	Replacement field. With `has_specs` the context is left right after `:`,
	and [`close_field()`](struct.ParseContext.html#method.close_field) must follow once the spec is consumed;
	otherwise the field is already closed.
	*/
	Field { id: ArgId<'a>, has_specs: bool },
}

/**
Cursor over a template, plus automatic/manual argument numbering state.

Custom formatters get one positioned at the start of their spec
(right after `:`), and must leave it at the closing `}`.
*/
#[derive(Clone, Debug)]
pub struct ParseContext<'a> {
	template: &'a str,
	pos: usize,
	// > 0: next automatic index, < 0: manual indexing, 0: undecided yet
	next_arg_id: isize,
	// known only when checking templates ahead of time
	num_args: Option<usize>,
}

impl<'a> ParseContext<'a> {
	pub const fn new(template: &'a str) -> Self {
		ParseContext {
			template,
			pos: 0,
			next_arg_id: 0,
			num_args: None,
		}
	}
	/// Context that also rejects indices past `num_args`
	pub const fn with_num_args(template: &'a str, num_args: usize) -> Self {
		ParseContext {
			template,
			pos: 0,
			next_arg_id: 0,
			num_args: Some(num_args),
		}
	}

	pub const fn template(&self) -> &'a str {
		self.template
	}
	pub const fn pos(&self) -> usize {
		self.pos
	}
	const fn bytes(&self) -> &'a [u8] {
		self.template.as_bytes()
	}
	const fn peek(&self) -> Option<u8> {
		let bytes = self.bytes();
		if self.pos < bytes.len() {
			Some(bytes[self.pos])
		} else {
			None
		}
	}
	const fn error(&self, msg: &'static str) -> ParseError {
		ParseError { pos: self.pos, msg }
	}

	/// Unparsed part of the template
	pub const fn remaining(&self) -> &'a str {
		let (_, tail) = self.bytes().split_at(self.pos);
		// SAFETY: the grammar only ever stops on ASCII characters or whole fill characters,
		// and `advance_to()` checks char boundaries
		unsafe { std::str::from_utf8_unchecked(tail) }
	}

	pub fn advance_to(&mut self, pos: usize) {
		assert!(pos >= self.pos && self.template.is_char_boundary(pos), "cannot advance parser to {}", pos);
		self.pos = pos;
	}

	/// Next index for `{}`, unless manual indexing is already in use
	pub const fn next_arg_id(&mut self) -> Result<usize, ParseError> {
		if self.next_arg_id < 0 {
			return Err(self.error("cannot switch from manual to automatic argument indexing"));
		}
		let id = self.next_arg_id as usize;
		self.next_arg_id += 1;
		match self.check_num_args(id) {
			Ok(()) => Ok(id),
			Err(e) => Err(e),
		}
	}

	/// Registers use of explicit index `id`, unless automatic indexing is already in use
	pub const fn check_arg_id(&mut self, id: usize) -> Result<(), ParseError> {
		if self.next_arg_id > 0 {
			return Err(self.error("cannot switch from automatic to manual argument indexing"));
		}
		self.next_arg_id = -1;
		self.check_num_args(id)
	}

	const fn check_num_args(&self, id: usize) -> Result<(), ParseError> {
		match self.num_args {
			Some(n) if id >= n => Err(self.error("argument not found")),
			_ => Ok(()),
		}
	}

	const fn parse_nonnegative_int(&mut self) -> Result<usize, ParseError> {
		let bytes = self.bytes();
		let mut value: u64 = 0;
		while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
			value = value * 10 + (bytes[self.pos] - b'0') as u64;
			if value > i32::MAX as u64 {
				return Err(self.error("number is too big"));
			}
			self.pos += 1;
		}
		Ok(value as usize)
	}

	/// Parses a decimal index or an identifier
	pub const fn parse_arg_id(&mut self) -> Result<ArgId<'a>, ParseError> {
		let bytes = self.bytes();
		let c = match self.peek() {
			Some(c) => c,
			None => return Err(self.error("invalid format string")),
		};
		if c.is_ascii_digit() {
			let index = if c == b'0' {
				self.pos += 1;
				0
			} else {
				tri!(self.parse_nonnegative_int())
			};
			return match self.peek() {
				Some(b'}') | Some(b':') => Ok(ArgId::Index(index)),
				_ => Err(self.error("invalid format string")),
			};
		}
		if !(c.is_ascii_alphabetic() || c == b'_') {
			return Err(self.error("invalid format string"));
		}
		let start = self.pos;
		while self.pos < bytes.len() && (bytes[self.pos].is_ascii_alphanumeric() || bytes[self.pos] == b'_') {
			self.pos += 1;
		}
		let (_, tail) = bytes.split_at(start);
		let (name, _) = tail.split_at(self.pos - start);
		// SAFETY: identifiers are ASCII
		Ok(ArgId::Name(unsafe { std::str::from_utf8_unchecked(name) }))
	}

	/**
	Consumes the brace the context is positioned at:
	an escape, or the opening part of a replacement field.
	*/
	pub const fn scan_brace(&mut self) -> Result<Brace<'a>, ParseError> {
		let bytes = self.bytes();
		if bytes[self.pos] == b'}' {
			if self.pos + 1 < bytes.len() && bytes[self.pos + 1] == b'}' {
				self.pos += 2;
				return Ok(Brace::Escaped(b'}'));
			}
			return Err(self.error("unmatched '}' in format string"));
		}
		self.pos += 1;
		let id = match self.peek() {
			None => return Err(self.error("invalid format string")),
			Some(b'{') => {
				self.pos += 1;
				return Ok(Brace::Escaped(b'{'));
			}
			Some(b'}') | Some(b':') => ArgId::Auto,
			Some(_) => tri!(self.parse_arg_id()),
		};
		match self.peek() {
			Some(b'}') => {
				self.pos += 1;
				Ok(Brace::Field { id, has_specs: false })
			}
			Some(b':') => {
				self.pos += 1;
				Ok(Brace::Field { id, has_specs: true })
			}
			_ => Err(self.error("missing '}' in format string")),
		}
	}

	/// Consumes the `}` that must follow a format spec
	pub const fn close_field(&mut self) -> Result<(), ParseError> {
		match self.peek() {
			Some(b'}') => {
				self.pos += 1;
				Ok(())
			}
			None => Err(self.error("missing '}' in format string")),
			Some(_) => Err(self.error("unknown format specifier")),
		}
	}

	/**
	Skips a spec nobody can interpret right now (a custom type's, during ahead-of-time checks),
	stopping at the `}` closing the field. Nested `{...}` pairs are skipped whole.
	*/
	pub const fn skip_specs(&mut self) -> Result<(), ParseError> {
		let bytes = self.bytes();
		let mut depth = 0;
		while self.pos < bytes.len() {
			match bytes[self.pos] {
				b'{' => depth += 1,
				b'}' if depth == 0 => return Ok(()),
				b'}' => depth -= 1,
				_ => {}
			}
			self.pos += 1;
		}
		Err(self.error("missing '}' in format string"))
	}

	/// Resolves `{}`/`{index}` into a position, keeping numbering consistent; names stay names.
	pub const fn resolve(&mut self, id: ArgId<'a>) -> Result<ArgRef<'a>, ParseError> {
		match id {
			ArgId::Auto => match self.next_arg_id() {
				Ok(i) => Ok(ArgRef::Index(i)),
				Err(e) => Err(e),
			},
			ArgId::Index(i) => match self.check_arg_id(i) {
				Ok(()) => Ok(ArgRef::Index(i)),
				Err(e) => Err(e),
			},
			ArgId::Name(name) => Ok(ArgRef::Name(name)),
		}
	}
}

/// Callbacks of the run-time front end
pub trait Handler<'a> {
	/// Literal text; escaped braces come as text too
	fn on_text(&mut self, text: &'a str) -> Result<()>;
	/// Maps a reference to an argument index
	fn on_arg_id(&mut self, id: ArgRef<'a>) -> Result<usize> {
		match id {
			ArgRef::Index(i) => Ok(i),
			ArgRef::Name(name) => Err(Error::ArgNotFound(name.to_owned())),
		}
	}
	/// Field without a spec: `{}`, `{0}`, `{name}`
	fn on_replacement_field(&mut self, id: usize) -> Result<()>;
	/// Field with a spec; `ctx` is right after `:` and has to be left at the closing `}`
	fn on_format_specs(&mut self, id: usize, ctx: &mut ParseContext<'a>) -> Result<()>;
	/// Grammar violations end up here before they end the scan
	fn on_error(&mut self, err: ParseError) -> Error {
		err.into()
	}
}

/// Walks `template`, reporting its parts to `handler`; stops at the first error.
pub fn parse_format_string<'a, H: Handler<'a>>(template: &'a str, handler: &mut H) -> Result<()> {
	let bytes = template.as_bytes();
	let mut ctx = ParseContext::new(template);
	loop {
		let start = ctx.pos;
		let brace = match memchr2(b'{', b'}', &bytes[start..]) {
			Some(n) => start + n,
			None => {
				if start < bytes.len() {
					handler.on_text(&template[start..])?;
				}
				return Ok(());
			}
		};
		if brace > start {
			handler.on_text(&template[start..brace])?;
		}
		ctx.pos = brace;
		let field = match ctx.scan_brace() {
			Ok(Brace::Escaped(_)) => {
				handler.on_text(&template[brace .. brace+1])?;
				continue;
			}
			Ok(Brace::Field { id, has_specs }) => ctx.resolve(id).map(|id| (id, has_specs)),
			Err(e) => Err(e),
		};
		let (id, has_specs) = field.map_err(|e| handler.on_error(e))?;
		let id = handler.on_arg_id(id)?;
		if has_specs {
			handler.on_format_specs(id, &mut ctx)?;
			ctx.close_field().map_err(|e| handler.on_error(e))?;
		} else {
			handler.on_replacement_field(id)?;
		}
	}
}

const fn find_brace(bytes: &[u8], mut pos: usize) -> usize {
	while pos < bytes.len() && bytes[pos] != b'{' && bytes[pos] != b'}' {
		pos += 1;
	}
	pos
}

const fn str_eq(a: &str, b: &str) -> bool {
	let (a, b) = (a.as_bytes(), b.as_bytes());
	if a.len() != b.len() {
		return false;
	}
	let mut i = 0;
	while i < a.len() {
		if a[i] != b[i] {
			return false;
		}
		i += 1;
	}
	true
}

/*
named arguments come last:
kinds = [ positional..., named... ]
names =                 [ named... ]
*/
const fn lookup(ctx: &ParseContext<'_>, arg: ArgRef<'_>, kinds: &[Kind], names: &[&str]) -> Result<usize, ParseError> {
	match arg {
		ArgRef::Index(i) => Ok(i),
		ArgRef::Name(name) => {
			let first_named = kinds.len() - names.len();
			let mut i = 0;
			while i < names.len() {
				if str_eq(names[i], name) {
					return Ok(first_named + i);
				}
				i += 1;
			}
			Err(ctx.error("argument not found"))
		}
	}
}

const fn check_count(ctx: &ParseContext<'_>, count: Count<'_>, kinds: &[Kind], names: &[&str]) -> Result<(), ParseError> {
	if let Count::Arg(arg) = count {
		let index = tri!(lookup(ctx, arg, kinds, names));
		if !matches!(kinds[index].category(), Category::SignedInt | Category::UnsignedInt) {
			return Err(ctx.error("width/precision is not integer"));
		}
	}
	Ok(())
}

/**
Checks `template` against arguments of the given kinds without formatting anything.

`names` are the names of the trailing `names.len()` arguments.
Besides the grammar itself, this catches references to missing arguments,
presentation types that do not suit the argument, and non-integer dynamic widths.
Specs of custom arguments are only checked for balanced braces.
*/
pub const fn check_format(template: &str, kinds: &[Kind], names: &[&str]) -> Result<(), ParseError> {
	let bytes = template.as_bytes();
	let mut ctx = ParseContext::with_num_args(template, kinds.len());
	loop {
		ctx.pos = find_brace(bytes, ctx.pos);
		if ctx.pos >= bytes.len() {
			return Ok(());
		}
		let (id, has_specs) = match tri!(ctx.scan_brace()) {
			Brace::Escaped(_) => continue,
			Brace::Field { id, has_specs } => (id, has_specs),
		};
		let arg = tri!(ctx.resolve(id));
		let index = tri!(lookup(&ctx, arg, kinds, names));
		if !has_specs {
			continue;
		}
		let cat = kinds[index].category();
		if matches!(cat, Category::Custom) {
			tri!(ctx.skip_specs());
		} else {
			let spec = tri!(ctx.parse_format_specs(cat));
			tri!(check_count(&ctx, spec.width, kinds, names));
			tri!(check_count(&ctx, spec.precision, kinds, names));
		}
		tri!(ctx.close_field());
	}
}
