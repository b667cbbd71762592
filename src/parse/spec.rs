use super::{ArgRef, ParseContext, ParseError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
	None,
	Left,
	Right,
	Center,
	/// Padding goes between the sign/prefix and the digits (`=`, or a bare `0`)
	Numeric,
}

/// `Minus` is what `None` does anyway: only negative values get a sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sign {
	None,
	Minus,
	Plus,
	Space,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presentation {
	None,
	Dec,
	Oct,
	HexLower,
	HexUpper,
	BinLower,
	BinUpper,
	Chr,
	String,
	Pointer,
	Debug,
	ExpLower,
	ExpUpper,
	FixedLower,
	FixedUpper,
	GeneralLower,
	GeneralUpper,
	HexFloatLower,
	HexFloatUpper,
}

/// What the parser needs to know about an argument to validate its spec
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
	None,
	SignedInt,
	UnsignedInt,
	Bool,
	Char,
	Float,
	CString,
	String,
	Pointer,
	Custom,
}

impl Category {
	pub const fn is_integral(self) -> bool {
		matches!(self, Category::SignedInt | Category::UnsignedInt | Category::Bool | Category::Char)
	}
	pub const fn is_arithmetic(self) -> bool {
		self.is_integral() || matches!(self, Category::Float)
	}
	const fn is_string(self) -> bool {
		matches!(self, Category::String | Category::CString)
	}
}

/// Fill character, kept as its UTF-8 encoding
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fill {
	bytes: [u8; 4],
	len: u8,
}

impl Fill {
	pub const SPACE: Fill = Fill { bytes: [b' ', 0, 0, 0], len: 1 };
	pub const ZERO: Fill = Fill { bytes: [b'0', 0, 0, 0], len: 1 };

	pub const fn from_char(c: char) -> Fill {
		let mut bytes = [0; 4];
		let len = c.encode_utf8(&mut bytes).len();
		Fill { bytes, len: len as u8 }
	}
	const fn from_bytes(src: &[u8], start: usize, len: usize) -> Fill {
		let mut bytes = [0; 4];
		let mut i = 0;
		while i < len {
			bytes[i] = src[start + i];
			i += 1;
		}
		Fill { bytes, len: len as u8 }
	}
	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes[..self.len as usize]
	}
	/// First code unit of the fill, which is all there is for ASCII fills
	pub const fn unit(&self) -> u8 {
		self.bytes[0]
	}
}

impl Default for Fill {
	fn default() -> Self {
		Fill::SPACE
	}
}

/// Width or precision: absent, given literally, or taken from another argument
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Count<'a> {
	None,
	Literal(usize),
	Arg(ArgRef<'a>),
}

/// Parsed standard format spec, `[[fill]align][sign][#][0][width][.precision][L][type]`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatSpec<'a> {
	pub fill: Fill,
	pub align: Align,
	pub sign: Sign,
	pub alt: bool,
	pub width: Count<'a>,
	pub precision: Count<'a>,
	pub localized: bool,
	pub ty: Presentation,
}

impl FormatSpec<'_> {
	pub const DEFAULT: FormatSpec<'static> = FormatSpec {
		fill: Fill::SPACE,
		align: Align::None,
		sign: Sign::None,
		alt: false,
		width: Count::None,
		precision: Count::None,
		localized: false,
		ty: Presentation::None,
	};
}

impl Default for FormatSpec<'_> {
	fn default() -> Self {
		FormatSpec::DEFAULT
	}
}

// spec parts, in the order they are allowed to appear
const START: u8 = 0;
const ALIGN: u8 = 1;
const SIGN: u8 = 2;
const HASH: u8 = 3;
const ZERO: u8 = 4;
const WIDTH: u8 = 5;
const PRECISION: u8 = 6;
const LOCALE: u8 = 7;

const fn parse_align(c: u8) -> Align {
	match c {
		b'<' => Align::Left,
		b'>' => Align::Right,
		b'^' => Align::Center,
		b'=' => Align::Numeric,
		_ => Align::None,
	}
}

const fn code_point_length(lead: u8) -> usize {
	match lead {
		0x00..=0x7f => 1,
		0xc0..=0xdf => 2,
		0xe0..=0xef => 3,
		_ => 4,
	}
}

macro_rules! tri {
	($e:expr) => {
		match $e {
			Ok(v) => v,
			Err(e) => return Err(e),
		}
	};
}

impl<'a> ParseContext<'a> {
	const fn enter(&self, state: &mut u8, next: u8, valid: bool, msg: &'static str) -> Result<(), ParseError> {
		if *state >= next {
			return Err(self.error("invalid format specifier"));
		}
		if !valid {
			return Err(self.error(msg));
		}
		*state = next;
		Ok(())
	}

	const fn presentation(&mut self, spec: &mut FormatSpec<'a>, ty: Presentation, valid: bool) -> Result<(), ParseError> {
		if !valid {
			return Err(self.error("invalid type specifier"));
		}
		spec.ty = ty;
		self.pos += 1;
		Ok(())
	}

	// `{}`, `{index}` or `{name}` in place of a width or precision
	const fn parse_dynamic(&mut self) -> Result<Count<'a>, ParseError> {
		// skip `{`
		self.pos += 1;
		let arg = match self.peek() {
			Some(b'}') => ArgRef::Index(tri!(self.next_arg_id())),
			Some(_) => match tri!(self.parse_arg_id()) {
				super::ArgId::Index(i) => {
					tri!(self.check_arg_id(i));
					ArgRef::Index(i)
				}
				super::ArgId::Name(name) => ArgRef::Name(name),
				super::ArgId::Auto => ArgRef::Index(tri!(self.next_arg_id())),
			},
			None => return Err(self.error("invalid format string")),
		};
		match self.peek() {
			Some(b'}') => {
				self.pos += 1;
				Ok(Count::Arg(arg))
			}
			_ => Err(self.error("invalid format string")),
		}
	}

	/**
	Parses a standard format spec for an argument of category `cat`,
	starting right after `:` and stopping at the closing `}` (which is left in place).
	*/
	pub const fn parse_format_specs(&mut self, cat: Category) -> Result<FormatSpec<'a>, ParseError> {
		let spec = tri!(self.parse_specs(cat));
		tri!(self.check_specs(&spec, cat));
		Ok(spec)
	}

	// bools and chars only take numeric flags when shown as numbers
	const fn check_specs(&self, spec: &FormatSpec<'a>, cat: Category) -> Result<(), ParseError> {
		if !matches!(cat, Category::Bool | Category::Char) {
			return Ok(());
		}
		let as_int = matches!(spec.ty,
			Presentation::Dec | Presentation::Oct | Presentation::HexLower | Presentation::HexUpper |
			Presentation::BinLower | Presentation::BinUpper);
		let numeric = spec.alt || matches!(spec.align, Align::Numeric);
		if numeric && !as_int {
			return Err(self.error("invalid format specifier"));
		}
		if matches!(cat, Category::Bool) && matches!(spec.ty, Presentation::Chr) {
			return Err(self.error("invalid format specifier"));
		}
		Ok(())
	}

	const fn parse_specs(&mut self, cat: Category) -> Result<FormatSpec<'a>, ParseError> {
		let mut spec = FormatSpec::DEFAULT;
		let mut state = START;
		let bytes = self.bytes();

		if self.pos >= bytes.len() {
			return Ok(spec);
		}
		// `<fill><align>` takes precedence over whatever the first character would mean on its own
		let mut c = bytes[self.pos];
		if self.pos + 1 < bytes.len() && !matches!(parse_align(bytes[self.pos + 1]), Align::None) {
			c = 0;
		}

		loop {
			match c {
				b'<' | b'>' | b'^' | b'=' => {
					let valid = c != b'=' || cat.is_arithmetic();
					tri!(self.enter(&mut state, ALIGN, valid, "format specifier requires numeric argument"));
					spec.align = parse_align(c);
					self.pos += 1;
				}
				b'+' | b'-' | b' ' => {
					let valid = matches!(cat, Category::SignedInt | Category::Float);
					tri!(self.enter(&mut state, SIGN, valid, "format specifier requires signed argument"));
					spec.sign = match c {
						b'+' => Sign::Plus,
						b'-' => Sign::Minus,
						_ => Sign::Space,
					};
					self.pos += 1;
				}
				b'#' => {
					tri!(self.enter(&mut state, HASH, cat.is_arithmetic(), "format specifier requires numeric argument"));
					spec.alt = true;
					self.pos += 1;
				}
				b'0' => {
					tri!(self.enter(&mut state, ZERO, cat.is_arithmetic(), "format specifier requires numeric argument"));
					if matches!(spec.align, Align::None) {
						spec.align = Align::Numeric;
						spec.fill = Fill::ZERO;
					}
					self.pos += 1;
				}
				b'1'..=b'9' | b'{' => {
					tri!(self.enter(&mut state, WIDTH, true, ""));
					spec.width = if c == b'{' {
						tri!(self.parse_dynamic())
					} else {
						Count::Literal(tri!(self.parse_nonnegative_int()))
					};
				}
				b'.' => {
					let valid = matches!(cat, Category::Float) || cat.is_string();
					tri!(self.enter(&mut state, PRECISION, valid, "precision not allowed for this argument type"));
					self.pos += 1;
					spec.precision = match self.peek() {
						Some(b'0'..=b'9') => Count::Literal(tri!(self.parse_nonnegative_int())),
						Some(b'{') => tri!(self.parse_dynamic()),
						_ => return Err(self.error("invalid precision")),
					};
				}
				b'L' => {
					tri!(self.enter(&mut state, LOCALE, cat.is_arithmetic(), "format specifier requires numeric argument"));
					spec.localized = true;
					self.pos += 1;
				}
				b'd' => { tri!(self.presentation(&mut spec, Presentation::Dec, cat.is_integral())); return Ok(spec) }
				b'o' => { tri!(self.presentation(&mut spec, Presentation::Oct, cat.is_integral())); return Ok(spec) }
				b'x' => { tri!(self.presentation(&mut spec, Presentation::HexLower, cat.is_integral())); return Ok(spec) }
				b'X' => { tri!(self.presentation(&mut spec, Presentation::HexUpper, cat.is_integral())); return Ok(spec) }
				b'b' => { tri!(self.presentation(&mut spec, Presentation::BinLower, cat.is_integral())); return Ok(spec) }
				b'B' => { tri!(self.presentation(&mut spec, Presentation::BinUpper, cat.is_integral())); return Ok(spec) }
				b'c' => { tri!(self.presentation(&mut spec, Presentation::Chr, cat.is_integral())); return Ok(spec) }
				b's' => {
					let valid = cat.is_string() || matches!(cat, Category::Bool);
					tri!(self.presentation(&mut spec, Presentation::String, valid));
					return Ok(spec)
				}
				b'p' => {
					let valid = matches!(cat, Category::Pointer | Category::CString);
					tri!(self.presentation(&mut spec, Presentation::Pointer, valid));
					return Ok(spec)
				}
				b'?' => {
					let valid = cat.is_string() || matches!(cat, Category::Char);
					tri!(self.presentation(&mut spec, Presentation::Debug, valid));
					return Ok(spec)
				}
				b'e' | b'E' | b'f' | b'F' | b'g' | b'G' | b'a' | b'A' => {
					let ty = match c {
						b'e' => Presentation::ExpLower,
						b'E' => Presentation::ExpUpper,
						b'f' => Presentation::FixedLower,
						b'F' => Presentation::FixedUpper,
						b'g' => Presentation::GeneralLower,
						b'G' => Presentation::GeneralUpper,
						b'a' => Presentation::HexFloatLower,
						_ => Presentation::HexFloatUpper,
					};
					tri!(self.presentation(&mut spec, ty, matches!(cat, Category::Float)));
					return Ok(spec)
				}
				b'}' => return Ok(spec),
				_ => {
					let lead = bytes[self.pos];
					if lead == b'}' {
						return Ok(spec);
					}
					let fill_len = code_point_length(lead);
					let fill_end = self.pos + fill_len;
					if fill_end >= bytes.len() {
						return Err(self.error("invalid format specifier"));
					}
					if lead == b'{' {
						return Err(self.error("invalid fill character '{'"));
					}
					let align = parse_align(bytes[fill_end]);
					let valid = !matches!(align, Align::None);
					tri!(self.enter(&mut state, ALIGN, valid, "invalid format specifier"));
					spec.fill = Fill::from_bytes(bytes, self.pos, fill_len);
					spec.align = align;
					self.pos = fill_end + 1;
				}
			}
			if self.pos >= bytes.len() {
				return Ok(spec);
			}
			c = bytes[self.pos];
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn specs(s: &str) -> FormatSpec<'_> {
		specs_for(s, Category::Float).unwrap()
	}
	fn specs_for(s: &str, cat: Category) -> Result<FormatSpec<'_>, ParseError> {
		let mut ctx = ParseContext::with_num_args(s, 43);
		ctx.parse_format_specs(cat)
	}

	#[test]
	fn parts() {
		assert_eq!(specs("<").align, Align::Left);
		assert_eq!(specs("*^").fill.unit(), b'*');
		assert_eq!(specs("*^").align, Align::Center);
		assert_eq!(specs("+").sign, Sign::Plus);
		assert_eq!(specs("-").sign, Sign::Minus);
		assert_eq!(specs(" ").sign, Sign::Space);
		assert!(specs("#").alt);
		assert_eq!(specs("0").align, Align::Numeric);
		assert_eq!(specs("0").fill, Fill::ZERO);
		assert!(specs("L").localized);
		assert_eq!(specs("42").width, Count::Literal(42));
		assert_eq!(specs("{42}").width, Count::Arg(ArgRef::Index(42)));
		assert_eq!(specs(".42").precision, Count::Literal(42));
		assert_eq!(specs(".{42}").precision, Count::Arg(ArgRef::Index(42)));
		assert_eq!(specs("f").ty, Presentation::FixedLower);
	}

	#[test]
	fn everything_at_once() {
		let s = specs("*>+#012.3Le}");
		assert_eq!(s.fill.unit(), b'*');
		assert_eq!(s.align, Align::Right);
		assert_eq!(s.sign, Sign::Plus);
		assert!(s.alt);
		// explicit alignment wins over `0`
		assert_eq!(s.fill.unit(), b'*');
		assert_eq!(s.width, Count::Literal(12));
		assert_eq!(s.precision, Count::Literal(3));
		assert!(s.localized);
		assert_eq!(s.ty, Presentation::ExpLower);
	}

	#[test]
	fn multibyte_fill() {
		let s = specs("→^7}");
		assert_eq!(s.fill.as_bytes(), "→".as_bytes());
		assert_eq!(s.align, Align::Center);
		assert_eq!(s.width, Count::Literal(7));
	}

	#[test]
	fn zero_as_fill() {
		let s = specs("0<5}");
		assert_eq!(s.fill.unit(), b'0');
		assert_eq!(s.align, Align::Left);
	}

	#[test]
	fn named_width() {
		assert_eq!(specs("{w}.{p}}").width, Count::Arg(ArgRef::Name("w")));
		assert_eq!(specs("{w}.{p}}").precision, Count::Arg(ArgRef::Name("p")));
	}

	#[test]
	fn stops_at_closing_brace() {
		let mut ctx = ParseContext::new(">5}tail");
		ctx.parse_format_specs(Category::SignedInt).unwrap();
		assert_eq!(ctx.remaining(), "}tail");
	}

	#[test]
	fn errors() {
		let msg = |s, cat| specs_for(s, cat).unwrap_err().msg;
		assert_eq!(msg("+}", Category::String), "format specifier requires signed argument");
		assert_eq!(msg("+}", Category::UnsignedInt), "format specifier requires signed argument");
		assert_eq!(msg("#}", Category::Pointer), "format specifier requires numeric argument");
		assert_eq!(msg("0}", Category::String), "format specifier requires numeric argument");
		assert_eq!(msg(".2}", Category::SignedInt), "precision not allowed for this argument type");
		assert_eq!(msg(".}", Category::Float), "invalid precision");
		assert_eq!(msg("f}", Category::SignedInt), "invalid type specifier");
		assert_eq!(msg("d}", Category::String), "invalid type specifier");
		assert_eq!(msg("z}", Category::SignedInt), "invalid format specifier");
		assert_eq!(msg("{<}", Category::SignedInt), "invalid fill character '{'");
		assert_eq!(msg("<<<}", Category::SignedInt), "invalid format specifier");
		assert_eq!(msg("99999999999}", Category::SignedInt), "number is too big");
		assert_eq!(msg("=5}", Category::String), "format specifier requires numeric argument");
		assert_eq!(msg("*=5}", Category::Pointer), "format specifier requires numeric argument");
	}

	#[test]
	fn bool_and_char_flags() {
		let msg = |s, cat| specs_for(s, cat).unwrap_err().msg;
		assert_eq!(msg("c}", Category::Bool), "invalid format specifier");
		assert_eq!(msg("05}", Category::Bool), "invalid format specifier");
		assert_eq!(msg("#}", Category::Bool), "invalid format specifier");
		assert_eq!(msg("#}", Category::Char), "invalid format specifier");
		assert_eq!(msg("05}", Category::Char), "invalid format specifier");
		assert_eq!(msg("=5}", Category::Char), "invalid format specifier");
		assert_eq!(msg("#c}", Category::Char), "invalid format specifier");
		// fine once shown as numbers
		assert!(specs_for("#x}", Category::Char).is_ok());
		assert!(specs_for("05d}", Category::Bool).is_ok());
		assert!(specs_for("=5b}", Category::Bool).is_ok());
		assert!(specs_for("c}", Category::Char).is_ok());
		assert!(specs_for("*^5}", Category::Char).is_ok());
	}

	#[test]
	fn categories() {
		assert_eq!(specs_for("x}", Category::Bool).unwrap().ty, Presentation::HexLower);
		assert_eq!(specs_for("s}", Category::Bool).unwrap().ty, Presentation::String);
		assert_eq!(specs_for("?}", Category::Char).unwrap().ty, Presentation::Debug);
		assert_eq!(specs_for("p}", Category::Pointer).unwrap().ty, Presentation::Pointer);
		assert_eq!(specs_for(".3s}", Category::String).unwrap().precision, Count::Literal(3));
	}
}
