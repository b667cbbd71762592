/*!
Built-in renderers.

Digits come from `core::fmt` into a scratch area on the stack;
everything around them (signs, prefixes, fill, alignment, C-style float layouts) is done here.
*/

use crate::parse::{Align, Fill, Presentation, Sign};
use crate::{Arg, Buffer, Error, Result};
use std::fmt::{self, Write};

/// Format spec with width and precision already resolved
#[derive(Clone, Copy, Debug)]
pub(crate) struct Specs {
	pub fill: Fill,
	pub align: Align,
	pub sign: Sign,
	pub alt: bool,
	pub width: usize,
	pub precision: Option<usize>,
	pub ty: Presentation,
}

impl Default for Specs {
	fn default() -> Self {
		Specs {
			fill: Fill::SPACE,
			align: Align::None,
			sign: Sign::None,
			alt: false,
			width: 0,
			precision: None,
			ty: Presentation::None,
		}
	}
}

const STACK_SIZE: usize = 136;

// enough for any integer in any base; longer texts (huge float precisions) spill to the heap
struct Scratch {
	stack: [u8; STACK_SIZE],
	len: usize,
	heap: Vec<u8>,
}

impl Scratch {
	fn new() -> Self {
		Scratch { stack: [0; STACK_SIZE], len: 0, heap: Vec::new() }
	}
	fn push(&mut self, bytes: &[u8]) {
		if self.heap.is_empty() && self.len + bytes.len() <= STACK_SIZE {
			self.stack[self.len .. self.len + bytes.len()].copy_from_slice(bytes);
			self.len += bytes.len();
		} else {
			if self.heap.is_empty() {
				self.heap.extend_from_slice(&self.stack[..self.len]);
			}
			self.heap.extend_from_slice(bytes);
		}
	}
	fn as_bytes(&self) -> &[u8] {
		if self.heap.is_empty() {
			&self.stack[..self.len]
		} else {
			&self.heap
		}
	}
	fn as_bytes_mut(&mut self) -> &mut [u8] {
		if self.heap.is_empty() {
			&mut self.stack[..self.len]
		} else {
			&mut self.heap
		}
	}
	fn truncate(&mut self, len: usize) {
		if self.heap.is_empty() {
			self.len = self.len.min(len);
		} else {
			self.heap.truncate(len);
		}
	}
}

impl Write for Scratch {
	fn write_str(&mut self, s: &str) -> fmt::Result {
		self.push(s.as_bytes());
		Ok(())
	}
}

fn scratch(args: fmt::Arguments<'_>) -> Result<Scratch> {
	let mut s = Scratch::new();
	s.write_fmt(args).map_err(|_| Error::Format("formatter error"))?;
	Ok(s)
}

fn fill(out: &mut dyn Buffer<u8>, fill: Fill, n: usize) -> Result<()> {
	for _ in 0..n {
		out.append(fill.as_bytes())?;
	}
	Ok(())
}

// `parts` take up `width` columns together
fn write_padded(out: &mut dyn Buffer<u8>, specs: &Specs, default: Align, parts: &[&[u8]], width: usize) -> Result<()> {
	let padding = specs.width.saturating_sub(width);
	let align = if specs.align == Align::None { default } else { specs.align };
	let (before, after) = match align {
		Align::Left => (0, padding),
		Align::Center => (padding / 2, padding - padding / 2),
		_ => (padding, 0),
	};
	fill(out, specs.fill, before)?;
	for part in parts {
		out.append(part)?;
	}
	fill(out, specs.fill, after)
}

// with numeric alignment, padding goes between sign/prefix and digits
fn write_number(out: &mut dyn Buffer<u8>, specs: &Specs, prefix: &[u8], body: &[u8]) -> Result<()> {
	let width = prefix.len() + body.len();
	if specs.align == Align::Numeric {
		out.append(prefix)?;
		fill(out, specs.fill, specs.width.saturating_sub(width))?;
		out.append(body)?;
		Ok(())
	} else {
		write_padded(out, specs, Align::Right, &[prefix, body], width)
	}
}

fn write_string(out: &mut dyn Buffer<u8>, specs: &Specs, s: &str) -> Result<()> {
	let s = match specs.precision {
		Some(n) => match s.char_indices().nth(n) {
			Some((end, _)) => &s[..end],
			None => s,
		},
		None => s,
	};
	write_padded(out, specs, Align::Left, &[s.as_bytes()], s.chars().count())
}

fn write_char(out: &mut dyn Buffer<u8>, specs: &Specs, c: char) -> Result<()> {
	let mut buf = [0; 4];
	write_string(out, specs, c.encode_utf8(&mut buf))
}

fn sign(specs: &Specs, negative: bool) -> &'static [u8] {
	match (negative, specs.sign) {
		(true, _) => b"-",
		(false, Sign::Plus) => b"+",
		(false, Sign::Space) => b" ",
		_ => b"",
	}
}

fn write_int(out: &mut dyn Buffer<u8>, specs: &Specs, negative: bool, abs: u128) -> Result<()> {
	let (digits, base) = match specs.ty {
		Presentation::Chr => {
			let c = u32::try_from(abs).ok()
				.filter(|_| !negative)
				.and_then(char::from_u32)
				.ok_or(Error::Format("invalid character"))?;
			return write_char(out, specs, c);
		}
		Presentation::Oct => (scratch(format_args!("{:o}", abs))?, if specs.alt && abs != 0 { "0" } else { "" }),
		Presentation::HexLower => (scratch(format_args!("{:x}", abs))?, if specs.alt { "0x" } else { "" }),
		Presentation::HexUpper => (scratch(format_args!("{:X}", abs))?, if specs.alt { "0X" } else { "" }),
		Presentation::BinLower => (scratch(format_args!("{:b}", abs))?, if specs.alt { "0b" } else { "" }),
		Presentation::BinUpper => (scratch(format_args!("{:b}", abs))?, if specs.alt { "0B" } else { "" }),
		_ => (scratch(format_args!("{}", abs))?, ""),
	};
	let mut prefix = [0u8; 3];
	let sign = sign(specs, negative);
	prefix[..sign.len()].copy_from_slice(sign);
	prefix[sign.len() .. sign.len() + base.len()].copy_from_slice(base.as_bytes());
	write_number(out, specs, &prefix[.. sign.len() + base.len()], digits.as_bytes())
}

fn write_pointer(out: &mut dyn Buffer<u8>, specs: &Specs, p: *const ()) -> Result<()> {
	let digits = scratch(format_args!("{:x}", p as usize))?;
	write_number(out, specs, b"0x", digits.as_bytes())
}

/*
Floats.

Rust writes exponents as `e5`/`e-5`; C-style output wants `e+05`/`e-05`,
and switches between fixed and exponential layouts on its own for `g` and the default.
*/

fn strip_minus(s: Scratch) -> Scratch {
	if s.as_bytes().first() != Some(&b'-') {
		return s;
	}
	let mut t = Scratch::new();
	t.push(&s.as_bytes()[1..]);
	t
}

// mantissa and exponent of Rust's `{:e}` output
fn split_exp(s: &[u8]) -> (&[u8], i32) {
	let e = s.iter().position(|&c| c == b'e').unwrap_or(s.len());
	let (mantissa, exp) = s.split_at(e);
	let exp = exp.get(1..).unwrap_or_default();
	let (negative, digits) = match exp.split_first() {
		Some((b'-', rest)) => (true, rest),
		_ => (false, exp),
	};
	let value = digits.iter().fold(0i32, |acc, &d| acc * 10 + (d - b'0') as i32);
	(mantissa, if negative { -value } else { value })
}

fn push_exp(s: &mut Scratch, exp: i32) {
	let sign = if exp < 0 { '-' } else { '+' };
	let _ = write!(s, "e{}{:02}", sign, exp.unsigned_abs());
}

fn fixed<F: fmt::Display>(value: F, precision: usize) -> Result<Scratch> {
	Ok(strip_minus(scratch(format_args!("{:.*}", precision, value))?))
}

fn exp<F: fmt::LowerExp>(value: F, precision: usize) -> Result<Scratch> {
	let raw = strip_minus(scratch(format_args!("{:.*e}", precision, value))?);
	let (mantissa, exp) = split_exp(raw.as_bytes());
	let mut s = Scratch::new();
	s.push(mantissa);
	push_exp(&mut s, exp);
	Ok(s)
}

// drops trailing zeros of the fractional part, and the point if nothing is left after it
fn strip_zeros(s: Scratch) -> Scratch {
	let bytes = s.as_bytes();
	let e = bytes.iter().position(|&c| c == b'e').unwrap_or(bytes.len());
	let (mantissa, exp) = bytes.split_at(e);
	if !mantissa.contains(&b'.') {
		return s;
	}
	let mut end = mantissa.len();
	while mantissa[end - 1] == b'0' {
		end -= 1;
	}
	if mantissa[end - 1] == b'.' {
		end -= 1;
	}
	let mut t = Scratch::new();
	t.push(&mantissa[..end]);
	t.push(exp);
	t
}

fn general<F: fmt::Display + fmt::LowerExp + Copy>(value: F, precision: usize, alt: bool) -> Result<Scratch> {
	let p = precision.max(1);
	let raw = scratch(format_args!("{:.*e}", p - 1, value))?;
	let (_, x) = split_exp(raw.as_bytes());
	let s = if x >= -4 && x < p as i32 {
		fixed(value, (p as i32 - 1 - x) as usize)?
	} else {
		exp(value, p - 1)?
	};
	Ok(if alt { s } else { strip_zeros(s) })
}

// shortest representation that reads back the same, laid out like the general format
fn shortest<F: fmt::LowerExp>(value: F) -> Result<Scratch> {
	let raw = strip_minus(scratch(format_args!("{:e}", value))?);
	let (mantissa, x) = split_exp(raw.as_bytes());
	let mut digits = Scratch::new();
	for &c in mantissa.iter().filter(|&&c| c != b'.') {
		digits.push(&[c]);
	}
	let digits = digits.as_bytes();
	let mut s = Scratch::new();
	if (-4..16).contains(&x) {
		if x < 0 {
			s.push(b"0.");
			for _ in 0 .. -x - 1 {
				s.push(b"0");
			}
			s.push(digits);
		} else {
			let int_len = x as usize + 1;
			if digits.len() <= int_len {
				s.push(digits);
				for _ in digits.len() .. int_len {
					s.push(b"0");
				}
			} else {
				s.push(&digits[..int_len]);
				s.push(b".");
				s.push(&digits[int_len..]);
			}
		}
	} else {
		s.push(mantissa);
		push_exp(&mut s, x);
	}
	Ok(s)
}

fn hex_float(value: f64, precision: Option<usize>) -> Scratch {
	const DIGITS: usize = 13;
	let bits = value.abs().to_bits();
	let biased = ((bits >> 52) & 0x7ff) as i32;
	let mantissa = bits & ((1 << 52) - 1);
	let (mut lead, exp) = match (biased, mantissa) {
		(0, 0) => (0u64, 0),
		(0, _) => (0, -1022),
		_ => (1, biased - 1023),
	};
	let mut s = Scratch::new();
	let frac = match precision {
		Some(p) if p < DIGITS => {
			let shift = (DIGITS - p) * 4;
			let full = (lead << 52) | mantissa;
			let (mut q, rem, half) = (full >> shift, full & ((1 << shift) - 1), 1u64 << (shift - 1));
			// ties go to even
			if rem > half || (rem == half && q & 1 == 1) {
				q += 1;
			}
			lead = q >> (p * 4);
			let mut frac = Scratch::new();
			if p > 0 {
				let _ = write!(frac, "{:01$x}", q & ((1 << (p * 4)) - 1), p);
			}
			frac
		}
		_ => {
			let mut frac = Scratch::new();
			let _ = write!(frac, "{:013x}", mantissa);
			match precision {
				Some(p) => {
					for _ in DIGITS..p {
						frac.push(b"0");
					}
				}
				None => {
					let end = frac.as_bytes().iter().rposition(|&c| c != b'0').map_or(0, |i| i + 1);
					frac.truncate(end);
				}
			}
			frac
		}
	};
	let _ = write!(s, "0x{}", lead);
	if !frac.as_bytes().is_empty() {
		s.push(b".");
		s.push(frac.as_bytes());
	}
	let _ = write!(s, "p{}{}", if exp < 0 { '-' } else { '+' }, exp.unsigned_abs());
	s
}

fn write_float<F: fmt::Display + fmt::LowerExp + Copy>(out: &mut dyn Buffer<u8>, specs: &Specs, value: F, wide: f64) -> Result<()> {
	use Presentation::{ExpLower, ExpUpper, FixedLower, FixedUpper, GeneralLower, GeneralUpper, HexFloatLower, HexFloatUpper};
	let upper = matches!(specs.ty, ExpUpper | FixedUpper | GeneralUpper | HexFloatUpper);
	let sign = sign(specs, wide.is_sign_negative() && !wide.is_nan());
	if !wide.is_finite() {
		let text: &[u8] = match (wide.is_nan(), upper) {
			(true, false) => b"nan",
			(true, true) => b"NAN",
			(false, false) => b"inf",
			(false, true) => b"INF",
		};
		// zero padding would make these look like numbers
		let mut specs = *specs;
		if specs.align == Align::Numeric {
			specs.align = Align::Right;
			specs.fill = Fill::SPACE;
		}
		return write_number(out, &specs, sign, text);
	}
	let mut body = match (specs.ty, specs.precision) {
		(FixedLower | FixedUpper, p) => fixed(value, p.unwrap_or(6))?,
		(ExpLower | ExpUpper, p) => exp(value, p.unwrap_or(6))?,
		(GeneralLower | GeneralUpper, p) => general(value, p.unwrap_or(6), specs.alt)?,
		(HexFloatLower | HexFloatUpper, p) => hex_float(wide, p),
		(_, Some(p)) => general(value, p, specs.alt)?,
		(_, None) => shortest(value)?,
	};
	if specs.alt && !body.as_bytes().contains(&b'.') {
		let bytes = body.as_bytes();
		let at = bytes.iter().position(|&c| c == b'e' || c == b'p').unwrap_or(bytes.len());
		let mut t = Scratch::new();
		t.push(&bytes[..at]);
		t.push(b".");
		t.push(&bytes[at..]);
		body = t;
	}
	if upper {
		body.as_bytes_mut().make_ascii_uppercase();
	}
	write_number(out, specs, sign, body.as_bytes())
}

pub(crate) fn render(out: &mut dyn Buffer<u8>, arg: Arg<'_>, specs: &Specs) -> Result<()> {
	use Presentation::{BinLower, BinUpper, Debug, Dec, HexLower, HexUpper, Oct, Pointer};
	let integral = matches!(specs.ty, Dec | Oct | HexLower | HexUpper | BinLower | BinUpper);
	match arg {
		Arg::Bool(v) if integral => write_int(out, specs, false, v as u128),
		Arg::Bool(v) => write_string(out, specs, if v { "true" } else { "false" }),
		Arg::Char(c) if integral => write_int(out, specs, false, c as u128),
		Arg::Char(c) if specs.ty == Debug => write_debug(out, specs, format_args!("{:?}", c)),
		Arg::Char(c) => write_char(out, specs, c),
		Arg::Int(v) => write_int(out, specs, v < 0, v.unsigned_abs() as u128),
		Arg::UInt(v) => write_int(out, specs, false, v as u128),
		Arg::LongLong(v) => write_int(out, specs, v < 0, v.unsigned_abs() as u128),
		Arg::ULongLong(v) => write_int(out, specs, false, v as u128),
		Arg::Int128(v) => write_int(out, specs, v < 0, v.unsigned_abs()),
		Arg::UInt128(v) => write_int(out, specs, false, v),
		Arg::Float(v) => write_float(out, specs, v, v as f64),
		Arg::Double(v) => write_float(out, specs, v, v),
		Arg::CString(s) if specs.ty == Pointer => write_pointer(out, specs, s.as_ptr() as *const ()),
		Arg::CString(s) => write_str(out, specs, &s.to_string_lossy()),
		Arg::Str(s) => write_str(out, specs, s),
		Arg::Pointer(p) => write_pointer(out, specs, p),
		Arg::None | Arg::Custom(_) => Err(Error::Format("argument cannot be rendered without its formatter")),
	}
}

fn write_str(out: &mut dyn Buffer<u8>, specs: &Specs, s: &str) -> Result<()> {
	if specs.ty == Presentation::Debug {
		write_debug(out, specs, format_args!("{:?}", s))
	} else {
		write_string(out, specs, s)
	}
}

// quoted and escaped
fn write_debug(out: &mut dyn Buffer<u8>, specs: &Specs, debug: fmt::Arguments<'_>) -> Result<()> {
	let escaped = scratch(debug)?;
	let escaped = std::str::from_utf8(escaped.as_bytes()).map_err(|_| Error::Format("formatter error"))?;
	write_string(out, specs, escaped)
}
