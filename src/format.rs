/*!
What makes a type formattable.

A type is formattable through a shared reference if it implements [`Format`],
and through an exclusive one if it implements [`FormatMut`].
Nothing else counts: a type that merely derefs, converts, or coerces
into something formattable has to say so with its own impl.
*/

use crate::parse::{FormatSpec, ParseContext};
use crate::{Arg, Context, Handle, Kind, MutArg, Result};
use std::ffi::{CStr, CString};

/**
Formatting through a shared reference.

Custom types only need [`format()`](#tymethod.format); the default [`parse()`](#method.parse)
accepts an empty spec and nothing else.

```
use buf_fmt::{Context, Format, Result};

struct Point(i32, i32);

impl Format for Point {
	type Spec<'t> = ();
	fn format(&self, _: &(), ctx: &mut Context<'_, '_>) -> Result<()> {
		write!(ctx, "({}, {})", self.0, self.1)
	}
}

assert_eq!(buf_fmt::format!("at {}", Point(1, -2)).unwrap(), "at (1, -2)");
```
*/
pub trait Format {
	/// Whatever [`parse()`](#method.parse) gets out of a field's spec
	type Spec<'t>: Default;
	/// Kind of the [`Arg`] this type turns into
	const KIND: Kind = Kind::Custom;

	/// Consumes the spec, leaving `ctx` at the closing `}`
	fn parse<'t>(ctx: &mut ParseContext<'t>) -> Result<Self::Spec<'t>> {
		let _ = ctx;
		Ok(Default::default())
	}
	fn format(&self, spec: &Self::Spec<'_>, ctx: &mut Context<'_, '_>) -> Result<()>;

	fn to_arg(&self) -> Arg<'_> where Self: Sized {
		Arg::Custom(Handle::new(self))
	}
}

/// Formatting that needs to mutate the value, available only to arguments passed as `mut` (see [`MutArg`])
pub trait FormatMut {
	type Spec<'t>: Default;

	fn parse<'t>(ctx: &mut ParseContext<'t>) -> Result<Self::Spec<'t>> {
		let _ = ctx;
		Ok(Default::default())
	}
	fn format(&mut self, spec: &Self::Spec<'_>, ctx: &mut Context<'_, '_>) -> Result<()>;
}

macro_rules! builtin {
	($($t:ty => $kind:ident, |$v:ident| $arg:expr;)*) => {$(
		impl Format for $t {
			type Spec<'t> = FormatSpec<'t>;
			const KIND: Kind = Kind::$kind;

			fn parse<'t>(ctx: &mut ParseContext<'t>) -> Result<FormatSpec<'t>> {
				Ok(ctx.parse_format_specs(Self::KIND.category())?)
			}
			fn format(&self, spec: &FormatSpec<'_>, ctx: &mut Context<'_, '_>) -> Result<()> {
				ctx.format_value(self.to_arg(), spec)
			}
			fn to_arg(&self) -> Arg<'_> {
				let $v = self;
				$arg
			}
		}
	)*};
}

builtin! {
	bool => Bool, |v| Arg::Bool(*v);
	char => Char, |v| Arg::Char(*v);
	i8 => Int, |v| Arg::Int(*v as i32);
	i16 => Int, |v| Arg::Int(*v as i32);
	i32 => Int, |v| Arg::Int(*v);
	i64 => LongLong, |v| Arg::LongLong(*v);
	i128 => Int128, |v| Arg::Int128(*v);
	u8 => UInt, |v| Arg::UInt(*v as u32);
	u16 => UInt, |v| Arg::UInt(*v as u32);
	u32 => UInt, |v| Arg::UInt(*v);
	u64 => ULongLong, |v| Arg::ULongLong(*v);
	u128 => UInt128, |v| Arg::UInt128(*v);
	f32 => Float, |v| Arg::Float(*v);
	f64 => Double, |v| Arg::Double(*v);
	&str => Str, |v| Arg::Str(v);
	String => Str, |v| Arg::Str(v.as_str());
	&CStr => CString, |v| Arg::CString(v);
	CString => CString, |v| Arg::CString(v.as_c_str());
	*const () => Pointer, |v| Arg::Pointer(*v);
	*mut () => Pointer, |v| Arg::Pointer(*v as *const ());
}

#[cfg(target_pointer_width = "64")]
builtin! {
	isize => LongLong, |v| Arg::LongLong(*v as i64);
	usize => ULongLong, |v| Arg::ULongLong(*v as u64);
}

#[cfg(not(target_pointer_width = "64"))]
builtin! {
	isize => Int, |v| Arg::Int(*v as i32);
	usize => UInt, |v| Arg::UInt(*v as u32);
}

/// Erases a typed pointer; only untyped pointers are formattable as they are
pub fn ptr<T: ?Sized>(p: *const T) -> *const () {
	p as *const ()
}

impl<T: Format> Format for &T {
	type Spec<'t> = T::Spec<'t>;
	const KIND: Kind = T::KIND;

	fn parse<'t>(ctx: &mut ParseContext<'t>) -> Result<Self::Spec<'t>> {
		T::parse(ctx)
	}
	fn format(&self, spec: &Self::Spec<'_>, ctx: &mut Context<'_, '_>) -> Result<()> {
		(**self).format(spec, ctx)
	}
	fn to_arg(&self) -> Arg<'_> {
		(**self).to_arg()
	}
}

impl<T: Format> Format for &mut T {
	type Spec<'t> = T::Spec<'t>;
	const KIND: Kind = T::KIND;

	fn parse<'t>(ctx: &mut ParseContext<'t>) -> Result<Self::Spec<'t>> {
		T::parse(ctx)
	}
	fn format(&self, spec: &Self::Spec<'_>, ctx: &mut Context<'_, '_>) -> Result<()> {
		(**self).format(spec, ctx)
	}
	fn to_arg(&self) -> Arg<'_> {
		(**self).to_arg()
	}
}

/// Kind of an argument as the formatting macros capture it: `&value`, or a [`MutArg`] for `mut value`
pub trait ArgKind {
	const KIND: Kind;
}

impl<T: Format + ?Sized> ArgKind for &T {
	const KIND: Kind = T::KIND;
}

impl<T: FormatMut> ArgKind for MutArg<'_, T> {
	const KIND: Kind = Kind::Custom;
}
