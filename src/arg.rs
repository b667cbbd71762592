use crate::parse::{Category, ParseContext};
use crate::{Context, Error, Format, FormatMut, Result};
use std::cell::Cell;
use std::ffi::CStr;
use std::marker::PhantomData;

/// Closed set of argument kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
	None,
	Bool,
	Char,
	Int,
	UInt,
	LongLong,
	ULongLong,
	Int128,
	UInt128,
	Float,
	Double,
	CString,
	Str,
	Pointer,
	Custom,
}

impl Kind {
	pub const fn category(self) -> Category {
		match self {
			Kind::None => Category::None,
			Kind::Bool => Category::Bool,
			Kind::Char => Category::Char,
			Kind::Int | Kind::LongLong | Kind::Int128 => Category::SignedInt,
			Kind::UInt | Kind::ULongLong | Kind::UInt128 => Category::UnsignedInt,
			Kind::Float | Kind::Double => Category::Float,
			Kind::CString => Category::CString,
			Kind::Str => Category::String,
			Kind::Pointer => Category::Pointer,
			Kind::Custom => Category::Custom,
		}
	}
}

/**
Type-erased reference to a value of some type with a [`Format`]/[`FormatMut`] implementation.

Instead of a vtable it keeps one function pointer, instantiated for the concrete type
when the handle is created, which parses the field's spec and renders the value.
*/
#[derive(Clone, Copy, Debug)]
pub struct Handle<'a> {
	value: *const (),
	format: unsafe fn(*const (), &mut ParseContext<'_>, &mut Context<'_, '_>) -> Result<()>,
	_marker: PhantomData<&'a ()>,
}

unsafe fn format_ref<T: Format>(value: *const (), parse_ctx: &mut ParseContext<'_>, ctx: &mut Context<'_, '_>) -> Result<()> {
	// SAFETY: `value` comes from a `&'a T` in `Handle::new()`, and the handle does not outlive 'a
	let value = unsafe { &*(value as *const T) };
	let spec = T::parse(parse_ctx)?;
	value.format(&spec, ctx)
}

unsafe fn format_mut<T: FormatMut>(slot: *const (), parse_ctx: &mut ParseContext<'_>, ctx: &mut Context<'_, '_>) -> Result<()> {
	// SAFETY: `slot` comes from a `&'a MutArg<'_, T>` in `Handle::new_mut()`, and the handle does not outlive 'a
	let slot = unsafe { &*(slot as *const MutArg<'_, T>) };
	// handles are `Copy`, so the value may be asked for again while it is being formatted
	if slot.busy.replace(true) {
		return Err(Error::Format("argument is already being formatted"));
	}
	// SAFETY: `slot` holds the only path to the value, and `busy` admits one `&mut T` at a time
	let value = unsafe { &mut *slot.value };
	let res = T::parse(parse_ctx).and_then(|spec| value.format(&spec, ctx));
	slot.busy.set(false);
	res
}

/**
Exclusive borrow of a [`FormatMut`] value, lent out to one formatting call.

The formatting macros make one for every argument written as `mut expr`.
Formatting the value again from within its own [`FormatMut::format()`]
(say, through a copy of its [`Handle`] taken from [`Context::arg()`]) fails instead of aliasing it.
*/
pub struct MutArg<'a, T> {
	value: *mut T,
	busy: Cell<bool>,
	_marker: PhantomData<&'a mut T>,
}

impl<'a, T: FormatMut> MutArg<'a, T> {
	pub fn new(value: &'a mut T) -> Self {
		MutArg {
			value: value as *mut T,
			busy: Cell::new(false),
			_marker: PhantomData,
		}
	}
	pub fn arg(&self) -> Arg<'_> {
		Arg::Custom(Handle::new_mut(self))
	}
}

impl<'a> Handle<'a> {
	pub fn new<T: Format>(value: &'a T) -> Self {
		Handle {
			value: value as *const T as *const (),
			format: format_ref::<T>,
			_marker: PhantomData,
		}
	}
	pub fn new_mut<T: FormatMut>(slot: &'a MutArg<'_, T>) -> Self {
		Handle {
			value: slot as *const MutArg<'_, T> as *const (),
			format: format_mut::<T>,
			_marker: PhantomData,
		}
	}
	/// Parses the rest of the field from `parse_ctx` (leaving it at the closing `}`), then writes into `ctx`.
	pub fn format(&self, parse_ctx: &mut ParseContext<'_>, ctx: &mut Context<'_, '_>) -> Result<()> {
		// SAFETY: `value` and `format` were paired up by one of the constructors
		unsafe { (self.format)(self.value, parse_ctx, ctx) }
	}
}

/// Formatting argument with its type erased down to one of the [`Kind`]s
#[derive(Clone, Copy, Debug, Default)]
pub enum Arg<'a> {
	/// No such argument
	#[default]
	None,
	Bool(bool),
	Char(char),
	Int(i32),
	UInt(u32),
	LongLong(i64),
	ULongLong(u64),
	Int128(i128),
	UInt128(u128),
	Float(f32),
	Double(f64),
	CString(&'a CStr),
	Str(&'a str),
	Pointer(*const ()),
	Custom(Handle<'a>),
}

impl<'a> Arg<'a> {
	/// Erases any formattable value; built-in types keep their own kinds
	pub fn new<T: Format>(value: &'a T) -> Self {
		value.to_arg()
	}

	pub fn kind(&self) -> Kind {
		match self {
			Arg::None => Kind::None,
			Arg::Bool(_) => Kind::Bool,
			Arg::Char(_) => Kind::Char,
			Arg::Int(_) => Kind::Int,
			Arg::UInt(_) => Kind::UInt,
			Arg::LongLong(_) => Kind::LongLong,
			Arg::ULongLong(_) => Kind::ULongLong,
			Arg::Int128(_) => Kind::Int128,
			Arg::UInt128(_) => Kind::UInt128,
			Arg::Float(_) => Kind::Float,
			Arg::Double(_) => Kind::Double,
			Arg::CString(_) => Kind::CString,
			Arg::Str(_) => Kind::Str,
			Arg::Pointer(_) => Kind::Pointer,
			Arg::Custom(_) => Kind::Custom,
		}
	}

	pub fn is_none(&self) -> bool {
		matches!(self, Arg::None)
	}

	/// Calls exactly one of `visitor`'s methods, the one for the active kind
	pub fn visit<V: Visitor<'a>>(self, visitor: V) -> V::Output {
		match self {
			Arg::None => visitor.visit_none(),
			Arg::Bool(v) => visitor.visit_bool(v),
			Arg::Char(v) => visitor.visit_char(v),
			Arg::Int(v) => visitor.visit_i32(v),
			Arg::UInt(v) => visitor.visit_u32(v),
			Arg::LongLong(v) => visitor.visit_i64(v),
			Arg::ULongLong(v) => visitor.visit_u64(v),
			Arg::Int128(v) => visitor.visit_i128(v),
			Arg::UInt128(v) => visitor.visit_u128(v),
			Arg::Float(v) => visitor.visit_f32(v),
			Arg::Double(v) => visitor.visit_f64(v),
			Arg::CString(v) => visitor.visit_cstr(v),
			Arg::Str(v) => visitor.visit_str(v),
			Arg::Pointer(v) => visitor.visit_pointer(v),
			Arg::Custom(v) => visitor.visit_custom(v),
		}
	}
}

/// Receiver for [`Arg::visit()`]
pub trait Visitor<'a> {
	type Output;
	/// Missing argument; there is no value to hand over
	fn visit_none(self) -> Self::Output;
	fn visit_bool(self, value: bool) -> Self::Output;
	fn visit_char(self, value: char) -> Self::Output;
	fn visit_i32(self, value: i32) -> Self::Output;
	fn visit_u32(self, value: u32) -> Self::Output;
	fn visit_i64(self, value: i64) -> Self::Output;
	fn visit_u64(self, value: u64) -> Self::Output;
	fn visit_i128(self, value: i128) -> Self::Output;
	fn visit_u128(self, value: u128) -> Self::Output;
	fn visit_f32(self, value: f32) -> Self::Output;
	fn visit_f64(self, value: f64) -> Self::Output;
	fn visit_cstr(self, value: &'a CStr) -> Self::Output;
	fn visit_str(self, value: &'a str) -> Self::Output;
	fn visit_pointer(self, value: *const ()) -> Self::Output;
	fn visit_custom(self, value: Handle<'a>) -> Self::Output;
}

/// One argument in a [`FormatArgs`] list
#[derive(Clone, Copy, Debug, Default)]
pub struct ArgEntry<'a> {
	pub name: Option<&'a str>,
	pub value: Arg<'a>,
}

impl<'a> ArgEntry<'a> {
	pub fn positional(value: Arg<'a>) -> Self {
		ArgEntry { name: None, value }
	}
	pub fn named(name: &'a str, value: Arg<'a>) -> Self {
		ArgEntry { name: Some(name), value }
	}
}

/**
Arguments of one formatting call.

Named arguments are also reachable by their position in the list.
Lookups never fail: unknown references come back as [`Arg::None`].
*/
#[derive(Clone, Copy, Debug, Default)]
pub struct FormatArgs<'a> {
	entries: &'a [ArgEntry<'a>],
}

impl<'a> FormatArgs<'a> {
	pub const fn new(entries: &'a [ArgEntry<'a>]) -> Self {
		FormatArgs { entries }
	}
	pub fn len(&self) -> usize {
		self.entries.len()
	}
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
	pub fn get(&self, index: usize) -> Arg<'a> {
		self.entries.get(index).map(|e| e.value).unwrap_or_default()
	}
	/// Position of the argument called `name`
	pub fn find(&self, name: &str) -> Option<usize> {
		self.entries.iter().position(|e| e.name == Some(name))
	}
	pub fn get_by_name(&self, name: &str) -> Arg<'a> {
		self.find(name).map(|i| self.get(i)).unwrap_or_default()
	}
	pub fn kinds(&self) -> impl Iterator<Item = Kind> + 'a {
		self.entries.iter().map(|e| e.value.kind())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Buffer, FixedBuffer, MemoryBuffer};

	// records which visitor method got called, and with what
	struct Probe;
	impl<'a> Visitor<'a> for Probe {
		type Output = (&'static str, String);
		fn visit_none(self) -> Self::Output { ("none", String::new()) }
		fn visit_bool(self, v: bool) -> Self::Output { ("bool", v.to_string()) }
		fn visit_char(self, v: char) -> Self::Output { ("char", v.to_string()) }
		fn visit_i32(self, v: i32) -> Self::Output { ("i32", v.to_string()) }
		fn visit_u32(self, v: u32) -> Self::Output { ("u32", v.to_string()) }
		fn visit_i64(self, v: i64) -> Self::Output { ("i64", v.to_string()) }
		fn visit_u64(self, v: u64) -> Self::Output { ("u64", v.to_string()) }
		fn visit_i128(self, v: i128) -> Self::Output { ("i128", v.to_string()) }
		fn visit_u128(self, v: u128) -> Self::Output { ("u128", v.to_string()) }
		fn visit_f32(self, v: f32) -> Self::Output { ("f32", v.to_string()) }
		fn visit_f64(self, v: f64) -> Self::Output { ("f64", v.to_string()) }
		fn visit_cstr(self, v: &'a CStr) -> Self::Output { ("cstr", v.to_string_lossy().into_owned()) }
		fn visit_str(self, v: &'a str) -> Self::Output { ("str", v.to_owned()) }
		fn visit_pointer(self, v: *const ()) -> Self::Output { ("pointer", format!("{:p}", v)) }
		fn visit_custom(self, _: Handle<'a>) -> Self::Output { ("custom", String::new()) }
	}

	fn visit<T: Format>(value: &T) -> (&'static str, String) {
		Arg::new(value).visit(Probe)
	}

	macro_rules! check_numeric {
		($($t:ty => $kind:expr),* $(,)?) => {$(
			for v in [<$t>::MIN, <$t>::MAX, 42 as $t] {
				assert_eq!(visit(&v), ($kind, v.to_string()), "{}", stringify!($t));
			}
		)*};
	}

	#[test]
	fn promotions() {
		check_numeric!(
			i8 => "i32", i16 => "i32", i32 => "i32", i64 => "i64", i128 => "i128",
			u8 => "u32", u16 => "u32", u32 => "u32", u64 => "u64", u128 => "u128",
		);
		#[cfg(target_pointer_width = "64")]
		check_numeric!(isize => "i64", usize => "u64");
		#[cfg(target_pointer_width = "32")]
		check_numeric!(isize => "i32", usize => "u32");
	}

	#[test]
	fn floats() {
		for v in [f32::MIN, f32::MAX, 4.2f32] {
			assert_eq!(visit(&v), ("f32", v.to_string()));
		}
		for v in [f64::MIN, f64::MAX, 4.2f64] {
			assert_eq!(visit(&v), ("f64", v.to_string()));
		}
	}

	#[test]
	fn bool_and_char() {
		assert_eq!(visit(&true), ("bool", "true".to_owned()));
		assert_eq!(visit(&false), ("bool", "false".to_owned()));
		assert_eq!(visit(&'a'), ("char", "a".to_owned()));
	}

	#[test]
	fn strings() {
		let s = String::from("test");
		assert_eq!(visit(&s), ("str", "test".to_owned()));
		assert_eq!(visit(&"test"), ("str", "test".to_owned()));
		let c = std::ffi::CString::new("test").unwrap();
		assert_eq!(visit(&c.as_c_str()), ("cstr", "test".to_owned()));
		assert_eq!(visit(&c), ("cstr", "test".to_owned()));
	}

	#[test]
	fn pointers() {
		let p: *mut () = std::ptr::null_mut();
		let cp: *const () = std::ptr::null();
		assert_eq!(visit(&p), visit(&cp));
		assert_eq!(visit(&cp).0, "pointer");
		// anything else has to be cast on purpose
		let x = 5u64;
		let typed: *const u64 = &x;
		assert_eq!(visit(&typed.cast::<()>()).0, "pointer");
		assert_eq!(visit(&crate::ptr(typed)).0, "pointer");
	}

	#[test]
	fn none() {
		assert_eq!(Arg::default().visit(Probe).0, "none");
		assert!(Arg::default().is_none());
		assert_eq!(Arg::default().kind(), Kind::None);
	}

	struct Test;
	impl Format for Test {
		type Spec<'t> = ();
		fn format(&self, _: &(), ctx: &mut Context<'_, '_>) -> Result<()> {
			ctx.write_str("test")
		}
	}

	// visitors get the handle, and the handle renders through the custom impl
	// formats itself again, through the handle it finds among the arguments
	struct Nested(u32);
	impl FormatMut for Nested {
		type Spec<'t> = ();
		fn format(&mut self, _: &(), ctx: &mut Context<'_, '_>) -> Result<()> {
			self.0 += 1;
			match ctx.arg(0)? {
				Arg::Custom(h) => h.format(&mut ParseContext::new("}"), ctx),
				_ => Ok(()),
			}
		}
	}

	fn format_first(args: FormatArgs<'_>) -> Result<()> {
		let mut buf = MemoryBuffer::new();
		let mut ctx = Context::new(&mut buf, args);
		match ctx.arg(0)? {
			Arg::Custom(h) => h.format(&mut ParseContext::new("}"), &mut ctx),
			_ => Ok(()),
		}
	}

	#[test]
	fn mut_reentry() {
		let mut n = Nested(0);
		let slot = MutArg::new(&mut n);
		let entries = [ArgEntry::positional(slot.arg())];
		let res = format_first(FormatArgs::new(&entries));
		assert!(matches!(res, Err(Error::Format("argument is already being formatted"))));
		// the slot is free again once the outer call is over
		let res = format_first(FormatArgs::new(&entries));
		assert!(matches!(res, Err(Error::Format("argument is already being formatted"))));
		assert_eq!(n.0, 2);
	}

	#[test]
	fn custom() {
		struct CheckCustom;
		impl<'a> Visitor<'a> for CheckCustom {
			type Output = String;
			fn visit_none(self) -> String { panic!("unexpected") }
			fn visit_bool(self, _: bool) -> String { panic!("unexpected") }
			fn visit_char(self, _: char) -> String { panic!("unexpected") }
			fn visit_i32(self, _: i32) -> String { panic!("unexpected") }
			fn visit_u32(self, _: u32) -> String { panic!("unexpected") }
			fn visit_i64(self, _: i64) -> String { panic!("unexpected") }
			fn visit_u64(self, _: u64) -> String { panic!("unexpected") }
			fn visit_i128(self, _: i128) -> String { panic!("unexpected") }
			fn visit_u128(self, _: u128) -> String { panic!("unexpected") }
			fn visit_f32(self, _: f32) -> String { panic!("unexpected") }
			fn visit_f64(self, _: f64) -> String { panic!("unexpected") }
			fn visit_cstr(self, _: &'a CStr) -> String { panic!("unexpected") }
			fn visit_str(self, _: &'a str) -> String { panic!("unexpected") }
			fn visit_pointer(self, _: *const ()) -> String { panic!("unexpected") }
			fn visit_custom(self, h: Handle<'a>) -> String {
				let mut data = [0u8; 10];
				let mut buf = FixedBuffer::new(&mut data[..]);
				let mut parse_ctx = ParseContext::new("");
				let mut ctx = Context::new(&mut buf, FormatArgs::default());
				h.format(&mut parse_ctx, &mut ctx).unwrap();
				String::from_utf8(buf.as_slice().to_vec()).unwrap()
			}
		}
		assert_eq!(Arg::new(&Test).visit(CheckCustom), "test");
	}

	#[test]
	fn format_args() {
		let args = FormatArgs::default();
		assert!(args.get(1).is_none());

		let entries = [
			ArgEntry::positional(Arg::new(&42)),
			ArgEntry::named("x", Arg::new(&"ex")),
		];
		let args = FormatArgs::new(&entries);
		assert_eq!(args.len(), 2);
		assert_eq!(args.get(0).kind(), Kind::Int);
		assert_eq!(args.get(1).kind(), Kind::Str);
		assert!(args.get(2).is_none());
		assert_eq!(args.find("x"), Some(1));
		assert_eq!(args.get_by_name("x").kind(), Kind::Str);
		assert!(args.get_by_name("y").is_none());
		assert_eq!(args.kinds().collect::<Vec<_>>(), vec![Kind::Int, Kind::Str]);
	}
}
