/*!
Formatting macros.

Arguments are captured by reference (`&expr`, or a [`MutArg`](crate::MutArg) over `&mut expr` when written as `mut expr`),
evaluated exactly once, and erased into [`Arg`](crate::Arg)s.
With a string literal as the template, the macro also generates a monomorphization-time check
of the template against the kinds of the arguments, so that a bad template fails the build.
*/

/**
Formats into a [`Sink`](crate::Sink).

```
use buf_fmt::{format_to, runtime, back_inserter};

let mut v = Vec::new();
format_to!(back_inserter(&mut v), "{:04x}|{name:>3}", 0xbeef_u32 & 0xff, name = 'z').unwrap();
assert_eq!(v, b"00ef|  z");

// templates made at run time are only checked as they get formatted
let t = String::from("{:q}");
let mut data = [0u8; 8];
assert!(format_to!(&mut data, runtime(&t), 42).is_err());
```

A template that does not fit its arguments does not compile:

```compile_fail
let mut data = [0u8; 8];
buf_fmt::format_to!(&mut data, "{:d}", "not a number");
```
*/
#[macro_export]
macro_rules! format_to {
	($sink:expr, $template:literal $(, $($args:tt)*)?) => {
		$crate::__format_args!(@start [to ($sink) checked ($template)] $($($args)*)?)
	};
	($sink:expr, $template:expr $(, $($args:tt)*)?) => {
		$crate::__format_args!(@start [to ($sink) unchecked ($template)] $($($args)*)?)
	};
}

/// Formats into a new `String`, checking literal templates like [`format_to!`] does.
#[macro_export]
macro_rules! format {
	($template:literal $(, $($args:tt)*)?) => {
		$crate::__format_args!(@start [string checked ($template)] $($($args)*)?)
	};
	($template:expr $(, $($args:tt)*)?) => {
		$crate::__format_args!(@start [string unchecked ($template)] $($($args)*)?)
	};
}

/**
Whether a type can be passed to the formatting macros as it is:
`T` as a plain argument, or `&mut U` as a `mut` argument.

```
use buf_fmt::is_formattable;

assert!(is_formattable!(i32));
assert!(is_formattable!(&str));
assert!(!is_formattable!(Vec<u8>));
```
*/
#[macro_export]
macro_rules! is_formattable {
	(&mut $t:ty) => {{
		#[allow(unused_imports)]
		use $crate::__private::NotFormattable as _;
		$crate::__private::Probe::<&mut $t>::IS_FORMATTABLE || $crate::__private::ProbeMut::<$t>::IS_FORMATTABLE
	}};
	($t:ty) => {{
		#[allow(unused_imports)]
		use $crate::__private::NotFormattable as _;
		$crate::__private::Probe::<$t>::IS_FORMATTABLE
	}};
}

/*
Argument muncher.

@pos/@named [what to do] [captured so far] [unused idents] remaining tokens...
Each captured argument is `(ident mode [name] expr)`, with mode `ref` or `mut`.
The idents name the captured arguments; there are as many of them as arguments allowed.
Named arguments have to come last, like their names in the static check.
*/
#[doc(hidden)]
#[macro_export]
macro_rules! __format_args {
	(@capture ref $e:expr) => { &$e };
	(@capture mut $e:expr) => { $crate::MutArg::new(&mut $e) };

	(@entry ref [] $b:ident) => { $crate::ArgEntry::positional($crate::Format::to_arg($b)) };
	(@entry mut [] $b:ident) => { $crate::ArgEntry::positional($crate::MutArg::arg(&$b)) };
	(@entry ref [$name:ident] $b:ident) => {
		$crate::ArgEntry::named(::core::stringify!($name), $crate::Format::to_arg($b))
	};
	(@entry mut [$name:ident] $b:ident) => {
		$crate::ArgEntry::named(::core::stringify!($name), $crate::MutArg::arg(&$b))
	};

	(@check [$what:ident $(($($sink:tt)*))? checked ($template:literal)] [$(($bind:ident $mode:ident [$($name:ident)?]))*]) => {{
		struct __Template;
		impl $crate::__private::Literal for __Template {
			const STR: &'static str = $template;
			const NAMES: &'static [&'static str] = &[$($(::core::stringify!($name),)?)*];
		}
		$crate::__private::check::<__Template, _>(($($crate::__private::marker(&$bind),)*));
	}};
	(@check [$what:ident $(($($sink:tt)*))? unchecked ($($template:tt)*)] [$($captured:tt)*]) => {};

	(@call [to ($($sink:tt)*) $check:ident ($($template:tt)*)] $args:ident) => {
		$crate::format_to($($sink)*, $($template)*, &$args)
	};
	(@call [string $check:ident ($($template:tt)*)] $args:ident) => {
		$crate::format($($template)*, &$args)
	};

	(@start [$($what:tt)*] $($rest:tt)*) => {
		$crate::__format_args!(@pos [$($what)*] [] [
			__a0 __a1 __a2 __a3 __a4 __a5 __a6 __a7 __a8 __a9 __a10 __a11 __a12 __a13 __a14 __a15
			__a16 __a17 __a18 __a19 __a20 __a21 __a22 __a23 __a24 __a25 __a26 __a27 __a28 __a29 __a30 __a31
		] $($rest)*)
	};

	// named: `name = mut expr`, `name = expr`
	(@$state:ident [$($what:tt)*] [$($done:tt)*] [$id:ident $($ids:ident)*] $name:ident = mut $e:expr $(, $($rest:tt)*)?) => {
		$crate::__format_args!(@named [$($what)*] [$($done)* ($id mut [$name] $e)] [$($ids)*] $($($rest)*)?)
	};
	(@$state:ident [$($what:tt)*] [$($done:tt)*] [$id:ident $($ids:ident)*] $name:ident = $e:expr $(, $($rest:tt)*)?) => {
		$crate::__format_args!(@named [$($what)*] [$($done)* ($id ref [$name] $e)] [$($ids)*] $($($rest)*)?)
	};
	// positional ones, unless a named one came first
	(@named [$($what:tt)*] [$($done:tt)*] [$($ids:ident)*] $($rest:tt)+) => {
		::core::compile_error!("positional arguments cannot follow named arguments")
	};
	(@pos [$($what:tt)*] [$($done:tt)*] [$id:ident $($ids:ident)*] mut $e:expr $(, $($rest:tt)*)?) => {
		$crate::__format_args!(@pos [$($what)*] [$($done)* ($id mut [] $e)] [$($ids)*] $($($rest)*)?)
	};
	(@pos [$($what:tt)*] [$($done:tt)*] [$id:ident $($ids:ident)*] $e:expr $(, $($rest:tt)*)?) => {
		$crate::__format_args!(@pos [$($what)*] [$($done)* ($id ref [] $e)] [$($ids)*] $($($rest)*)?)
	};
	(@$state:ident [$($what:tt)*] [$($done:tt)*] [] $($rest:tt)+) => {
		::core::compile_error!("too many formatting arguments")
	};

	// all arguments captured
	(@$state:ident [$($what:tt)*] [$(($bind:ident $mode:ident [$($name:ident)?] $e:expr))*] [$($ids:ident)*]) => {
		match ($($crate::__format_args!(@capture $mode $e),)*) {
			($($bind,)*) => {
				$crate::__format_args!(@check [$($what)*] [$(($bind $mode [$($name)?]))*]);
				let __entries = [$($crate::__format_args!(@entry $mode [$($name)?] $bind),)*];
				let __args = $crate::FormatArgs::new(&__entries);
				$crate::__format_args!(@call [$($what)*] __args)
			}
		}
	};
}

#[doc(hidden)]
pub mod __private {
	use crate::parse::check_format;
	use crate::{ArgKind, Format, FormatMut, Kind};
	use std::marker::PhantomData;

	/// Template literal handed to the static check
	pub trait Literal {
		const STR: &'static str;
		/// Names of the trailing named arguments
		const NAMES: &'static [&'static str];
	}

	/// Kinds of all arguments, in order
	pub trait KindList {
		const KINDS: &'static [Kind];
	}

	pub fn marker<T: ArgKind>(_: &T) -> PhantomData<T> {
		PhantomData
	}

	macro_rules! kind_list {
		($($t:ident)*) => {
			impl<$($t: ArgKind),*> KindList for ($(PhantomData<$t>,)*) {
				const KINDS: &'static [Kind] = &[$($t::KIND),*];
			}
		};
	}

	kind_list!();
	kind_list!(A0);
	kind_list!(A0 A1);
	kind_list!(A0 A1 A2);
	kind_list!(A0 A1 A2 A3);
	kind_list!(A0 A1 A2 A3 A4);
	kind_list!(A0 A1 A2 A3 A4 A5);
	kind_list!(A0 A1 A2 A3 A4 A5 A6);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12 A13);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12 A13 A14);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12 A13 A14 A15);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12 A13 A14 A15 A16);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12 A13 A14 A15 A16 A17);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12 A13 A14 A15 A16 A17 A18);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12 A13 A14 A15 A16 A17 A18 A19);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12 A13 A14 A15 A16 A17 A18 A19 A20);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12 A13 A14 A15 A16 A17 A18 A19 A20 A21);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12 A13 A14 A15 A16 A17 A18 A19 A20 A21 A22);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12 A13 A14 A15 A16 A17 A18 A19 A20 A21 A22 A23);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12 A13 A14 A15 A16 A17 A18 A19 A20 A21 A22 A23 A24);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12 A13 A14 A15 A16 A17 A18 A19 A20 A21 A22 A23 A24 A25);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12 A13 A14 A15 A16 A17 A18 A19 A20 A21 A22 A23 A24 A25 A26);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12 A13 A14 A15 A16 A17 A18 A19 A20 A21 A22 A23 A24 A25 A26 A27);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12 A13 A14 A15 A16 A17 A18 A19 A20 A21 A22 A23 A24 A25 A26 A27 A28);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12 A13 A14 A15 A16 A17 A18 A19 A20 A21 A22 A23 A24 A25 A26 A27 A28 A29);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12 A13 A14 A15 A16 A17 A18 A19 A20 A21 A22 A23 A24 A25 A26 A27 A28 A29 A30);
	kind_list!(A0 A1 A2 A3 A4 A5 A6 A7 A8 A9 A10 A11 A12 A13 A14 A15 A16 A17 A18 A19 A20 A21 A22 A23 A24 A25 A26 A27 A28 A29 A30 A31);

	struct Validate<S, L>(PhantomData<(S, L)>);

	impl<S: Literal, L: KindList> Validate<S, L> {
		const OK: () = match check_format(S::STR, L::KINDS, S::NAMES) {
			Ok(()) => (),
			Err(e) => panic!("{}", e.msg),
		};
	}

	/// Fails the build, once instantiated, if the template does not fit the argument kinds
	#[inline(always)]
	pub fn check<S: Literal, L: KindList>(_: L) {
		#[allow(clippy::let_unit_value)]
		let () = Validate::<S, L>::OK;
	}

	// Compile-time formattability test, see `is_formattable!`.
	// Inherent consts shadow the trait's, but only where their bounds hold.
	pub struct Probe<T: ?Sized>(PhantomData<T>);
	pub struct ProbeMut<T: ?Sized>(PhantomData<T>);

	pub trait NotFormattable {
		const IS_FORMATTABLE: bool = false;
	}

	impl<T: ?Sized> NotFormattable for Probe<T> {}
	impl<T: ?Sized> NotFormattable for ProbeMut<T> {}

	impl<T: Format> Probe<T> {
		pub const IS_FORMATTABLE: bool = true;
	}

	impl<T: FormatMut> ProbeMut<T> {
		pub const IS_FORMATTABLE: bool = true;
	}
}
