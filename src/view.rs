use std::cmp::Ordering;
use std::fmt;

/**
Non-owning view over a run of UTF-8 code units.

Comparison is plain lexicographic byte comparison,
which is what `&[u8]` already does, so this is mostly a thin, `Copy` wrapper
that gives the engine one name for "some bytes borrowed from the caller".
*/
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StringView<'a> {
	data: &'a [u8],
}

impl<'a> StringView<'a> {
	pub const fn new(data: &'a [u8]) -> Self {
		StringView { data }
	}
	pub const fn from_str(s: &'a str) -> Self {
		StringView { data: s.as_bytes() }
	}
	pub const fn data(&self) -> &'a [u8] {
		self.data
	}
	pub const fn size(&self) -> usize {
		self.data.len()
	}
	pub const fn is_empty(&self) -> bool {
		self.data.is_empty()
	}
	/// Lexicographic three-way comparison, by byte.
	pub fn compare(&self, other: StringView<'_>) -> Ordering {
		self.data.cmp(other.data)
	}
	pub fn starts_with_unit(&self, unit: u8) -> bool {
		self.data.first() == Some(&unit)
	}
	pub fn starts_with(&self, prefix: StringView<'_>) -> bool {
		self.data.starts_with(prefix.data)
	}
	/// `None` if the viewed bytes are not valid UTF-8 (e.g. a bounded write cut a sequence in half).
	pub fn to_str(&self) -> Option<&'a str> {
		std::str::from_utf8(self.data).ok()
	}
}

impl PartialOrd for StringView<'_> {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}
impl Ord for StringView<'_> {
	fn cmp(&self, other: &Self) -> Ordering {
		self.compare(*other)
	}
}

impl<'a> From<&'a str> for StringView<'a> {
	fn from(s: &'a str) -> Self {
		StringView::from_str(s)
	}
}
impl<'a> From<&'a String> for StringView<'a> {
	fn from(s: &'a String) -> Self {
		StringView::from_str(s.as_str())
	}
}
impl<'a> From<&'a [u8]> for StringView<'a> {
	fn from(data: &'a [u8]) -> Self {
		StringView::new(data)
	}
}

impl PartialEq<str> for StringView<'_> {
	fn eq(&self, other: &str) -> bool {
		self.data == other.as_bytes()
	}
}
impl PartialEq<&str> for StringView<'_> {
	fn eq(&self, other: &&str) -> bool {
		self.data == other.as_bytes()
	}
}

impl fmt::Debug for StringView<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&String::from_utf8_lossy(self.data), f)
	}
}
