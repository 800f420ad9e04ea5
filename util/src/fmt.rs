//! Utilities for writing [`std::fmt`] implementations.

use std::fmt::{Debug, Display, Formatter};

struct FmtClosure<T>(T);

impl<T> Debug for FmtClosure<T>
where
    T: Fn(&mut Formatter<'_>) -> std::fmt::Result,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0(f)
    }
}

impl<T> Display for FmtClosure<T>
where
    T: Fn(&mut Formatter<'_>) -> std::fmt::Result,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0(f)
    }
}

/// Turns a closure that writes to a [`Formatter`] into a type that implements [`Display`] and
/// [`Debug`] by calling that closure.
pub fn fmt_closure<T: Fn(&mut Formatter<'_>) -> std::fmt::Result>(
    closure: T,
) -> impl Display + Debug {
    FmtClosure(closure)
}

/// Formats a byte string as contiguous lowercase hex digits.
pub fn fmt_hex(bytes: &[u8]) -> impl Display + Debug + '_ {
    fmt_closure(move |f| {
        for byte in bytes {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    })
}

/// An amount of memory that is displayed with a binary unit suffix.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ByteAmount(pub usize);

impl Debug for ByteAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self, f)
    }
}

impl Display for ByteAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0 < 1000 {
            write!(f, "{}B", self.0)
        } else if self.0 < 1000 << 10 {
            write!(f, "{:.1}K", self.0 as f64 / (1u64 << 10) as f64)
        } else if self.0 < 1000 << 20 {
            write!(f, "{:.1}M", self.0 as f64 / (1u64 << 20) as f64)
        } else {
            write!(f, "{:.1}G", self.0 as f64 / (1u64 << 30) as f64)
        }
    }
}
