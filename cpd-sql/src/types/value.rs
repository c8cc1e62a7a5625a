use super::Null;

use chrono::prelude::*;
use std::fmt;

//borrowed from rusqlite's Value type
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// The value is a `NULL` value.
    Null,
    /// The value is a signed integer.
    Integer(i64),
    /// The value is a floating point number.
    Real(f64),
    /// The value is a text string.
    Text(String),
    /// The value is a blob of data
    Blob(Vec<u8>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        *self == Value::Null
    }

    /// The text a `%s` placeholder or a quoted clause value is built from,
    /// before escaping. `NULL` renders as the empty string.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Integer(i) => i.to_string(),
            Value::Real(f) => f.to_string(),
            Value::Text(s) => s.to_string(),
            Value::Blob(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }

    /// Integer coercion for `%d` and `id` clauses.
    ///
    /// Text is read up to the first character that can not continue a
    /// decimal integer (`"42 apples"` is 42, `"apples"` is 0); reals are
    /// truncated toward zero and saturate at the bounds of `i64`.
    pub fn to_integer(&self) -> i64 {
        match self {
            Value::Null => 0,
            Value::Integer(i) => *i,
            Value::Real(f) if f.is_nan() => 0,
            Value::Real(f) => f.trunc() as i64,
            Value::Text(s) => leading_integer(s),
            Value::Blob(b) => leading_integer(&String::from_utf8_lossy(b)),
        }
    }

    /// Float coercion for `%f`. Text is read for the longest leading decimal
    /// number, with an optional fraction and exponent.
    pub fn to_real(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Integer(i) => *i as f64,
            Value::Real(f) => *f,
            Value::Text(s) => leading_real(s),
            Value::Blob(b) => leading_real(&String::from_utf8_lossy(b)),
        }
    }

    /// `false` for `NULL`, zero, the empty string and `"0"`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Integer(i) => *i != 0,
            Value::Real(f) => *f != 0.0,
            Value::Text(s) => !(s.is_empty() || s == "0"),
            Value::Blob(b) => !(b.is_empty() || b.as_slice() == b"0"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            _ => write!(f, "{}", self.to_text()),
        }
    }
}

fn leading_integer(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first().copied() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut n: i64 = 0;

    for d in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(d - b'0');

        n = match n.checked_mul(10).and_then(|n| {
            if negative {
                n.checked_sub(d)
            }
            else {
                n.checked_add(d)
            }
        }) {
            Some(n) => n,
            None if negative => return i64::min_value(),
            None => return i64::max_value(),
        };
    }

    n
}

fn leading_real(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if let Some(b'-') | Some(b'+') = bytes.first().copied() {
        end = 1;
    }

    let int_digits = bytes[end..].iter().take_while(|b| b.is_ascii_digit()).count();
    end += int_digits;

    let mut frac_digits = 0;

    if bytes.get(end) == Some(&b'.') {
        frac_digits = bytes[end + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();

        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits + frac_digits == 0 {
        return 0.0;
    }

    if let Some(b'e') | Some(b'E') = bytes.get(end).copied() {
        let mut exp_end = end + 1;

        if let Some(b'-') | Some(b'+') = bytes.get(exp_end).copied() {
            exp_end += 1;
        }

        let exp_digits = bytes[exp_end..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();

        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}

/// Anything that can be handed to a query as data.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for Null {
    fn to_value(&self) -> Value {
        Value::Null
    }
}

impl<'a, T: ToValue + ?Sized> ToValue for &'a T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Integer(*self as i64)
    }
}

impl ToValue for isize {
    fn to_value(&self) -> Value {
        Value::Integer(*self as i64)
    }
}

macro_rules! from_i64(
    ($t:ty) => (
        impl ToValue for $t {
            fn to_value(&self) -> Value {
                Value::Integer(i64::from(*self))
            }
        }
    )
);

from_i64!(i8);
from_i64!(i16);
from_i64!(i32);
from_i64!(i64);
from_i64!(u8);
from_i64!(u16);
from_i64!(u32);

// values past i64::MAX keep their digits as text
macro_rules! from_wide_unsigned(
    ($t:ty) => (
        impl ToValue for $t {
            fn to_value(&self) -> Value {
                if *self as u64 <= i64::max_value() as u64 {
                    Value::Integer(*self as i64)
                }
                else {
                    Value::Text(self.to_string())
                }
            }
        }
    )
);

from_wide_unsigned!(u64);
from_wide_unsigned!(usize);

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Real(f64::from(*self))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Real(*self)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl<Tz: TimeZone> ToValue for DateTime<Tz>
where
    Tz::Offset: fmt::Display,
{
    fn to_value(&self) -> Value {
        Value::Text(self.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

impl ToValue for NaiveDateTime {
    fn to_value(&self) -> Value {
        Value::Text(self.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

impl ToValue for NaiveDate {
    fn to_value(&self) -> Value {
        Value::Text(self.format("%Y-%m-%d").to_string())
    }
}

#[cfg(feature = "composer-serde")]
impl From<Value> for serde_value::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_value::Value::Unit,
            Value::Integer(i) => serde_value::Value::I64(i),
            Value::Real(f) => serde_value::Value::F64(f),
            Value::Text(s) => serde_value::Value::String(s),
            Value::Blob(b) => match String::from_utf8(b) {
                Ok(s) => serde_value::Value::String(s),
                Err(e) => serde_value::Value::Bytes(e.into_bytes()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ToValue, Value};
    use crate::types::Null;

    use chrono::NaiveDate;

    #[test]
    fn test_integer_coercion() {
        assert_eq!(Value::Text("42 apples".into()).to_integer(), 42);
        assert_eq!(Value::Text("  -7".into()).to_integer(), -7);
        assert_eq!(Value::Text("apples".into()).to_integer(), 0);
        assert_eq!(Value::Text("1 OR 1=1".into()).to_integer(), 1);
        assert_eq!(Value::Real(-3.9).to_integer(), -3);
        assert_eq!(Value::Null.to_integer(), 0);
        assert_eq!(
            Value::Text("99999999999999999999".into()).to_integer(),
            i64::max_value()
        );
    }

    #[test]
    fn test_real_coercion() {
        assert_eq!(Value::Text("2.5kg".into()).to_real(), 2.5);
        assert_eq!(Value::Text(".5".into()).to_real(), 0.5);
        assert_eq!(Value::Text("1e3x".into()).to_real(), 1000.0);
        assert_eq!(Value::Text("7e".into()).to_real(), 7.0);
        assert_eq!(Value::Text("-.".into()).to_real(), 0.0);
        assert_eq!(Value::Integer(3).to_real(), 3.0);
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Text("0".into()).is_truthy());
        assert!(!Value::Text("".into()).is_truthy());
        assert!(!Value::Integer(0).is_truthy());
        assert!(Value::Text("0.0".into()).is_truthy());
        assert!(Value::Integer(12).is_truthy());
    }

    #[test]
    fn test_to_value() {
        let name = "Steven".to_string();
        let missing: Option<i32> = None;

        assert_eq!(name.to_value(), Value::Text("Steven".into()));
        assert_eq!((&&"x").to_value(), Value::Text("x".into()));
        assert_eq!(missing.to_value(), Value::Null);
        assert_eq!(Some(5u8).to_value(), Value::Integer(5));
        assert_eq!(true.to_value(), Value::Integer(1));
        assert_eq!(Null().to_value(), Value::Null);
        assert_eq!(u64::max_value().to_value(), Value::Text("18446744073709551615".into()));
        assert_eq!(
            NaiveDate::from_ymd(2010, 3, 4).and_hms(5, 6, 7).to_value(),
            Value::Text("2010-03-04 05:06:07".into())
        );
    }
}
