// Field values as seen by validators

use crate::Record;
use std::fmt;

/// Borrowed view of a single field value.
///
/// Validators never see concrete field types; the record model lowers every
/// field to one of these variants so a validator registered once can inspect
/// any record.
#[derive(Clone)]
pub enum FieldValue<'a> {
    /// Absent value (`None`)
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(&'a str),
    List(Vec<FieldValue<'a>>),
    /// A nested record
    Record(&'a dyn Record),
}

impl<'a> FieldValue<'a> {
    /// Whether the value counts as "not provided".
    ///
    /// `Null`, `false`, numeric zero, whitespace-only strings, empty lists and
    /// records whose fields are all empty are empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Bool(value) => !value,
            FieldValue::Int(value) => *value == 0,
            FieldValue::UInt(value) => *value == 0,
            FieldValue::Float(value) => *value == 0.0,
            FieldValue::Str(value) => value.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Record(record) => record.fields().iter().all(|f| f.value.is_empty()),
        }
    }

    /// Short name of the value kind, used in error text.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int",
            FieldValue::UInt(_) => "uint",
            FieldValue::Float(_) => "float",
            FieldValue::Str(_) => "string",
            FieldValue::List(_) => "list",
            FieldValue::Record(_) => "record",
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            FieldValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&'a dyn Record> {
        match self {
            FieldValue::Record(record) => Some(*record),
            _ => None,
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self, FieldValue::Record(_))
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(value) => write!(f, "{}", value),
            FieldValue::Int(value) => write!(f, "{}", value),
            FieldValue::UInt(value) => write!(f, "{}", value),
            FieldValue::Float(value) => write!(f, "{}", value),
            FieldValue::Str(value) => f.write_str(value),
            FieldValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            FieldValue::Record(record) => write!(f, "{{{}}}", record.type_name()),
        }
    }
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("Null"),
            FieldValue::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            FieldValue::Int(value) => f.debug_tuple("Int").field(value).finish(),
            FieldValue::UInt(value) => f.debug_tuple("UInt").field(value).finish(),
            FieldValue::Float(value) => f.debug_tuple("Float").field(value).finish(),
            FieldValue::Str(value) => f.debug_tuple("Str").field(value).finish(),
            FieldValue::List(items) => f.debug_tuple("List").field(items).finish(),
            FieldValue::Record(record) => f.debug_tuple("Record").field(&record.type_name()).finish(),
        }
    }
}

impl PartialEq for FieldValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::Int(a), FieldValue::Int(b)) => a == b,
            (FieldValue::UInt(a), FieldValue::UInt(b)) => a == b,
            (FieldValue::Float(a), FieldValue::Float(b)) => a == b,
            (FieldValue::Str(a), FieldValue::Str(b)) => a == b,
            (FieldValue::List(a), FieldValue::List(b)) => a == b,
            (FieldValue::Record(a), FieldValue::Record(b)) => std::ptr::addr_eq(*a, *b),
            _ => false,
        }
    }
}

/// Conversion of a field into its [`FieldValue`] view.
///
/// Implemented for the primitive types, strings, `Option`, `Vec`, slices and
/// boxes. `#[derive(Record)]` implements it for the derived type so records
/// nest inside records.
pub trait AsFieldValue {
    fn as_field_value(&self) -> FieldValue<'_>;
}

impl AsFieldValue for str {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Str(self)
    }
}

impl AsFieldValue for String {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Str(self.as_str())
    }
}

impl AsFieldValue for bool {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Bool(*self)
    }
}

macro_rules! impl_as_field_value {
    ($variant:ident as $target:ty => $($ty:ty),+) => {
        $(
            impl AsFieldValue for $ty {
                fn as_field_value(&self) -> FieldValue<'_> {
                    FieldValue::$variant(*self as $target)
                }
            }
        )+
    };
}

impl_as_field_value!(Int as i64 => i8, i16, i32, i64, isize);
impl_as_field_value!(UInt as u64 => u8, u16, u32, u64, usize);
impl_as_field_value!(Float as f64 => f32, f64);

impl<T: AsFieldValue + ?Sized> AsFieldValue for &T {
    fn as_field_value(&self) -> FieldValue<'_> {
        (**self).as_field_value()
    }
}

impl<T: AsFieldValue + ?Sized> AsFieldValue for Box<T> {
    fn as_field_value(&self) -> FieldValue<'_> {
        (**self).as_field_value()
    }
}

impl<T: AsFieldValue> AsFieldValue for Option<T> {
    fn as_field_value(&self) -> FieldValue<'_> {
        match self {
            Some(value) => value.as_field_value(),
            None => FieldValue::Null,
        }
    }
}

impl<T: AsFieldValue> AsFieldValue for [T] {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::List(self.iter().map(AsFieldValue::as_field_value).collect())
    }
}

impl<T: AsFieldValue> AsFieldValue for Vec<T> {
    fn as_field_value(&self) -> FieldValue<'_> {
        self.as_slice().as_field_value()
    }
}
