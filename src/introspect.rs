//! Shape classification of values to be converted.
//!
//! Every value taking part in a conversion implements [`Introspect`], which
//! reports its [`Shape`] once: null, scalar, one of the link-bearing
//! wrapper shapes, sequence, map, or record. The builder dispatches on that
//! shape and never inspects concrete types.

use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::Display;
use std::ops::Deref;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::AccessError;
use crate::link::Link;
use crate::types::json_type_name;

/// A value reachable from the graph being converted.
///
/// Accessors may hand out a borrow of data they own or a value computed
/// on demand.
pub enum ObjectRef<'a> {
    Borrowed(&'a dyn Introspect),
    Owned(Box<dyn Introspect + 'a>),
}

impl<'a> ObjectRef<'a> {
    pub fn owned(value: impl Introspect + 'a) -> Self {
        ObjectRef::Owned(Box::new(value))
    }
}

impl<'a> Deref for ObjectRef<'a> {
    type Target = dyn Introspect + 'a;

    fn deref(&self) -> &Self::Target {
        match self {
            ObjectRef::Borrowed(value) => *value,
            ObjectRef::Owned(value) => value.as_ref(),
        }
    }
}

impl<'a, T: Introspect> From<&'a T> for ObjectRef<'a> {
    fn from(value: &'a T) -> Self {
        ObjectRef::Borrowed(value)
    }
}

/// Result of classifying a value.
pub enum Shape<'a> {
    /// Absent value; converts to nothing.
    Null,
    /// Single-value type, already stringified.
    Scalar(String),
    /// Links plus one wrapped content value.
    Resource(&'a dyn ContentBearer),
    /// Links plus a collection of wrapped items.
    Resources(&'a dyn MultiContentBearer),
    /// Links plus the value's own properties.
    LinkBearing(&'a dyn LinkBearer, &'a dyn Record),
    /// Ordered or unordered collection that is not a map.
    Sequence(Vec<ObjectRef<'a>>),
    /// Key/value entries with stringified keys.
    Map(Vec<(String, ObjectRef<'a>)>),
    /// Opaque record introspected property by property.
    Record(&'a dyn Record),
    /// Transparent stand-in, converted exactly as the value it yields.
    Proxy(ObjectRef<'a>),
}

impl Shape<'_> {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Null => "null",
            Shape::Scalar(_) => "scalar",
            Shape::Resource(_) => "resource",
            Shape::Resources(_) => "resources",
            Shape::LinkBearing(..) => "link-bearing",
            Shape::Sequence(_) => "sequence",
            Shape::Map(_) => "map",
            Shape::Record(_) => "record",
            Shape::Proxy(_) => "proxy",
        }
    }
}

/// A value that can be converted into UBER nodes.
pub trait Introspect {
    /// Classify this value.
    fn shape(&self) -> Result<Shape<'_>, AccessError>;

    /// Name used in error messages.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Identity used to detect cycles. Pointer types report their pointee.
    fn identity(&self) -> usize {
        (self as *const Self).cast::<()>() as usize
    }
}

/// Exposes outbound links.
pub trait LinkBearer {
    fn links(&self) -> Result<Vec<Link>, AccessError>;
}

/// Link bearer wrapping a single content value.
pub trait ContentBearer: LinkBearer {
    fn content(&self) -> Result<ObjectRef<'_>, AccessError>;
}

/// Link bearer wrapping a collection of items.
pub trait MultiContentBearer: LinkBearer {
    fn contents(&self) -> Result<Vec<ObjectRef<'_>>, AccessError>;
}

/// Readable named properties of an opaque value.
pub trait Record {
    fn property_names(&self) -> Vec<&str>;

    /// Read one property. Fails if the name is unknown or the accessor fails.
    fn read_property(&self, name: &str) -> Result<ObjectRef<'_>, AccessError>;
}

fn scalar<T: Display + ?Sized>(value: &T) -> Result<Shape<'_>, AccessError> {
    Ok(Shape::Scalar(value.to_string()))
}

macro_rules! scalar_types {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Introspect for $ty {
                fn shape(&self) -> Result<Shape<'_>, AccessError> {
                    scalar(self)
                }
            }
        )*
    };
}

scalar_types!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
    String, str,
);

#[cfg(feature = "chrono")]
mod dates {
    use super::*;

    scalar_types!(chrono::NaiveDate, chrono::NaiveTime);

    // Display separates date and time with a space; ISO-8601 wants `T`.
    impl Introspect for chrono::NaiveDateTime {
        fn shape(&self) -> Result<Shape<'_>, AccessError> {
            Ok(Shape::Scalar(self.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
        }
    }

    impl<Tz: chrono::TimeZone> Introspect for chrono::DateTime<Tz>
    where
        Tz::Offset: std::fmt::Display,
    {
        fn shape(&self) -> Result<Shape<'_>, AccessError> {
            Ok(Shape::Scalar(self.to_rfc3339()))
        }
    }
}

impl Introspect for () {
    fn shape(&self) -> Result<Shape<'_>, AccessError> {
        Ok(Shape::Null)
    }
}

impl<T: Introspect> Introspect for Option<T> {
    fn shape(&self) -> Result<Shape<'_>, AccessError> {
        match self {
            Some(value) => value.shape(),
            None => Ok(Shape::Null),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Some(value) => value.type_name(),
            None => std::any::type_name::<Self>(),
        }
    }

    fn identity(&self) -> usize {
        match self {
            Some(value) => value.identity(),
            None => (self as *const Self).cast::<()>() as usize,
        }
    }
}

macro_rules! pointer_types {
    ($($ptr:ident),*) => {
        $(
            impl<T: Introspect + ?Sized> Introspect for $ptr<T> {
                fn shape(&self) -> Result<Shape<'_>, AccessError> {
                    (**self).shape()
                }

                fn type_name(&self) -> &'static str {
                    (**self).type_name()
                }

                fn identity(&self) -> usize {
                    (**self).identity()
                }
            }
        )*
    };
}

pointer_types!(Box, Rc, Arc);

impl<T: Introspect + ?Sized> Introspect for &T {
    fn shape(&self) -> Result<Shape<'_>, AccessError> {
        (**self).shape()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn identity(&self) -> usize {
        (**self).identity()
    }
}

/// Shared borrow of a `RefCell`'s content, kept alive while it is converted.
struct CellBorrow<'a, T: ?Sized>(Ref<'a, T>);

impl<T: Introspect + ?Sized> Introspect for CellBorrow<'_, T> {
    fn shape(&self) -> Result<Shape<'_>, AccessError> {
        self.0.shape()
    }

    fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    fn identity(&self) -> usize {
        self.0.identity()
    }
}

impl<T: Introspect + ?Sized> Introspect for RefCell<T> {
    fn shape(&self) -> Result<Shape<'_>, AccessError> {
        let borrowed = self
            .try_borrow()
            .map_err(|e| AccessError::with_source("value is mutably borrowed", e))?;
        Ok(Shape::Proxy(ObjectRef::owned(CellBorrow(borrowed))))
    }
}

fn items<'a, T: Introspect + 'a>(values: impl Iterator<Item = &'a T>) -> Shape<'a> {
    Shape::Sequence(values.map(|value| ObjectRef::Borrowed(value)).collect())
}

impl<T: Introspect> Introspect for [T] {
    fn shape(&self) -> Result<Shape<'_>, AccessError> {
        Ok(items(self.iter()))
    }
}

impl<T: Introspect, const N: usize> Introspect for [T; N] {
    fn shape(&self) -> Result<Shape<'_>, AccessError> {
        Ok(items(self.iter()))
    }
}

impl<T: Introspect> Introspect for Vec<T> {
    fn shape(&self) -> Result<Shape<'_>, AccessError> {
        Ok(items(self.iter()))
    }
}

impl<T: Introspect> Introspect for VecDeque<T> {
    fn shape(&self) -> Result<Shape<'_>, AccessError> {
        Ok(items(self.iter()))
    }
}

impl<T: Introspect> Introspect for BTreeSet<T> {
    fn shape(&self) -> Result<Shape<'_>, AccessError> {
        Ok(items(self.iter()))
    }
}

impl<T: Introspect, S> Introspect for HashSet<T, S> {
    fn shape(&self) -> Result<Shape<'_>, AccessError> {
        Ok(items(self.iter()))
    }
}

fn entries<'a, K: Display + 'a, V: Introspect + 'a>(
    pairs: impl Iterator<Item = (&'a K, &'a V)>,
) -> Shape<'a> {
    Shape::Map(
        pairs
            .map(|(key, value)| (key.to_string(), ObjectRef::Borrowed(value)))
            .collect(),
    )
}

impl<K: Display, V: Introspect> Introspect for BTreeMap<K, V> {
    fn shape(&self) -> Result<Shape<'_>, AccessError> {
        Ok(entries(self.iter()))
    }
}

impl<K: Display, V: Introspect, S> Introspect for HashMap<K, V, S> {
    fn shape(&self) -> Result<Shape<'_>, AccessError> {
        Ok(entries(self.iter()))
    }
}

impl<K: Display, V: Introspect, S> Introspect for IndexMap<K, V, S> {
    fn shape(&self) -> Result<Shape<'_>, AccessError> {
        Ok(entries(self.iter()))
    }
}

impl Introspect for Value {
    fn shape(&self) -> Result<Shape<'_>, AccessError> {
        match self {
            Value::Null => Ok(Shape::Null),
            Value::Bool(b) => scalar(b),
            Value::Number(n) => scalar(n),
            Value::String(s) => scalar(s),
            Value::Array(arr) => Ok(items(arr.iter())),
            Value::Object(map) => Ok(entries(map.iter())),
        }
    }

    fn type_name(&self) -> &'static str {
        json_type_name(self)
    }
}
