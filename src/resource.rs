//! Link-bearing wrappers around content values.

use crate::error::AccessError;
use crate::introspect::{
    ContentBearer, Introspect, LinkBearer, MultiContentBearer, ObjectRef, Record, Shape,
};
use crate::link::Link;

/// A single content value together with its links.
///
/// Converts to the links followed by the content's own nodes, on the same
/// level.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource<T> {
    content: T,
    links: Vec<Link>,
}

impl<T> Resource<T> {
    pub fn new(content: T) -> Self {
        Self {
            content,
            links: Vec::new(),
        }
    }

    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    pub fn with_links(mut self, links: impl IntoIterator<Item = Link>) -> Self {
        self.links.extend(links);
        self
    }

    pub fn content(&self) -> &T {
        &self.content
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }
}

impl<T: Introspect> LinkBearer for Resource<T> {
    fn links(&self) -> Result<Vec<Link>, AccessError> {
        Ok(self.links.clone())
    }
}

impl<T: Introspect> ContentBearer for Resource<T> {
    fn content(&self) -> Result<ObjectRef<'_>, AccessError> {
        Ok(ObjectRef::Borrowed(&self.content))
    }
}

impl<T: Introspect> Introspect for Resource<T> {
    fn shape(&self) -> Result<Shape<'_>, AccessError> {
        Ok(Shape::Resource(self))
    }
}

/// A collection of items together with the collection's links.
#[derive(Debug, Clone, PartialEq)]
pub struct Resources<T> {
    items: Vec<T>,
    links: Vec<Link>,
}

impl<T> Resources<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
            links: Vec::new(),
        }
    }

    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    pub fn with_links(mut self, links: impl IntoIterator<Item = Link>) -> Self {
        self.links.extend(links);
        self
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T: Introspect> LinkBearer for Resources<T> {
    fn links(&self) -> Result<Vec<Link>, AccessError> {
        Ok(self.links.clone())
    }
}

impl<T: Introspect> MultiContentBearer for Resources<T> {
    fn contents(&self) -> Result<Vec<ObjectRef<'_>>, AccessError> {
        Ok(self.items.iter().map(ObjectRef::from).collect())
    }
}

impl<T: Introspect> Introspect for Resources<T> {
    fn shape(&self) -> Result<Shape<'_>, AccessError> {
        Ok(Shape::Resources(self))
    }
}

/// A record carrying its own links.
///
/// Its properties are introspected like a plain record's, except `id` and
/// `links`, which are already represented by the link nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedRecord<T> {
    record: T,
    links: Vec<Link>,
}

impl<T> LinkedRecord<T> {
    pub fn new(record: T) -> Self {
        Self {
            record,
            links: Vec::new(),
        }
    }

    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    pub fn record(&self) -> &T {
        &self.record
    }
}

impl<T: Record> LinkBearer for LinkedRecord<T> {
    fn links(&self) -> Result<Vec<Link>, AccessError> {
        Ok(self.links.clone())
    }
}

impl<T: Record> Introspect for LinkedRecord<T> {
    fn shape(&self) -> Result<Shape<'_>, AccessError> {
        Ok(Shape::LinkBearing(self, &self.record))
    }
}

/// Implement [`Record`] and [`Introspect`] for a struct by listing the fields
/// to expose, in order.
///
/// ```
/// use uber_hypermedia::impl_record;
///
/// struct Widget {
///     name: String,
///     qty: u32,
/// }
///
/// impl_record!(Widget { name, qty });
/// ```
#[macro_export]
macro_rules! impl_record {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::Record for $ty {
            fn property_names(&self) -> ::std::vec::Vec<&str> {
                ::std::vec![$(stringify!($field)),*]
            }

            fn read_property(
                &self,
                name: &str,
            ) -> ::std::result::Result<$crate::ObjectRef<'_>, $crate::AccessError> {
                match name {
                    $(stringify!($field) => ::std::result::Result::Ok(
                        $crate::ObjectRef::Borrowed(&self.$field),
                    ),)*
                    _ => ::std::result::Result::Err($crate::AccessError::unknown_property(name)),
                }
            }
        }

        impl $crate::Introspect for $ty {
            fn shape(&self) -> ::std::result::Result<$crate::Shape<'_>, $crate::AccessError> {
                ::std::result::Result::Ok($crate::Shape::Record(self))
            }
        }
    };
}
