//! Tree building - converts a value graph into UBER nodes.
//!
//! Values are classified once via [`Introspect::shape`] and dispatched on
//! the resulting [`Shape`]. The order of the arms in [`Walker::dispatch`]
//! is the priority order of the conversion rules:
//!
//! 1. null: nothing is appended
//! 2. resource: links, then the content flattened into the same node
//! 3. resources: links, then one child node per item
//! 4. link-bearing record: links, then properties minus `id` and `links`
//! 5. sequence: one child node per element
//! 6. map: one named child node per entry
//! 7. record: one named child node per property
//!
//! Map entries and record properties holding a scalar become leaf nodes
//! with a `value`; a null there becomes the explicit null marker.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::error::{AccessError, BuildError};
use crate::introspect::{Introspect, LinkBearer, Record, Shape};
use crate::link::link_nodes;
use crate::node::{Node, NodeValue, UberDocument};
use crate::types::{BuildOptions, LINK_BEARER_FILTER, RECORD_FILTER};

/// Append the representation of `value` to `parent.data`.
///
/// # Errors
///
/// Returns `BuildError` if an accessor fails, a link carries a method with
/// no UBER action, or the graph is cyclic or too deep for `options`. The
/// parent may hold partial output after an error and should be discarded.
pub fn build(
    parent: &mut Node,
    value: &dyn Introspect,
    options: &BuildOptions,
) -> Result<(), BuildError> {
    Walker::new(options).visit(parent, value, &Location::root(), Slot::Item)
}

/// Convert a root value into a complete UBER document.
///
/// The root must be a resource, a collection or a map. Scalars, null and
/// bare records are rejected rather than introspected.
///
/// # Errors
///
/// Returns `BuildError::UnsupportedRootType` for unsupported roots, or any
/// error [`build`] reports.
pub fn to_uber_document(
    value: &dyn Introspect,
    options: &BuildOptions,
) -> Result<UberDocument, BuildError> {
    let location = Location::root();
    let shape = value
        .shape()
        .map_err(|source| access_failure(value, &location, source))?;
    debug!(root = value.type_name(), shape = shape.kind(), "building UBER document");

    let mut root = Node::new();
    match shape {
        Shape::Proxy(inner) => return to_uber_document(&*inner, options),
        Shape::Resource(_)
        | Shape::Resources(_)
        | Shape::LinkBearing(..)
        | Shape::Sequence(_)
        | Shape::Map(_) => {
            Walker::new(options).enter(&mut root, value, shape, &location, Slot::Item)?;
        }
        Shape::Null | Shape::Scalar(_) | Shape::Record(_) => {
            return Err(BuildError::UnsupportedRootType {
                type_name: value.type_name().to_string(),
            });
        }
    }

    // A resource wrapping a scalar leaves the scalar on the root node.
    if let Some(scalar) = root.value.take() {
        root.data.push(Node::new().with_value(scalar));
    }

    Ok(UberDocument::new(root.data))
}

/// Where in the value graph the walker currently is.
#[derive(Debug, Clone)]
struct Location {
    /// JSON-Pointer-like path of segments, `/` for the root.
    path: String,
    depth: usize,
}

impl Location {
    fn root() -> Self {
        Self {
            path: String::new(),
            depth: 0,
        }
    }

    /// Location of a child node named by `segment`.
    fn child(&self, segment: &str) -> Self {
        let escaped = segment.replace('~', "~0").replace('/', "~1");
        Self {
            path: format!("{}/{}", self.path, escaped),
            depth: self.depth + 1,
        }
    }

    /// Location of a value flattened into the current node.
    fn within(&self) -> Self {
        Self {
            path: self.path.clone(),
            depth: self.depth + 1,
        }
    }

    fn display(&self) -> String {
        if self.path.is_empty() {
            "/".to_string()
        } else {
            self.path.clone()
        }
    }
}

/// How a scalar or null value lands in the node it is converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Sequence element, resource content or root: null adds nothing.
    Item,
    /// Map entry or record property: null becomes the null marker.
    Entry,
}

struct Walker<'o> {
    options: &'o BuildOptions,
    /// Container values on the current path, by identity and type.
    active: HashSet<(usize, &'static str)>,
}

impl<'o> Walker<'o> {
    fn new(options: &'o BuildOptions) -> Self {
        Self {
            options,
            active: HashSet::new(),
        }
    }

    fn visit(
        &mut self,
        node: &mut Node,
        value: &dyn Introspect,
        location: &Location,
        slot: Slot,
    ) -> Result<(), BuildError> {
        let shape = value
            .shape()
            .map_err(|source| access_failure(value, location, source))?;

        match shape {
            Shape::Null => {
                if slot == Slot::Entry {
                    node.value = Some(NodeValue::Null);
                }
                Ok(())
            }
            Shape::Scalar(text) => {
                node.value = Some(NodeValue::Text(text));
                Ok(())
            }
            container => self.enter(node, value, container, location, slot),
        }
    }

    /// Guard against cycles and excessive depth around one container value.
    fn enter(
        &mut self,
        node: &mut Node,
        value: &dyn Introspect,
        shape: Shape<'_>,
        location: &Location,
        slot: Slot,
    ) -> Result<(), BuildError> {
        if let Some(max_depth) = self.options.max_depth {
            if location.depth > max_depth {
                return Err(BuildError::DepthExceeded {
                    max_depth,
                    path: location.display(),
                });
            }
        }

        let key = (value.identity(), value.type_name());
        if self.options.detect_cycles && !self.active.insert(key) {
            return Err(BuildError::CyclicGraph {
                type_name: value.type_name().to_string(),
                path: location.display(),
            });
        }

        trace!(path = %location.display(), shape = shape.kind(), "converting");
        let result = self.dispatch(node, value, shape, location, slot);

        if self.options.detect_cycles {
            self.active.remove(&key);
        }
        result
    }

    fn dispatch(
        &mut self,
        node: &mut Node,
        value: &dyn Introspect,
        shape: Shape<'_>,
        location: &Location,
        slot: Slot,
    ) -> Result<(), BuildError> {
        match shape {
            // 1
            Shape::Null => Ok(()),
            Shape::Scalar(text) => {
                node.value = Some(NodeValue::Text(text));
                Ok(())
            }
            // 2
            Shape::Resource(resource) => {
                self.append_links(node, value, resource, location)?;
                let content = resource
                    .content()
                    .map_err(|source| access_failure(value, location, source))?;
                self.visit(node, &*content, &location.within(), Slot::Item)
            }
            // 3
            Shape::Resources(resources) => {
                self.append_links(node, value, resources, location)?;
                let items = resources
                    .contents()
                    .map_err(|source| access_failure(value, location, source))?;
                for (index, item) in items.iter().enumerate() {
                    let child = node.push_child(Node::new());
                    self.visit(child, &**item, &location.child(&index.to_string()), Slot::Item)?;
                }
                Ok(())
            }
            // 4
            Shape::LinkBearing(links, record) => {
                self.append_links(node, value, links, location)?;
                self.append_properties(node, value, record, LINK_BEARER_FILTER, location)
            }
            // 5
            Shape::Sequence(items) => {
                for (index, item) in items.iter().enumerate() {
                    let child = node.push_child(Node::new());
                    self.visit(child, &**item, &location.child(&index.to_string()), Slot::Item)?;
                }
                Ok(())
            }
            // 6
            Shape::Map(entries) => {
                for (key, entry) in &entries {
                    let child = node.push_child(Node::named(key.as_str()));
                    self.visit(child, &**entry, &location.child(key), Slot::Entry)?;
                }
                Ok(())
            }
            // 7
            Shape::Record(record) => {
                self.append_properties(node, value, record, RECORD_FILTER, location)
            }
            Shape::Proxy(inner) => self.visit(node, &*inner, &location.within(), slot),
        }
    }

    fn append_links(
        &mut self,
        node: &mut Node,
        value: &dyn Introspect,
        bearer: &(impl LinkBearer + ?Sized),
        location: &Location,
    ) -> Result<(), BuildError> {
        let links = bearer
            .links()
            .map_err(|source| access_failure(value, location, source))?;
        node.data.extend(link_nodes(&links)?);
        Ok(())
    }

    /// One named child per readable property not in `filter`.
    fn append_properties(
        &mut self,
        node: &mut Node,
        value: &dyn Introspect,
        record: &dyn Record,
        filter: &[&str],
        location: &Location,
    ) -> Result<(), BuildError> {
        for name in record.property_names() {
            if filter.contains(&name) {
                continue;
            }
            let property_location = location.child(name);
            let content = record
                .read_property(name)
                .map_err(|source| access_failure(value, &property_location, source))?;

            let child = node.push_child(Node::named(name));
            self.visit(child, &*content, &property_location, Slot::Entry)?;
        }
        Ok(())
    }
}

fn access_failure(value: &dyn Introspect, location: &Location, source: AccessError) -> BuildError {
    BuildError::Introspection {
        type_name: value.type_name().to_string(),
        path: location.display(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::Link;
    use crate::resource::{LinkedRecord, Resource, Resources};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Widget {
        name: String,
        qty: u32,
    }

    crate::impl_record!(Widget { name, qty });

    fn render(node: &Node) -> serde_json::Value {
        serde_json::to_value(&node.data).unwrap()
    }

    fn built(value: &dyn Introspect) -> Node {
        let mut root = Node::new();
        build(&mut root, value, &BuildOptions::default()).unwrap();
        root
    }

    #[test]
    fn null_appends_nothing() {
        let root = built(&None::<u8>);
        assert!(root.data.is_empty());
        assert!(root.value.is_none());
    }

    #[test]
    fn resource_flattens_content() {
        let widget = Resource::new(Widget {
            name: "bolt".into(),
            qty: 5,
        })
        .with_link(Link::new("/widgets/1", "self"));

        assert_eq!(
            render(&built(&widget)),
            json!([
                {"rel": ["self"], "url": "/widgets/1"},
                {"name": "name", "value": "bolt"},
                {"name": "qty", "value": "5"}
            ])
        );
    }

    #[test]
    fn resources_nest_items() {
        let resources = Resources::new(vec![
            Resource::new(Widget {
                name: "bolt".into(),
                qty: 5,
            })
            .with_link(Link::new("/widgets/1", "self")),
        ])
        .with_link(Link::new("/widgets", "self"));

        assert_eq!(
            render(&built(&resources)),
            json!([
                {"rel": ["self"], "url": "/widgets"},
                {"data": [
                    {"rel": ["self"], "url": "/widgets/1"},
                    {"name": "name", "value": "bolt"},
                    {"name": "qty", "value": "5"}
                ]}
            ])
        );
    }

    #[test]
    fn link_bearing_record_skips_id_and_links() {
        struct Order {
            id: u32,
            links: Vec<String>,
            total: f64,
        }
        crate::impl_record!(Order { id, links, total });

        let order = LinkedRecord::new(Order {
            id: 7,
            links: vec!["ignored".into()],
            total: 9.5,
        })
        .with_link(Link::new("/orders/7", "self"));

        assert_eq!(
            render(&built(&order)),
            json!([
                {"rel": ["self"], "url": "/orders/7"},
                {"name": "total", "value": "9.5"}
            ])
        );
    }

    #[test]
    fn plain_record_skips_only_class() {
        struct Tagged {
            id: u32,
            class: String,
        }
        crate::impl_record!(Tagged { id, class });

        let root = built(&vec![Tagged {
            id: 1,
            class: "x".into(),
        }]);
        assert_eq!(render(&root), json!([{"data": [{"name": "id", "value": "1"}]}]));
    }

    #[test]
    fn sequence_elements_get_fresh_children() {
        assert_eq!(
            render(&built(&vec![Some(1), None, Some(3)])),
            json!([{"value": "1"}, {}, {"value": "3"}])
        );
    }

    #[test]
    fn map_entries_are_named() {
        let value = json!({"k1": 1, "k2": {"inner": true}, "k3": null});
        assert_eq!(
            render(&built(&value)),
            json!([
                {"name": "k1", "value": "1"},
                {"name": "k2", "data": [{"name": "inner", "value": "true"}]},
                {"name": "k3", "value": null}
            ])
        );
    }

    #[test]
    fn failing_property_aborts_build() {
        struct Flaky;

        impl Record for Flaky {
            fn property_names(&self) -> Vec<&str> {
                vec!["ok", "broken"]
            }

            fn read_property(
                &self,
                name: &str,
            ) -> Result<crate::ObjectRef<'_>, AccessError> {
                match name {
                    "ok" => Ok(crate::ObjectRef::owned(1)),
                    _ => Err(AccessError::new("accessor raised")),
                }
            }
        }

        impl Introspect for Flaky {
            fn shape(&self) -> Result<Shape<'_>, AccessError> {
                Ok(Shape::Record(self))
            }
        }

        let mut root = Node::new();
        let err = build(&mut root, &single(Flaky), &BuildOptions::default()).unwrap_err();
        match err {
            BuildError::Introspection {
                type_name,
                path,
                source,
            } => {
                assert!(type_name.ends_with("Flaky"), "{}", type_name);
                assert_eq!(path, "/0/broken");
                assert_eq!(source.message(), "accessor raised");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    fn single<T>(item: T) -> Vec<T> {
        vec![item]
    }

    #[test]
    fn cycles_are_detected() {
        struct Ring {
            next: RefCell<Option<Rc<Ring>>>,
        }
        crate::impl_record!(Ring { next });

        let a = Rc::new(Ring {
            next: RefCell::new(None),
        });
        let b = Rc::new(Ring {
            next: RefCell::new(Some(Rc::clone(&a))),
        });
        *a.next.borrow_mut() = Some(Rc::clone(&b));

        let mut root = Node::new();
        let err = build(&mut root, &vec![Rc::clone(&a)], &BuildOptions::default()).unwrap_err();
        assert!(
            matches!(err, BuildError::CyclicGraph { ref path, .. } if path == "/0/next/next"),
            "{}",
            err
        );

        // break the cycle so both rings are freed
        *a.next.borrow_mut() = None;
    }

    #[test]
    fn shared_values_are_not_cycles() {
        let shared = Rc::new(vec![1]);
        let root = built(&vec![Rc::clone(&shared), Rc::clone(&shared)]);
        assert_eq!(
            render(&root),
            json!([{"data": [{"value": "1"}]}, {"data": [{"value": "1"}]}])
        );
    }

    #[test]
    fn depth_limit() {
        let value = json!([[[["deep"]]]]);
        let mut root = Node::new();
        let options = BuildOptions::new().max_depth(Some(2));
        let err = build(&mut root, &value, &options).unwrap_err();
        assert!(matches!(
            err,
            BuildError::DepthExceeded { max_depth: 2, ref path } if path == "/0/0/0"
        ));

        let mut root = Node::new();
        let options = BuildOptions::new().max_depth(None);
        assert!(build(&mut root, &value, &options).is_ok());
    }

    #[test]
    fn path_segments_are_escaped() {
        struct Broken;

        impl Introspect for Broken {
            fn shape(&self) -> Result<Shape<'_>, AccessError> {
                Err(AccessError::new("boom"))
            }
        }

        let mut map = std::collections::BTreeMap::new();
        map.insert("a/b~c", Broken);
        let mut root = Node::new();
        let err = build(&mut root, &map, &BuildOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Introspection { ref path, .. } if path == "/a~1b~0c"
        ));
    }

    #[test]
    fn document_rejects_unsupported_roots() {
        let options = BuildOptions::default();
        for root in [
            &5_i32 as &dyn Introspect,
            &"text",
            &None::<u8>,
            &Widget {
                name: "bolt".into(),
                qty: 1,
            },
        ] {
            let err = to_uber_document(root, &options).unwrap_err();
            assert!(matches!(err, BuildError::UnsupportedRootType { .. }), "{}", err);
        }
    }

    #[test]
    fn document_from_scalar_resource_keeps_value() {
        let resource = Resource::new(42).with_link(Link::new("/answer", "self"));
        let doc = to_uber_document(&resource, &BuildOptions::default()).unwrap();
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({"uber": {"version": "1.0", "data": [
                {"rel": ["self"], "url": "/answer"},
                {"value": "42"}
            ]}})
        );
    }

    #[test]
    fn document_through_refcell_root() {
        let cell = RefCell::new(json!({"a": 1}));
        let doc = to_uber_document(&cell, &BuildOptions::default()).unwrap();
        assert_eq!(
            serde_json::to_value(&doc.data).unwrap(),
            json!([{"name": "a", "value": "1"}])
        );
    }
}
