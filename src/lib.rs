//! UBER Hypermedia
//!
//! Converts in-memory object graphs into UBER+JSON hypermedia documents.
//!
//! Values are classified by [`Introspect::shape`] into resources (content
//! plus links), collections, maps and records, and walked depth-first into a
//! tree of [`Node`]s. Links sharing an href are merged into one link node per
//! action, with the UBER `action` and `model` derived from the HTTP method and
//! URI template variables.
//!
//! # Example
//!
//! ```
//! use uber_hypermedia::{impl_record, to_uber_document, BuildOptions, Link, Resource};
//! use serde_json::json;
//!
//! struct Widget {
//!     name: String,
//!     qty: u32,
//! }
//!
//! impl_record!(Widget { name, qty });
//!
//! let widget = Resource::new(Widget { name: "bolt".into(), qty: 5 })
//!     .with_link(Link::new("/widgets/1", "self"));
//!
//! let doc = to_uber_document(&widget, &BuildOptions::default()).unwrap();
//!
//! assert_eq!(
//!     doc.to_json_value().unwrap(),
//!     json!({"uber": {"version": "1.0", "data": [
//!         {"rel": ["self"], "url": "/widgets/1"},
//!         {"name": "name", "value": "bolt"},
//!         {"name": "qty", "value": "5"}
//!     ]}})
//! );
//! ```
//!
//! # Rendering Rules
//!
//! | Field | Omitted when |
//! |-------|--------------|
//! | `rel`, `data`, `sending`, `accepting` | empty |
//! | `templated`, `transclude` | `false` |
//! | `action` | `read` |
//! | `value` | absent (a literal null renders as `null`) |

mod builder;
mod error;
mod introspect;
mod link;
mod loader;
mod node;
mod resource;
mod types;
mod uri_template;
mod validator;

pub use builder::{build, to_uber_document};
pub use error::{AccessError, BuildError, LoadError, SchemaError, ValidateError};
pub use introspect::{
    ContentBearer, Introspect, LinkBearer, MultiContentBearer, ObjectRef, Record, Shape,
};
pub use link::{aggregate_links, link_node, link_nodes, model_for, ActionDescriptor, Link, LinkAndRels};
pub use loader::{is_url, load_input, load_input_auto, load_input_str};
pub use node::{Node, NodeValue, UberDocument};
pub use resource::{LinkedRecord, Resource, Resources};
pub use types::{
    json_type_name, BuildOptions, HttpMethod, UberAction, DEFAULT_MAX_DEPTH, LINK_BEARER_FILTER,
    RECORD_FILTER, UBER_VERSION,
};
pub use uri_template::UriTemplate;
pub use validator::{uber_schema, validate_against_schema, validate_document};

#[cfg(feature = "remote")]
pub use loader::load_input_url;
