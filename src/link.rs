//! Outbound links and their conversion into UBER link nodes.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::error::BuildError;
use crate::node::Node;
use crate::types::{HttpMethod, UberAction};
use crate::uri_template::UriTemplate;

/// HTTP method plus the URI template variables the action accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    method: HttpMethod,
    template_variables: Vec<String>,
}

impl ActionDescriptor {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            template_variables: Vec::new(),
        }
    }

    /// Add a template variable name.
    pub fn variable(mut self, name: impl Into<String>) -> Self {
        self.template_variables.push(name.into());
        self
    }

    pub fn with_variables<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.template_variables
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn template_variables(&self) -> &[String] {
        &self.template_variables
    }
}

/// A navigable link: target href, one or more relation names, and the
/// actions it affords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    href: String,
    rels: Vec<String>,
    actions: Vec<ActionDescriptor>,
}

impl Link {
    pub fn new(href: impl Into<String>, rel: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rels: vec![rel.into()],
            actions: Vec::new(),
        }
    }

    /// Add another relation name for the same target.
    pub fn rel(mut self, rel: impl Into<String>) -> Self {
        let rel = rel.into();
        if !self.rels.contains(&rel) {
            self.rels.push(rel);
        }
        self
    }

    /// Attach an action descriptor.
    pub fn action(mut self, descriptor: ActionDescriptor) -> Self {
        self.actions.push(descriptor);
        self
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn rels(&self) -> &[String] {
        &self.rels
    }

    /// Descriptors for this link; never empty.
    ///
    /// A link without explicit descriptors affords a single GET whose
    /// variables are the variables of its href template.
    pub fn action_descriptors(&self) -> Vec<ActionDescriptor> {
        if self.actions.is_empty() {
            let variables = UriTemplate::parse(&self.href).variable_names();
            return vec![ActionDescriptor::new(HttpMethod::Get).with_variables(variables)];
        }
        self.actions.clone()
    }
}

/// A link plus every relation name collected for its href.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAndRels {
    pub link: Link,
    pub rels: IndexSet<String>,
}

/// Merge links by href, preserving the order hrefs were first seen.
///
/// Links sharing an href collapse into one entry whose rels are the union
/// of all their rels. The link kept for an entry is the last one seen.
pub fn aggregate_links(links: &[Link]) -> IndexMap<String, LinkAndRels> {
    let mut merged: IndexMap<String, LinkAndRels> = IndexMap::new();

    for link in links {
        match merged.get_mut(link.href()) {
            Some(entry) => {
                entry.link = link.clone();
                entry.rels.extend(link.rels().iter().cloned());
            }
            None => {
                merged.insert(
                    link.href().to_string(),
                    LinkAndRels {
                        link: link.clone(),
                        rels: link.rels().iter().cloned().collect(),
                    },
                );
            }
        }
    }

    debug!(links = links.len(), urls = merged.len(), "aggregated links");
    merged
}

/// Build the UBER `model` string for an action's template variables.
///
/// GET and DELETE produce a query template (`{?a,b}`), POST, PUT and PATCH
/// a form template (`a={a}&b={b}`). Anything else, or no variables, gives
/// `None`.
pub fn model_for(variables: &[String], method: HttpMethod) -> Option<String> {
    if variables.is_empty() {
        return None;
    }

    let model = if method.is_retrieval() {
        format!("{{?{}}}", variables.join(","))
    } else if method.is_submission() {
        variables
            .iter()
            .map(|name| format!("{}={{{}}}", name, name))
            .collect::<Vec<_>>()
            .join("&")
    } else {
        return None;
    };

    if model.is_empty() {
        None
    } else {
        Some(model)
    }
}

/// Convert one href, its merged rels and one action descriptor into a link
/// node.
///
/// The node's url is the href cut before its query and fragment parts. It is
/// marked `templated` when path expressions remain in it.
///
/// # Errors
///
/// Returns `BuildError::UnsupportedMethod` if the descriptor's method has
/// no UBER action.
pub fn link_node<'a, I>(
    href: &str,
    rels: I,
    descriptor: &ActionDescriptor,
) -> Result<Node, BuildError>
where
    I: IntoIterator<Item = &'a String>,
{
    let action =
        UberAction::for_method(descriptor.method()).ok_or_else(|| BuildError::UnsupportedMethod {
            method: descriptor.method().to_string(),
            href: href.to_string(),
        })?;

    let url = UriTemplate::parse(href).base_uri();
    // path expressions survive the cut and still need expanding
    let templated = UriTemplate::parse(&url).has_variables();
    Ok(Node::link(url, rels.into_iter().cloned())
        .with_templated(templated)
        .with_action(action)
        .with_model(model_for(descriptor.template_variables(), descriptor.method())))
}

/// Convert a list of links into link nodes: one node per distinct href and
/// action descriptor.
///
/// # Errors
///
/// Returns `BuildError::UnsupportedMethod` if any descriptor's method has no
/// UBER action.
pub fn link_nodes(links: &[Link]) -> Result<Vec<Node>, BuildError> {
    let mut nodes = Vec::new();
    for (href, entry) in aggregate_links(links) {
        for descriptor in entry.link.action_descriptors() {
            nodes.push(link_node(&href, &entry.rels, &descriptor)?);
        }
    }
    Ok(nodes)
}
