//! Minimal RFC 6570 URI template handling.
//!
//! Only what link conversion needs: listing variable names and collapsing a
//! template to its base URI with no variables bound.

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Expression {
        operator: Option<char>,
        raw: String,
        variables: Vec<String>,
    },
}

/// A parsed URI template such as `/orders/{id}{?page,size}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    parts: Vec<Part>,
}

const OPERATORS: &[char] = &['+', '#', '.', '/', ';', '?', '&', '=', ',', '!', '@', '|'];

impl UriTemplate {
    /// Parse a template. Unterminated expressions are kept as literal text.
    pub fn parse(template: &str) -> Self {
        let mut parts = Vec::new();
        let mut rest = template;

        while !rest.is_empty() {
            let Some(open) = rest.find('{') else {
                parts.push(Part::Literal(rest.to_string()));
                break;
            };
            let Some(close) = rest[open..].find('}').map(|i| open + i) else {
                parts.push(Part::Literal(rest.to_string()));
                break;
            };
            if open > 0 {
                parts.push(Part::Literal(rest[..open].to_string()));
            }
            parts.push(parse_expression(&rest[open + 1..close]));
            rest = &rest[close + 1..];
        }

        Self { parts }
    }

    /// Variable names in order of first appearance.
    pub fn variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for part in &self.parts {
            if let Part::Expression { variables, .. } = part {
                for name in variables {
                    if !names.contains(name) {
                        names.push(name.clone());
                    }
                }
            }
        }
        names
    }

    /// True if the template contains at least one expression.
    pub fn has_variables(&self) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, Part::Expression { .. }))
    }

    /// The template expanded with no variables bound, cut before its query
    /// and fragment parts.
    ///
    /// Path-level expressions stay unexpanded, e.g. `/orders/{id}{?page}`
    /// yields `/orders/{id}`.
    pub fn base_uri(&self) -> String {
        let mut base = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => {
                    if let Some(cut) = text.find(|c: char| c == '?' || c == '#') {
                        base.push_str(&text[..cut]);
                        return base;
                    }
                    base.push_str(text);
                }
                Part::Expression {
                    operator: Some('?' | '&' | '#'),
                    ..
                } => return base,
                Part::Expression { raw, .. } => {
                    base.push('{');
                    base.push_str(raw);
                    base.push('}');
                }
            }
        }
        base
    }
}

fn parse_expression(raw: &str) -> Part {
    let mut body = raw;
    let operator = raw.chars().next().filter(|c| OPERATORS.contains(c));
    if let Some(op) = operator {
        body = &raw[op.len_utf8()..];
    }

    let variables = body
        .split(',')
        .map(|varspec| {
            let varspec = varspec.trim();
            let varspec = varspec.strip_suffix('*').unwrap_or(varspec);
            varspec.split(':').next().unwrap_or(varspec).to_string()
        })
        .filter(|name| !name.is_empty())
        .collect();

    Part::Expression {
        operator,
        raw: raw.to_string(),
        variables,
    }
}
