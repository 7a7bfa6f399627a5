//! Declarative structural schemas for [`XmlNode`] trees.
//!
//! A [`Schema`] names a root element, an optional default namespace, and one
//! [`ElementSchema`] per element name. Each element declares its attributes
//! (required or optional, optionally restricted to an enumeration or a fixed
//! value) and its content model: empty, text only, or an ordered sequence of
//! child particles with occurrence bounds. [`validate`] walks a tree and
//! reports every violation it finds rather than stopping at the first.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use crate::tree::XmlNode;

const XSI_PREFIX: &str = "xsi:";

/// Attribute constraint on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSchema {
    pub name: String,
    pub required: bool,
    /// Permitted values; empty means any value.
    pub allowed: Vec<String>,
}

impl AttributeSchema {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
            allowed: Vec::new(),
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name)
        }
    }

    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.allowed = values.iter().map(|v| v.to_string()).collect();
        self
    }
}

/// One entry of a sequence content model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Particle {
    pub element: String,
    pub min: usize,
    /// `None` is unbounded.
    pub max: Option<usize>,
}

impl Particle {
    pub fn new(element: impl Into<String>, min: usize, max: Option<usize>) -> Self {
        Self {
            element: element.into(),
            min,
            max,
        }
    }

    pub fn one(element: impl Into<String>) -> Self {
        Self::new(element, 1, Some(1))
    }

    pub fn optional(element: impl Into<String>) -> Self {
        Self::new(element, 0, Some(1))
    }

    pub fn many(element: impl Into<String>, min: usize) -> Self {
        Self::new(element, min, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Empty,
    Text,
    Sequence(Vec<Particle>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSchema {
    pub name: String,
    pub attributes: Vec<AttributeSchema>,
    pub content: Content,
}

impl ElementSchema {
    pub fn new(name: impl Into<String>, content: Content) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            content,
        }
    }

    pub fn attribute(mut self, attribute: AttributeSchema) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// A complete document schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub root: String,
    /// Required default namespace (`xmlns`) on the root element.
    pub namespace: Option<String>,
    pub elements: BTreeMap<String, ElementSchema>,
}

impl Schema {
    pub fn new(root: impl Into<String>, namespace: Option<&str>) -> Self {
        Self {
            root: root.into(),
            namespace: namespace.map(ToOwned::to_owned),
            elements: BTreeMap::new(),
        }
    }

    pub fn element(mut self, element: ElementSchema) -> Self {
        self.elements.insert(element.name.clone(), element);
        self
    }
}

/// A single schema constraint failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Slash-separated element path with 1-based sibling indexes, e.g.
    /// `/srx/body[1]/languagerules[1]/languagerule[2]`.
    pub path: String,
    /// Offending attribute, when the constraint is on an attribute.
    pub attribute: Option<String>,
    pub constraint: String,
    /// Source line when the tree was parsed from text, otherwise 0.
    pub line: usize,
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        if let Some(attribute) = &self.attribute {
            write!(f, "/@{attribute}")?;
        }
        if self.line > 0 {
            write!(f, " (line {})", self.line)?;
        }
        write!(f, ": {}", self.constraint)
    }
}

/// Validate `root` against `schema`, returning every violation found.
pub fn validate(root: &XmlNode, schema: &Schema) -> Vec<Violation> {
    let mut out = Vec::new();
    let path = format!("/{}", root.tag);

    if root.tag != schema.root {
        out.push(violation(
            root,
            &path,
            None,
            format!("root element must be <{}>", schema.root),
        ));
        return out;
    }

    if let Some(namespace) = &schema.namespace {
        match root.attribute("xmlns") {
            Some(value) if value == namespace => {}
            Some(value) => out.push(violation(
                root,
                &path,
                Some("xmlns"),
                format!("namespace must be '{namespace}', found '{value}'"),
            )),
            None => out.push(violation(
                root,
                &path,
                Some("xmlns"),
                format!("missing namespace declaration '{namespace}'"),
            )),
        }
    }

    validate_element(root, schema, &path, true, &mut out);
    out
}

fn validate_element(
    node: &XmlNode,
    schema: &Schema,
    path: &str,
    is_root: bool,
    out: &mut Vec<Violation>,
) {
    let Some(element) = schema.elements.get(&node.tag) else {
        out.push(violation(node, path, None, "element is not declared".to_string()));
        return;
    };

    validate_attributes(node, element, path, is_root, out);

    match &element.content {
        Content::Empty => {
            if !node.children.is_empty() || node.has_significant_text() {
                out.push(violation(node, path, None, "element must be empty".to_string()));
            }
        }
        Content::Text => {
            if !node.children.is_empty() {
                out.push(violation(
                    node,
                    path,
                    None,
                    "element must contain text only".to_string(),
                ));
            }
        }
        Content::Sequence(particles) => {
            if node.has_significant_text() {
                out.push(violation(
                    node,
                    path,
                    None,
                    "character content is not allowed here".to_string(),
                ));
            }
            validate_sequence(node, particles, path, out);
            let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
            for child in &node.children {
                let index = seen.entry(child.tag.as_str()).or_insert(0);
                *index += 1;
                let child_path = format!("{path}/{}[{}]", child.tag, index);
                if particles.iter().any(|p| p.element == child.tag) {
                    validate_element(child, schema, &child_path, false, out);
                }
            }
        }
    }
}

fn validate_attributes(
    node: &XmlNode,
    element: &ElementSchema,
    path: &str,
    is_root: bool,
    out: &mut Vec<Violation>,
) {
    for declared in &element.attributes {
        match node.attribute(&declared.name) {
            None if declared.required => out.push(violation(
                node,
                path,
                Some(&declared.name),
                "required attribute is missing".to_string(),
            )),
            Some(value) if !declared.allowed.is_empty() && !declared.allowed.iter().any(|a| a == value) => {
                out.push(violation(
                    node,
                    path,
                    Some(&declared.name),
                    format!(
                        "value '{value}' is not one of [{}]",
                        declared.allowed.join(", ")
                    ),
                ))
            }
            _ => {}
        }
    }

    for key in node.attributes.keys() {
        let is_namespace_decl = key == "xmlns" || key.starts_with("xmlns:");
        if is_namespace_decl && is_root {
            continue;
        }
        // Instance attributes such as xsi:schemaLocation are allowed anywhere.
        if key.starts_with(XSI_PREFIX) {
            continue;
        }
        if !element.attributes.iter().any(|a| &a.name == key) {
            out.push(violation(
                node,
                path,
                Some(key),
                "attribute is not declared".to_string(),
            ));
        }
    }
}

/// Match children against an ordered particle list, greedily consuming each
/// particle up to its maximum before moving on.
fn validate_sequence(node: &XmlNode, particles: &[Particle], path: &str, out: &mut Vec<Violation>) {
    let children = &node.children;
    let mut cursor = 0;

    for particle in particles {
        let mut count = 0;
        while cursor < children.len()
            && children[cursor].tag == particle.element
            && particle.max.map_or(true, |max| count < max)
        {
            count += 1;
            cursor += 1;
        }
        if count < particle.min {
            out.push(violation(
                node,
                path,
                None,
                format!(
                    "expected at least {} <{}> element(s), found {count}",
                    particle.min, particle.element
                ),
            ));
        }
    }

    if let Some(extra) = children.get(cursor) {
        let expected: Vec<&str> = particles.iter().map(|p| p.element.as_str()).collect();
        out.push(violation(
            extra,
            &format!("{path}/{}", extra.tag),
            None,
            format!(
                "unexpected element; content must follow the sequence ({})",
                expected.join(", ")
            ),
        ));
    }
}

fn violation(node: &XmlNode, path: &str, attribute: Option<&str>, constraint: String) -> Violation {
    Violation {
        path: path.to_string(),
        attribute: attribute.map(ToOwned::to_owned),
        constraint,
        line: node.line,
    }
}

#[cfg(test)]
mod tests {
    use super::{validate, AttributeSchema, Content, ElementSchema, Particle, Schema};
    use crate::parser::parse;

    fn sample_schema() -> Schema {
        Schema::new("list", Some("urn:test"))
            .element(
                ElementSchema::new(
                    "list",
                    Content::Sequence(vec![Particle::optional("title"), Particle::many("item", 1)]),
                )
                .attribute(AttributeSchema::required("version").one_of(&["1"])),
            )
            .element(ElementSchema::new("title", Content::Text))
            .element(
                ElementSchema::new("item", Content::Empty)
                    .attribute(AttributeSchema::optional("kind").one_of(&["a", "b"])),
            )
    }

    #[test]
    fn accepts_conforming_document() {
        let node = parse(br#"<list xmlns="urn:test" version="1"><title>t</title><item/><item kind="b"/></list>"#)
            .expect("parse");
        assert!(validate(&node, &sample_schema()).is_empty());
    }

    #[test]
    fn reports_every_violation() {
        let node = parse(br#"<list version="2"><item kind="c" extra="x"/><title/></list>"#)
            .expect("parse");
        let violations = validate(&node, &sample_schema());
        let constraints: Vec<String> = violations.iter().map(ToString::to_string).collect();

        assert!(constraints.iter().any(|c| c.contains("@xmlns")));
        assert!(constraints.iter().any(|c| c.contains("@version") && c.contains("'2'")));
        assert!(constraints.iter().any(|c| c.contains("@kind")));
        assert!(constraints.iter().any(|c| c.contains("@extra")));
        assert!(constraints.iter().any(|c| c.contains("unexpected element")));
    }

    #[test]
    fn instance_attributes_are_not_declared_but_allowed() {
        let node = parse(
            br#"<list xmlns="urn:test" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="urn:test list.xsd" version="1"><item xsi:type="x"/></list>"#,
        )
        .expect("parse");
        assert!(validate(&node, &sample_schema()).is_empty());
    }

    #[test]
    fn enforces_minimum_occurrence() {
        let node = parse(br#"<list xmlns="urn:test" version="1"/>"#).expect("parse");
        let violations = validate(&node, &sample_schema());

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "/list");
        assert!(violations[0].constraint.contains("at least 1 <item>"));
    }
}
