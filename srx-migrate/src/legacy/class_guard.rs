//! Allow-list for the object classes a legacy rules document may instantiate.
//!
//! The legacy format is a serialized object graph; a document naming any other
//! class (process builders, nested decoders, reflection helpers) is rejected
//! before a single property is interpreted.

use srx_xml::XmlNode;

use super::ParseError;

pub(super) const SRX_CLASS: &str = "org.omegat.core.segmentation.SRX";
pub(super) const MAP_RULE_CLASS: &str = "org.omegat.core.segmentation.MapRule";
pub(super) const RULE_CLASS: &str = "org.omegat.core.segmentation.Rule";
pub(super) const LIST_CLASS: &str = "java.util.ArrayList";
const DECODER_CLASS: &str = "java.beans.XMLDecoder";

const ALLOWED_CLASSES: [&str; 4] = [SRX_CLASS, MAP_RULE_CLASS, RULE_CLASS, LIST_CLASS];
const KNOWN_ELEMENTS: [&str; 6] = ["java", "object", "void", "string", "boolean", "null"];

/// Walk the whole document and fail on the first disallowed class, element or
/// method invocation.
pub fn check_document(root: &XmlNode) -> Result<(), ParseError> {
    if root.tag != "java" {
        return Err(ParseError::Structure {
            line: root.line,
            element: root.tag.clone(),
            reason: "root element must be <java>".to_string(),
        });
    }
    if let Some(class) = root.attribute("class") {
        if class != DECODER_CLASS {
            return Err(forbidden(root, class));
        }
    }
    for child in &root.children {
        check_node(child)?;
    }
    Ok(())
}

fn check_node(node: &XmlNode) -> Result<(), ParseError> {
    if !KNOWN_ELEMENTS.contains(&node.tag.as_str()) || node.tag == "java" {
        return Err(ParseError::Structure {
            line: node.line,
            element: node.tag.clone(),
            reason: "element is not supported in a segmentation rules document".to_string(),
        });
    }
    if let Some(class) = node.attribute("class") {
        if !ALLOWED_CLASSES.contains(&class) {
            return Err(forbidden(node, class));
        }
    }
    if let Some(method) = node.attribute("method") {
        if method != "add" {
            return Err(ParseError::Structure {
                line: node.line,
                element: node.tag.clone(),
                reason: format!("method '{method}' may not be invoked"),
            });
        }
    }
    for child in &node.children {
        check_node(child)?;
    }
    Ok(())
}

fn forbidden(node: &XmlNode, class: &str) -> ParseError {
    ParseError::ForbiddenClass {
        line: node.line,
        class: class.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use srx_xml::parse;

    use super::check_document;
    use crate::legacy::ParseError;

    #[test]
    fn accepts_rules_document_classes() {
        let root = parse(
            br#"<java class="java.beans.XMLDecoder"><object class="org.omegat.core.segmentation.SRX"><void property="mappingRules"><void method="add"><object class="org.omegat.core.segmentation.MapRule"/></void></void></object></java>"#,
        )
        .expect("parse");
        assert!(check_document(&root).is_ok());
    }

    #[test]
    fn rejects_process_builder() {
        let root = parse(
            b"<java class=\"java.beans.XMLDecoder\">\n<object class=\"java.lang.ProcessBuilder\"><void method=\"start\"/></object></java>",
        )
        .expect("parse");
        let err = check_document(&root).expect_err("must fail");
        assert!(matches!(err, ParseError::ForbiddenClass { line: 2, .. }));
        assert!(err.to_string().contains("java.lang.ProcessBuilder"));
    }

    #[test]
    fn rejects_nested_decoder() {
        let root = parse(
            br#"<java><object class="java.beans.XMLDecoder"/></java>"#,
        )
        .expect("parse");
        let err = check_document(&root).expect_err("must fail");
        assert!(err.to_string().contains("java.beans.XMLDecoder"));
    }

    #[test]
    fn rejects_non_add_method() {
        let root = parse(br#"<java><object class="java.util.ArrayList"><void method="clear"/></object></java>"#)
            .expect("parse");
        assert!(matches!(
            check_document(&root),
            Err(ParseError::Structure { .. })
        ));
    }
}
