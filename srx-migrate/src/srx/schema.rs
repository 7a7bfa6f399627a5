//! Structural definition of SRX 2.0, as published in `srx20.xsd`.
//!
//! Only the parts a segmentation rules document uses are declared; anything
//! else in the output is reported as undeclared.

use srx_xml::{AttributeSchema, Content, ElementSchema, Particle, Schema};

use super::{SRX_NAMESPACE, SRX_VERSION};

const YES_NO: &[&str] = &["yes", "no"];

pub fn srx20_schema() -> Schema {
    Schema::new("srx", Some(SRX_NAMESPACE))
        .element(
            ElementSchema::new(
                "srx",
                Content::Sequence(vec![Particle::one("header"), Particle::one("body")]),
            )
            .attribute(AttributeSchema::required("version").one_of(&[SRX_VERSION])),
        )
        .element(
            ElementSchema::new(
                "header",
                Content::Sequence(vec![Particle::new("formathandle", 0, Some(3))]),
            )
            .attribute(AttributeSchema::required("segmentsubflows").one_of(YES_NO))
            .attribute(AttributeSchema::required("cascade").one_of(YES_NO)),
        )
        .element(
            ElementSchema::new("formathandle", Content::Empty)
                .attribute(
                    AttributeSchema::required("type").one_of(&["start", "end", "isolated"]),
                )
                .attribute(AttributeSchema::required("include").one_of(YES_NO)),
        )
        .element(ElementSchema::new(
            "body",
            Content::Sequence(vec![Particle::one("languagerules"), Particle::one("maprules")]),
        ))
        .element(ElementSchema::new(
            "languagerules",
            Content::Sequence(vec![Particle::many("languagerule", 1)]),
        ))
        .element(
            ElementSchema::new(
                "languagerule",
                Content::Sequence(vec![Particle::many("rule", 1)]),
            )
            .attribute(AttributeSchema::required("languagerulename")),
        )
        .element(
            ElementSchema::new(
                "rule",
                Content::Sequence(vec![
                    Particle::optional("beforebreak"),
                    Particle::optional("afterbreak"),
                ]),
            )
            .attribute(AttributeSchema::optional("break").one_of(YES_NO)),
        )
        .element(ElementSchema::new("beforebreak", Content::Text))
        .element(ElementSchema::new("afterbreak", Content::Text))
        .element(ElementSchema::new(
            "maprules",
            Content::Sequence(vec![Particle::many("languagemap", 1)]),
        ))
        .element(
            ElementSchema::new("languagemap", Content::Empty)
                .attribute(AttributeSchema::required("languagepattern"))
                .attribute(AttributeSchema::required("languagerulename")),
        )
}

#[cfg(test)]
mod tests {
    use srx_xml::{parse, validate};

    use super::srx20_schema;

    const VALID: &str = r#"<srx xmlns="http://www.lisa.org/srx20" version="2.0">
  <header segmentsubflows="yes" cascade="yes">
    <formathandle type="start" include="no"/>
  </header>
  <body>
    <languagerules>
      <languagerule languagerulename="default">
        <rule break="yes"><beforebreak>.</beforebreak><afterbreak>\s</afterbreak></rule>
        <rule><afterbreak/></rule>
      </languagerule>
    </languagerules>
    <maprules>
      <languagemap languagepattern="en.*" languagerulename="default"/>
    </maprules>
  </body>
</srx>"#;

    #[test]
    fn accepts_minimal_document() {
        let root = parse(VALID.as_bytes()).expect("parse");
        assert!(validate(&root, &srx20_schema()).is_empty());
    }

    #[test]
    fn rejects_empty_language_rule() {
        let doc = VALID.replace(
            r#"<languagerule languagerulename="default">
        <rule break="yes"><beforebreak>.</beforebreak><afterbreak>\s</afterbreak></rule>
        <rule><afterbreak/></rule>
      </languagerule>"#,
            r#"<languagerule languagerulename="default"></languagerule>"#,
        );
        let root = parse(doc.as_bytes()).expect("parse");
        let violations = validate(&root, &srx20_schema());

        assert_eq!(violations.len(), 1);
        assert!(violations[0].path.ends_with("languagerule[1]"));
    }

    #[test]
    fn rejects_bad_break_value_and_wrong_namespace() {
        let doc = VALID
            .replace(r#"break="yes""#, r#"break="maybe""#)
            .replace("srx20", "srx10");
        let root = parse(doc.as_bytes()).expect("parse");
        let violations = validate(&root, &srx20_schema());

        assert!(violations.iter().any(|v| v.attribute.as_deref() == Some("break")));
        assert!(violations.iter().any(|v| v.attribute.as_deref() == Some("xmlns")));
    }

    #[test]
    fn rejects_maprules_before_languagerules() {
        let doc = r#"<srx xmlns="http://www.lisa.org/srx20" version="2.0"><header segmentsubflows="yes" cascade="yes"/><body><maprules><languagemap languagepattern=".*" languagerulename="x"/></maprules><languagerules><languagerule languagerulename="x"><rule/></languagerule></languagerules></body></srx>"#;
        let root = parse(doc.as_bytes()).expect("parse");
        assert!(!validate(&root, &srx20_schema()).is_empty());
    }
}
