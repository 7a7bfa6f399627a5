use std::collections::{HashMap, HashSet};

use srx_xml::XmlNode;

use super::class_guard::{LIST_CLASS, MAP_RULE_CLASS, RULE_CLASS, SRX_CLASS};
use super::ParseError;
use crate::language_names::LanguageNames;
use crate::model::{BreakRule, LanguageRuleGroup, MapRule, RuleSet, SegmentationOptions};
use crate::pattern::{check_pattern, PatternCheck};

/// Interpret a class-checked legacy document tree.
pub(super) fn decode(
    root: &XmlNode,
    names: Option<&LanguageNames>,
    pattern_check: PatternCheck,
) -> Result<RuleSet, ParseError> {
    let srx = match root.children.as_slice() {
        [only] if only.tag == "object" && only.attribute("class") == Some(SRX_CLASS) => only,
        _ => {
            return Err(structure(
                root,
                format!("expected exactly one <object class=\"{SRX_CLASS}\">"),
            ))
        }
    };

    let mut decoder = Decoder {
        names,
        pattern_check,
        set: RuleSet::default(),
        group_lines: HashMap::new(),
        list_ids: HashMap::new(),
        rule_ids: HashMap::new(),
    };
    decoder.read_srx(srx)?;
    Ok(decoder.set)
}

struct Decoder<'a> {
    names: Option<&'a LanguageNames>,
    pattern_check: PatternCheck,
    set: RuleSet,
    /// Group name to the line that defined it.
    group_lines: HashMap<String, usize>,
    /// Serialized list id to the group it became.
    list_ids: HashMap<String, String>,
    /// Serialized rule id to the rule it decoded to.
    rule_ids: HashMap<String, BreakRule>,
}

/// Where a map rule gets its rules from.
enum RuleList<'n> {
    Inline {
        id: Option<&'n str>,
        adds: Vec<&'n XmlNode>,
    },
    Shared {
        idref: &'n str,
        node: &'n XmlNode,
    },
}

impl Decoder<'_> {
    fn read_srx(&mut self, srx: &XmlNode) -> Result<(), ParseError> {
        let mut options = SegmentationOptions::default();

        for (name, prop) in properties(srx)? {
            match name {
                "mappingRules" => {
                    for add in list_adds(prop)? {
                        let object = single_object(add, MAP_RULE_CLASS)?;
                        self.read_map_rule(object)?;
                    }
                }
                "cascade" => options.cascade = Some(bool_value(prop)?),
                "segmentSubflows" => options.segment_subflows = Some(bool_value(prop)?),
                "includeStartingTags" => options.include_starting_tags = Some(bool_value(prop)?),
                "includeEndingTags" => options.include_ending_tags = Some(bool_value(prop)?),
                "includeIsolatedTags" => options.include_isolated_tags = Some(bool_value(prop)?),
                "version" => options.version = string_value(prop)?,
                other => return Err(unknown_property(prop, other)),
            }
        }

        if let Some(version) = &options.version {
            log::debug!("legacy rules document version {version}");
        }
        self.set.options = options;
        Ok(())
    }

    fn read_map_rule(&mut self, object: &XmlNode) -> Result<(), ParseError> {
        let mut language = None;
        let mut pattern = None;
        let mut rules = None;

        for (name, prop) in properties(object)? {
            match name {
                "language" => language = string_value(prop)?,
                "pattern" => pattern = string_value(prop)?.map(|p| (p, prop.line)),
                "rules" => rules = Some(rule_list(prop)?),
                other => return Err(unknown_property(prop, other)),
            }
        }

        let language = language.ok_or_else(|| missing(object, "language"))?;
        let (pattern, pattern_line) = pattern.ok_or_else(|| missing(object, "pattern"))?;
        self.check(&pattern, pattern_line, "language pattern")?;

        let group = match rules {
            Some(RuleList::Shared { idref, node }) => self
                .list_ids
                .get(idref)
                .cloned()
                .ok_or_else(|| ParseError::DanglingReference {
                    line: node.line,
                    reference: idref.to_string(),
                })?,
            Some(RuleList::Inline { id, adds }) => {
                let name = self.group_name(&pattern, &language);
                let mut rules = Vec::with_capacity(adds.len());
                for add in adds {
                    rules.push(self.read_rule_add(add)?);
                }
                self.define_group(object, name, rules, id)?
            }
            None => {
                let name = self.group_name(&pattern, &language);
                self.define_group(object, name, Vec::new(), None)?
            }
        };

        if group != language {
            log::debug!("map rule '{pattern}' ({language}) uses rule group '{group}'");
        }
        self.set.map_rules.push(MapRule::new(pattern, group));
        Ok(())
    }

    /// One list entry: a Rule object, or an `idref` to a Rule serialized
    /// earlier, which yields a copy of that rule.
    fn read_rule_add(&mut self, add: &XmlNode) -> Result<BreakRule, ParseError> {
        if let [object] = add.children.as_slice() {
            if let Some(idref) = object.attribute("idref").filter(|_| object.tag == "object") {
                return self.rule_ids.get(idref).cloned().ok_or_else(|| {
                    ParseError::DanglingReference {
                        line: object.line,
                        reference: idref.to_string(),
                    }
                });
            }
        }

        let object = single_object(add, RULE_CLASS)?;
        let rule = self.read_rule(object)?;
        if let Some(id) = object.attribute("id") {
            self.rule_ids.insert(id.to_string(), rule.clone());
        }
        Ok(rule)
    }

    fn read_rule(&self, object: &XmlNode) -> Result<BreakRule, ParseError> {
        let mut rule = BreakRule::new("", "", false);

        for (name, prop) in properties(object)? {
            match name {
                "beforebreak" => {
                    rule.before = string_value(prop)?.unwrap_or_default();
                    self.check(&rule.before, prop.line, "beforebreak")?;
                }
                "afterbreak" => {
                    rule.after = string_value(prop)?.unwrap_or_default();
                    self.check(&rule.after, prop.line, "afterbreak")?;
                }
                "breakRule" => rule.is_breaking = bool_value(prop)?,
                other => return Err(unknown_property(prop, other)),
            }
        }
        Ok(rule)
    }

    fn group_name(&self, pattern: &str, language: &str) -> String {
        self.names
            .and_then(|names| names.standard_name(pattern, language))
            .unwrap_or(language)
            .to_string()
    }

    fn define_group(
        &mut self,
        object: &XmlNode,
        name: String,
        rules: Vec<BreakRule>,
        id: Option<&str>,
    ) -> Result<String, ParseError> {
        if let Some(first_line) = self.group_lines.get(&name) {
            return Err(ParseError::DuplicateGroup {
                line: object.line,
                name,
                first_line: *first_line,
            });
        }
        if let Some(id) = id {
            self.list_ids.insert(id.to_string(), name.clone());
        }
        self.group_lines.insert(name.clone(), object.line);
        self.set.groups.push(LanguageRuleGroup::new(name.clone(), rules));
        Ok(name)
    }

    fn check(&self, pattern: &str, line: usize, field: &'static str) -> Result<(), ParseError> {
        check_pattern(pattern, self.pattern_check).map_err(|reason| ParseError::InvalidPattern {
            line,
            field,
            pattern: pattern.to_string(),
            reason,
        })
    }
}

/// The `<void property="…">` children of an object, in document order. A
/// property may be set only once.
fn properties(object: &XmlNode) -> Result<Vec<(&str, &XmlNode)>, ParseError> {
    let mut seen = HashSet::new();
    object
        .children
        .iter()
        .map(|child| match (child.tag.as_str(), child.attribute("property")) {
            ("void", Some(name)) if !seen.insert(name) => Err(structure(
                child,
                format!("duplicate property '{name}'"),
            )),
            ("void", Some(name)) => Ok((name, child)),
            _ => Err(structure(child, "expected <void property=\"…\">".to_string())),
        })
        .collect()
}

/// The `<void method="add">` children of a list-valued property.
fn list_adds(prop: &XmlNode) -> Result<Vec<&XmlNode>, ParseError> {
    prop.children
        .iter()
        .map(|child| match (child.tag.as_str(), child.attribute("method")) {
            ("void", Some("add")) => Ok(child),
            _ => Err(structure(child, "expected <void method=\"add\">".to_string())),
        })
        .collect()
}

/// Resolve the three serialized shapes of a `rules` property: adds directly
/// under the property, adds under an explicit list object, or an `idref` to a
/// list serialized earlier.
fn rule_list(prop: &XmlNode) -> Result<RuleList<'_>, ParseError> {
    if let [object] = prop.children.as_slice() {
        if object.tag == "object" {
            if let Some(idref) = object.attribute("idref") {
                return Ok(RuleList::Shared { idref, node: object });
            }
            if object.attribute("class") == Some(LIST_CLASS) {
                return Ok(RuleList::Inline {
                    id: object.attribute("id").or_else(|| prop.attribute("id")),
                    adds: list_adds(object)?,
                });
            }
        }
    }
    Ok(RuleList::Inline {
        id: prop.attribute("id"),
        adds: list_adds(prop)?,
    })
}

fn single_object<'n>(add: &'n XmlNode, class: &str) -> Result<&'n XmlNode, ParseError> {
    match add.children.as_slice() {
        [object] if object.tag == "object" && object.attribute("class") == Some(class) => {
            Ok(object)
        }
        [object] if object.tag == "object" && object.attribute("idref").is_some() => Err(structure(
            object,
            format!("shared <object idref> is not supported for {class}"),
        )),
        _ => Err(structure(add, format!("expected one <object class=\"{class}\">"))),
    }
}

fn string_value(prop: &XmlNode) -> Result<Option<String>, ParseError> {
    match prop.children.as_slice() {
        [value] if value.tag == "string" => {
            if !value.children.is_empty() {
                return Err(structure(
                    value,
                    "encoded characters inside <string> are not supported".to_string(),
                ));
            }
            Ok(Some(value.text.clone().unwrap_or_default()))
        }
        [value] if value.tag == "null" => Ok(None),
        _ => Err(structure(prop, "expected a <string> or <null/> value".to_string())),
    }
}

fn bool_value(prop: &XmlNode) -> Result<bool, ParseError> {
    match prop.children.as_slice() {
        [value] if value.tag == "boolean" => match value.text.as_deref().map(str::trim) {
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            _ => Err(structure(value, "boolean must be 'true' or 'false'".to_string())),
        },
        _ => Err(structure(prop, "expected a <boolean> value".to_string())),
    }
}

fn structure(node: &XmlNode, reason: String) -> ParseError {
    ParseError::Structure {
        line: node.line,
        element: node.tag.clone(),
        reason,
    }
}

fn missing(object: &XmlNode, property: &'static str) -> ParseError {
    ParseError::MissingField {
        line: object.line,
        element: object.attribute("class").unwrap_or(&object.tag).to_string(),
        property,
    }
}

fn unknown_property(prop: &XmlNode, name: &str) -> ParseError {
    structure(prop, format!("unknown property '{name}'"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::legacy::{LegacyParser, ParseError};
    use crate::model::{BreakRule, LanguageRuleGroup, MapRule};

    fn wrap(map_rules: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<java version="1.8.0" class="java.beans.XMLDecoder">
 <object class="org.omegat.core.segmentation.SRX">
  <void property="mappingRules">
{map_rules}
  </void>
 </object>
</java>
"#
        )
    }

    fn map_rule(language: &str, pattern: &str, rules: &str) -> String {
        format!(
            r#"   <void method="add">
    <object class="org.omegat.core.segmentation.MapRule">
     <void property="language"><string>{language}</string></void>
     <void property="pattern"><string>{pattern}</string></void>
     {rules}
    </object>
   </void>"#
        )
    }

    fn rule(before: &str, after: &str, breaking: bool) -> String {
        let flag = if breaking {
            r#"<void property="breakRule"><boolean>true</boolean></void>"#
        } else {
            ""
        };
        format!(
            r#"<void method="add"><object class="org.omegat.core.segmentation.Rule"><void property="afterbreak"><string>{after}</string></void><void property="beforebreak"><string>{before}</string></void>{flag}</object></void>"#
        )
    }

    #[test]
    fn reads_single_group_scenario() {
        let doc = wrap(&map_rule(
            "default",
            "en.*",
            &format!(r#"<void property="rules">{}</void>"#, rule(".", "\\s", true)),
        ));
        let set = LegacyParser::default().parse(doc.as_bytes()).expect("parse");

        assert_eq!(set.map_rules, vec![MapRule::new("en.*", "default")]);
        assert_eq!(
            set.groups,
            vec![LanguageRuleGroup::new(
                "default",
                vec![BreakRule::new(".", "\\s", true)]
            )]
        );
    }

    #[test]
    fn keeps_rule_and_map_order() {
        let rules_a = format!(
            r#"<void property="rules">{}{}{}</void>"#,
            rule("Mr\\.", "\\s", false),
            rule("\\.", "\\s", true),
            rule("", "\\n", true)
        );
        let rules_b = format!(r#"<void property="rules">{}</void>"#, rule("。", "", true));
        let doc = wrap(&format!(
            "{}\n{}",
            map_rule("Custom", "XX-YY", &rules_a),
            map_rule("Other", "ZZ.*", &rules_b)
        ));
        let set = LegacyParser::verbatim().parse(doc.as_bytes()).expect("parse");

        assert_eq!(
            set.map_rules,
            vec![MapRule::new("XX-YY", "Custom"), MapRule::new("ZZ.*", "Other")]
        );
        let custom = set.group("Custom").expect("group");
        assert_eq!(
            custom.rules,
            vec![
                BreakRule::new("Mr\\.", "\\s", false),
                BreakRule::new("\\.", "\\s", true),
                BreakRule::new("", "\\n", true),
            ]
        );
        assert_eq!(set.group("Other").expect("group").rules, vec![BreakRule::new("。", "", true)]);
    }

    #[test]
    fn idref_shares_one_group() {
        let first = format!(
            r#"<void id="ArrayList0" property="rules">{}</void>"#,
            rule("\\.", "\\s", true)
        );
        let second = r#"<void property="rules"><object idref="ArrayList0"/></void>"#;
        let doc = wrap(&format!(
            "{}\n{}",
            map_rule("Latin", "EN.*", &first),
            map_rule("Latin too", "DE.*", second)
        ));
        let set = LegacyParser::verbatim().parse(doc.as_bytes()).expect("parse");

        assert_eq!(set.groups.len(), 1);
        assert_eq!(
            set.map_rules,
            vec![MapRule::new("EN.*", "Latin"), MapRule::new("DE.*", "Latin")]
        );
    }

    #[test]
    fn explicit_list_object_with_id_is_shareable() {
        let first = format!(
            r#"<void property="rules"><object class="java.util.ArrayList" id="ArrayList1">{}</object></void>"#,
            rule("\\.", "\\s", true)
        );
        let second = r#"<void property="rules"><object idref="ArrayList1"/></void>"#;
        let doc = wrap(&format!(
            "{}\n{}",
            map_rule("A", "A.*", &first),
            map_rule("B", "B.*", second)
        ));
        let set = LegacyParser::verbatim().parse(doc.as_bytes()).expect("parse");

        assert_eq!(set.map_rules[1].group, "A");
    }

    #[test]
    fn dangling_idref_is_rejected() {
        let doc = wrap(&map_rule(
            "A",
            "A.*",
            r#"<void property="rules"><object idref="ArrayList9"/></void>"#,
        ));
        let err = LegacyParser::verbatim().parse(doc.as_bytes()).expect_err("must fail");

        assert!(matches!(
            err,
            ParseError::DanglingReference { ref reference, .. } if reference == "ArrayList9"
        ));
        assert!(err.line() > 0);
    }

    #[test]
    fn rule_idref_copies_earlier_rule() {
        let first = r#"<void property="rules"><void method="add"><object class="org.omegat.core.segmentation.Rule" id="Rule0"><void property="beforebreak"><string>\.</string></void><void property="breakRule"><boolean>true</boolean></void></object></void></void>"#;
        let second = r#"<void property="rules"><void method="add"><object idref="Rule0"/></void></void>"#;
        let doc = wrap(&format!(
            "{}\n{}",
            map_rule("A", "A.*", first),
            map_rule("B", "B.*", second)
        ));
        let set = LegacyParser::verbatim().parse(doc.as_bytes()).expect("parse");

        assert_eq!(set.groups.len(), 2);
        assert_eq!(set.groups[0].rules, set.groups[1].rules);
        assert_eq!(set.groups[1].rules, vec![BreakRule::new("\\.", "", true)]);
    }

    #[test]
    fn unknown_rule_idref_is_dangling() {
        let rules = r#"<void property="rules"><void method="add"><object idref="Rule5"/></void></void>"#;
        let doc = wrap(&map_rule("A", "A.*", rules));
        let err = LegacyParser::verbatim().parse(doc.as_bytes()).expect_err("must fail");

        assert!(matches!(
            err,
            ParseError::DanglingReference { ref reference, .. } if reference == "Rule5"
        ));
    }

    #[test]
    fn repeated_property_is_rejected() {
        let doc = wrap(&map_rule(
            "A",
            "A.*",
            r#"<void property="pattern"><string>B.*</string></void>"#,
        ));
        let err = LegacyParser::verbatim().parse(doc.as_bytes()).expect_err("must fail");

        assert!(err.to_string().contains("duplicate property 'pattern'"));
    }

    #[test]
    fn duplicate_group_name_is_rejected() {
        let rules = format!(r#"<void property="rules">{}</void>"#, rule("\\.", "", true));
        let doc = wrap(&format!(
            "{}\n{}",
            map_rule("Same", "A.*", &rules),
            map_rule("Same", "B.*", &rules)
        ));
        let err = LegacyParser::verbatim().parse(doc.as_bytes()).expect_err("must fail");

        assert!(matches!(err, ParseError::DuplicateGroup { ref name, .. } if name == "Same"));
    }

    #[test]
    fn invalid_pattern_names_field_and_line() {
        let rules = format!(r#"<void property="rules">{}</void>"#, rule("(abc", "", true));
        let doc = wrap(&map_rule("A", "A.*", &rules));
        let err = LegacyParser::verbatim().parse(doc.as_bytes()).expect_err("must fail");

        match err {
            ParseError::InvalidPattern {
                line, field, pattern, ..
            } => {
                assert_eq!(field, "beforebreak");
                assert_eq!(pattern, "(abc");
                assert_eq!(line, 9);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_pattern_is_reported() {
        let doc = wrap(
            r#"<void method="add"><object class="org.omegat.core.segmentation.MapRule"><void property="language"><string>A</string></void></object></void>"#,
        );
        let err = LegacyParser::verbatim().parse(doc.as_bytes()).expect_err("must fail");

        assert!(matches!(err, ParseError::MissingField { property: "pattern", .. }));
    }

    #[test]
    fn absent_patterns_and_flag_use_legacy_defaults() {
        let rules = r#"<void property="rules"><void method="add"><object class="org.omegat.core.segmentation.Rule"><void property="beforebreak"><null/></void></object></void></void>"#;
        let doc = wrap(&map_rule("A", "A.*", rules));
        let set = LegacyParser::verbatim().parse(doc.as_bytes()).expect("parse");

        assert_eq!(set.groups[0].rules, vec![BreakRule::new("", "", false)]);
    }

    #[test]
    fn whitespace_pattern_is_kept_verbatim() {
        let rules = r#"<void property="rules"><void method="add"><object class="org.omegat.core.segmentation.Rule">
<void property="beforebreak"><string> </string></void>
<void property="afterbreak"><string/></void>
<void property="breakRule"><boolean>true</boolean></void>
</object></void></void>"#;
        let doc = wrap(&map_rule("A", "A.*", rules));
        let set = LegacyParser::verbatim().parse(doc.as_bytes()).expect("parse");

        assert_eq!(set.groups[0].rules, vec![BreakRule::new(" ", "", true)]);
    }

    #[test]
    fn normalizes_localized_language_names() {
        let rules = format!(r#"<void property="rules">{}</void>"#, rule("。", "", true));
        let doc = wrap(&map_rule("日本語", "JA.*", &rules));
        let set = LegacyParser::default().parse(doc.as_bytes()).expect("parse");

        assert_eq!(set.map_rules, vec![MapRule::new("JA.*", "Japanese")]);
        assert_eq!(set.groups[0].name, "Japanese");
    }

    #[test]
    fn reads_document_flags() {
        let doc = r#"<java class="java.beans.XMLDecoder"><object class="org.omegat.core.segmentation.SRX">
<void property="cascade"><boolean>false</boolean></void>
<void property="includeStartingTags"><boolean>true</boolean></void>
<void property="segmentSubflows"><boolean>false</boolean></void>
<void property="version"><string>0.2.2</string></void>
</object></java>"#;
        let set = LegacyParser::verbatim().parse(doc.as_bytes()).expect("parse");

        assert_eq!(set.options.cascade, Some(false));
        assert_eq!(set.options.segment_subflows, Some(false));
        assert_eq!(set.options.include_starting_tags, Some(true));
        assert_eq!(set.options.include_ending_tags, None);
        assert_eq!(set.options.version.as_deref(), Some("0.2.2"));
        assert!(set.map_rules.is_empty());
    }

    #[test]
    fn unknown_property_is_rejected() {
        let doc = r#"<java><object class="org.omegat.core.segmentation.SRX"><void property="colour"><string>red</string></void></object></java>"#;
        let err = LegacyParser::verbatim().parse(doc.as_bytes()).expect_err("must fail");

        assert!(err.to_string().contains("unknown property 'colour'"));
    }
}
