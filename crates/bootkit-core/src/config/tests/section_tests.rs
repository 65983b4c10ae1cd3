use serde::Deserialize;

use crate::config::{self, ConfigError};

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct DemoConfig {
    #[serde(default)]
    name: String,
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    interval: u64,
}

const DOC: &[u8] = br#"
demo:
  - name: ""
    enabled: true
  - name: ""
    enabled: true
other:
  - name: alpha
    enabled: false
    interval: 5
  - name: alpha
    enabled: true
"#;

#[test]
fn test_blank_names_are_derived_from_section_and_position() {
    let entries = config::section_entries::<DemoConfig>(DOC, "demo").expect("section should decode");
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["demo-0", "demo-1"]);
    assert!(entries.iter().all(|e| e.enabled));
    assert_eq!(entries[1].index, 1);
}

#[test]
fn test_colliding_names_get_index_suffix() {
    let entries = config::section_entries::<DemoConfig>(DOC, "other").unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "alpha-1"]);
    assert!(!entries[0].enabled);
    assert_eq!(entries[0].config.interval, 5);
}

#[test]
fn test_suffix_is_reapplied_until_unique() {
    let doc = br#"
x:
  - name: x-1
  - {}
  - name: x-1
"#;
    let entries = config::section_entries::<DemoConfig>(doc, "x").unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["x-1", "x-1-1", "x-1-2"]);
}

#[test]
fn test_only_blank_names_are_replaced() {
    let doc = br#"
ws:
  - name: "   "
  - name: " padded "
"#;
    let entries = config::section_entries::<DemoConfig>(doc, "ws").unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["ws-0", " padded "]);
}

#[test]
fn test_naming_is_deterministic() {
    let first = config::section_entries::<DemoConfig>(DOC, "demo").unwrap();
    let second = config::section_entries::<DemoConfig>(DOC, "demo").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_missing_section_is_empty() {
    let entries = config::section_entries::<DemoConfig>(DOC, "absent").unwrap();
    assert!(entries.is_empty());

    let entries = config::section_entries::<DemoConfig>(b"", "demo").unwrap();
    assert!(entries.is_empty(), "empty document has no sections");

    let entries = config::section_entries::<DemoConfig>(b"demo:\n", "demo").unwrap();
    assert!(entries.is_empty(), "null section has no entries");
}

#[test]
fn test_section_must_be_a_sequence() {
    let doc = b"demo:\n  name: single\n";
    match config::section_entries::<DemoConfig>(doc, "demo") {
        Err(ConfigError::Section { section, .. }) => assert_eq!(section, "demo"),
        other => panic!("Expected ConfigError::Section, got {:?}", other),
    }
}

#[test]
fn test_malformed_document_is_an_error() {
    let result = config::section_entries::<DemoConfig>(b"demo: [unclosed", "demo");
    assert!(matches!(result, Err(ConfigError::Yaml(_))));
    assert!(!config::has_section(b"demo: [unclosed", "demo"));
}

#[test]
fn test_scalar_document_is_rejected() {
    let result = config::section_entries::<DemoConfig>(b"42", "demo");
    assert!(matches!(result, Err(ConfigError::Invalid { .. })));
}

#[test]
fn test_has_section_and_section_raw() {
    assert!(config::has_section(DOC, "demo"));
    assert!(!config::has_section(DOC, "nope"));

    let raw = config::section_raw(DOC, "other").unwrap().expect("section present");
    let decoded: Vec<DemoConfig> = config::unmarshal(&raw).unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].name, "alpha");

    assert!(config::section_raw(DOC, "nope").unwrap().is_none());
}

#[test]
fn test_unmarshal_section() {
    let decoded: Option<Vec<DemoConfig>> = config::unmarshal_section(DOC, "demo").unwrap();
    assert_eq!(decoded.map(|v| v.len()), Some(2));

    let missing: Option<Vec<DemoConfig>> = config::unmarshal_section(DOC, "nope").unwrap();
    assert!(missing.is_none());
}
