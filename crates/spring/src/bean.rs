//! Bean definitions extracted from context XML.
//!
//! The original definition subtree is decomposed at parse time into an owned
//! property table, so a definition can answer property lookups long after
//! the document is gone. Only the shapes that URL-mapping resolution needs
//! are kept: scalar values, references to other beans, and string-to-string
//! property maps.

use std::collections::BTreeMap;

use roxmltree::Node;
use tracing::debug;

/// A declared property value. "Absent" is expressed by the lookup returning
/// `None`, which is distinct from an empty map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// A scalar string, from a `value` attribute or `<value>` child.
    Value(String),
    /// A reference to another bean by name.
    Ref(String),
    /// A name/value table, from a `<props>` child.
    Props(BTreeMap<String, String>),
}

/// One bean declaration. Every bean has at least a name and a class; beans
/// declared without `id` or `name` are keyed by their class name.
#[derive(Debug, Clone)]
pub struct BeanDefinition {
    name: String,
    class: String,
    properties: BTreeMap<String, PropertyValue>,
}

impl BeanDefinition {
    pub(crate) fn from_node(node: &Node<'_, '_>) -> Option<BeanDefinition> {
        let class = node
            .attribute("class")
            .map(|value| value.trim().to_string())
            .unwrap_or_default();
        let name = node
            .attribute("id")
            .or_else(|| node.attribute("name"))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| class.clone());
        if name.is_empty() {
            return None;
        }

        let mut properties = BTreeMap::new();
        for child in node.children().filter(|n| n.is_element()) {
            if child.tag_name().name() != "property" {
                continue;
            }
            let Some(property_name) = child.attribute("name") else {
                continue;
            };
            if let Some(value) = extract_property(&child) {
                properties.insert(property_name.to_string(), value);
            }
        }
        debug!("found bean \"{name}\" => {class}");

        Some(BeanDefinition {
            name,
            class,
            properties,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// The declared value of a property, or `None` when not declared.
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// A property as a scalar string; `None` for refs, maps, and absence.
    pub fn property_text(&self, name: &str) -> Option<&str> {
        match self.property(name)? {
            PropertyValue::Value(text) => Some(text),
            _ => None,
        }
    }

    /// A property as a name/value table. Accepts both an explicit `<props>`
    /// declaration and the delimited-pairs shorthand inside a scalar value.
    pub fn property_as_properties(&self, name: &str) -> Option<BTreeMap<String, String>> {
        match self.property(name)? {
            PropertyValue::Props(map) => Some(map.clone()),
            PropertyValue::Value(text) => Some(parse_delimited_pairs(text)),
            PropertyValue::Ref(_) => None,
        }
    }
}

fn extract_property(node: &Node<'_, '_>) -> Option<PropertyValue> {
    if let Some(value) = node.attribute("value") {
        return Some(PropertyValue::Value(value.to_string()));
    }
    if let Some(target) = node.attribute("ref") {
        return Some(PropertyValue::Ref(target.to_string()));
    }
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "value" => {
                return Some(PropertyValue::Value(
                    child.text().unwrap_or_default().to_string(),
                ));
            }
            "ref" => {
                let target = child
                    .attribute("bean")
                    .or_else(|| child.attribute("local"))
                    .unwrap_or_default();
                return Some(PropertyValue::Ref(target.to_string()));
            }
            "props" => {
                let mut map = BTreeMap::new();
                for prop in child.children().filter(|n| n.is_element()) {
                    if prop.tag_name().name() != "prop" {
                        continue;
                    }
                    if let Some(key) = prop.attribute("key") {
                        let value = prop.text().unwrap_or_default().trim().to_string();
                        map.insert(key.to_string(), value);
                    }
                }
                return Some(PropertyValue::Props(map));
            }
            _ => {}
        }
    }
    None
}

/// Parses the `java.util.Properties`-style shorthand: one `key=value` (or
/// `key:value`) pair per line, blank lines and comment lines ignored.
fn parse_delimited_pairs(text: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let Some(split) = line.find(['=', ':']) else {
            continue;
        };
        let key = line[..split].trim();
        let value = line[split + 1..].trim();
        if !key.is_empty() {
            map.insert(key.to_string(), value.to_string());
        }
    }
    map
}
