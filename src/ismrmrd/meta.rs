//! Image attribute strings (`ismrmrdMeta` documents).

use std::collections::BTreeMap;

use super::xml::XmlNode;
use crate::error::{Error, Result};

/// Image meta attributes: every name maps to one or more string values.
pub type Meta = BTreeMap<String, Vec<String>>;

const ROOT: &str = "ismrmrdMeta";

/// parse an attribute string; an empty string is an empty map
pub fn parse_meta(attributes: &str) -> Result<Meta> {
    let mut meta = Meta::new();
    if attributes.trim().is_empty() {
        return Ok(meta);
    }
    let root = XmlNode::parse(attributes)?;
    if root.name != ROOT {
        return Err(Error::MalformedXml(format!("expected <{ROOT}>, found <{}>", root.name)));
    }
    for entry in root.children_named("meta") {
        let name = entry.child("name").ok_or_else(|| Error::MissingElement {
            parent: entry.name.clone(),
            element: "name",
        })?;
        meta.entry(name.text.clone())
            .or_default()
            .extend(entry.children_named("value").map(|v| v.text.clone()));
    }
    Ok(meta)
}

/// serialize meta attributes; an empty map is an empty string
pub fn serialize_meta(meta: &Meta) -> Result<String> {
    if meta.is_empty() {
        return Ok(String::new());
    }
    let mut root = XmlNode::new(ROOT);
    for (name, values) in meta {
        let mut entry = XmlNode::new("meta");
        entry.children.push(XmlNode::leaf("name", name.as_str()));
        entry
            .children
            .extend(values.iter().map(|v| XmlNode::leaf("value", v.as_str())));
        root.children.push(entry);
    }
    root.to_document(&[])
}
