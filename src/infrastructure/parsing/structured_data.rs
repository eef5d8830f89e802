//! JSON-LD extraction
//!
//! Collects every `application/ld+json` block of a document into a flat list
//! of candidate objects and picks the one describing a product.

#![allow(clippy::uninlined_format_args)]

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};

use super::{ParsingError, ParsingResult};

const LD_JSON_CONTENT_TYPE: &str = "application/ld+json";
const GRAPH_KEY: &str = "@graph";
const TYPE_KEY: &str = "@type";
const PRODUCT_TYPE: &str = "product";

/// Extracts linked-data objects from an HTML document
pub struct StructuredDataExtractor {
    script_selector: Selector,
}

impl StructuredDataExtractor {
    pub fn new() -> ParsingResult<Self> {
        let selector = "script[type]";
        let script_selector =
            Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, e))?;
        Ok(Self { script_selector })
    }

    /// All candidate objects in document order, then intra-block order.
    /// Malformed blocks are skipped.
    pub fn extract(&self, document: &Html) -> Vec<Value> {
        let mut objects = Vec::new();

        for (index, script) in document
            .select(&self.script_selector)
            .filter(|script| {
                script
                    .value()
                    .attr("type")
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case(LD_JSON_CONTENT_TYPE))
            })
            .enumerate()
        {
            let raw: String = script.text().collect();
            if raw.trim().is_empty() {
                continue;
            }

            match parse_block(&raw) {
                Some(value) => flatten_into(value, &mut objects),
                None => warn!("Skipping unparsable JSON-LD block #{}", index + 1),
            }
        }

        debug!("Extracted {} JSON-LD objects", objects.len());
        objects
    }

    /// First object whose `@type` is "product" (any case), alone or within a list
    pub fn select_product(objects: &[Value]) -> Option<&Value> {
        objects.iter().find(|object| is_product(object))
    }
}

fn parse_block(raw: &str) -> Option<Value> {
    serde_json::from_str(raw).ok().or_else(|| {
        let trimmed = raw.trim().trim_start_matches('\u{feff}');
        serde_json::from_str(trimmed).ok()
    })
}

fn flatten_into(value: Value, objects: &mut Vec<Value>) {
    match value {
        Value::Object(mut map) if map.get(GRAPH_KEY).is_some_and(Value::is_array) => {
            if let Some(Value::Array(items)) = map.remove(GRAPH_KEY) {
                objects.extend(items);
            }
        }
        Value::Array(items) => objects.extend(items),
        other => objects.push(other),
    }
}

fn is_product(object: &Value) -> bool {
    let matches = |tag: &str| tag.eq_ignore_ascii_case(PRODUCT_TYPE);
    match object.get(TYPE_KEY) {
        Some(Value::String(tag)) => matches(tag),
        Some(Value::Array(tags)) => tags.iter().filter_map(Value::as_str).any(matches),
        _ => false,
    }
}
