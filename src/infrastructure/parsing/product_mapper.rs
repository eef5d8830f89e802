//! Maps a JSON-LD product object plus page fallbacks onto an export row
//!
//! Every lookup is shape-tolerant: a missing key, a `null`, or a value of the
//! wrong type all read as "not present", so mapping never fails.

use serde_json::Value;

use super::page_metadata::PageMetadata;
use crate::domain::product_record::{ProductRecord, StockStatus};

const STRIKETHROUGH_SUFFIX: &str = "StrikethroughPrice";

pub struct ProductMapper;

impl ProductMapper {
    pub fn map(product: Option<&Value>, page: &PageMetadata) -> ProductRecord {
        let field = |key: &str| product.and_then(|p| p.get(key));
        let offers = field("offers").filter(|v| v.is_object());
        let offer_field = |key: &str| offers.and_then(|o| o.get(key));

        let name = field("name")
            .and_then(text_form)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| page.title.clone());

        let description = field("description")
            .and_then(text_form)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| page.description.clone())
            .trim()
            .to_string();

        let availability = offer_field("availability").and_then(Value::as_str);

        ProductRecord {
            id: page.product_id.clone(),
            sku: field("sku").and_then(text_form).unwrap_or_default(),
            name,
            description,
            images: image_url(field("image")),
            sale_price: offer_field("price").and_then(text_form).unwrap_or_default(),
            regular_price: strikethrough_price(offer_field("priceSpecification")),
            sale_price_end_date: offer_field("priceValidUntil")
                .and_then(text_form)
                .unwrap_or_default(),
            in_stock: StockStatus::from_availability(availability)
                .as_export_value()
                .to_string(),
            ..ProductRecord::default()
        }
    }
}

/// Cell text for a JSON value; `null` is absent
pub fn text_form(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

fn image_url(image: Option<&Value>) -> String {
    match image {
        Some(Value::Object(map)) => map.get("url").and_then(text_form).unwrap_or_default(),
        Some(Value::String(url)) => url.clone(),
        _ => String::new(),
    }
}

fn strikethrough_price(price_spec: Option<&Value>) -> String {
    let Some(price_spec) = price_spec.filter(|v| v.is_object()) else {
        return String::new();
    };

    let is_strikethrough = price_spec
        .get("priceType")
        .and_then(Value::as_str)
        .is_some_and(|t| t.ends_with(STRIKETHROUGH_SUFFIX));

    if is_strikethrough {
        price_spec.get("price").and_then(text_form).unwrap_or_default()
    } else {
        String::new()
    }
}
