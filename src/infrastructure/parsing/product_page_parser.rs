//! Product detail page parser: document → structured data → export row

#![allow(clippy::uninlined_format_args)]

use scraper::Html;
use tracing::debug;

use super::page_metadata::PageMetadataExtractor;
use super::product_mapper::ProductMapper;
use super::structured_data::StructuredDataExtractor;
use super::{ParsingError, ParsingResult};
use crate::domain::product_record::ProductRecord;

/// Compiles its selectors once; shared across worker tasks behind an `Arc`
pub struct ProductPageParser {
    structured_data: StructuredDataExtractor,
    metadata: PageMetadataExtractor,
}

impl ProductPageParser {
    pub fn new() -> ParsingResult<Self> {
        Ok(Self {
            structured_data: StructuredDataExtractor::new()?,
            metadata: PageMetadataExtractor::new()?,
        })
    }

    /// Parse one product document into an export row.
    ///
    /// `scraper::Html` is not `Send`; the parsed tree must not be held across
    /// an await point.
    pub fn parse(&self, html: &str) -> ParsingResult<ProductRecord> {
        if html.trim().is_empty() {
            return Err(ParsingError::EmptyDocument);
        }

        let document = Html::parse_document(html);
        let objects = self.structured_data.extract(&document);
        let product = StructuredDataExtractor::select_product(&objects);
        let metadata = self.metadata.extract(&document);

        if product.is_none() {
            debug!("No Product object among {} JSON-LD objects, using page metadata", objects.len());
        }

        Ok(ProductMapper::map(product, &metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAMP_PAGE: &str = r#"<!DOCTYPE html>
<html lang="vi">
<head>
  <title>Đèn bàn Lamp | Tiki</title>
  <meta name="description" content="Mua đèn bàn giá tốt">
  <meta name="product" content="27513497">
  <script type="application/ld+json">
    {"@context":"https://schema.org","@graph":[{"@type":"BreadcrumbList","itemListElement":[]}]}
  </script>
  <script type="application/ld+json">
    {"@type":"Product","name":"Lamp","sku":"SKU1",
     "offers":{"price":"199000","availability":"https://schema.org/InStock"}}
  </script>
</head>
<body></body>
</html>"#;

    #[test]
    fn test_parse_lamp_page() {
        let parser = ProductPageParser::new().unwrap();
        let record = parser.parse(LAMP_PAGE).unwrap();

        assert_eq!(record.id, "27513497");
        assert_eq!(record.name, "Lamp");
        assert_eq!(record.sku, "SKU1");
        assert_eq!(record.sale_price, "199000");
        assert_eq!(record.in_stock, "1");
        assert_eq!(record.description, "Mua đèn bàn giá tốt");
        assert_eq!(record.product_type, "simple");
        assert_eq!(record.position, "0");
    }

    #[test]
    fn test_page_without_structured_data() {
        let parser = ProductPageParser::new().unwrap();
        let record = parser
            .parse("<html><head><title>Chỉ có tiêu đề</title></head></html>")
            .unwrap();

        assert_eq!(record.name, "Chỉ có tiêu đề");
        assert_eq!(record.in_stock, "");
        assert_eq!(record.published, "1");
    }

    #[test]
    fn test_empty_document_is_an_error() {
        let parser = ProductPageParser::new().unwrap();
        assert_eq!(parser.parse("  \n "), Err(ParsingError::EmptyDocument));
    }
}
