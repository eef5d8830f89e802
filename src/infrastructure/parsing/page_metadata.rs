//! Page-level fallback fields read from `<title>` and `<meta>` tags

use scraper::{Html, Selector};

use super::{ParsingError, ParsingResult};

/// Fallback values used when structured data is missing or incomplete
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    /// Content of `<meta name="product">`, the only source of the export ID
    pub product_id: String,
}

pub struct PageMetadataExtractor {
    title: Selector,
    description: Selector,
    product_id: Selector,
}

impl PageMetadataExtractor {
    pub fn new() -> ParsingResult<Self> {
        Ok(Self {
            title: compile("title")?,
            description: compile(r#"meta[name="description"]"#)?,
            product_id: compile(r#"meta[name="product"]"#)?,
        })
    }

    pub fn extract(&self, document: &Html) -> PageMetadata {
        let title = document
            .select(&self.title)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        PageMetadata {
            title,
            description: self.meta_content(document, &self.description),
            product_id: self.meta_content(document, &self.product_id),
        }
    }

    fn meta_content(&self, document: &Html, selector: &Selector) -> String {
        document
            .select(selector)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(|content| content.trim().to_string())
            .unwrap_or_default()
    }
}

fn compile(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_title_description_and_product_id() {
        let html = r#"<html><head>
            <title>  Đèn bàn LED | Tiki </title>
            <meta name="description" content="  Đèn học chống cận  ">
            <meta name="product" content=" 27513497 ">
            </head></html>"#;

        let metadata = PageMetadataExtractor::new()
            .unwrap()
            .extract(&Html::parse_document(html));

        assert_eq!(metadata.title, "Đèn bàn LED | Tiki");
        assert_eq!(metadata.description, "Đèn học chống cận");
        assert_eq!(metadata.product_id, "27513497");
    }

    #[test]
    fn test_missing_tags_become_empty_strings() {
        let html = r#"<html><head><meta name="product"></head><body></body></html>"#;
        let metadata = PageMetadataExtractor::new()
            .unwrap()
            .extract(&Html::parse_document(html));
        assert_eq!(metadata, PageMetadata::default());
    }
}
