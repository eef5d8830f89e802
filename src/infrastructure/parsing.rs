//! HTML parsing infrastructure
//!
//! Product detail pages are read through their embedded JSON-LD, with
//! `<title>` and `<meta>` tags as fallbacks.

pub mod error;
pub mod page_metadata;
pub mod product_mapper;
pub mod product_page_parser;
pub mod structured_data;

pub use error::{ParsingError, ParsingResult};
pub use page_metadata::{PageMetadata, PageMetadataExtractor};
pub use product_mapper::{ProductMapper, text_form};
pub use product_page_parser::ProductPageParser;
pub use structured_data::StructuredDataExtractor;
