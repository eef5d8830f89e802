//! Export-ready product row
//!
//! One named slot per WooCommerce import column. The column order in
//! [`ExportField::ALL`] is the order every exported table must use.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Columns of the product import schema, in export order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportField {
    Id,
    Type,
    Sku,
    Name,
    Published,
    IsFeatured,
    VisibilityInCatalog,
    ShortDescription,
    Description,
    SalePriceStartDate,
    SalePriceEndDate,
    TaxStatus,
    TaxClass,
    InStock,
    Stock,
    LowStockAmount,
    BackordersAllowed,
    SoldIndividually,
    WeightKg,
    LengthCm,
    WidthCm,
    HeightCm,
    AllowCustomerReviews,
    PurchaseNote,
    SalePrice,
    RegularPrice,
    Categories,
    Tags,
    ShippingClass,
    Images,
    DownloadLimit,
    DownloadExpiryDays,
    Parent,
    GroupedProducts,
    Upsells,
    CrossSells,
    ExternalUrl,
    ButtonText,
    Position,
}

impl ExportField {
    pub const COUNT: usize = 39;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Id,
        Self::Type,
        Self::Sku,
        Self::Name,
        Self::Published,
        Self::IsFeatured,
        Self::VisibilityInCatalog,
        Self::ShortDescription,
        Self::Description,
        Self::SalePriceStartDate,
        Self::SalePriceEndDate,
        Self::TaxStatus,
        Self::TaxClass,
        Self::InStock,
        Self::Stock,
        Self::LowStockAmount,
        Self::BackordersAllowed,
        Self::SoldIndividually,
        Self::WeightKg,
        Self::LengthCm,
        Self::WidthCm,
        Self::HeightCm,
        Self::AllowCustomerReviews,
        Self::PurchaseNote,
        Self::SalePrice,
        Self::RegularPrice,
        Self::Categories,
        Self::Tags,
        Self::ShippingClass,
        Self::Images,
        Self::DownloadLimit,
        Self::DownloadExpiryDays,
        Self::Parent,
        Self::GroupedProducts,
        Self::Upsells,
        Self::CrossSells,
        Self::ExternalUrl,
        Self::ButtonText,
        Self::Position,
    ];

    /// Column header as written to the export table
    pub const fn header(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Type => "Type",
            Self::Sku => "SKU",
            Self::Name => "Name",
            Self::Published => "Published",
            Self::IsFeatured => "Is-featured",
            Self::VisibilityInCatalog => "Visibility-in-catalog",
            Self::ShortDescription => "Short-description",
            Self::Description => "Description",
            Self::SalePriceStartDate => "Sale-price-start-date",
            Self::SalePriceEndDate => "Sale-price-end-date",
            Self::TaxStatus => "Tax-status",
            Self::TaxClass => "Tax-class",
            Self::InStock => "In-stock",
            Self::Stock => "Stock",
            Self::LowStockAmount => "Low-stock-amount",
            Self::BackordersAllowed => "Backorders-allowed",
            Self::SoldIndividually => "Sold-individually",
            Self::WeightKg => "Weight-kg",
            Self::LengthCm => "Length-cm",
            Self::WidthCm => "Width-cm",
            Self::HeightCm => "Height-cm",
            Self::AllowCustomerReviews => "Allow-customer-reviews",
            Self::PurchaseNote => "Purchase-note",
            Self::SalePrice => "Sale-price",
            Self::RegularPrice => "Regular-price",
            Self::Categories => "Categories",
            Self::Tags => "Tags",
            Self::ShippingClass => "Shipping-class",
            Self::Images => "Images",
            Self::DownloadLimit => "Download-limit",
            Self::DownloadExpiryDays => "Download-expiry-days",
            Self::Parent => "Parent",
            Self::GroupedProducts => "Grouped-products",
            Self::Upsells => "Upsells",
            Self::CrossSells => "Cross-sells",
            Self::ExternalUrl => "External-URL",
            Self::ButtonText => "Button-text",
            Self::Position => "Position",
        }
    }

    /// Fixed default for the column: a simple, physical, published, taxable,
    /// single-item product. Scraped columns default to empty.
    pub const fn default_value(self) -> &'static str {
        match self {
            Self::Type => "simple",
            Self::Published => "1",
            Self::IsFeatured => "0",
            Self::VisibilityInCatalog => "visible",
            Self::TaxStatus => "taxable",
            Self::BackordersAllowed => "no",
            Self::SoldIndividually => "no",
            Self::AllowCustomerReviews => "1",
            Self::Position => "0",
            _ => "",
        }
    }

    /// All headers in export order
    pub fn headers() -> [&'static str; Self::COUNT] {
        Self::ALL.map(Self::header)
    }
}

impl fmt::Display for ExportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Stock availability derived from a schema.org availability URL.
///
/// Missing availability stays [`StockStatus::Unknown`] and exports as an empty
/// cell so importers keep their own default instead of marking it out of stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StockStatus {
    InStock,
    OutOfStock,
    #[default]
    Unknown,
}

impl StockStatus {
    /// `https://schema.org/InStock` → `InStock`; any other final segment → `OutOfStock`;
    /// absent or empty → `Unknown`.
    pub fn from_availability(availability: Option<&str>) -> Self {
        match availability.map(str::trim) {
            None | Some("") => Self::Unknown,
            Some(url) => {
                let last_segment = url.rsplit('/').next().unwrap_or(url);
                if last_segment.eq_ignore_ascii_case("instock") {
                    Self::InStock
                } else {
                    Self::OutOfStock
                }
            }
        }
    }

    pub const fn as_export_value(self) -> &'static str {
        match self {
            Self::InStock => "1",
            Self::OutOfStock => "0",
            Self::Unknown => "",
        }
    }
}

/// One scraped product, every export column present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub product_type: String,
    pub sku: String,
    pub name: String,
    pub published: String,
    pub is_featured: String,
    pub visibility_in_catalog: String,
    pub short_description: String,
    pub description: String,
    pub sale_price_start_date: String,
    pub sale_price_end_date: String,
    pub tax_status: String,
    pub tax_class: String,
    pub in_stock: String,
    pub stock: String,
    pub low_stock_amount: String,
    pub backorders_allowed: String,
    pub sold_individually: String,
    pub weight_kg: String,
    pub length_cm: String,
    pub width_cm: String,
    pub height_cm: String,
    pub allow_customer_reviews: String,
    pub purchase_note: String,
    pub sale_price: String,
    pub regular_price: String,
    pub categories: String,
    pub tags: String,
    pub shipping_class: String,
    pub images: String,
    pub download_limit: String,
    pub download_expiry_days: String,
    pub parent: String,
    pub grouped_products: String,
    pub upsells: String,
    pub cross_sells: String,
    pub external_url: String,
    pub button_text: String,
    pub position: String,
}

impl Default for ProductRecord {
    fn default() -> Self {
        let d = |field: ExportField| field.default_value().to_string();
        Self {
            id: d(ExportField::Id),
            product_type: d(ExportField::Type),
            sku: d(ExportField::Sku),
            name: d(ExportField::Name),
            published: d(ExportField::Published),
            is_featured: d(ExportField::IsFeatured),
            visibility_in_catalog: d(ExportField::VisibilityInCatalog),
            short_description: d(ExportField::ShortDescription),
            description: d(ExportField::Description),
            sale_price_start_date: d(ExportField::SalePriceStartDate),
            sale_price_end_date: d(ExportField::SalePriceEndDate),
            tax_status: d(ExportField::TaxStatus),
            tax_class: d(ExportField::TaxClass),
            in_stock: d(ExportField::InStock),
            stock: d(ExportField::Stock),
            low_stock_amount: d(ExportField::LowStockAmount),
            backorders_allowed: d(ExportField::BackordersAllowed),
            sold_individually: d(ExportField::SoldIndividually),
            weight_kg: d(ExportField::WeightKg),
            length_cm: d(ExportField::LengthCm),
            width_cm: d(ExportField::WidthCm),
            height_cm: d(ExportField::HeightCm),
            allow_customer_reviews: d(ExportField::AllowCustomerReviews),
            purchase_note: d(ExportField::PurchaseNote),
            sale_price: d(ExportField::SalePrice),
            regular_price: d(ExportField::RegularPrice),
            categories: d(ExportField::Categories),
            tags: d(ExportField::Tags),
            shipping_class: d(ExportField::ShippingClass),
            images: d(ExportField::Images),
            download_limit: d(ExportField::DownloadLimit),
            download_expiry_days: d(ExportField::DownloadExpiryDays),
            parent: d(ExportField::Parent),
            grouped_products: d(ExportField::GroupedProducts),
            upsells: d(ExportField::Upsells),
            cross_sells: d(ExportField::CrossSells),
            external_url: d(ExportField::ExternalUrl),
            button_text: d(ExportField::ButtonText),
            position: d(ExportField::Position),
        }
    }
}

impl ProductRecord {
    /// Value of a single column
    pub fn get(&self, field: ExportField) -> &str {
        match field {
            ExportField::Id => &self.id,
            ExportField::Type => &self.product_type,
            ExportField::Sku => &self.sku,
            ExportField::Name => &self.name,
            ExportField::Published => &self.published,
            ExportField::IsFeatured => &self.is_featured,
            ExportField::VisibilityInCatalog => &self.visibility_in_catalog,
            ExportField::ShortDescription => &self.short_description,
            ExportField::Description => &self.description,
            ExportField::SalePriceStartDate => &self.sale_price_start_date,
            ExportField::SalePriceEndDate => &self.sale_price_end_date,
            ExportField::TaxStatus => &self.tax_status,
            ExportField::TaxClass => &self.tax_class,
            ExportField::InStock => &self.in_stock,
            ExportField::Stock => &self.stock,
            ExportField::LowStockAmount => &self.low_stock_amount,
            ExportField::BackordersAllowed => &self.backorders_allowed,
            ExportField::SoldIndividually => &self.sold_individually,
            ExportField::WeightKg => &self.weight_kg,
            ExportField::LengthCm => &self.length_cm,
            ExportField::WidthCm => &self.width_cm,
            ExportField::HeightCm => &self.height_cm,
            ExportField::AllowCustomerReviews => &self.allow_customer_reviews,
            ExportField::PurchaseNote => &self.purchase_note,
            ExportField::SalePrice => &self.sale_price,
            ExportField::RegularPrice => &self.regular_price,
            ExportField::Categories => &self.categories,
            ExportField::Tags => &self.tags,
            ExportField::ShippingClass => &self.shipping_class,
            ExportField::Images => &self.images,
            ExportField::DownloadLimit => &self.download_limit,
            ExportField::DownloadExpiryDays => &self.download_expiry_days,
            ExportField::Parent => &self.parent,
            ExportField::GroupedProducts => &self.grouped_products,
            ExportField::Upsells => &self.upsells,
            ExportField::CrossSells => &self.cross_sells,
            ExportField::ExternalUrl => &self.external_url,
            ExportField::ButtonText => &self.button_text,
            ExportField::Position => &self.position,
        }
    }

    /// Row values in export order
    pub fn values(&self) -> [&str; ExportField::COUNT] {
        ExportField::ALL.map(|field| self.get(field))
    }
}
