//! Extraction and dedup throughput
//!
//! A full product page parse (JSON-LD extraction + mapping) runs once per
//! URL inside the worker pool; dedup runs once over the whole discovery set.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use product_export_crawler::domain::dedup_urls;
use product_export_crawler::infrastructure::ProductPageParser;

fn product_page() -> String {
    let breadcrumbs: String = (0..20)
        .map(|i| format!(r#"{{"@type":"ListItem","position":{i},"name":"Mục {i}"}}"#))
        .collect::<Vec<_>>()
        .join(",");
    let filler = "<div class=\"product-info\"><span>Thông tin chi tiết</span></div>".repeat(400);

    format!(
        r#"<!DOCTYPE html><html><head>
        <title>Đèn bàn LED chống cận | Tiki</title>
        <meta name="description" content="Đèn bàn học sinh">
        <meta name="product" content="27513497">
        <script type="application/ld+json">{{"@graph":[{{"@type":"BreadcrumbList","itemListElement":[{breadcrumbs}]}}]}}</script>
        <script type="application/ld+json">{{"@type":"Product","name":"Đèn bàn LED","sku":"4711",
          "image":{{"url":"https://salt.tikicdn.com/cache/280x280/ts/product/lamp.jpg"}},
          "offers":{{"price":199000,"priceValidUntil":"2026-12-31",
            "availability":"https://schema.org/InStock",
            "priceSpecification":{{"priceType":"https://schema.org/StrikethroughPrice","price":259000}}}}}}</script>
        </head><body>{filler}</body></html>"#
    )
}

fn extraction(c: &mut Criterion) {
    let parser = ProductPageParser::new().unwrap();
    let html = product_page();

    c.bench_function("parse product page", |b| {
        b.iter(|| black_box(parser.parse(black_box(&html)).unwrap()))
    });
}

fn dedup(c: &mut Criterion) {
    let raw: Vec<String> = (0..10_000)
        .map(|i| format!("https://tiki.vn/san-pham-p{}.html?spid={}&src=category", i % 2_500, i))
        .collect();

    c.bench_function("dedup 10k discovered urls", |b| {
        b.iter(|| black_box(dedup_urls(black_box(&raw))))
    });
}

criterion_group!(benches, extraction, dedup);
criterion_main!(benches);
