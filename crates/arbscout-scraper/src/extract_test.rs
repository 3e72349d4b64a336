use arbscout_core::{Marketplace, PRICE_SENTINEL};

use super::*;

fn base() -> Url {
    Url::parse("https://www.amazon.com").unwrap()
}

const RETAIL_CARD: &str = r#"
<div data-component-type="s-search-result" data-asin="B01">
  <h2><a href="/dp/B01?ref=sr_1"><span>  Wireless   Earbuds
     Pro </span></a></h2>
  <span class="a-price"><span class="a-offscreen">$29.99</span></span>
</div>"#;

fn page(cards: &str) -> String {
    format!("<html><body><div class=\"s-main-slot\">{cards}</div></body></html>")
}

#[test]
fn retail_card_fields_are_extracted_and_normalized() {
    let profile = MarketplaceProfile::retail();
    let out = extract_cards(
        &page(RETAIL_CARD),
        "[data-component-type='s-search-result']",
        &profile,
        &base(),
        10,
    );

    assert_eq!(out.records.len(), 1);
    let record = &out.records[0];
    assert_eq!(record.source(), Marketplace::Retail);
    assert_eq!(record.title(), "Wireless Earbuds Pro");
    assert_eq!(record.price(), "$29.99");
    assert_eq!(record.url(), Some("https://www.amazon.com/dp/B01?ref=sr_1"));
    assert!(record.moq().is_none());
}

#[test]
fn whole_price_fallback_gets_currency_prefix() {
    let html = page(
        r#"<div class="s-card-container">
             <h2><span class="a-text-normal">Earbuds</span></h2>
             <span class="a-price-whole">19.</span>
           </div>"#,
    );
    let out = extract_cards(&html, ".s-card-container", &MarketplaceProfile::retail(), &base(), 5);
    assert_eq!(out.records[0].price(), "$19");
}

#[test]
fn missing_price_keeps_card_with_sentinel() {
    let html = page(r#"<div class="card"><h2>No Price Here</h2></div>"#);
    let out = extract_cards(&html, ".card", &MarketplaceProfile::retail(), &base(), 5);
    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].price(), PRICE_SENTINEL);
}

#[test]
fn untitled_card_is_dropped_without_affecting_others() {
    let html = page(
        r#"<div class="card"><h2>First</h2></div>
           <div class="card"><span class="a-price"><span class="a-offscreen">$1</span></span></div>
           <div class="card"><h2>   </h2></div>
           <div class="card"><h2>Second</h2></div>"#,
    );
    let out = extract_cards(&html, ".card", &MarketplaceProfile::retail(), &base(), 10);

    let titles: Vec<&str> = out.records.iter().map(ProductRecord::title).collect();
    assert_eq!(titles, vec!["First", "Second"]);
    assert_eq!(out.dropped, 2);
    assert_eq!(out.cards_seen, 4);
}

#[test]
fn max_results_caps_records() {
    let cards: String = (0..8)
        .map(|i| format!(r#"<div class="card"><h2>Item {i}</h2></div>"#))
        .collect();
    let out = extract_cards(&page(&cards), ".card", &MarketplaceProfile::retail(), &base(), 3);
    assert_eq!(out.records.len(), 3);
    assert_eq!(out.records[2].title(), "Item 2");
}

#[test]
fn title_chain_falls_through_to_attribute_rule() {
    let html = page(r#"<div class="card"><img class="s-image" alt="Image Alt Title"></div>"#);
    let out = extract_cards(&html, ".card", &MarketplaceProfile::retail(), &base(), 5);
    assert_eq!(out.records[0].title(), "Image Alt Title");
}

#[test]
fn wholesale_card_reads_supplier_attributes() {
    let html = page(
        r#"<div class="fy23-search-card">
             <div class="search-card-e-title"><a href="//www.alibaba.com/product-detail/x_1.html">
               <span>TWS Earbuds OEM</span></a></div>
             <div class="search-card-e-price-main">$2.10-$3.50</div>
             <div class="search-card-m-sale-features__item">Min. order: 500 pieces</div>
             <a class="search-card-e-company">Shenzhen Audio Co., Ltd.</a>
             <span class="search-card-e-supplier__year">7 yrs</span>
           </div>"#,
    );
    let wholesale_base = Url::parse("https://www.alibaba.com").unwrap();
    let out = extract_cards(
        &html,
        ".fy23-search-card",
        &MarketplaceProfile::wholesale(),
        &wholesale_base,
        10,
    );

    let record = &out.records[0];
    assert_eq!(record.source(), Marketplace::Wholesale);
    assert_eq!(record.title(), "TWS Earbuds OEM");
    assert_eq!(record.price(), "$2.10-$3.50");
    assert_eq!(
        record.url(),
        Some("https://www.alibaba.com/product-detail/x_1.html")
    );
    assert_eq!(record.moq(), Some("Min. order: 500 pieces"));
    assert_eq!(record.seller_name(), Some("Shenzhen Audio Co., Ltd."));
    assert_eq!(record.seller_years(), Some("7 yrs"));
}

#[test]
fn invalid_field_selector_is_skipped_not_fatal() {
    let mut profile = MarketplaceProfile::retail();
    profile.title.insert(0, FieldRule::text("h2[[["));
    let html = page(r#"<div class="card"><h2>Still Found</h2></div>"#);
    let out = extract_cards(&html, ".card", &profile, &base(), 5);
    assert_eq!(out.records[0].title(), "Still Found");
}

#[test]
fn invalid_card_selector_yields_nothing() {
    let out = extract_cards(&page(RETAIL_CARD), "div[[", &MarketplaceProfile::retail(), &base(), 5);
    assert!(out.records.is_empty());
    assert_eq!(out.cards_seen, 0);
}

#[test]
fn absolutize_handles_relative_absolute_and_junk() {
    let b = base();
    assert_eq!(
        absolutize(&b, "/dp/X1").as_deref(),
        Some("https://www.amazon.com/dp/X1")
    );
    assert_eq!(
        absolutize(&b, "https://other.example/p").as_deref(),
        Some("https://other.example/p")
    );
    assert!(absolutize(&b, "javascript:void(0)").is_none());
    assert!(absolutize(&b, "#").is_none());
    assert!(absolutize(&b, "  ").is_none());
}
