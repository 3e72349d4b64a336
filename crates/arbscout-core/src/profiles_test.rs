use std::io::Write;

use super::*;

fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write yaml");
    file
}

#[test]
fn builtin_profiles_have_multiple_card_alternatives() {
    let set = ProfileSet::builtin();
    for m in Marketplace::ALL {
        let profile = set.get(m);
        assert_eq!(profile.marketplace, m);
        assert!(
            profile.cards.len() >= 3,
            "{m} should carry several card fallbacks"
        );
        assert!(profile.title.len() >= 3);
        assert!(!profile.price.is_empty());
    }
}

#[test]
fn builtin_profiles_pass_validation() {
    let file = ProfilesFile {
        marketplaces: vec![MarketplaceProfile::wholesale(), MarketplaceProfile::retail()],
    };
    validate_profiles(&file).expect("built-in profiles must be valid");
}

#[test]
fn search_url_form_encodes_term() {
    let url = MarketplaceProfile::retail()
        .search_url("wireless earbuds & case")
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://www.amazon.com/s?k=wireless+earbuds+%26+case"
    );
}

#[test]
fn wholesale_search_url_uses_trade_search() {
    let url = MarketplaceProfile::wholesale()
        .search_url("yoga mat")
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://www.alibaba.com/trade/search?SearchText=yoga+mat"
    );
}

#[test]
fn validate_rejects_duplicate_marketplace() {
    let file = ProfilesFile {
        marketplaces: vec![MarketplaceProfile::retail(), MarketplaceProfile::retail()],
    };
    let err = validate_profiles(&file).unwrap_err();
    assert!(err.to_string().contains("duplicate profile"));
}

#[test]
fn validate_rejects_relative_base_url() {
    let mut profile = MarketplaceProfile::retail();
    profile.base_url = "/amazon".to_string();
    let file = ProfilesFile {
        marketplaces: vec![profile],
    };
    let err = validate_profiles(&file).unwrap_err();
    assert!(err.to_string().contains("absolute http(s) URL"));
}

#[test]
fn validate_rejects_empty_card_chain() {
    let mut profile = MarketplaceProfile::wholesale();
    profile.cards.clear();
    let file = ProfilesFile {
        marketplaces: vec![profile],
    };
    assert!(matches!(
        validate_profiles(&file),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn validate_rejects_blank_field_selector() {
    let mut profile = MarketplaceProfile::wholesale();
    profile.price.push(FieldRule::text("  "));
    let file = ProfilesFile {
        marketplaces: vec![profile],
    };
    let err = validate_profiles(&file).unwrap_err();
    assert!(err.to_string().contains("blank selector"));
}

#[test]
fn load_profiles_overrides_only_listed_marketplace() {
    let file = write_yaml(
        r#"
marketplaces:
  - marketplace: retail
    base_url: https://shop.example.com
    search_path: /search
    query_param: q
    cards: [".result", ".tile"]
    title:
      - css: ".name"
      - css: "img"
        attr: alt
    price:
      - css: ".amount"
        prefix: "$"
"#,
    );

    let set = load_profiles(file.path()).expect("valid yaml");
    let retail = set.get(Marketplace::Retail);
    assert_eq!(retail.base_url, "https://shop.example.com");
    assert_eq!(retail.cards, vec![".result", ".tile"]);
    assert_eq!(retail.title[1].attr.as_deref(), Some("alt"));
    assert_eq!(retail.price[0].prefix.as_deref(), Some("$"));
    assert!(retail.link.is_empty());
    assert_eq!(
        set.get(Marketplace::Wholesale),
        &MarketplaceProfile::wholesale()
    );
}

#[test]
fn load_profiles_reports_missing_file() {
    let err = load_profiles(Path::new("/definitely/not/here.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::ProfilesFileIo { .. }));
}

#[test]
fn load_profiles_reports_parse_error() {
    let file = write_yaml("marketplaces: [ { marketplace: auction } ]");
    let err = load_profiles(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ProfilesFileParse(_)));
}
