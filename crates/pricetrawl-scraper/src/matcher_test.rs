use serde_json::json;

use super::*;

const ORIGIN: &str = "https://shop.example/api/catalog";

fn matcher() -> ProductMatcher {
    ProductMatcher::new(ExtractRules::default())
}

fn match_one(value: &Value, origin: &str) -> Option<Item> {
    let obj = value.as_object().expect("fixture must be an object");
    matcher().match_object(obj, &LinkResolver::new(origin))
}

// -----------------------------------------------------------------------
// match_object: name and price gate
// -----------------------------------------------------------------------

#[test]
fn rejects_object_without_name() {
    assert!(match_one(&json!({"price": 10, "url": "/p/1"}), ORIGIN).is_none());
}

#[test]
fn rejects_object_with_blank_name() {
    assert!(match_one(&json!({"name": "   ", "price": 10}), ORIGIN).is_none());
}

#[test]
fn rejects_object_without_price() {
    assert!(match_one(&json!({"name": "Milk", "url": "/p/1"}), ORIGIN).is_none());
}

#[test]
fn rejects_object_with_non_positive_price() {
    assert!(match_one(&json!({"name": "Milk", "price": 0}), ORIGIN).is_none());
}

#[test]
fn skips_blank_name_key_and_uses_next_synonym() {
    let item = match_one(
        &json!({"name": "", "title": "Rye  bread\n", "price": "59"}),
        ORIGIN,
    )
    .unwrap();
    assert_eq!(item.name(), "Rye bread");
}

#[test]
fn skips_non_string_name_key() {
    let item = match_one(
        &json!({"name": {"ru": "Хлеб"}, "displayName": "Bread", "price": 59}),
        ORIGIN,
    )
    .unwrap();
    assert_eq!(item.name(), "Bread");
}

// -----------------------------------------------------------------------
// match_object: link fallback chain
// -----------------------------------------------------------------------

#[test]
fn resolves_relative_link_against_origin() {
    let item = match_one(
        &json!({"title": "Milk", "price": 89.9, "url": "/p/123"}),
        "https://shop.example",
    )
    .unwrap();
    assert_eq!(item.url(), "https://shop.example/p/123");
}

#[test]
fn keeps_absolute_link() {
    let item = match_one(
        &json!({"title": "Milk", "price": 89.9, "productUrl": "https://m.shop.example/p/1"}),
        ORIGIN,
    )
    .unwrap();
    assert_eq!(item.url(), "https://m.shop.example/p/1");
}

#[test]
fn link_keys_are_probed_in_order() {
    let item = match_one(
        &json!({"title": "Milk", "price": 89.9, "slug": "/milk", "href": "/catalog/milk"}),
        ORIGIN,
    )
    .unwrap();
    assert_eq!(item.url(), "https://shop.example/catalog/milk");
}

#[test]
fn synthesizes_search_url_from_string_id() {
    let item = match_one(
        &json!({"title": "Milk", "price": 89.9, "sku": "MLK 3.2"}),
        ORIGIN,
    )
    .unwrap();
    assert_eq!(item.url(), "https://shop.example/search/?q=MLK%203.2");
}

#[test]
fn synthesizes_search_url_from_numeric_id() {
    let item = match_one(&json!({"title": "Milk", "price": 89.9, "id": 1042}), ORIGIN).unwrap();
    assert_eq!(item.url(), "https://shop.example/search/?q=1042");
}

#[test]
fn falls_back_to_payload_url_without_link_or_id() {
    let item = match_one(
        &json!({"title": "Milk", "price": 89.9}),
        "https://api.example/cat",
    )
    .unwrap();
    assert_eq!(item.url(), "https://api.example/cat");
}

#[test]
fn falls_back_to_payload_url_when_origin_unparsable() {
    let item = match_one(
        &json!({"title": "Milk", "price": 89.9, "slug": "/milk", "id": "7"}),
        "captured-without-scheme",
    )
    .unwrap();
    assert_eq!(item.url(), "captured-without-scheme");
}

#[test]
fn discards_match_when_every_url_fallback_is_empty() {
    assert!(match_one(&json!({"title": "Milk", "price": 89.9}), "").is_none());
}

#[test]
fn custom_rules_change_probed_keys() {
    let rules = ExtractRules {
        name_keys: vec!["caption".to_owned()],
        link_keys: vec!["permalink".to_owned()],
        ..ExtractRules::default()
    };
    let obj = json!({"caption": "Kefir", "title": "ignored", "price": 70, "permalink": "/k"});
    let item = ProductMatcher::new(rules)
        .match_object(obj.as_object().unwrap(), &LinkResolver::new(ORIGIN))
        .unwrap();
    assert_eq!(item.name(), "Kefir");
    assert_eq!(item.url(), "https://shop.example/k");
}

// -----------------------------------------------------------------------
// extract
// -----------------------------------------------------------------------

#[test]
fn extract_finds_products_at_any_depth() {
    let payload = json!({
        "data": {
            "catalog": {
                "sections": [
                    {"title": "Dairy", "products": [
                        {"name": "Milk", "prices": {"price": "89,90 ₽"}, "slug": "/milk"},
                        {"name": "Kefir", "price": {"value": 75}, "id": "kf-1"}
                    ]},
                    {"title": "Bakery", "products": [
                        {"name": "Bread", "currentPrice": 45}
                    ]}
                ]
            }
        }
    });
    let items = matcher().extract(&payload, ORIGIN);
    let names: Vec<&str> = items.iter().map(Item::name).collect();
    assert_eq!(names, vec!["Milk", "Kefir", "Bread"]);
    assert_eq!(items[0].price(), "89.90");
    assert_eq!(items[0].url(), "https://shop.example/milk");
    assert_eq!(items[1].url(), "https://shop.example/search/?q=kf-1");
    assert_eq!(items[2].url(), ORIGIN);
}

#[test]
fn extract_keeps_in_payload_duplicates() {
    let payload = json!({"items": [
        {"title": "Milk", "price": 89.9, "slug": "/milk-1"},
        {"title": "Milk", "price": 89.9, "slug": "/milk-1"},
        {"foo": "bar"}
    ]});
    assert_eq!(matcher().extract(&payload, "https://shop.example/api").len(), 2);
}

#[test]
fn extract_from_payload_without_products_is_empty() {
    let payload = json!({"meta": {"page": 1}, "banners": [{"title": "Sale!"}]});
    assert!(matcher().extract(&payload, ORIGIN).is_empty());
}

#[test]
fn every_extracted_price_is_canonical() {
    let payload = json!([
        {"name": "A", "price": 1.25},
        {"name": "B", "price": "2 000"},
        {"name": "C", "salePrice": "3,5₽"},
        {"name": "D", "priceValue": {"amount": 4}}
    ]);
    let items = matcher().extract(&payload, ORIGIN);
    assert_eq!(items.len(), 4);
    for item in &items {
        assert!(!item.name().is_empty());
        assert!(!item.url().is_empty());
        assert!(
            item.price().chars().all(|c| c.is_ascii_digit() || c == '.'),
            "non-canonical price {:?}",
            item.price()
        );
    }
}
