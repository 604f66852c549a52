//! Raw listing payload → strict `Listing`.
//!
//! Only `id` and `title` are required. Every other field is defaulted on its
//! own so a single bad field never costs the whole record. Prices and
//! counters deliberately disagree on bad input: a non-numeric price is kept
//! for display, a non-numeric counter becomes 0.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::status::api_status_to_ui;
use crate::types::{Listing, Price};

/// Normalize one raw listing record.
pub fn normalize(raw: &Value) -> Result<Listing, ValidationError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| ValidationError::new("payload is not an object"))?;

    let id = required_text(obj, "id")?;
    let title = required_text(obj, "title")?;

    Ok(Listing {
        id,
        title,
        description: text(obj, "description").unwrap_or_default(),
        price: coerce_price(obj.get("price")),
        city: text(obj, "city").unwrap_or_default(),
        region: text(obj, "region")
            .or_else(|| text(obj, "region_name"))
            .unwrap_or_default(),
        images: images(obj.get("images")),
        category: text(obj, "category").unwrap_or_default(),
        subcategory: text(obj, "subcategory"),
        transaction_type: text(obj, "transaction_type"),
        rental_period: text(obj, "rental_period"),
        created_at: text(obj, "created_at"),
        status: api_status_to_ui(obj.get("status").and_then(Value::as_str)),
        views: counter(obj.get("views")),
        favorites: counter(obj.get("favorites")),
        messages: counter(obj.get("messages")),
        filters: obj
            .get("filters")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
        user_id: text(obj, "user_id"),
    })
}

/// Normalize a page of records, skipping the invalid ones.
pub fn normalize_all(raw: &[Value]) -> Vec<Listing> {
    raw.iter()
        .filter_map(|item| match normalize(item) {
            Ok(listing) => Some(listing),
            Err(err) => {
                tracing::warn!(error = %err, "invalid listing skipped");
                None
            }
        })
        .collect()
}

/// Non-empty string form of a required key. Numbers are accepted and
/// stringified since some endpoints return numeric ids.
fn required_text(obj: &Map<String, Value>, key: &str) -> Result<String, ValidationError> {
    let value = match obj.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        _ => return Err(ValidationError::new(format!("missing required field `{key}`"))),
    };
    Ok(value)
}

fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn images(raw: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = raw else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default()
}

/// Counters are taken only when already numeric; anything else is 0.
fn counter(raw: Option<&Value>) -> u64 {
    match raw.and_then(Value::as_f64) {
        Some(n) if n.is_finite() && n > 0.0 => n.trunc() as u64,
        _ => 0,
    }
}

fn coerce_price(raw: Option<&Value>) -> Price {
    match raw {
        None | Some(Value::Null) => Price::Amount(0.0),
        Some(Value::Number(n)) => Price::Amount(n.as_f64().unwrap_or(0.0)),
        Some(Value::Bool(b)) => Price::Amount(if *b { 1.0 } else { 0.0 }),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Price::Amount(0.0);
            }
            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => Price::Amount(n),
                _ => Price::Raw(Value::String(s.clone())),
            }
        }
        Some(other) => Price::Raw(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::ApiStatus;
    use serde_json::json;

    #[test]
    fn rejects_non_objects() {
        for raw in [json!(null), json!("listing"), json!(42), json!([{"id": "1"}])] {
            let err = normalize(&raw).unwrap_err();
            assert_eq!(err.reason, "payload is not an object");
        }
    }

    #[test]
    fn rejects_missing_id_and_title() {
        assert!(normalize(&json!({})).is_err());
        let err = normalize(&json!({"id": "1"})).unwrap_err();
        assert!(err.reason.contains("title"));
        let err = normalize(&json!({"id": "", "title": "x"})).unwrap_err();
        assert!(err.reason.contains("id"));
        assert!(normalize(&json!({"id": "1", "title": ""})).is_err());
    }

    #[test]
    fn minimal_record_gets_every_default() {
        let listing = normalize(&json!({"id": "1", "title": "x"})).unwrap();
        assert_eq!(listing.id, "1");
        assert_eq!(listing.title, "x");
        assert_eq!(listing.description, "");
        assert_eq!(listing.price, Price::Amount(0.0));
        assert_eq!(listing.city, "");
        assert_eq!(listing.region, "");
        assert!(listing.images.is_empty());
        assert_eq!(listing.category, "");
        assert!(listing.filters.is_empty());
        assert_eq!(listing.status, ApiStatus::Pending);
        assert_eq!((listing.views, listing.favorites, listing.messages), (0, 0, 0));
        assert!(listing.user_id.is_none());
        assert!(listing.created_at.is_none());
    }

    #[test]
    fn numeric_id_is_stringified() {
        let listing = normalize(&json!({"id": 42, "title": "x"})).unwrap();
        assert_eq!(listing.id, "42");
    }

    #[test]
    fn non_numeric_counters_become_zero() {
        let listing = normalize(&json!({
            "id": "1", "title": "x", "views": "abc", "favorites": "3", "messages": null
        }))
        .unwrap();
        assert_eq!(listing.views, 0);
        assert_eq!(listing.favorites, 0);
        assert_eq!(listing.messages, 0);
    }

    #[test]
    fn negative_counters_are_clamped() {
        let listing =
            normalize(&json!({"id": "1", "title": "x", "views": -5, "favorites": 2.7})).unwrap();
        assert_eq!(listing.views, 0);
        assert_eq!(listing.favorites, 2);
    }

    #[test]
    fn price_coercion_keeps_raw_text_when_not_numeric() {
        let price = |raw: Value| normalize(&json!({"id": "1", "title": "x", "price": raw})).unwrap().price;
        assert_eq!(price(json!("15000")), Price::Amount(15000.0));
        assert_eq!(price(json!(" 99.5 ")), Price::Amount(99.5));
        assert_eq!(price(json!(250)), Price::Amount(250.0));
        assert_eq!(price(json!("")), Price::Amount(0.0));
        assert_eq!(price(json!(null)), Price::Amount(0.0));
        assert_eq!(price(json!("12 000 €")), Price::Raw(json!("12 000 €")));
        assert_eq!(price(json!("inf")), Price::Raw(json!("inf")));
    }

    #[test]
    fn region_falls_back_to_region_name() {
        let listing = normalize(&json!({"id": "1", "title": "x", "region_name": "Occitanie"})).unwrap();
        assert_eq!(listing.region, "Occitanie");
        let listing = normalize(&json!({
            "id": "1", "title": "x", "region": "Bretagne", "region_name": "Occitanie"
        }))
        .unwrap();
        assert_eq!(listing.region, "Bretagne");
    }

    #[test]
    fn malformed_images_are_dropped() {
        let listing = normalize(&json!({"id": "1", "title": "x", "images": "a.jpg"})).unwrap();
        assert!(listing.images.is_empty());
        let listing = normalize(&json!({"id": "1", "title": "x", "images": ["a.jpg", 3]})).unwrap();
        assert!(listing.images.is_empty());
    }

    #[test]
    fn filters_must_be_an_object() {
        let listing = normalize(&json!({"id": "1", "title": "x", "filters": [1, 2]})).unwrap();
        assert!(listing.filters.is_empty());
        let listing =
            normalize(&json!({"id": "1", "title": "x", "filters": {"mileage": 12000}})).unwrap();
        assert_eq!(listing.filters["mileage"], json!(12000));
    }

    #[test]
    fn full_vehicle_payload() {
        let listing = normalize(&json!({
            "id": "42",
            "title": "Voiture",
            "price": "15000",
            "status": "Publié",
            "images": ["a.jpg", "b.jpg"]
        }))
        .unwrap();
        assert_eq!(listing.price, Price::Amount(15000.0));
        assert_eq!(listing.status, ApiStatus::Published);
        assert_eq!(listing.images, vec!["a.jpg", "b.jpg"]);
        assert!(listing.filters.is_empty());
    }

    #[test]
    fn shorthand_status_is_mapped() {
        let listing = normalize(&json!({"id": "1", "title": "x", "status": "paused"})).unwrap();
        assert_eq!(listing.status, ApiStatus::Suspended);
    }

    #[test]
    fn normalize_all_skips_invalid_records() {
        let raw = vec![
            json!({"id": "1", "title": "first"}),
            json!({"title": "no id"}),
            json!("garbage"),
            json!({"id": "2", "title": "second"}),
        ];
        let listings = normalize_all(&raw);
        let ids: Vec<_> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
