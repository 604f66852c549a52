//! Stateless HTTP request builder and response parser for the marketplace API.
//!
//! # Design
//! `MarketClient` holds the configuration and a token provider and carries no
//! other state between calls. Each operation is split into a `build_*` method
//! that produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the round-trip. Listing payloads are
//! never deserialized directly: they go through `normalize`, so one bad
//! record in a page is skipped instead of failing the page.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::auth::TokenProvider;
use crate::config::ClientConfig;
use crate::envelope::DetailEnvelope;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::normalize::{normalize, normalize_all};
use crate::profile::{
    check_account_transition, resolve_account_type, validate_seller, UpdateProfile,
};
use crate::status::{ui_status_to_api, ApiStatus, UiStatus};
use crate::types::{
    CreateListing, FavoriteStatus, Listing, ListingDetail, SellerProfile, UpdateListingStatus,
};

/// Public listing search filters. Unset and empty values are left out of the
/// query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub transaction_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl ListingQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_pair(&mut pairs, "q", self.q.clone());
        push_pair(&mut pairs, "category", self.category.clone());
        push_pair(&mut pairs, "subcategory", self.subcategory.clone());
        push_pair(&mut pairs, "city", self.city.clone());
        push_pair(&mut pairs, "region", self.region.clone());
        push_pair(&mut pairs, "transaction_type", self.transaction_type.clone());
        push_pair(&mut pairs, "minPrice", self.min_price.map(|p| p.to_string()));
        push_pair(&mut pairs, "maxPrice", self.max_price.map(|p| p.to_string()));
        push_pair(&mut pairs, "page", self.page.map(|p| p.to_string()));
        push_pair(&mut pairs, "limit", self.limit.map(|l| l.to_string()));
        push_pair(&mut pairs, "sort", self.sort.clone());
        push_pair(&mut pairs, "order", self.order.clone());
        pairs
    }
}

/// Filters for the signed-in seller's own listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MyListingsQuery {
    pub status: Option<ApiStatus>,
    pub is_approved: Option<bool>,
}

impl MyListingsQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_pair(&mut pairs, "status", self.status.map(|s| s.as_str().to_string()));
        push_pair(&mut pairs, "is_approved", self.is_approved.map(|a| a.to_string()));
        pairs
    }
}

/// Synchronous, stateless client for the marketplace API.
#[derive(Clone)]
pub struct MarketClient {
    config: ClientConfig,
    tokens: Arc<dyn TokenProvider>,
}

impl fmt::Debug for MarketClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketClient")
            .field("base_url", &self.config.base_url)
            .field("signed_in", &self.tokens.bearer_token().is_some())
            .finish()
    }
}

impl MarketClient {
    pub fn new(config: ClientConfig, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { config, tokens }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    // -- listings ----------------------------------------------------------

    pub fn build_list_listings(&self, query: &ListingQuery) -> HttpRequest {
        self.request(HttpMethod::Get, with_query("/listings", &query.pairs()), None)
    }

    pub fn build_recent_listings(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/listings/recent".to_string(), None)
    }

    pub fn build_most_viewed_listings(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/listings/most-viewed".to_string(), None)
    }

    pub fn build_my_listings(&self, query: &MyListingsQuery) -> HttpRequest {
        self.request(HttpMethod::Get, with_query("/listings/me", &query.pairs()), None)
    }

    /// Parse any endpoint returning a page of listings. Invalid records are
    /// skipped.
    pub fn parse_listings(&self, response: HttpResponse) -> Result<Vec<Listing>, ApiError> {
        match json_body(response)? {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(normalize_all(&items)),
            Some(other) => Err(ApiError::Deserialization(format!(
                "expected a list of listings, got {}",
                kind(&other)
            ))),
        }
    }

    pub fn build_get_listing(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, format!("/listings/{}", encode_component(id)), None)
    }

    pub fn parse_get_listing(&self, response: HttpResponse) -> Result<ListingDetail, ApiError> {
        let body = json_body(response)?.unwrap_or(Value::Null);
        Ok(DetailEnvelope::classify(body).into_detail()?)
    }

    pub fn build_create_listing(&self, input: &CreateListing) -> Result<HttpRequest, ApiError> {
        let body = to_json(input)?;
        Ok(self.request(HttpMethod::Post, "/listings".to_string(), Some(body)))
    }

    pub fn parse_create_listing(&self, response: HttpResponse) -> Result<Listing, ApiError> {
        single_listing(response)
    }

    /// Build the status update for a listing. The UI status is translated to
    /// the backend vocabulary here.
    pub fn build_update_status(&self, id: &str, status: UiStatus) -> Result<HttpRequest, ApiError> {
        let payload = UpdateListingStatus {
            status: ui_status_to_api(status),
        };
        let body = to_json(&payload)?;
        Ok(self.request(
            HttpMethod::Patch,
            format!("/listings/{}", encode_component(id)),
            Some(body),
        ))
    }

    pub fn parse_update_status(&self, response: HttpResponse) -> Result<Listing, ApiError> {
        single_listing(response)
    }

    pub fn build_delete_listing(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, format!("/listings/{}", encode_component(id)), None)
    }

    pub fn parse_delete_listing(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    // -- favorites ---------------------------------------------------------

    pub fn build_favorite_status(&self, id: &str) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            format!("/listings/{}/is-favorite", encode_component(id)),
            None,
        )
    }

    pub fn parse_favorite_status(&self, response: HttpResponse) -> Result<bool, ApiError> {
        let status: FavoriteStatus = parse_json(response)?;
        Ok(status.is_favorite)
    }

    pub fn build_add_favorite(&self, id: &str) -> HttpRequest {
        self.build_set_favorite(id, true)
    }

    pub fn build_remove_favorite(&self, id: &str) -> HttpRequest {
        self.build_set_favorite(id, false)
    }

    /// POST to add, DELETE to remove.
    pub fn build_set_favorite(&self, id: &str, favorite: bool) -> HttpRequest {
        let method = if favorite {
            HttpMethod::Post
        } else {
            HttpMethod::Delete
        };
        self.request(method, format!("/listings/{}/favorite", encode_component(id)), None)
    }

    /// Add/remove favorite answers with the updated listing or relation; only
    /// the status matters to the caller.
    pub fn parse_favorite_mutation(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    // -- profile -----------------------------------------------------------

    /// Build a profile update after checking the account transition and the
    /// seller fields. Nothing is sent when a rule rejects the change.
    pub fn build_update_profile(
        &self,
        current: &SellerProfile,
        update: &UpdateProfile,
    ) -> Result<HttpRequest, ApiError> {
        let update = UpdateProfile {
            account_type: resolve_account_type(update),
            ..update.clone()
        };
        check_account_transition(current, update.account_type)?;
        validate_seller(&update)?;
        let body = to_json(&update)?;
        Ok(self.request(HttpMethod::Put, "/user/profile".to_string(), Some(body)))
    }

    pub fn parse_update_profile(&self, response: HttpResponse) -> Result<SellerProfile, ApiError> {
        parse_json(response)
    }

    fn request(&self, method: HttpMethod, path: String, body: Option<String>) -> HttpRequest {
        let mut headers = Vec::new();
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = self.tokens.bearer_token() {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        tracing::debug!(method = method.as_str(), %path, "request built");
        HttpRequest {
            method,
            path: format!("{}{path}", self.config.base_url),
            headers,
            body,
        }
    }
}

/// Map non-2xx responses to `ApiError`, extracting the server's message.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = error_message(response);
    if response.status == 404 {
        return Err(ApiError::NotFound { message });
    }
    Err(ApiError::Http {
        status: response.status,
        message,
    })
}

/// JSON `message` (string, or strings joined by newlines), else the raw
/// body, else `HTTP {status}`.
fn error_message(response: &HttpResponse) -> String {
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(&response.body) {
        match obj.get("message") {
            Some(Value::String(message)) if !message.is_empty() => return message.clone(),
            Some(Value::Array(items)) => {
                let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                if !parts.is_empty() {
                    return parts.join("\n");
                }
            }
            _ => {}
        }
    }
    let text = response.body.trim();
    if text.is_empty() {
        format!("HTTP {}", response.status)
    } else {
        text.to_string()
    }
}

/// Body as JSON, or `None` for `204 No Content` / empty bodies.
fn json_body(response: HttpResponse) -> Result<Option<Value>, ApiError> {
    check_status(&response)?;
    if response.status == 204 || response.body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&response.body)
        .map(Some)
        .map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    let body = json_body(response)?
        .ok_or_else(|| ApiError::Deserialization("empty response body".to_string()))?;
    serde_json::from_value(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn single_listing(response: HttpResponse) -> Result<Listing, ApiError> {
    let body = json_body(response)?
        .ok_or_else(|| ApiError::Deserialization("empty response body".to_string()))?;
    Ok(normalize(&body)?)
}

fn to_json<T: Serialize>(input: &T) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn push_pair(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        pairs.push((key, value));
    }
}

fn with_query(path: &str, pairs: &[(&'static str, String)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let query: Vec<String> = pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", encode_component(value)))
        .collect();
    format!("{path}?{}", query.join("&"))
}

/// Same output as JavaScript's `encodeURIComponent`: everything outside
/// `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is percent-encoded as UTF-8 bytes.
fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{NoToken, TokenStore};
    use crate::types::{AccountType, Price, SellerType};

    fn client() -> MarketClient {
        MarketClient::new(ClientConfig::new("http://localhost:3000/api"), Arc::new(NoToken))
    }

    fn signed_in(token: &str) -> MarketClient {
        MarketClient::new(
            ClientConfig::new("http://localhost:3000/api"),
            Arc::new(TokenStore::with_token(token)),
        )
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_listings_without_filters() {
        let req = client().build_list_listings(&ListingQuery::default());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/api/listings");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_list_listings_drops_empty_filters() {
        let query = ListingQuery {
            category: Some("vehicle".to_string()),
            city: Some(String::new()),
            q: Some("clio rouge".to_string()),
            max_price: Some(20000.0),
            ..ListingQuery::default()
        };
        let req = client().build_list_listings(&query);
        assert_eq!(
            req.path,
            "http://localhost:3000/api/listings?q=clio%20rouge&category=vehicle&maxPrice=20000"
        );
    }

    #[test]
    fn bearer_token_is_attached_when_signed_in() {
        let req = signed_in("tok-1").build_add_favorite("42");
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/api/listings/42/favorite");
        assert_eq!(req.header("Authorization"), Some("Bearer tok-1"));
        assert_eq!(req.header("content-type"), None);
    }

    #[test]
    fn build_remove_favorite_uses_delete() {
        let req = client().build_remove_favorite("42");
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3000/api/listings/42/favorite");
    }

    #[test]
    fn path_ids_are_percent_encoded() {
        let req = client().build_get_listing("a b/c");
        assert_eq!(req.path, "http://localhost:3000/api/listings/a%20b%2Fc");
    }

    #[test]
    fn build_update_status_translates_ui_shorthand() {
        let req = client().build_update_status("42", UiStatus::Paused).unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.path, "http://localhost:3000/api/listings/42");
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["status"], "Suspendu");
    }

    #[test]
    fn build_my_listings_with_filters() {
        let query = MyListingsQuery {
            status: Some(ApiStatus::Published),
            is_approved: Some(true),
        };
        let req = client().build_my_listings(&query);
        assert_eq!(
            req.path,
            "http://localhost:3000/api/listings/me?status=Publi%C3%A9&is_approved=true"
        );
    }

    #[test]
    fn parse_listings_skips_invalid_records() {
        let body = r#"[{"id":"1","title":"ok","price":"10"},{"title":"no id"},{"id":"2","title":"ok too"}]"#;
        let listings = client().parse_listings(response(200, body)).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].price, Price::Amount(10.0));
    }

    #[test]
    fn parse_listings_rejects_non_array() {
        let err = client().parse_listings(response(200, r#"{"id":"1"}"#)).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_listings_bad_json() {
        let err = client().parse_listings(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_get_listing_wrapped() {
        let body = r#"{"listing":{"id":"7","title":"Maison"},"seller":{"user_id":"u1"},"isFavorite":true}"#;
        let detail = client().parse_get_listing(response(200, body)).unwrap();
        assert_eq!(detail.listing.id, "7");
        assert!(detail.is_favorite);
        assert_eq!(detail.seller.unwrap().user_id, "u1");
    }

    #[test]
    fn parse_get_listing_without_id_is_validation_error() {
        let err = client().parse_get_listing(response(200, "{}")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn parse_get_listing_not_found() {
        let err = client()
            .parse_get_listing(response(404, r#"{"message":"Annonce introuvable"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { ref message } if message == "Annonce introuvable"));
    }

    #[test]
    fn error_message_joins_message_arrays() {
        let err = client()
            .parse_update_status(response(
                400,
                r#"{"message":["status must be valid","price must be positive"]}"#,
            ))
            .unwrap_err();
        assert_eq!(err.to_string(), "status must be valid\nprice must be positive");
    }

    #[test]
    fn error_message_falls_back_to_text_then_status() {
        let err = client().parse_favorite_mutation(response(502, "Bad Gateway")).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 502, ref message } if message == "Bad Gateway"));

        let err = client().parse_favorite_mutation(response(500, "")).unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[test]
    fn no_content_is_void_success() {
        assert!(client().parse_favorite_mutation(response(204, "")).is_ok());
        assert!(client().parse_delete_listing(response(204, "")).is_ok());
        assert!(client().parse_listings(response(204, "")).unwrap().is_empty());
    }

    #[test]
    fn parse_favorite_status() {
        assert!(client().parse_favorite_status(response(200, r#"{"isFavorite":true}"#)).unwrap());
        assert!(!client().parse_favorite_status(response(200, r#"{"isFavorite":false}"#)).unwrap());
    }

    #[test]
    fn parse_update_status_normalizes_status() {
        let listing = client()
            .parse_update_status(response(200, r#"{"id":"42","title":"Voiture","status":"Vendu"}"#))
            .unwrap();
        assert_eq!(listing.status, ApiStatus::Sold);
    }

    #[test]
    fn update_profile_seller_to_buyer_is_rejected_before_building() {
        let current = SellerProfile {
            user_id: "u1".to_string(),
            account_type: Some(AccountType::SellerParticular),
            is_seller: Some(true),
            ..SellerProfile::default()
        };
        let update = UpdateProfile {
            account_type: Some(AccountType::Buyer),
            ..UpdateProfile::default()
        };
        let err = client().build_update_profile(&current, &update).unwrap_err();
        assert!(matches!(err, ApiError::Application(_)));
    }

    #[test]
    fn build_update_profile_puts_resolved_account_type() {
        let current = SellerProfile {
            user_id: "u1".to_string(),
            account_type: Some(AccountType::Buyer),
            ..SellerProfile::default()
        };
        let update = UpdateProfile {
            account_type: Some(AccountType::SellerPro),
            seller_type: Some(SellerType::Particular),
            phone: Some("0600000000".to_string()),
            ..UpdateProfile::default()
        };
        let req = signed_in("u1").build_update_profile(&current, &update).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3000/api/user/profile");
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["account_type"], "seller_particular");
        assert_eq!(body["seller_type"], "particular");
    }

    #[test]
    fn build_update_profile_checks_professional_fields_after_resolving() {
        let current = SellerProfile {
            user_id: "u1".to_string(),
            ..SellerProfile::default()
        };
        let update = UpdateProfile {
            account_type: Some(AccountType::SellerParticular),
            seller_type: Some(SellerType::Professional),
            phone: Some("0600000000".to_string()),
            ..UpdateProfile::default()
        };
        let err = client().build_update_profile(&current, &update).unwrap_err();
        assert_eq!(err.to_string(), crate::profile::COMPANY_REQUIRED);
    }

    #[test]
    fn build_create_listing_serializes_payload() {
        let input = CreateListing {
            category: "craft".to_string(),
            title: "Vase".to_string(),
            description: "Terre cuite".to_string(),
            city: "Fès".to_string(),
            region: "Fès-Meknès".to_string(),
            price: 120.0,
            transaction_type: Some("achat".to_string()),
            rental_period: None,
            images: vec!["vase.jpg".to_string()],
            filters: serde_json::Map::new(),
            details: serde_json::Map::new(),
        };
        let req = client().build_create_listing(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/api/listings");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Vase");
        assert_eq!(body["price"], 120.0);
    }
}
