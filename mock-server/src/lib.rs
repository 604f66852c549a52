use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const STATUSES: [&str; 5] = ["En attente", "Publié", "Rejeté", "Suspendu", "Vendu"];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub rental_period: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    pub status: String,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub favorites: u64,
    #[serde(default)]
    pub messages: u64,
    #[serde(default)]
    pub filters: Map<String, Value>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub show_phone: Option<bool>,
    #[serde(default)]
    pub show_whatsapp: Option<bool>,
    #[serde(default)]
    pub is_seller: Option<bool>,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub seller_type: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub siret: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateListing {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub region: String,
    pub category: String,
    #[serde(default)]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub rental_period: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub filters: Map<String, Value>,
    #[serde(default)]
    pub details: Map<String, Value>,
}

#[derive(Deserialize)]
pub struct UpdateListing {
    pub status: Option<String>,
    pub title: Option<String>,
    pub price: Option<f64>,
}

#[derive(Deserialize)]
pub struct UpdateProfile {
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub show_phone: Option<bool>,
    pub show_whatsapp: Option<bool>,
    pub company_name: Option<String>,
    pub seller_type: Option<String>,
    pub siret: Option<String>,
    pub account_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<f64>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<f64>,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub message: Value,
}

#[derive(Default)]
pub struct Store {
    pub listings: HashMap<String, Listing>,
    pub profiles: HashMap<String, Profile>,
    /// (user id, listing id)
    pub favorites: HashSet<(String, String)>,
}

pub type Db = Arc<RwLock<Store>>;

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorBody>)>;

pub fn app() -> Router {
    app_with(Store::default())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/listings", get(list_listings).post(create_listing))
        .route("/listings/recent", get(recent_listings))
        .route("/listings/most-viewed", get(most_viewed_listings))
        .route("/listings/me", get(my_listings))
        .route(
            "/listings/{id}",
            get(get_listing).patch(update_listing).delete(delete_listing),
        )
        .route(
            "/listings/{id}/favorite",
            get(favorite_status).post(add_favorite).delete(remove_favorite),
        )
        .route("/listings/{id}/is-favorite", get(favorite_status))
        .route("/user/profile", put(update_profile))
        .with_state(db)
}

/// Two published listings and one pending one, owned by `seller-1`.
pub fn seeded_store() -> Store {
    let mut store = Store::default();
    let mut vehicle_filters = Map::new();
    vehicle_filters.insert("brand".into(), Value::from("Renault"));
    vehicle_filters.insert("mileage".into(), Value::from(82000));

    let listings = [
        Listing {
            id: "l-1".into(),
            title: "Renault Clio".into(),
            description: "Bon état".into(),
            price: 7500.0,
            city: "Lyon".into(),
            region: "Auvergne-Rhône-Alpes".into(),
            images: vec!["clio.jpg".into()],
            category: "vehicle".into(),
            transaction_type: Some("achat".into()),
            rental_period: None,
            created_at: Some("2025-03-01T09:00:00Z".into()),
            status: "Publié".into(),
            views: 40,
            favorites: 0,
            messages: 2,
            filters: vehicle_filters,
            user_id: Some("seller-1".into()),
        },
        Listing {
            id: "l-2".into(),
            title: "Studio centre-ville".into(),
            description: String::new(),
            price: 650.0,
            city: "Nantes".into(),
            region: "Pays de la Loire".into(),
            images: Vec::new(),
            category: "real_estate".into(),
            transaction_type: Some("location".into()),
            rental_period: Some("month".into()),
            created_at: Some("2025-03-05T09:00:00Z".into()),
            status: "Publié".into(),
            views: 90,
            favorites: 3,
            messages: 0,
            filters: Map::new(),
            user_id: Some("seller-1".into()),
        },
        Listing {
            id: "l-3".into(),
            title: "Table en chêne".into(),
            description: "Fait main".into(),
            price: 300.0,
            city: "Lyon".into(),
            region: "Auvergne-Rhône-Alpes".into(),
            images: Vec::new(),
            category: "craft".into(),
            transaction_type: Some("achat".into()),
            rental_period: None,
            created_at: Some("2025-03-07T09:00:00Z".into()),
            status: "En attente".into(),
            views: 0,
            favorites: 0,
            messages: 0,
            filters: Map::new(),
            user_id: Some("seller-1".into()),
        },
    ];
    for listing in listings {
        store.listings.insert(listing.id.clone(), listing);
    }
    store.profiles.insert(
        "seller-1".into(),
        Profile {
            user_id: "seller-1".into(),
            username: Some("alice".into()),
            phone: Some("0600000000".into()),
            show_phone: Some(true),
            is_seller: Some(true),
            account_type: Some("seller_particular".into()),
            seller_type: Some("particular".into()),
            ..Profile::default()
        },
    );
    store
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(seeded_store())).await
}

fn error(status: StatusCode, message: impl Into<Value>) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            message: message.into(),
        }),
    )
}

/// The bearer token doubles as the user id.
fn caller(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .filter(|token| !token.is_empty())
}

fn require_caller(headers: &HeaderMap) -> ApiResult<String> {
    caller(headers).ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Unauthorized"))
}

fn published(store: &Store) -> Vec<Listing> {
    store
        .listings
        .values()
        .filter(|listing| listing.status == "Publié")
        .cloned()
        .collect()
}

async fn list_listings(
    State(db): State<Db>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Listing>> {
    let store = db.read().await;
    let term = params.q.as_deref().map(str::to_lowercase);
    let mut listings: Vec<Listing> = published(&store)
        .into_iter()
        .filter(|l| params.category.as_deref().map_or(true, |c| l.category == c))
        .filter(|l| params.city.as_deref().map_or(true, |c| l.city == c))
        .filter(|l| params.min_price.map_or(true, |min| l.price >= min))
        .filter(|l| params.max_price.map_or(true, |max| l.price <= max))
        .filter(|l| {
            term.as_deref()
                .map_or(true, |t| l.title.to_lowercase().contains(t))
        })
        .collect();
    listings.sort_by(|a, b| a.id.cmp(&b.id));
    Json(listings)
}

async fn recent_listings(State(db): State<Db>) -> Json<Vec<Listing>> {
    let mut listings = published(&*db.read().await);
    listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Json(listings)
}

async fn most_viewed_listings(State(db): State<Db>) -> Json<Vec<Listing>> {
    let mut listings = published(&*db.read().await);
    listings.sort_by(|a, b| b.views.cmp(&a.views));
    Json(listings)
}

async fn my_listings(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Listing>>> {
    let user = require_caller(&headers)?;
    let store = db.read().await;
    let mut listings: Vec<Listing> = store
        .listings
        .values()
        .filter(|l| l.user_id.as_deref() == Some(user.as_str()))
        .filter(|l| params.status.as_deref().map_or(true, |s| l.status == s))
        .cloned()
        .collect();
    listings.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(Json(listings))
}

async fn create_listing(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateListing>,
) -> ApiResult<(StatusCode, Json<Listing>)> {
    let user = require_caller(&headers)?;
    if input.title.trim().is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, vec!["title should not be empty"]));
    }
    let mut filters = input.filters;
    for (key, value) in input.details {
        filters.entry(key).or_insert(value);
    }
    let listing = Listing {
        id: Uuid::new_v4().to_string(),
        title: input.title,
        description: input.description,
        price: input.price,
        city: input.city,
        region: input.region,
        images: input.images,
        category: input.category,
        transaction_type: input.transaction_type,
        rental_period: input.rental_period,
        created_at: Some(chrono::Utc::now().to_rfc3339()),
        status: "En attente".into(),
        views: 0,
        favorites: 0,
        messages: 0,
        filters,
        user_id: Some(user),
    };
    tracing::info!(id = %listing.id, "listing created");
    db.write()
        .await
        .listings
        .insert(listing.id.clone(), listing.clone());
    Ok((StatusCode::CREATED, Json(listing)))
}

async fn get_listing(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let mut store = db.write().await;
    let listing = store
        .listings
        .get_mut(&id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Annonce introuvable"))?;
    listing.views += 1;
    let listing = listing.clone();

    let seller = listing
        .user_id
        .as_ref()
        .and_then(|user| store.profiles.get(user))
        .cloned();
    let is_favorite = caller(&headers)
        .map(|user| store.favorites.contains(&(user, id.clone())))
        .unwrap_or(false);

    Ok(Json(serde_json::json!({
        "listing": listing,
        "seller": seller,
        "isFavorite": is_favorite,
    })))
}

async fn update_listing(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<UpdateListing>,
) -> ApiResult<Json<Listing>> {
    let user = require_caller(&headers)?;
    let mut store = db.write().await;
    let listing = store
        .listings
        .get_mut(&id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Annonce introuvable"))?;
    if listing.user_id.as_deref() != Some(user.as_str()) {
        return Err(error(StatusCode::FORBIDDEN, "Forbidden"));
    }
    if let Some(status) = input.status {
        if !STATUSES.contains(&status.as_str()) {
            return Err(error(
                StatusCode::BAD_REQUEST,
                vec![format!("status must be one of: {}", STATUSES.join(", "))],
            ));
        }
        listing.status = status;
    }
    if let Some(title) = input.title {
        listing.title = title;
    }
    if let Some(price) = input.price {
        listing.price = price;
    }
    Ok(Json(listing.clone()))
}

async fn delete_listing(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let user = require_caller(&headers)?;
    let mut store = db.write().await;
    let owner = store
        .listings
        .get(&id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Annonce introuvable"))?
        .user_id
        .clone();
    if owner.as_deref() != Some(user.as_str()) {
        return Err(error(StatusCode::FORBIDDEN, "Forbidden"));
    }
    store.listings.remove(&id);
    store.favorites.retain(|(_, listing)| listing != &id);
    Ok(StatusCode::NO_CONTENT)
}

async fn favorite_status(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let user = require_caller(&headers)?;
    let store = db.read().await;
    if !store.listings.contains_key(&id) {
        return Err(error(StatusCode::NOT_FOUND, "Annonce introuvable"));
    }
    let is_favorite = store.favorites.contains(&(user, id));
    Ok(Json(serde_json::json!({ "isFavorite": is_favorite })))
}

async fn add_favorite(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<Listing>)> {
    let user = require_caller(&headers)?;
    let mut store = db.write().await;
    if !store.listings.contains_key(&id) {
        return Err(error(StatusCode::NOT_FOUND, "Annonce introuvable"));
    }
    let added = store.favorites.insert((user, id.clone()));
    let listing = store
        .listings
        .get_mut(&id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Annonce introuvable"))?;
    if added {
        listing.favorites += 1;
    }
    Ok((StatusCode::CREATED, Json(listing.clone())))
}

async fn remove_favorite(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Listing>> {
    let user = require_caller(&headers)?;
    let mut store = db.write().await;
    let removed = store.favorites.remove(&(user, id.clone()));
    let listing = store
        .listings
        .get_mut(&id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Annonce introuvable"))?;
    if removed {
        listing.favorites = listing.favorites.saturating_sub(1);
    }
    Ok(Json(listing.clone()))
}

async fn update_profile(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<UpdateProfile>,
) -> ApiResult<Json<Profile>> {
    let user = require_caller(&headers)?;
    let mut store = db.write().await;
    let profile = store.profiles.entry(user.clone()).or_insert_with(|| Profile {
        user_id: user,
        ..Profile::default()
    });
    let was_seller = profile.is_seller.unwrap_or(false);
    if was_seller && input.account_type.as_deref() == Some("buyer") {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "Un compte vendeur ne peut pas redevenir acheteur.",
        ));
    }
    if let Some(account_type) = input.account_type {
        profile.is_seller = Some(account_type.starts_with("seller"));
        profile.account_type = Some(account_type);
    }
    profile.phone = input.phone.or(profile.phone.take());
    profile.whatsapp = input.whatsapp.or(profile.whatsapp.take());
    profile.show_phone = input.show_phone.or(profile.show_phone);
    profile.show_whatsapp = input.show_whatsapp.or(profile.show_whatsapp);
    profile.company_name = input.company_name.or(profile.company_name.take());
    profile.seller_type = input.seller_type.or(profile.seller_type.take());
    profile.siret = input.siret.or(profile.siret.take());
    Ok(Json(profile.clone()))
}
