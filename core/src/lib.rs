//! Client core for the GoodPlans marketplace front-end.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and owns the few pieces of
//! front-end logic that carry invariants: listing status translation,
//! listing normalization and optimistic favorite toggling.
//!
//! # Design
//! - `MarketClient` is stateless apart from its config and injected
//!   `TokenProvider`.
//! - Every listing that comes off the wire goes through `normalize`;
//!   status strings go through the `status` module and nowhere else.
//! - `FavoriteToggle` sequences overlapping toggles so the user's last
//!   click decides the final state.
//! - `Transport` is the async seam for hosts that let the core drive a
//!   round-trip.

pub mod auth;
pub mod category;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod favorite;
pub mod http;
pub mod normalize;
pub mod profile;
pub mod seller;
pub mod status;
pub mod types;

pub use auth::{NoToken, TokenProvider, TokenStore};
pub use category::CategoryDetails;
pub use client::{ListingQuery, MarketClient, MyListingsQuery};
pub use config::ClientConfig;
pub use envelope::DetailEnvelope;
pub use error::{ApiError, ValidationError};
pub use favorite::{FavoritePhase, FavoriteToggle, ToggleOutcome, ToggleTicket};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use normalize::{normalize, normalize_all};
pub use profile::UpdateProfile;
pub use seller::{SellerListingsView, SortOption, StatusFilter};
pub use status::{api_status_to_ui, ui_status_to_api, ApiStatus, UiStatus};
pub use types::{CreateListing, Listing, ListingDetail, Price, SellerProfile};
