//! Domain types for the marketplace API.
//!
//! # Design
//! `Listing` is the strict shape produced by `normalize`; it is never
//! deserialized straight from the wire in production code. Open vocabularies
//! on the wire (category, transaction type, rental period) stay `String`s on
//! the struct and get typed accessors that return `None` for values the
//! front-end does not know about. The mock-server crate defines its own
//! copies of the wire types; integration tests catch schema drift.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::normalize::normalize;
use crate::status::ApiStatus;

/// Listing price. Non-numeric raw values are kept verbatim for display
/// instead of failing the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(f64),
    Raw(Value),
}

impl Price {
    pub fn amount(&self) -> Option<f64> {
        match self {
            Price::Amount(amount) => Some(*amount),
            Price::Raw(_) => None,
        }
    }

    /// Amount used for ordering; raw prices sort as 0.
    pub fn sort_key(&self) -> f64 {
        self.amount().unwrap_or(0.0)
    }
}

impl Default for Price {
    fn default() -> Self {
        Price::Amount(0.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Amount(amount) => write!(f, "{amount}"),
            Price::Raw(Value::String(raw)) => f.write_str(raw),
            Price::Raw(other) => write!(f, "{other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Location,
    Achat,
}

impl TransactionType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "location" => Some(TransactionType::Location),
            "achat" => Some(TransactionType::Achat),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RentalPeriod {
    Day,
    Week,
    Month,
    Year,
}

impl RentalPeriod {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "day" => Some(RentalPeriod::Day),
            "week" => Some(RentalPeriod::Week),
            "month" => Some(RentalPeriod::Month),
            "year" => Some(RentalPeriod::Year),
            _ => None,
        }
    }
}

/// A single marketplace listing after normalization.
///
/// Deserializing goes through `normalize`, so a `Listing` always has an id
/// and a title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub city: String,
    pub region: String,
    pub images: Vec<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub status: ApiStatus,
    pub views: u64,
    pub favorites: u64,
    pub messages: u64,
    pub filters: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl TryFrom<Value> for Listing {
    type Error = ValidationError;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        normalize(&raw)
    }
}

impl Listing {
    pub fn transaction(&self) -> Option<TransactionType> {
        self.transaction_type.as_deref().and_then(TransactionType::parse)
    }

    pub fn rental(&self) -> Option<RentalPeriod> {
        self.rental_period.as_deref().and_then(RentalPeriod::parse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Buyer,
    SellerPro,
    SellerParticular,
    Admin,
    SuperAdmin,
}

impl AccountType {
    pub fn is_seller(self) -> bool {
        matches!(self, AccountType::SellerPro | AccountType::SellerParticular)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellerType {
    Particular,
    Professional,
}

/// Read-only projection of a user acting as seller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SellerProfile {
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
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
    pub seller_approved: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub account_type: Option<AccountType>,
    #[serde(default)]
    pub seller_type: Option<SellerType>,
    #[serde(default)]
    pub company_name: Option<String>,
}

impl SellerProfile {
    /// Phone number, only when the seller chose to show it.
    pub fn visible_phone(&self) -> Option<&str> {
        if self.show_phone.unwrap_or(false) {
            self.phone.as_deref().filter(|p| !p.is_empty())
        } else {
            None
        }
    }

    /// WhatsApp number, only when the seller chose to show it.
    pub fn visible_whatsapp(&self) -> Option<&str> {
        if self.show_whatsapp.unwrap_or(false) {
            self.whatsapp.as_deref().filter(|w| !w.is_empty())
        } else {
            None
        }
    }

    pub fn is_approved(&self) -> bool {
        self.seller_approved.unwrap_or(false)
    }

    /// Name shown on the seller card: company for professionals, else the
    /// username.
    pub fn display_name(&self) -> Option<&str> {
        let company = self.company_name.as_deref().filter(|c| !c.is_empty());
        match (self.seller_type, company) {
            (Some(SellerType::Professional), Some(company)) => Some(company),
            _ => self.username.as_deref(),
        }
    }
}

/// Listing detail page data: the listing, its seller and the caller's
/// favorite flag.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDetail {
    pub listing: Listing,
    pub seller: Option<SellerProfile>,
    pub is_favorite: bool,
}

/// Response body of the favorite-status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteStatus {
    #[serde(rename = "isFavorite")]
    pub is_favorite: bool,
}

/// Request payload for `PATCH /listings/{id}` when only the status changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateListingStatus {
    pub status: ApiStatus,
}

/// Request payload for creating a listing with its category-specific details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateListing {
    pub category: String,
    pub title: String,
    pub description: String,
    pub city: String,
    pub region: String,
    pub price: f64,
    pub transaction_type: Option<String>,
    pub rental_period: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub filters: Map<String, Value>,
    #[serde(default)]
    pub details: Map<String, Value>,
}
