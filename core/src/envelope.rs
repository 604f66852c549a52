//! Listing detail response shapes.
//!
//! `GET /listings/{id}` answers in one of three shapes depending on the
//! backend version: `{listing, seller, isFavorite}`, `{data: listing}`, or
//! the bare listing record. This is the only place that tells them apart.

use serde_json::Value;

use crate::error::ValidationError;
use crate::normalize::normalize;
use crate::types::{ListingDetail, SellerProfile};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailEnvelope {
    Wrapped {
        listing: Value,
        seller: Option<Value>,
        is_favorite: bool,
    },
    Data(Value),
    Bare(Value),
}

impl DetailEnvelope {
    pub fn classify(body: Value) -> Self {
        let Value::Object(mut obj) = body else {
            return DetailEnvelope::Bare(body);
        };
        if obj.get("listing").is_some_and(Value::is_object) {
            let listing = obj.remove("listing").unwrap_or(Value::Null);
            let seller = obj.remove("seller").filter(Value::is_object);
            let is_favorite = obj
                .get("isFavorite")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            return DetailEnvelope::Wrapped {
                listing,
                seller,
                is_favorite,
            };
        }
        if obj.get("data").is_some_and(Value::is_object) {
            return DetailEnvelope::Data(obj.remove("data").unwrap_or(Value::Null));
        }
        DetailEnvelope::Bare(Value::Object(obj))
    }

    /// Normalize the inner record. A record without an id means the listing
    /// does not exist.
    pub fn into_detail(self) -> Result<ListingDetail, ValidationError> {
        let (record, seller, is_favorite) = match self {
            DetailEnvelope::Wrapped {
                listing,
                seller,
                is_favorite,
            } => (listing, seller, is_favorite),
            DetailEnvelope::Data(record) | DetailEnvelope::Bare(record) => (record, None, false),
        };

        if record.get("id").map_or(true, Value::is_null) {
            return Err(ValidationError::new("listing not found"));
        }
        let listing = normalize(&record)?;

        let seller = seller.and_then(|raw| match serde_json::from_value::<SellerProfile>(raw) {
            Ok(seller) => Some(seller),
            Err(err) => {
                tracing::warn!(listing_id = %listing.id, error = %err, "unreadable seller profile dropped");
                None
            }
        });

        Ok(ListingDetail {
            listing,
            seller,
            is_favorite,
        })
    }
}
