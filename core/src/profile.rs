//! Profile update payload and the rules checked before it is sent.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::types::{AccountType, SellerProfile, SellerType};

pub const SELLER_TO_BUYER: &str = "Un compte vendeur ne peut pas redevenir acheteur.";
pub const PHONE_REQUIRED: &str = "Un numéro de téléphone est requis pour les vendeurs.";
pub const COMPANY_REQUIRED: &str = "Le nom de l'entreprise est obligatoire pour les professionnels.";
pub const SIRET_REQUIRED: &str = "Le numéro de SIRET est obligatoire pour les professionnels.";

/// Partial profile update; `None` fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_phone: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_whatsapp: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_type: Option<SellerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub siret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,
}

/// A profile counts as a seller when its account type says so or the
/// backend flagged it `is_seller`.
pub fn is_seller_account(profile: &SellerProfile) -> bool {
    profile.account_type.is_some_and(AccountType::is_seller) || profile.is_seller.unwrap_or(false)
}

/// Seller accounts cannot go back to buyer.
pub fn check_account_transition(
    current: &SellerProfile,
    requested: Option<AccountType>,
) -> Result<(), ApiError> {
    if requested == Some(AccountType::Buyer) && is_seller_account(current) {
        tracing::debug!(user_id = %current.user_id, "seller to buyer transition refused");
        return Err(ApiError::Application(SELLER_TO_BUYER.to_string()));
    }
    Ok(())
}

/// Sellers need a phone number; professionals also need a company name and
/// a SIRET number.
pub fn validate_seller(update: &UpdateProfile) -> Result<(), ApiError> {
    if !update.account_type.is_some_and(AccountType::is_seller) {
        return Ok(());
    }
    if is_blank(&update.phone) {
        return Err(ApiError::Application(PHONE_REQUIRED.to_string()));
    }
    let professional = update.seller_type == Some(SellerType::Professional)
        || update.account_type == Some(AccountType::SellerPro);
    if professional {
        if is_blank(&update.company_name) {
            return Err(ApiError::Application(COMPANY_REQUIRED.to_string()));
        }
        if is_blank(&update.siret) {
            return Err(ApiError::Application(SIRET_REQUIRED.to_string()));
        }
    }
    Ok(())
}

/// Account type implied by the seller switch and the seller type.
pub fn account_type_for(seller_enabled: bool, seller_type: Option<SellerType>) -> AccountType {
    match (seller_enabled, seller_type) {
        (false, _) => AccountType::Buyer,
        (true, Some(SellerType::Professional)) => AccountType::SellerPro,
        (true, _) => AccountType::SellerParticular,
    }
}

/// Requested account type. A seller asking for a seller type gets the
/// matching seller account; other requests pass through.
pub fn resolve_account_type(update: &UpdateProfile) -> Option<AccountType> {
    match (update.account_type, update.seller_type) {
        (Some(requested), Some(seller_type)) if requested.is_seller() => {
            Some(account_type_for(true, Some(seller_type)))
        }
        (requested, _) => requested,
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
