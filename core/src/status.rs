//! Listing status vocabularies and the translation between them.
//!
//! The backend speaks French status labels (`ApiStatus`). Screens also use
//! three English shorthands (`active`, `paused`, `sold`); `UiStatus` is the
//! union of both. Every translation in the crate goes through the two
//! functions below, and both fall back to `ApiStatus::Pending` instead of
//! failing.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Canonical listing status as stored by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ApiStatus {
    /// `En attente`
    #[default]
    Pending,
    /// `Publié`
    Published,
    /// `Rejeté`
    Rejected,
    /// `Suspendu`
    Suspended,
    /// `Vendu`
    Sold,
}

impl ApiStatus {
    pub const ALL: [ApiStatus; 5] = [
        ApiStatus::Pending,
        ApiStatus::Published,
        ApiStatus::Rejected,
        ApiStatus::Suspended,
        ApiStatus::Sold,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApiStatus::Pending => "En attente",
            ApiStatus::Published => "Publié",
            ApiStatus::Rejected => "Rejeté",
            ApiStatus::Suspended => "Suspendu",
            ApiStatus::Sold => "Vendu",
        }
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ApiStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Deserialization is total: unknown labels become `Pending`.
impl<'de> Deserialize<'de> for ApiStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(api_status_to_ui(raw.as_deref()))
    }
}

/// Status as selected on screen: any API label or one of the shorthands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiStatus {
    Api(ApiStatus),
    Active,
    Paused,
    Sold,
}

impl UiStatus {
    /// Total parse; anything unrecognized is `Pending`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "active" => UiStatus::Active,
            "paused" => UiStatus::Paused,
            "sold" => UiStatus::Sold,
            other => UiStatus::Api(api_status_to_ui(Some(other))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UiStatus::Api(status) => status.as_str(),
            UiStatus::Active => "active",
            UiStatus::Paused => "paused",
            UiStatus::Sold => "sold",
        }
    }
}

impl From<ApiStatus> for UiStatus {
    fn from(status: ApiStatus) -> Self {
        UiStatus::Api(status)
    }
}

impl fmt::Display for UiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a raw status string from the backend (or a UI shorthand) to the
/// canonical vocabulary.
pub fn api_status_to_ui(raw: Option<&str>) -> ApiStatus {
    match raw {
        Some("En attente") => ApiStatus::Pending,
        Some("Publié") | Some("active") => ApiStatus::Published,
        Some("Rejeté") => ApiStatus::Rejected,
        Some("Suspendu") | Some("paused") => ApiStatus::Suspended,
        Some("Vendu") | Some("sold") => ApiStatus::Sold,
        _ => ApiStatus::Pending,
    }
}

/// Map a UI-selected status to the label the backend expects.
pub fn ui_status_to_api(ui: UiStatus) -> ApiStatus {
    match ui {
        UiStatus::Active => ApiStatus::Published,
        UiStatus::Paused => ApiStatus::Suspended,
        UiStatus::Sold => ApiStatus::Sold,
        UiStatus::Api(status) => status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "En attente",
        "Publié",
        "Rejeté",
        "Suspendu",
        "Vendu",
        "active",
        "paused",
        "sold",
        "archived",
        "PUBLIÉ",
        "publié",
        " Vendu",
        "null",
    ];

    #[test]
    fn known_api_labels_pass_through() {
        for status in ApiStatus::ALL {
            assert_eq!(api_status_to_ui(Some(status.as_str())), status);
        }
    }

    #[test]
    fn shorthands_map_to_api_labels() {
        assert_eq!(api_status_to_ui(Some("active")), ApiStatus::Published);
        assert_eq!(api_status_to_ui(Some("paused")), ApiStatus::Suspended);
        assert_eq!(api_status_to_ui(Some("sold")), ApiStatus::Sold);
        assert_eq!(ui_status_to_api(UiStatus::Active), ApiStatus::Published);
        assert_eq!(ui_status_to_api(UiStatus::Paused), ApiStatus::Suspended);
        assert_eq!(ui_status_to_api(UiStatus::Sold), ApiStatus::Sold);
    }

    #[test]
    fn unknown_and_missing_fall_back_to_pending() {
        assert_eq!(api_status_to_ui(None), ApiStatus::Pending);
        assert_eq!(api_status_to_ui(Some("")), ApiStatus::Pending);
        assert_eq!(api_status_to_ui(Some("archived")), ApiStatus::Pending);
        assert_eq!(api_status_to_ui(Some("PUBLIÉ")), ApiStatus::Pending);
        assert_eq!(ui_status_to_api(UiStatus::parse("archived")), ApiStatus::Pending);
    }

    #[test]
    fn both_directions_are_idempotent() {
        for &raw in SAMPLES {
            let once = api_status_to_ui(Some(raw));
            assert_eq!(api_status_to_ui(Some(once.as_str())), once, "api: {raw:?}");

            let ui = UiStatus::parse(raw);
            let once = ui_status_to_api(ui);
            assert_eq!(ui_status_to_api(once.into()), once, "ui: {raw:?}");
            assert_eq!(ui_status_to_api(UiStatus::parse(once.as_str())), once);
        }
    }

    #[test]
    fn ui_parse_roundtrips_its_own_labels() {
        for raw in ["active", "paused", "sold"] {
            assert_eq!(UiStatus::parse(raw).as_str(), raw);
        }
        assert_eq!(UiStatus::parse("Rejeté"), UiStatus::Api(ApiStatus::Rejected));
    }

    #[test]
    fn serde_uses_api_labels_and_is_total() {
        let json = serde_json::to_string(&ApiStatus::Published).unwrap();
        assert_eq!(json, "\"Publié\"");
        let back: ApiStatus = serde_json::from_str("\"Vendu\"").unwrap();
        assert_eq!(back, ApiStatus::Sold);
        let unknown: ApiStatus = serde_json::from_str("\"whatever\"").unwrap();
        assert_eq!(unknown, ApiStatus::Pending);
        let null: ApiStatus = serde_json::from_str("null").unwrap();
        assert_eq!(null, ApiStatus::Pending);
    }
}
