//! Category-specific views over a listing's filter bag.
//!
//! The filter bag is an open map on the wire. `CategoryDetails` reads only
//! the keys that belong to the listing's own category, so a stray `mileage`
//! on a real-estate listing is never surfaced.

use serde_json::{Map, Value};

use crate::types::Listing;

pub const VEHICLE: &str = "vehicle";
pub const REAL_ESTATE: &str = "real_estate";
pub const SERVICES: &str = "services";
pub const CRAFT: &str = "craft";

#[derive(Debug, Clone, PartialEq)]
pub enum CategoryDetails {
    Vehicle {
        brand: Option<String>,
        model: Option<String>,
        year: Option<u64>,
        mileage: Option<u64>,
    },
    RealEstate {
        surface: Option<f64>,
        rooms: Option<u64>,
        bedrooms: Option<u64>,
        bathrooms: Option<u64>,
    },
    Services {
        service_type: Option<String>,
        experience_level: Option<String>,
    },
    Craft {
        craft_type: Option<String>,
        material: Option<String>,
        dimensions: Option<String>,
    },
    Other,
}

impl CategoryDetails {
    pub fn from_listing(listing: &Listing) -> Self {
        Self::read(&listing.category, &listing.filters)
    }

    pub fn read(category: &str, filters: &Map<String, Value>) -> Self {
        match category {
            VEHICLE => CategoryDetails::Vehicle {
                brand: text(filters, "brand"),
                model: text(filters, "model"),
                year: count(filters, "year"),
                mileage: count(filters, "mileage"),
            },
            REAL_ESTATE => CategoryDetails::RealEstate {
                surface: number(filters, "surface"),
                rooms: count(filters, "rooms"),
                bedrooms: count(filters, "bedrooms"),
                bathrooms: count(filters, "bathrooms"),
            },
            SERVICES => CategoryDetails::Services {
                service_type: text(filters, "service_type"),
                experience_level: text(filters, "experience_level"),
            },
            CRAFT => CategoryDetails::Craft {
                craft_type: text(filters, "craft_type"),
                material: text(filters, "material"),
                dimensions: text(filters, "dimensions"),
            },
            _ => CategoryDetails::Other,
        }
    }

    /// Label/value rows for the detail page. Absent, empty and zero values
    /// are left out.
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = Vec::new();
        match self {
            CategoryDetails::Vehicle {
                brand,
                model,
                year,
                mileage,
            } => {
                push_text(&mut rows, "Marque", brand);
                push_text(&mut rows, "Modèle", model);
                push_count(&mut rows, "Année", *year, "");
                push_count(&mut rows, "Kilométrage", *mileage, " km");
            }
            CategoryDetails::RealEstate {
                surface,
                rooms,
                bedrooms,
                bathrooms,
            } => {
                push_count(&mut rows, "Pièces", *rooms, "");
                if let Some(surface) = surface.filter(|s| *s != 0.0) {
                    rows.push(("Surface", format!("{surface} m²")));
                }
                push_count(&mut rows, "Chambres", *bedrooms, "");
                push_count(&mut rows, "Salles de bain", *bathrooms, "");
            }
            CategoryDetails::Services {
                service_type,
                experience_level,
            } => {
                push_text(&mut rows, "Type de service", service_type);
                push_text(&mut rows, "Expérience", experience_level);
            }
            CategoryDetails::Craft {
                craft_type,
                material,
                dimensions,
            } => {
                push_text(&mut rows, "Type", craft_type);
                push_text(&mut rows, "Matériau", material);
                push_text(&mut rows, "Dimensions", dimensions);
            }
            CategoryDetails::Other => {}
        }
        rows
    }
}

pub fn category_label(category: &str) -> &str {
    match category {
        VEHICLE => "Véhicules",
        REAL_ESTATE => "Immobilier",
        SERVICES => "Services",
        CRAFT => "Artisanat",
        other => other,
    }
}

pub fn transaction_label(transaction: Option<&str>) -> Option<&str> {
    match transaction? {
        "" => None,
        "rent" | "location" => Some("Location"),
        "sale" | "achat" => Some("Vente"),
        other => Some(other),
    }
}

fn text(filters: &Map<String, Value>, key: &str) -> Option<String> {
    filters.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Numbers, or strings holding a number (form inputs often arrive as text).
fn number(filters: &Map<String, Value>, key: &str) -> Option<f64> {
    match filters.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn count(filters: &Map<String, Value>, key: &str) -> Option<u64> {
    number(filters, key)
        .filter(|n| *n >= 0.0)
        .map(|n| n.trunc() as u64)
}

fn push_text(rows: &mut Vec<(&'static str, String)>, label: &'static str, value: &Option<String>) {
    if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
        rows.push((label, value.to_string()));
    }
}

fn push_count(rows: &mut Vec<(&'static str, String)>, label: &'static str, value: Option<u64>, unit: &str) {
    if let Some(value) = value.filter(|v| *v != 0) {
        rows.push((label, format!("{value}{unit}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use serde_json::json;

    #[test]
    fn vehicle_rows() {
        let listing = normalize(&json!({
            "id": "1",
            "title": "Clio",
            "category": "vehicle",
            "filters": {"brand": "Renault", "model": "Clio", "year": 2015, "mileage": "82000"}
        }))
        .unwrap();
        let details = CategoryDetails::from_listing(&listing);
        assert_eq!(
            details.display_rows(),
            vec![
                ("Marque", "Renault".to_string()),
                ("Modèle", "Clio".to_string()),
                ("Année", "2015".to_string()),
                ("Kilométrage", "82000 km".to_string()),
            ]
        );
    }

    #[test]
    fn keys_from_other_categories_are_ignored() {
        let filters = json!({"mileage": 12000, "brand": "Peugeot", "surface": 45, "rooms": 2});
        let filters = filters.as_object().unwrap();
        let details = CategoryDetails::read(REAL_ESTATE, filters);
        assert_eq!(
            details,
            CategoryDetails::RealEstate {
                surface: Some(45.0),
                rooms: Some(2),
                bedrooms: None,
                bathrooms: None,
            }
        );
        let rows = details.display_rows();
        assert!(rows.iter().all(|(label, _)| *label != "Kilométrage" && *label != "Marque"));
        assert_eq!(rows, vec![("Pièces", "2".to_string()), ("Surface", "45 m²".to_string())]);
    }

    #[test]
    fn wrongly_typed_and_zero_values_are_skipped() {
        let filters = json!({"service_type": 3, "experience_level": ""});
        let details = CategoryDetails::read(SERVICES, filters.as_object().unwrap());
        assert!(details.display_rows().is_empty());

        let filters = json!({"rooms": 0, "bathrooms": -1});
        let details = CategoryDetails::read(REAL_ESTATE, filters.as_object().unwrap());
        assert!(details.display_rows().is_empty());
    }

    #[test]
    fn unknown_category_has_no_details() {
        let filters = json!({"craft_type": "poterie"});
        let details = CategoryDetails::read("jobs", filters.as_object().unwrap());
        assert_eq!(details, CategoryDetails::Other);
        assert!(details.display_rows().is_empty());
    }

    #[test]
    fn labels_fall_back_to_raw_value() {
        assert_eq!(category_label("craft"), "Artisanat");
        assert_eq!(category_label("jobs"), "jobs");
        assert_eq!(transaction_label(Some("achat")), Some("Vente"));
        assert_eq!(transaction_label(Some("rent")), Some("Location"));
        assert_eq!(transaction_label(Some("swap")), Some("swap"));
        assert_eq!(transaction_label(None), None);
        assert_eq!(transaction_label(Some("")), None);
    }
}
