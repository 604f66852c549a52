//! Seller dashboard listing table: status filter, search, sort, pages.

use std::cmp::Ordering;

use chrono::DateTime;

use crate::status::ApiStatus;
use crate::types::Listing;

pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ApiStatus),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOption {
    #[default]
    Newest,
    Oldest,
    PriceHigh,
    PriceLow,
    Views,
}

impl SortOption {
    /// Parse the select value used by the dashboard; unknown values keep the
    /// server order.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "newest" => Some(SortOption::Newest),
            "oldest" => Some(SortOption::Oldest),
            "price_high" => Some(SortOption::PriceHigh),
            "price_low" => Some(SortOption::PriceLow),
            "views" => Some(SortOption::Views),
            _ => None,
        }
    }
}

/// Current state of the seller's listing table. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerListingsView {
    pub status: StatusFilter,
    pub search: String,
    pub sort: Option<SortOption>,
    pub page: usize,
}

impl Default for SellerListingsView {
    fn default() -> Self {
        Self {
            status: StatusFilter::All,
            search: String::new(),
            sort: Some(SortOption::Newest),
            page: 1,
        }
    }
}

/// One rendered page of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage<'a> {
    pub items: Vec<&'a Listing>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

impl SellerListingsView {
    /// Filtered and sorted listings, before pagination.
    pub fn filter<'a>(&self, listings: &'a [Listing]) -> Vec<&'a Listing> {
        let term = self.search.trim().to_lowercase();
        let mut result: Vec<&Listing> = listings
            .iter()
            .filter(|listing| match self.status {
                StatusFilter::All => true,
                StatusFilter::Only(status) => listing.status == status,
            })
            .filter(|listing| {
                term.is_empty()
                    || listing.title.to_lowercase().contains(&term)
                    || listing.description.to_lowercase().contains(&term)
            })
            .collect();

        if let Some(sort) = self.sort {
            match sort {
                SortOption::Newest => result.sort_by_key(|l| std::cmp::Reverse(created_millis(l))),
                SortOption::Oldest => result.sort_by_key(|l| created_millis(l)),
                SortOption::PriceHigh => result.sort_by(|a, b| by_price(b, a)),
                SortOption::PriceLow => result.sort_by(|a, b| by_price(a, b)),
                SortOption::Views => result.sort_by(|a, b| b.views.cmp(&a.views)),
            }
        }
        result
    }

    pub fn page<'a>(&self, listings: &'a [Listing]) -> ListingPage<'a> {
        let filtered = self.filter(listings);
        let total = filtered.len();
        let total_pages = total.div_ceil(PAGE_SIZE).max(1);
        let start = self.page.saturating_sub(1).saturating_mul(PAGE_SIZE);
        let items = filtered.into_iter().skip(start).take(PAGE_SIZE).collect();
        ListingPage {
            items,
            total,
            page: self.page,
            total_pages,
        }
    }

    /// Changing a filter sends the table back to the first page.
    pub fn set_status(&mut self, status: StatusFilter) {
        self.status = status;
        self.page = 1;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: Option<SortOption>) {
        self.sort = sort;
        self.page = 1;
    }
}

/// Replace the status of one listing in place, as after a successful
/// status update.
pub fn apply_status(listings: &mut [Listing], id: &str, status: ApiStatus) -> bool {
    match listings.iter_mut().find(|listing| listing.id == id) {
        Some(listing) => {
            listing.status = status;
            true
        }
        None => false,
    }
}

/// Drop a deleted listing from the table.
pub fn remove_listing(listings: &mut Vec<Listing>, id: &str) -> bool {
    let before = listings.len();
    listings.retain(|listing| listing.id != id);
    listings.len() != before
}

/// Creation instant in epoch milliseconds; missing or unparseable dates
/// count as the epoch.
fn created_millis(listing: &Listing) -> i64 {
    listing
        .created_at
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map_or(0, |at| at.timestamp_millis())
}

fn by_price(a: &Listing, b: &Listing) -> Ordering {
    a.price
        .sort_key()
        .partial_cmp(&b.price.sort_key())
        .unwrap_or(Ordering::Equal)
}
