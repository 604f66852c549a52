//! Optimistic favorite toggling for one listing view.
//!
//! # Design
//! `FavoriteToggle` owns the observable favorite flag and favorites counter
//! of a single listing. A toggle flips both immediately, then the remote
//! add/remove call decides whether the change stays or is rolled back.
//!
//! Alongside the observable state the coordinator keeps a confirmed
//! baseline: the flag and counter the server last acknowledged. Any
//! successful call moves the baseline, older ones included. A failure of the
//! most recent toggle reverts the view to the baseline, never to values that
//! were themselves optimistic.
//!
//! Every `begin` hands out a ticket with a fresh sequence number. Only the
//! most recently issued ticket decides what the view shows while it is in
//! flight, so the final state follows the user's last click rather than
//! whichever response arrived last. Once it has resolved, the view tracks
//! the baseline. The phase stays `Pending` until every issued ticket has
//! come back. Completions after `detach` are discarded.

use std::collections::BTreeSet;

use crate::client::MarketClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::types::ListingDetail;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoritePhase {
    Idle { is_favorite: bool },
    Pending { target: bool },
}

/// How a completed toggle affected the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The server accepted the change and the view shows the confirmed state.
    Confirmed { is_favorite: bool },
    /// A newer toggle still decides the view; this result only updated the
    /// confirmed baseline.
    Superseded,
    /// The view was detached; this result was ignored.
    Discarded,
}

/// One in-flight toggle. Execute `request()` and hand the ticket back to
/// `FavoriteToggle::complete`.
#[derive(Debug)]
pub struct ToggleTicket {
    seq: u64,
    target: bool,
    request: HttpRequest,
}

impl ToggleTicket {
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn target(&self) -> bool {
        self.target
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone)]
pub struct FavoriteToggle {
    listing_id: String,
    is_favorite: bool,
    favorites: u64,
    confirmed_favorite: bool,
    confirmed_count: u64,
    /// Sequence of the newest ticket the server acknowledged.
    confirmed_seq: u64,
    issued: u64,
    in_flight: BTreeSet<u64>,
    live: bool,
}

impl FavoriteToggle {
    pub fn new(listing_id: impl Into<String>, is_favorite: bool, favorites: u64) -> Self {
        Self {
            listing_id: listing_id.into(),
            is_favorite,
            favorites,
            confirmed_favorite: is_favorite,
            confirmed_count: favorites,
            confirmed_seq: 0,
            issued: 0,
            in_flight: BTreeSet::new(),
            live: true,
        }
    }

    pub fn from_detail(detail: &ListingDetail) -> Self {
        Self::new(
            detail.listing.id.clone(),
            detail.is_favorite,
            detail.listing.favorites,
        )
    }

    pub fn listing_id(&self) -> &str {
        &self.listing_id
    }

    pub fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    pub fn favorites(&self) -> u64 {
        self.favorites
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn phase(&self) -> FavoritePhase {
        if self.in_flight.is_empty() {
            FavoritePhase::Idle {
                is_favorite: self.is_favorite,
            }
        } else {
            FavoritePhase::Pending {
                target: self.is_favorite,
            }
        }
    }

    /// Apply the optimistic flip and return the ticket for the remote call.
    pub fn begin(&mut self, client: &MarketClient) -> Result<ToggleTicket, ApiError> {
        if !self.live {
            return Err(ApiError::Application(
                "listing view is no longer active".to_string(),
            ));
        }

        let target = !self.is_favorite;
        self.favorites = shift(self.favorites, self.is_favorite, target);
        self.is_favorite = target;
        self.issued += 1;
        self.in_flight.insert(self.issued);

        tracing::debug!(listing_id = %self.listing_id, seq = self.issued, target, "favorite toggle issued");

        Ok(ToggleTicket {
            seq: self.issued,
            target,
            request: client.build_set_favorite(&self.listing_id, target),
        })
    }

    /// Reconcile a finished remote call with the view.
    ///
    /// A failure of the latest toggle reverts the view to the confirmed
    /// baseline and is returned to the caller. An older toggle that succeeds
    /// moves the baseline; if the latest toggle has already resolved, the
    /// view follows and the outcome is `Confirmed`.
    pub fn complete(
        &mut self,
        ticket: ToggleTicket,
        result: Result<(), ApiError>,
    ) -> Result<ToggleOutcome, ApiError> {
        if !self.live {
            tracing::debug!(listing_id = %self.listing_id, seq = ticket.seq, "favorite result discarded");
            return Ok(ToggleOutcome::Discarded);
        }
        self.in_flight.remove(&ticket.seq);
        let latest = ticket.seq == self.issued;

        match result {
            Ok(()) => {
                let moved = self.confirm(ticket.seq, ticket.target);
                if latest || (moved && !self.in_flight.contains(&self.issued)) {
                    self.show_confirmed();
                    return Ok(ToggleOutcome::Confirmed {
                        is_favorite: self.is_favorite,
                    });
                }
                Ok(ToggleOutcome::Superseded)
            }
            Err(err) if latest => {
                self.show_confirmed();
                tracing::warn!(listing_id = %self.listing_id, error = %err, "favorite toggle rolled back");
                Err(err)
            }
            Err(err) => {
                // The latest ticket owns the view, or the view already shows
                // the baseline, which this failure did not move.
                tracing::warn!(
                    listing_id = %self.listing_id,
                    seq = ticket.seq,
                    error = %err,
                    "superseded favorite toggle failed"
                );
                Ok(ToggleOutcome::Superseded)
            }
        }
    }

    /// `complete` for a raw response from the host.
    pub fn complete_response(
        &mut self,
        client: &MarketClient,
        ticket: ToggleTicket,
        response: HttpResponse,
    ) -> Result<ToggleOutcome, ApiError> {
        let result = client.parse_favorite_mutation(response);
        self.complete(ticket, result)
    }

    /// Toggle and drive the remote call through `transport`.
    pub async fn toggle<T>(
        &mut self,
        client: &MarketClient,
        transport: &T,
    ) -> Result<ToggleOutcome, ApiError>
    where
        T: Transport + ?Sized,
    {
        let ticket = self.begin(client)?;
        let result = match transport.execute(ticket.request().clone()).await {
            Ok(response) => client.parse_favorite_mutation(response),
            Err(err) => Err(err),
        };
        self.complete(ticket, result)
    }

    /// Mark the view as gone; later completions are ignored.
    pub fn detach(&mut self) {
        self.live = false;
        self.in_flight.clear();
    }

    /// Move the baseline to an acknowledged target unless a newer ticket was
    /// already acknowledged.
    fn confirm(&mut self, seq: u64, target: bool) -> bool {
        if seq <= self.confirmed_seq {
            return false;
        }
        self.confirmed_count = shift(self.confirmed_count, self.confirmed_favorite, target);
        self.confirmed_favorite = target;
        self.confirmed_seq = seq;
        true
    }

    fn show_confirmed(&mut self) {
        self.is_favorite = self.confirmed_favorite;
        self.favorites = self.confirmed_count;
    }
}

/// Counter after moving the flag from `from` to `to`, clamped at 0.
fn shift(count: u64, from: bool, to: bool) -> u64 {
    match (from, to) {
        (false, true) => count.saturating_add(1),
        (true, false) => count.saturating_sub(1),
        _ => count,
    }
}
