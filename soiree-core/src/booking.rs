//! The in-progress booking form.
//!
//! The draft is saved to client storage as the visitor fills the form, so a
//! reload resumes where they left off.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Catalog, EventBundle};
use crate::error::StorageError;
use crate::storage::Persistence;

/// Storage key for the draft.
pub const DRAFT_KEY: &str = "booking-draft";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingDraft {
    pub bundle_id: Option<String>,
    pub payment_method_id: Option<String>,
    pub guests: u32,
    /// ISO 8601 date, as entered.
    pub event_date: Option<String>,
    pub contact_name: Option<String>,
    pub notes: Option<String>,
}

impl Default for BookingDraft {
    fn default() -> Self {
        Self {
            bundle_id: None,
            payment_method_id: None,
            guests: 1,
            event_date: None,
            contact_name: None,
            notes: None,
        }
    }
}

impl BookingDraft {
    /// The selected bundle, if it still exists.
    pub fn bundle<'a>(&self, catalog: &'a Catalog) -> Option<&'a EventBundle> {
        self.bundle_id.as_deref().and_then(|id| catalog.bundle(id))
    }

    /// Price of the selected bundle.
    ///
    /// `None` when nothing is selected or the bundle has no price yet.
    pub fn total(&self, catalog: &Catalog) -> Option<f64> {
        self.bundle(catalog).and_then(|bundle| bundle.price)
    }

    /// Whether the draft can be submitted against `catalog`.
    pub fn is_complete(&self, catalog: &Catalog) -> bool {
        let bundle_fits = self
            .bundle(catalog)
            .is_some_and(|bundle| self.guests >= 1 && self.guests <= bundle.capacity);
        let payment_ok = self
            .payment_method_id
            .as_deref()
            .and_then(|id| catalog.payment_method(id))
            .is_some_and(|method| method.enabled);
        let named = self
            .contact_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());

        bundle_fits && payment_ok && named && self.event_date.is_some()
    }
}

pub fn save_draft(persistence: &Persistence, draft: &BookingDraft) {
    persistence.save(DRAFT_KEY, draft);
}

/// The saved draft, or a fresh one.
pub fn load_draft(persistence: &Persistence) -> BookingDraft {
    persistence.load(DRAFT_KEY).unwrap_or_else(|| {
        debug!("no saved booking draft; starting fresh");
        BookingDraft::default()
    })
}

/// The saved draft, distinguishing "none saved" from a failed read.
pub fn try_load_draft(persistence: &Persistence) -> Result<Option<BookingDraft>, StorageError> {
    persistence.try_load(DRAFT_KEY)
}

pub fn clear_draft(persistence: &Persistence) {
    persistence.clear(DRAFT_KEY);
}
