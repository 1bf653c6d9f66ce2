//! Event catalog.
//!
//! Organizers, payment methods and event bundles, loaded from JSON and
//! indexed by id in their original order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::currency::CurrencyFormatter;
use crate::error::UiError;
use crate::view::{el, ClientOnly, View};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organizer {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    /// Out of five.
    #[serde(default)]
    pub rating: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentKind {
    Card,
    EWallet,
    BankTransfer,
    Cash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: String,
    pub name: String,
    pub kind: PaymentKind,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBundle {
    pub id: String,
    pub name: String,
    pub organizer_id: String,
    /// Absent while a bundle's price is still being quoted.
    #[serde(default)]
    pub price: Option<f64>,
    /// Maximum number of guests.
    pub capacity: u32,
    #[serde(default)]
    pub inclusions: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCatalog {
    #[serde(default)]
    organizers: Vec<Organizer>,
    #[serde(default)]
    payment_methods: Vec<PaymentMethod>,
    #[serde(default)]
    bundles: Vec<EventBundle>,
}

/// The indexed catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    organizers: IndexMap<String, Organizer>,
    payment_methods: IndexMap<String, PaymentMethod>,
    bundles: IndexMap<String, EventBundle>,
}

impl Catalog {
    /// Parse `{"organizers": [..], "paymentMethods": [..], "bundles": [..]}`.
    ///
    /// A later record with a repeated id replaces the earlier one in place.
    pub fn from_json(json: &str) -> Result<Self, UiError> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        Ok(Self::from_parts(raw.organizers, raw.payment_methods, raw.bundles))
    }

    pub fn from_parts(
        organizers: Vec<Organizer>,
        payment_methods: Vec<PaymentMethod>,
        bundles: Vec<EventBundle>,
    ) -> Self {
        Self {
            organizers: organizers.into_iter().map(|o| (o.id.clone(), o)).collect(),
            payment_methods: payment_methods
                .into_iter()
                .map(|m| (m.id.clone(), m))
                .collect(),
            bundles: bundles.into_iter().map(|b| (b.id.clone(), b)).collect(),
        }
    }

    pub fn organizer(&self, id: &str) -> Option<&Organizer> {
        self.organizers.get(id)
    }

    pub fn organizers(&self) -> impl Iterator<Item = &Organizer> {
        self.organizers.values()
    }

    pub fn bundle(&self, id: &str) -> Option<&EventBundle> {
        self.bundles.get(id)
    }

    pub fn bundles(&self) -> impl Iterator<Item = &EventBundle> {
        self.bundles.values()
    }

    pub fn bundles_by_organizer<'a>(
        &'a self,
        organizer_id: &'a str,
    ) -> impl Iterator<Item = &'a EventBundle> + 'a {
        self.bundles
            .values()
            .filter(move |b| b.organizer_id == organizer_id)
    }

    /// Bundles that can host at least `guests` people.
    pub fn bundles_for_guests(&self, guests: u32) -> impl Iterator<Item = &EventBundle> {
        self.bundles.values().filter(move |b| b.capacity >= guests)
    }

    pub fn payment_method(&self, id: &str) -> Option<&PaymentMethod> {
        self.payment_methods.get(id)
    }

    pub fn payment_methods(&self) -> impl Iterator<Item = &PaymentMethod> {
        self.payment_methods.values()
    }

    pub fn enabled_payment_methods(&self) -> impl Iterator<Item = &PaymentMethod> {
        self.payment_methods.values().filter(|m| m.enabled)
    }

    /// Lowest and highest known bundle price.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        self.bundles
            .values()
            .filter_map(|b| b.price)
            .filter(|p| p.is_finite())
            .fold(None, |range, price| match range {
                None => Some((price, price)),
                Some((low, high)) => Some((low.min(price), high.max(price))),
            })
    }
}

/// A card for `bundle`.
///
/// The price depends on the visitor's locale, so it is only formatted once
/// the page is interactive; the server and the first client render show a
/// placeholder instead.
pub fn bundle_card(bundle: &EventBundle, formatter: &CurrencyFormatter) -> View {
    let price = {
        let formatter = formatter.clone();
        let amount = bundle.price;
        ClientOnly::new(move || {
            el("span")
                .class("bundle-price")
                .child(formatter.format(amount))
                .into()
        })
        .with_placeholder(|| {
            el("span")
                .class("bundle-price bundle-price--pending")
                .attr("aria-busy", "true")
                .into()
        })
        .into_view()
    };

    el("article")
        .class("bundle-card")
        .attr("data-bundle", bundle.id.clone())
        .child(el("h3").child(bundle.name.clone()))
        .child(price)
        .child(
            el("p")
                .class("bundle-capacity")
                .child(format!("Up to {} guests", bundle.capacity)),
        )
        .child(
            el("ul").class("bundle-inclusions").children(
                bundle
                    .inclusions
                    .iter()
                    .map(|item| View::from(el("li").child(item.clone()))),
            ),
        )
        .into()
}
