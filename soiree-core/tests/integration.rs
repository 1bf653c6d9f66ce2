//! Integration Tests for the Site Core
//!
//! These tests drive whole pages through the host: server render, hydration,
//! providers and persistence working together.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use soiree_core::booking::{load_draft, save_draft, BookingDraft};
use soiree_core::catalog::{bundle_card, Catalog};
use soiree_core::reactive::{use_context, Signal};
use soiree_core::storage::{MemoryStore, Persistence};
use soiree_core::toast::{provide_toaster, use_toast, NewToast};
use soiree_core::view::{
    dynamic, el, ClientOnly, CommitQueue, Host, MountState, RenderMode, View,
};
use soiree_core::{SiteConfig, UiError};

const CATALOG: &str = r#"{
    "organizers": [{"id": "org-1", "name": "Golden Hour", "location": "Makati"}],
    "paymentMethods": [{"id": "gcash", "name": "GCash", "kind": "eWallet"}],
    "bundles": [
        {"id": "b-1", "name": "Garden Wedding", "organizerId": "org-1",
         "price": 150000, "capacity": 120, "inclusions": ["Venue"]}
    ]
}"#;

/// A page whose footer shows the visitor's local greeting, which the server
/// cannot know.
fn greeting_page(local: Rc<Cell<bool>>, gated: bool) -> impl Fn() -> View {
    move || {
        let greeting = {
            let local = local.clone();
            move || -> View {
                if local.get() {
                    "Magandang gabi".into()
                } else {
                    "Good evening".into()
                }
            }
        };
        let footer: View = if gated {
            ClientOnly::new(greeting).into()
        } else {
            greeting()
        };
        el("footer").child(footer).into()
    }
}

/// Client-only content keeps the first client commit identical to the server
/// output, then appears in exactly one further commit.
#[test]
fn hydration_with_client_only_matches_then_reveals() {
    let server_html = Host::render_to_string(greeting_page(Rc::new(Cell::new(false)), true));
    assert_eq!(server_html, "<footer></footer>");

    let host = Host::hydrate(&server_html, greeting_page(Rc::new(Cell::new(true)), true));
    assert!(host.mismatch().is_none());
    assert_eq!(
        host.history(),
        &["<footer></footer>", "<footer>Magandang gabi</footer>"]
    );
}

/// The same page without the gate hydrates differently from the server.
#[test]
fn hydration_without_client_only_reports_mismatch() {
    let server_html = Host::render_to_string(greeting_page(Rc::new(Cell::new(false)), false));
    let host = Host::hydrate(&server_html, greeting_page(Rc::new(Cell::new(true)), false));

    let mismatch = host.mismatch().expect("mismatch detected");
    assert_eq!(mismatch.server, "<footer>Good evening</footer>");
    assert_eq!(mismatch.client, "<footer>Magandang gabi</footer>");
}

/// A server render never produces client-only content.
#[test]
fn server_render_keeps_placeholder() {
    let host = Host::mount(RenderMode::Server, || {
        ClientOnly::new(|| "content".into())
            .with_placeholder(|| "loading".into())
            .into()
    });
    assert_eq!(host.history(), &["loading"]);
}

/// Unmounting before the post-commit hooks run leaves the latch untouched.
#[test]
fn disposed_region_never_mounts() {
    let host = Host::mount(RenderMode::Client, || View::Empty);
    let (handle, commits) = host.run(|| {
        let handle = ClientOnly::new(|| "late".into()).mount();
        (handle, use_context::<CommitQueue>().expect("client host queue"))
    });
    assert_eq!(commits.pending(), 1);
    host.unmount();

    assert_eq!(commits.flush(), 1);
    assert_eq!(handle.mount_state(), MountState::NotYetMounted);
    assert_eq!(handle.html(), "");
}

/// A component inside the provider pushes a toast; a list view re-renders.
#[test]
fn toast_flow_through_provider() {
    let mut host = Host::mount(RenderMode::Client, || {
        let toaster = provide_toaster(&SiteConfig::default());
        let list = dynamic(move || {
            el("ol")
                .children(
                    toaster
                        .list()
                        .into_iter()
                        .map(|t| View::from(el("li").child(t.title.unwrap_or_default()))),
                )
                .into()
        });
        el("section").child(list).into()
    });
    assert_eq!(host.html(), "<section><ol></ol></section>");

    let toaster = host.run(use_toast).expect("provider in scope");
    let start = Instant::now();
    let id = toaster.add(NewToast::titled("Booking saved"));
    host.flush();
    assert_eq!(host.html(), "<section><ol><li>Booking saved</li></ol></section>");

    toaster.dismiss_at(Some(id), start);
    toaster.sweep_at(start + Duration::from_millis(SiteConfig::default().toast_remove_delay_ms));
    host.flush();
    assert_eq!(host.html(), "<section><ol></ol></section>");
}

#[test]
fn toast_outside_provider_is_an_error() {
    let host = Host::mount(RenderMode::Client, || View::Empty);
    let result = host.run(use_toast);
    assert!(matches!(result, Err(UiError::MissingContext { .. })));
}

/// Catalog cards hydrate cleanly because the price is client-only.
#[test]
fn bundle_cards_hydrate_without_mismatch() {
    let catalog = Rc::new(Catalog::from_json(CATALOG).unwrap());
    let config = SiteConfig::from_json(r#"{"locale": "en-PH", "currencyCode": "PHP"}"#).unwrap();
    let formatter = config.currency_formatter();

    let page = {
        let catalog = catalog.clone();
        move || -> View {
            el("div")
                .children(catalog.bundles().map(|b| bundle_card(b, &formatter)))
                .into()
        }
    };

    let server_html = Host::render_to_string(page.clone());
    let host = Host::hydrate(&server_html, page);
    assert!(host.mismatch().is_none());
    assert!(host.html().contains("₱150,000.00"));
    assert_eq!(host.history().len(), 2);
}

/// A draft written on one visit is read back on the next.
#[test]
fn booking_draft_persists_across_hosts() {
    let store = Arc::new(MemoryStore::new());
    let config = SiteConfig::default();
    let catalog = Catalog::from_json(CATALOG).unwrap();

    let draft = BookingDraft {
        bundle_id: Some("b-1".into()),
        guests: 80,
        ..BookingDraft::default()
    };
    save_draft(
        &Persistence::new(store.clone()).with_namespace(config.storage_namespace.clone()),
        &draft,
    );

    let next_visit = Persistence::new(store).with_namespace(config.storage_namespace);
    let restored = load_draft(&next_visit);
    assert_eq!(restored, draft);
    assert_eq!(restored.total(&catalog), Some(150000.0));
}

/// Signals changed outside the tree are committed on the next flush.
#[test]
fn external_signal_changes_commit_on_flush() {
    let guests = Signal::new(10_u32);
    let mut host = Host::mount(RenderMode::Client, {
        let guests = guests.clone();
        move || dynamic(move || format!("{} guests", guests.get()).into())
    });
    assert_eq!(host.html(), "10 guests");

    guests.set(25);
    assert_eq!(host.flush(), 1);
    assert_eq!(host.html(), "25 guests");
}
