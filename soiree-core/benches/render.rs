//! Render and hydrate throughput for a catalog page.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use soiree_core::catalog::{bundle_card, Catalog, EventBundle};
use soiree_core::currency::CurrencyFormatter;
use soiree_core::view::{el, Host, View};

fn catalog(bundles: usize) -> Catalog {
    let bundles = (0..bundles)
        .map(|i| EventBundle {
            id: format!("b-{i}"),
            name: format!("Bundle {i}"),
            organizer_id: "org-1".to_string(),
            price: Some(25_000.0 + i as f64 * 750.0),
            capacity: 50 + i as u32,
            inclusions: vec!["Venue".into(), "Catering".into(), "Lights & sound".into()],
        })
        .collect();
    Catalog::from_parts(Vec::new(), Vec::new(), bundles)
}

fn page(catalog: &Catalog) -> impl Fn() -> View + Clone + '_ {
    let formatter = CurrencyFormatter::new("en-PH", "PHP");
    move || {
        el("main")
            .children(catalog.bundles().map(|b| bundle_card(b, &formatter)))
            .into()
    }
}

fn bench_render(c: &mut Criterion) {
    let catalog = catalog(100);

    c.bench_function("render_to_string_100_cards", |b| {
        b.iter(|| black_box(Host::render_to_string(page(&catalog))))
    });

    let server_html = Host::render_to_string(page(&catalog));
    c.bench_function("hydrate_100_cards", |b| {
        b.iter(|| {
            let host = Host::hydrate(&server_html, page(&catalog));
            black_box(host.html().len());
            host.unmount();
        })
    });

    let formatter = CurrencyFormatter::default();
    c.bench_function("format_currency", |b| {
        b.iter(|| black_box(formatter.format(black_box(Some(1_234_567.891)))))
    });
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
