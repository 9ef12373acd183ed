//! Live API tests. Run with: `cargo test --features online -- --nocapture`
#![cfg(feature = "online")]

use dashcharts::dashboard::{PanelView, load_dashboard, standard_panels};
use dashcharts::posts::PostFilters;
use dashcharts::{Client, Endpoint};

#[test]
fn health_is_ok() {
    let h = Client::default().health().unwrap();
    assert!(!h.status.is_empty());
}

#[test]
fn every_mock_endpoint_parses() {
    let cli = Client::default();
    for e in Endpoint::ALL {
        cli.fetch_payload(e)
            .unwrap_or_else(|err| panic!("{}: {err:#}", e.path()));
    }
}

#[test]
fn dashboard_panels_are_ready() {
    let panels = load_dashboard(&Client::default(), &standard_panels());
    assert_eq!(panels.len(), 10);
    assert!(
        panels
            .iter()
            .all(|p| matches!(p.view, PanelView::Ready(_) | PanelView::Empty))
    );
}

#[test]
fn mock_posts_listing() {
    let cli = Client::default();
    let posts = cli.mock_posts().unwrap();
    assert!(posts.iter().all(|p| !p.id.is_empty()));
    // Listing real posts requires a token; only check that the request shape is accepted.
    let _ = cli.list_posts(&PostFilters {
        limit: Some(5),
        ..Default::default()
    });
}
