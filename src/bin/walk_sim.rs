//! Scripted walk simulation against the in-memory store
//!
//! Walks three short routes around a block, promotes them into chains,
//! and prints the resulting territory. Useful for eyeballing rule
//! behavior without a device.

use std::sync::Arc;

use geo_types::coord;

use pathclaim::core::config::GameConfig;
use pathclaim::core::types::{GeoPoint, PlayerId, SessionKind};
use pathclaim::position::PositionSample;
use pathclaim::session::PlayerSession;
use pathclaim::storage::MemoryStore;

/// ~200m in degrees of latitude at the equator
const SIDE_DEG: f64 = 0.0018;
const POINTS_PER_WALK: usize = 24;

fn walk_route(from: GeoPoint, to: GeoPoint) -> Vec<PositionSample> {
    let mut t = chrono::Utc::now();
    (0..POINTS_PER_WALK)
        .map(|i| {
            let f = i as f64 / (POINTS_PER_WALK - 1) as f64;
            let point = coord! {
                x: from.x + (to.x - from.x) * f,
                y: from.y + (to.y - from.y) * f,
            };
            t += chrono::Duration::seconds(2);
            PositionSample::at(point, t).with_speed(1.4)
        })
        .collect()
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting pathclaim walk simulation");

    let config = GameConfig::default();
    let store = Arc::new(MemoryStore::new());
    let mut session =
        PlayerSession::new(PlayerId::new(), SessionKind::Permanent, config, store)
            .expect("default config is valid");

    // Three legs of a block: corners end up as established nodes
    let corners = [
        coord! { x: 0.0, y: 0.0 },
        coord! { x: SIDE_DEG, y: 0.0 },
        coord! { x: SIDE_DEG, y: SIDE_DEG },
        coord! { x: 0.0, y: SIDE_DEG },
    ];

    for leg in corners.windows(2) {
        let check = session.start_walk(leg[0]).await.expect("start_walk");
        if !check.allowed {
            tracing::warn!(reason = ?check.reason, "walk rejected");
            continue;
        }
        for sample in walk_route(leg[0], leg[1]) {
            let event = session.ingest_sample(sample).await.expect("ingest");
            tracing::debug!(?event, "sample processed");
        }
        let done = session.finish_walk().await.expect("finish_walk");
        tracing::info!(allowed = done.allowed, "walk finished");
    }

    tracing::info!(
        nodes = session.nodes().len(),
        chains = session.chains().len(),
        "session state"
    );
    match session.territory() {
        Some(t) => tracing::info!(area_m2 = t.area_m2, "territory established"),
        None => tracing::info!("no territory yet (need 3 established nodes)"),
    }
    session.flush().await;
}
