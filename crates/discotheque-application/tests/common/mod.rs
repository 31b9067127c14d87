#![allow(dead_code)]

use discotheque_application::{AppState, InMemoryEventBus};
use discotheque_config::AppConfig;
use discotheque_paging::PagingSnapshot;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use wiremock::MockServer;

/// App state pointed at `server`, recording events in the returned bus.
pub fn app_for(server: &MockServer) -> (AppState, InMemoryEventBus) {
    let mut config = AppConfig::default();
    config.discogs.base_url = server.uri();
    config.discogs.token = Some("test-token".to_string());

    let client = discotheque_application::build_catalog_client(&config.discogs).unwrap();
    let bus = InMemoryEventBus::new();
    let state = AppState::with_parts(config, Arc::new(client), Arc::new(bus.clone()));
    (state, bus)
}

pub async fn wait_until<T: Clone>(
    snapshots: &mut watch::Receiver<PagingSnapshot<T>>,
    predicate: impl FnMut(&PagingSnapshot<T>) -> bool,
) -> PagingSnapshot<T> {
    let snapshot = tokio::time::timeout(Duration::from_secs(5), snapshots.wait_for(predicate))
        .await
        .expect("snapshot condition not reached in time")
        .expect("snapshot channel closed");
    (*snapshot).clone()
}

pub fn artist_json(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "title": name,
        "thumb": format!("https://i.discogs.com/{id}-thumb.jpg"),
        "cover_image": format!("https://i.discogs.com/{id}.jpg"),
        "resource_url": format!("https://api.discogs.com/artists/{id}"),
        "uri": format!("/artist/{id}"),
        "type": "artist"
    })
}

pub fn release_json(id: u64, title: &str, year: i32) -> Value {
    json!({
        "id": id,
        "title": title,
        "year": year,
        "type": "master",
        "role": "Main",
        "thumb": ""
    })
}

pub fn pagination(page: u32, pages: u32, items: u32) -> Value {
    json!({"per_page": 30, "items": items, "page": page, "pages": pages, "urls": {}})
}
