// SPDX-License-Identifier: GPL-3.0-or-later

#[cfg(test)]
mod tests {
    use crate::{CatalogApi, DiscogsClient, DiscogsError, FailureKind};
    use discotheque_domain::{ArtistId, DiscographyFilter, ReleaseId, SortOption};
    use reqwest::StatusCode;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn artist_search_response() -> serde_json::Value {
        serde_json::json!({
            "pagination": {
                "per_page": 30,
                "items": 2,
                "page": 1,
                "pages": 1,
                "urls": {}
            },
            "results": [
                {
                    "id": 3840,
                    "title": "Radiohead",
                    "thumb": "https://i.discogs.com/radiohead-thumb.jpg",
                    "cover_image": "https://i.discogs.com/radiohead.jpg",
                    "resource_url": "https://api.discogs.com/artists/3840",
                    "uri": "/artist/3840-Radiohead",
                    "type": "artist"
                },
                {
                    "id": 1289271,
                    "title": "Radiohead Tribute Band",
                    "thumb": null,
                    "cover_image": null,
                    "resource_url": "https://api.discogs.com/artists/1289271",
                    "uri": "/artist/1289271",
                    "type": "artist"
                }
            ]
        })
    }

    fn releases_response() -> serde_json::Value {
        serde_json::json!({
            "pagination": {"per_page": 30, "items": 61, "page": 1, "pages": 3},
            "releases": [
                {
                    "id": 21491,
                    "title": "Pablo Honey",
                    "year": 1993,
                    "type": "master",
                    "role": "Main",
                    "thumb": "https://i.discogs.com/pablo.jpg"
                }
            ]
        })
    }

    fn client_for(server: &MockServer) -> DiscogsClient {
        DiscogsClient::builder()
            .base_url(server.uri())
            .token(Some("test-token".to_string()))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_search_artists() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/database/search"))
            .and(query_param("q", "Radiohead"))
            .and(query_param("type", "artist"))
            .and(query_param("per_page", "30"))
            .and(query_param("page", "1"))
            .and(header("authorization", "Discogs token=test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(artist_search_response()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let page = client.search_artists("Radiohead", 1).await.unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, ArtistId(3840));
        assert_eq!(
            page.items[0].image_url.as_deref(),
            Some("https://i.discogs.com/radiohead-thumb.jpg")
        );
        assert_eq!(page.items[1].image_url, None);
        assert_eq!(page.pagination.pages, 1);
        assert!(!page.pagination.has_next());
    }

    #[tokio::test]
    async fn test_requests_carry_user_agent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/artists/3840"))
            .and(header(
                "user-agent",
                concat!(
                    "Discotheque/",
                    env!("CARGO_PKG_VERSION"),
                    " (+https://github.com/discotheque-app/discotheque)"
                ),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 3840,
                "name": "Radiohead"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let detail = client.artist_detail(ArtistId(3840)).await.unwrap();
        assert_eq!(detail.name, "Radiohead");
        assert!(detail.members.is_none());
    }

    #[tokio::test]
    async fn test_blank_token_is_not_sent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/artists/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 1,
                "name": "The Persuader"
            })))
            .mount(&mock_server)
            .await;

        let client = DiscogsClient::builder()
            .base_url(mock_server.uri())
            .token(Some("   ".to_string()))
            .build()
            .unwrap();
        client.artist_detail(ArtistId(1)).await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_artist_releases_sends_sort_parameters() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/artists/3840/releases"))
            .and(query_param("sort", "title"))
            .and(query_param("sort_order", "asc"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(releases_response()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let page = client
            .artist_releases(
                ArtistId(3840),
                DiscographyFilter::new(SortOption::TitleAsc),
                2,
            )
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Pablo Honey");
        assert!(page.pagination.has_next());
    }

    #[tokio::test]
    async fn test_not_found_is_http_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/artists/123"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "message": "Artist not found."
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let error = client.artist_detail(ArtistId(123)).await.unwrap_err();

        assert_eq!(error.kind(), FailureKind::Server);
        assert_eq!(error.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(error.to_string(), "HTTP status 404 Not Found");
        match error {
            DiscogsError::HttpStatus { message, .. } => assert_eq!(message, "Artist not found."),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_body_is_reported() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/releases/5"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let error = client.release_detail(ReleaseId(5)).await.unwrap_err();

        assert!(matches!(error, DiscogsError::EmptyBody));
        assert_eq!(error.kind(), FailureKind::EmptyBody);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_mapping_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/releases/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "not-a-number",
                "title": 7
            })))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let error = client.release_detail(ReleaseId(7)).await.unwrap_err();

        assert!(matches!(error, DiscogsError::Deserialization(_)));
        assert_eq!(error.kind(), FailureKind::Mapping);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_failure() {
        // Nothing listens on port 9 on the loopback interface in test environments.
        let client = DiscogsClient::builder()
            .base_url("http://127.0.0.1:9")
            .connect_timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        let error = client.search_artists("Radiohead", 1).await.unwrap_err();
        assert!(matches!(error, DiscogsError::Transport(_)));
        assert_eq!(error.kind(), FailureKind::Transport);
    }

    #[tokio::test]
    async fn test_query_is_url_encoded() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/database/search"))
            .and(query_param("q", "Sigur Rós & Friends"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "pagination": {"per_page": 30, "items": 0, "page": 1, "pages": 0},
                "results": []
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let page = client.search_artists("Sigur Rós & Friends", 1).await.unwrap();
        assert!(page.items.is_empty());
    }
}
