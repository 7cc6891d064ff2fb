//! Tests for the catalog client.
//!
//! These tests use mock servers to verify client behavior without
//! requiring a real gateway.

use levelplay_catalog::{CatalogClient, CatalogConfig, CatalogError};
use levelplay_core::{AudioQuality, Catalog, CollectionRef, LevelError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn track_json(id: &str, quality: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "artist_name": "Miles Davis",
        "album_name": "Kind of Blue",
        "track_name": format!("Track {}", id),
        "album_release_date": "1959-08-17",
        "album_cover_url": "https://images.example/kob.jpg",
        "quality_tag": quality
    })
}

async fn setup_client() -> (MockServer, CatalogClient) {
    let mock_server = MockServer::start().await;
    let config = CatalogConfig::new(mock_server.uri())
        .with_token("test_token")
        .with_country_code("NO");
    let client = CatalogClient::new(config).unwrap();
    (mock_server, client)
}

// =============================================================================
// Client Creation Tests
// =============================================================================

mod client_creation {
    use super::*;

    #[test]
    fn test_valid_https_url() {
        let client = CatalogClient::new(CatalogConfig::new("https://catalog.example.com/v1"));
        assert!(client.is_ok());
    }

    #[test]
    fn test_empty_url_rejected() {
        match CatalogClient::new(CatalogConfig::new("")) {
            Err(CatalogError::InvalidUrl(msg)) => assert!(msg.contains("empty")),
            other => panic!("Expected InvalidUrl error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_url_without_scheme_rejected() {
        let result = CatalogClient::new(CatalogConfig::new("catalog.example.com"));
        assert!(matches!(result, Err(CatalogError::InvalidUrl(_))));
    }

    #[test]
    fn test_ftp_scheme_rejected() {
        let result = CatalogClient::new(CatalogConfig::new("ftp://catalog.example.com"));
        assert!(matches!(result, Err(CatalogError::InvalidUrl(_))));
    }

    #[test]
    fn test_url_normalization_trailing_slash() {
        let client = CatalogClient::new(CatalogConfig::new("https://catalog.example.com/v1/"))
            .unwrap();
        assert_eq!(client.url(), "https://catalog.example.com/v1");
        assert!(!client.is_authenticated());
    }
}

// =============================================================================
// Collection Tests
// =============================================================================

mod collections {
    use super::*;

    #[tokio::test]
    async fn test_album_tracks_in_order() {
        let (mock_server, client) = setup_client().await;

        Mock::given(method("GET"))
            .and(path("/albums/58990510/tracks"))
            .and(header("Authorization", "Bearer test_token"))
            .and(query_param("countryCode", "NO"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [track_json("1", "LOSSLESS"), track_json("2", "HI_RES"), track_json("3", "HIGH")],
                "total": 3
            })))
            .mount(&mock_server)
            .await;

        let reference = CollectionRef::parse("album/58990510").unwrap();
        let tracks = client.get_tracks(&reference).await.unwrap();

        let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(tracks[1].quality_tag, AudioQuality::HiRes);
        assert_eq!(tracks[0].album_release_date.as_deref(), Some("1959-08-17"));
    }

    #[tokio::test]
    async fn test_single_track_reference() {
        let (mock_server, client) = setup_client().await;

        Mock::given(method("GET"))
            .and(path("/tracks/77"))
            .respond_with(ResponseTemplate::new(200).set_body_json(track_json("77", "LOSSLESS")))
            .mount(&mock_server)
            .await;

        let reference = CollectionRef::parse("track/77").unwrap();
        let tracks = client.get_tracks(&reference).await.unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "77");
    }

    #[tokio::test]
    async fn test_favorites() {
        let (mock_server, client) = setup_client().await;

        Mock::given(method("GET"))
            .and(path("/users/me/favorites/tracks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [track_json("f1", "LOSSLESS")]
            })))
            .expect(2)
            .mount(&mock_server)
            .await;

        // Through the trait, as the orchestrator calls it
        let catalog: &dyn Catalog = &client;
        for _ in 0..2 {
            let tracks = catalog.tracks(&CollectionRef::Favorites).await.unwrap();
            assert_eq!(tracks[0].id, "f1");
        }
    }

    #[tokio::test]
    async fn test_unknown_quality_tag_tolerated() {
        let (mock_server, client) = setup_client().await;

        Mock::given(method("GET"))
            .and(path("/playlists/p1/tracks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [track_json("1", "DOLBY_ATMOS")]
            })))
            .mount(&mock_server)
            .await;

        let tracks = client
            .get_tracks(&CollectionRef::parse("playlist/p1").unwrap())
            .await
            .unwrap();
        assert_eq!(tracks[0].quality_tag, AudioQuality::Unknown);
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let (mock_server, client) = setup_client().await;

        Mock::given(method("GET"))
            .and(path("/artists/7/toptracks"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Token expired"))
            .mount(&mock_server)
            .await;

        let result = client
            .get_tracks(&CollectionRef::parse("artist/7").unwrap())
            .await;
        assert!(matches!(result, Err(CatalogError::AuthRequired)));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_catalog_error() {
        let (mock_server, client) = setup_client().await;

        Mock::given(method("GET"))
            .and(path("/artists/7/radio"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let reference = CollectionRef::parse("artist-radio/7").unwrap();
        match client.get_tracks(&reference).await {
            Err(CatalogError::ServerError { status, message }) => {
                assert_eq!(status, 500);
                assert!(message.contains("Internal Server Error"));
            }
            other => panic!("Expected ServerError, got {:?}", other),
        }

        let result = Catalog::tracks(&client, &reference).await;
        assert!(matches!(result, Err(LevelError::Catalog(_))));
    }

    #[tokio::test]
    async fn test_invalid_json_response() {
        let (mock_server, client) = setup_client().await;

        Mock::given(method("GET"))
            .and(path("/tracks/9/radio"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
            .mount(&mock_server)
            .await;

        let result = client
            .get_tracks(&CollectionRef::parse("track-radio/9").unwrap())
            .await;
        assert!(matches!(result, Err(CatalogError::ParseError(_))));
    }
}

// =============================================================================
// Stream URL Tests
// =============================================================================

mod stream_urls {
    use super::*;

    #[tokio::test]
    async fn test_stream_url() {
        let (mock_server, client) = setup_client().await;

        Mock::given(method("GET"))
            .and(path("/tracks/42/streamurl"))
            .and(header("Authorization", "Bearer test_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "url": "https://cdn.example/42.flac?sig=abc",
                "expires_in": 3600
            })))
            .mount(&mock_server)
            .await;

        let url = client.get_stream_url("42").await.unwrap();
        assert_eq!(url, "https://cdn.example/42.flac?sig=abc");
    }

    #[tokio::test]
    async fn test_missing_stream_is_stream_unavailable() {
        let (mock_server, client) = setup_client().await;

        Mock::given(method("GET"))
            .and(path("/tracks/404/streamurl"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Track not found"))
            .mount(&mock_server)
            .await;

        match client.stream_url("404").await {
            Err(LevelError::StreamUnavailable { track_id, reason }) => {
                assert_eq!(track_id, "404");
                assert!(reason.contains("404"));
            }
            other => panic!("Expected StreamUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_stream_unavailable() {
        // Nothing listens on port 9 (discard)
        let client = CatalogClient::new(CatalogConfig::new("http://127.0.0.1:9")).unwrap();

        let result = client.get_stream_url("1").await;
        assert!(matches!(
            result,
            Err(CatalogError::StreamUnavailable { .. })
        ));
    }
}
