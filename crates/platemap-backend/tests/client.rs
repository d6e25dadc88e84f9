//! Integration tests for `BackendClient` using wiremock HTTP mocks.

use platemap_backend::{BackendClient, BackendError};
use platemap_core::{ImageUpload, LocationUpdate, Position, ProfileDraft};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> BackendClient {
    BackendClient::new(base_url, 5, "test-token").expect("client construction should not fail")
}

fn restaurant_json(id: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "name": "Pho Thin",
        "description": "Beef pho since 1979",
        "phone": "0241234567",
        "address": "13 Lo Duc, Hanoi",
        "minOrder": 50000,
        "deliveryFee": 15000,
        "maxDeliveryDistance": 5,
        "image": "https://cdn.example.com/pho.jpg",
        "locationId": { "_id": "loc-1", "coords": { "lat": 21.0169, "lng": 105.8558 } }
    })
}

fn draft() -> ProfileDraft {
    ProfileDraft {
        name: "Pho Thin".to_owned(),
        description: "Beef pho".to_owned(),
        phone: "0241234567".to_owned(),
        min_order: 50_000.0,
        delivery_fee: 15_000.0,
        max_delivery_distance: 5.0,
    }
}

#[tokio::test]
async fn restaurants_by_owner_sends_bearer_and_parses_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/restaurants/owner/owner-1"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([restaurant_json("r-1"), restaurant_json("r-2")])),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let list = client
        .restaurants_by_owner("owner-1")
        .await
        .expect("should parse restaurant list");

    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id, "r-1");
    assert_eq!(list[0].name, "Pho Thin");
}

#[tokio::test]
async fn restaurants_by_owner_404_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/restaurants/owner/nobody"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let list = client.restaurants_by_owner("nobody").await.unwrap();
    assert!(list.is_empty());
}

#[tokio::test]
async fn restaurant_parses_populated_location() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/restaurants/r-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(restaurant_json("r-1")))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let profile = client.restaurant("r-1").await.expect("should parse");
    assert_eq!(profile.address, "13 Lo Duc, Hanoi");
    assert!((profile.min_order - 50_000.0).abs() < f64::EPSILON);
    let loc = profile.location.expect("location populated");
    assert_eq!(loc.id, "loc-1");
    assert_eq!(
        loc.position,
        Some(Position::new(21.0169, 105.8558).unwrap())
    );
}

#[tokio::test]
async fn unauthorized_is_typed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/restaurants/r-1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.restaurant("r-1").await.unwrap_err();
    assert!(err.is_unauthorized(), "got: {err:?}");
}

#[tokio::test]
async fn update_location_sends_coords_and_address() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/locations/loc-1"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({
            "coords": { "lat": 21.03, "lng": 105.85 },
            "address": "Hoan Kiem, Hanoi"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "loc-1",
            "coords": { "lat": 21.03, "lng": 105.85 },
            "address": "Hoan Kiem, Hanoi"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let update = LocationUpdate {
        position: Position::new(21.03, 105.85).unwrap(),
        address: "Hoan Kiem, Hanoi".to_owned(),
    };
    let loc = client
        .update_location("loc-1", &update)
        .await
        .expect("should update");
    assert_eq!(loc.id, "loc-1");
}

#[tokio::test]
async fn update_restaurant_sends_multipart_fields_and_image() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/restaurants/r-1"))
        .and(body_string_contains("name=\"minOrder\""))
        .and(body_string_contains("Beef pho"))
        .and(body_string_contains("filename=\"front.png\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(restaurant_json("r-1")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let image = ImageUpload {
        file_name: "front.png".to_owned(),
        mime: "image/png".to_owned(),
        bytes: b"fake-png-bytes".to_vec(),
    };
    let profile = client
        .update_restaurant("r-1", &draft(), "13 Lo Duc, Hanoi", Some(&image))
        .await
        .expect("should update");
    assert_eq!(profile.id, "r-1");
}

#[tokio::test]
async fn server_error_message_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/restaurants/r-1"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "phone is invalid" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .update_restaurant("r-1", &draft(), "addr", None)
        .await
        .unwrap_err();
    assert!(
        matches!(err, BackendError::UnexpectedStatus { status: 422, ref message, .. } if message == "phone is invalid"),
        "got: {err:?}"
    );
}
