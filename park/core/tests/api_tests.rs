// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use park_core::application::ParkServices;
use park_core::infrastructure::event_bus::EventBus;
use park_core::infrastructure::repositories::{InMemoryCageRepository, InMemorySpeciesRepository};
use park_core::infrastructure::seed::seed_park;
use park_core::presentation::api::{app, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn router() -> Router {
    let services = ParkServices::new(
        Arc::new(InMemoryCageRepository::new()),
        Arc::new(InMemorySpeciesRepository::new()),
        Arc::new(EventBus::default()),
    );
    app(AppState::new(services.cage_service, services.species_service))
}

async fn seeded_router() -> Router {
    let cages = Arc::new(InMemoryCageRepository::new());
    let species = Arc::new(InMemorySpeciesRepository::new());
    seed_park(cages.as_ref(), species.as_ref()).await.unwrap();
    let services = ParkServices::new(cages, species, Arc::new(EventBus::default()));
    app(AppState::new(services.cage_service, services.species_service))
}

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_reports_healthy() {
    let router = router();
    let (status, body) = call(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn cage_lifecycle_over_http() {
    let router = router();

    let (status, body) = call(
        &router,
        Method::POST,
        "/cages",
        Some(json!({"capacity": 0, "maxCapacity": 4, "status": "ACTIVE"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["statusCode"], 200);
    assert_eq!(body["data"]["capacity"], 0);
    assert_eq!(body["data"]["maxCapacity"], 4);
    assert_eq!(body["data"]["status"], "ACTIVE");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = call(&router, Method::PATCH, &format!("/cage/{id}"), Some(json!({"status": "DOWN"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "DOWN");

    let (_, body) = call(&router, Method::GET, "/cages/DOWN", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = call(&router, Method::GET, &format!("/cage/{id}"), None).await;
    assert_eq!(body["data"]["species"], json!([]));

    let (status, body) = call(&router, Method::DELETE, &format!("/cage/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], true);

    let (status, body) = call(&router, Method::GET, &format!("/cage/{id}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], 400);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn validation_failures_use_the_error_envelope() {
    let router = router();

    let (status, body) = call(
        &router,
        Method::POST,
        "/cages",
        Some(json!({"capacity": -1, "maxCapacity": 4, "status": "ACTIVE"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], 400);
    assert!(body["error"].as_str().unwrap().contains("capacity is less than zero"));

    let (status, body) = call(
        &router,
        Method::POST,
        "/cages",
        Some(json!({"capacity": 5, "maxCapacity": 4, "status": "ACTIVE"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("exceeds max capacity"));

    let (status, _) = call(&router, Method::GET, "/cages/SLEEPING", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&router, Method::GET, "/cage/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], 400);

    let (status, body) = call(&router, Method::POST, "/cages", Some(json!({"status": "SIDEWAYS"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], 400);

    let (status, _) = call(&router, Method::DELETE, "/species/raptor", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn species_relocation_over_http() {
    let router = router();

    let (_, body) = call(
        &router,
        Method::POST,
        "/cages",
        Some(json!({
            "maxCapacity": 16,
            "status": "ACTIVE",
            "species": [{"name": "Triceratops", "diet": "Herbivore", "quantity": 3}]
        })),
    )
    .await;
    let cage_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["capacity"], 3);
    assert_eq!(body["data"]["species"].as_array().unwrap().len(), 1);

    let (status, body) = call(
        &router,
        Method::POST,
        "/species",
        Some(json!({"name": "Stegosaurus", "diet": "Herbivore", "quantity": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cageId"], Value::Null);
    let stego = body["data"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &router,
        Method::PATCH,
        &format!("/species/{stego}"),
        Some(json!({"cageId": cage_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cageId"], cage_id);

    let (_, body) = call(&router, Method::GET, &format!("/cage/{cage_id}"), None).await;
    assert_eq!(body["data"]["capacity"], 5);

    let (_, body) = call(&router, Method::GET, "/species/Stegosaurus", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Occupied cages refuse to power down
    let (status, body) = call(&router, Method::PATCH, &format!("/cage/{cage_id}"), Some(json!({"status": "DOWN"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("cannot power down"));

    // Unassigning with null frees the space again
    let (status, _) = call(
        &router,
        Method::PATCH,
        &format!("/species/{stego}"),
        Some(json!({"cageId": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call(&router, Method::GET, &format!("/cage/{cage_id}"), None).await;
    assert_eq!(body["data"]["capacity"], 3);

    let (status, body) = call(&router, Method::DELETE, &format!("/species/{stego}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], true);
}

#[tokio::test]
async fn seeded_carnivores_cannot_be_mixed_over_http() {
    let router = seeded_router().await;

    let (_, body) = call(&router, Method::GET, "/cages", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 5);

    let (_, body) = call(&router, Method::GET, "/species/Velociraptor", None).await;
    let raptor = body["data"][0]["id"].as_i64().unwrap();
    let (_, body) = call(&router, Method::GET, "/species/Tyrannosaurus", None).await;
    let rex_cage = body["data"][0]["cageId"].as_i64().unwrap();

    let (status, body) = call(
        &router,
        Method::PATCH,
        &format!("/species/{raptor}"),
        Some(json!({"cageId": rex_cage})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("carnivores cannot share"));
}

#[tokio::test]
async fn huge_groups_are_refused_instead_of_overflowing() {
    let router = router();

    let (_, body) = call(
        &router,
        Method::POST,
        "/cages",
        Some(json!({
            "maxCapacity": 16,
            "status": "ACTIVE",
            "species": [{"name": "Triceratops", "diet": "Herbivore", "quantity": 4}]
        })),
    )
    .await;
    let cage_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &router,
        Method::POST,
        "/species",
        Some(json!({"name": "Stegosaurus", "diet": "Herbivore", "quantity": i64::MAX})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let stego = body["data"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &router,
        Method::PATCH,
        &format!("/species/{stego}"),
        Some(json!({"cageId": cage_id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("exceeds max capacity"));

    let (_, body) = call(&router, Method::GET, &format!("/cage/{cage_id}"), None).await;
    assert_eq!(body["data"]["capacity"], 4);
    assert_eq!(body["data"]["species"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn occupied_cage_capacity_cannot_be_cleared_over_http() {
    let router = router();

    let (_, body) = call(
        &router,
        Method::POST,
        "/cages",
        Some(json!({
            "maxCapacity": 4,
            "status": "ACTIVE",
            "species": [{"name": "Tyrannosaurus", "diet": "Carnivore", "quantity": 2}]
        })),
    )
    .await;
    let cage_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = call(&router, Method::PATCH, &format!("/cage/{cage_id}"), Some(json!({"capacity": 0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("must match"));

    let (status, body) = call(&router, Method::PATCH, &format!("/cage/{cage_id}"), Some(json!({"status": "DOWN"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("cannot power down"));

    let (_, body) = call(&router, Method::GET, &format!("/cage/{cage_id}"), None).await;
    assert_eq!(body["data"]["status"], "ACTIVE");
    assert_eq!(body["data"]["capacity"], 2);
}
