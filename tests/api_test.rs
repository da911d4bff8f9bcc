//! HTTP-level tests against the full route table, backed by an in-memory store.

use std::net::TcpListener;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use serde_json::{json, Value};

use inventory_service::infrastructure::memory::InMemoryStore;
use inventory_service::{build_server, configure_app, AppState};

fn state() -> AppState {
    AppState::new(Arc::new(InMemoryStore::new()))
}

macro_rules! app {
    ($state:expr) => {{
        let state = $state.clone();
        test::init_service(App::new().configure(move |cfg| configure_app(&state, cfg))).await
    }};
}

#[actix_web::test]
async fn sales_order_lifecycle_adjusts_stock_once() {
    let app = app!(state());

    let product: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/products")
            .set_json(json!({"name": "Widget", "sku": "W-1", "category": "parts", "stock": 5}))
            .to_request(),
    )
    .await;
    let product_id = product["id"].as_str().unwrap().to_string();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/sales-orders")
            .set_json(json!({
                "customer": {"name": "Ada"},
                "items": [{"product_id": product_id, "quantity": 2, "unit_price": "10.00"}]
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = test::read_body_json(resp).await;
    assert_eq!(order["total_amount"], "20.00");
    assert_eq!(order["status"], "pending");
    assert_eq!(order["status_history"].as_array().unwrap().len(), 1);
    assert_eq!(order["items"][0]["product_name"], "Widget");
    assert_eq!(order["items"][0]["line_total"], "20.00");
    let order_id = order["id"].as_str().unwrap().to_string();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/sales-orders/{}/status", order_id))
            .set_json(json!({"status": "fulfilled"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let outcome: Value = test::read_body_json(resp).await;
    assert_eq!(outcome["previous_status"], "pending");
    assert_eq!(outcome["order"]["status"], "fulfilled");
    assert_eq!(outcome["order"]["status_history"].as_array().unwrap().len(), 2);
    assert_eq!(outcome["fulfillment"]["adjusted"][0]["after"], 3);

    let product: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/products/{}", product_id))
            .to_request(),
    )
    .await;
    assert_eq!(product["stock"], 3);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/sales-orders/{}/status", order_id))
            .set_json(json!({"status": "fulfilled"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let product: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/products/{}", product_id))
            .to_request(),
    )
    .await;
    assert_eq!(product["stock"], 3);
}

#[actix_web::test]
async fn replacing_items_recomputes_total_and_ignores_client_totals() {
    let app = app!(state());

    let order: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/purchase-orders")
            .set_json(json!({
                "supplier": {"name": "Acme"},
                "items": [{"product_id": "00000000-0000-0000-0000-000000000001", "product_name": "Bolt", "quantity": 2, "unit_price": "10.00"}]
            }))
            .to_request(),
    )
    .await;
    let order_id = order["id"].as_str().unwrap().to_string();
    assert!(order["order_number"].as_str().unwrap().starts_with("PO-"));

    let updated: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::put()
            .uri(&format!("/purchase-orders/{}/items", order_id))
            .set_json(json!({"items": [
                {"product_id": "00000000-0000-0000-0000-000000000001", "product_name": "Bolt", "quantity": 3, "unit_price": "1.10"},
                {"product_id": "00000000-0000-0000-0000-000000000002", "product_name": "Nut", "quantity": 10, "unit_price": "0.25"}
            ]}))
            .to_request(),
    )
    .await;
    assert_eq!(updated["total_amount"], "5.80");

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/purchase-orders/{}", order_id))
            .set_json(json!({"total_amount": "1.00"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/purchase-orders/{}", order_id))
            .set_json(json!({"notes": "deliver to dock 2"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let patched: Value = test::read_body_json(resp).await;
    assert_eq!(patched["notes"], "deliver to dock 2");
    assert_eq!(patched["total_amount"], "5.80");

    let cleared: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/purchase-orders/{}", order_id))
            .set_json(json!({"notes": null, "expected_date": "2026-11-02"}))
            .to_request(),
    )
    .await;
    assert!(cleared["notes"].is_null());
    assert_eq!(cleared["expected_date"], "2026-11-02");
}

#[actix_web::test]
async fn invalid_requests_map_to_client_errors() {
    let app = app!(state());

    let order: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/sales-orders")
            .set_json(json!({
                "customer": {"name": "Ada"},
                "items": [{"product_id": "00000000-0000-0000-0000-000000000001", "product_name": "Widget", "quantity": 1, "unit_price": "1.00"}]
            }))
            .to_request(),
    )
    .await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/sales-orders/{}/status", order_id))
            .set_json(json!({"status": "delivered"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/sales-orders/00000000-0000-0000-0000-00000000beef")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("sales order"));

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/sales-orders")
            .set_json(json!({
                "customer": {"name": "Ada"},
                "items": [{"product_id": "00000000-0000-0000-0000-000000000001", "product_name": "Widget", "quantity": 0, "unit_price": "1.00"}]
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/sales-orders")
            .set_json(json!({
                "supplier": {"name": "Acme"},
                "items": [{"product_id": "00000000-0000-0000-0000-000000000001", "product_name": "Widget", "quantity": 1, "unit_price": "1.00"}]
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/products?filter=stock:like:3")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn fulfillment_skips_deleted_products() {
    let app = app!(state());

    let mut ids = Vec::new();
    for (name, sku) in [("Widget", "W-1"), ("Gadget", "G-1")] {
        let product: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/products")
                .set_json(json!({"name": name, "sku": sku, "stock": 10}))
                .to_request(),
        )
        .await;
        ids.push(product["id"].as_str().unwrap().to_string());
    }

    let order: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/sales-orders")
            .set_json(json!({
                "customer": {"name": "Ada"},
                "items": [
                    {"product_id": ids[0], "quantity": 4, "unit_price": "1.00"},
                    {"product_id": ids[1], "quantity": 4, "unit_price": "1.00"}
                ]
            }))
            .to_request(),
    )
    .await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/products/{}", ids[0]))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let outcome: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri(&format!("/sales-orders/{}/status", order_id))
            .set_json(json!({"status": "fulfilled", "note": "picked up"}))
            .to_request(),
    )
    .await;
    assert_eq!(outcome["fulfillment"]["skipped"][0], ids[0].as_str());
    assert_eq!(outcome["order"]["status_history"][1]["note"], "picked up");

    let gadget: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/products/{}", ids[1]))
            .to_request(),
    )
    .await;
    assert_eq!(gadget["stock"], 6);
}

#[actix_web::test]
async fn lists_filter_and_expand_directory_references() {
    let app = app!(state());

    let supplier: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/suppliers")
            .set_json(json!({"name": "Acme Supply", "email": "sales@acme.test"}))
            .to_request(),
    )
    .await;

    for total in ["5.00", "50.00"] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/purchase-orders")
                .set_json(json!({
                    "supplier": {"supplier_id": supplier["id"], "name": ""},
                    "items": [{"product_id": "00000000-0000-0000-0000-000000000001", "product_name": "Bolt", "quantity": 1, "unit_price": total}]
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let page: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/purchase-orders?filter=total_amount:gt:10;counterparty.name:contains:acme")
            .to_request(),
    )
    .await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["total_amount"], "50.00");
    assert_eq!(page["items"][0]["counterparty"]["email"], "sales@acme.test");
}

#[actix_web::test]
async fn openapi_document_is_served() {
    let app = app!(state());
    let doc: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api-docs/openapi.json")
            .to_request(),
    )
    .await;
    assert!(doc["paths"]["/products"].is_object());
    assert!(doc["paths"]["/suppliers/{id}"].is_object());
    assert!(doc["paths"]["/purchase-orders"]["post"].is_object());
    assert!(doc["paths"]["/purchase-orders/{id}/items"]["put"].is_object());
    assert!(doc["paths"]["/sales-orders/{id}/status"]["post"].is_object());
    assert!(doc["paths"]["/sales-orders/{id}"]["patch"].is_object());
    assert!(doc["components"]["schemas"]["SalesOrderStatus"].is_object());
    assert!(doc["components"]["schemas"]["CreateSalesOrderRequest"].is_object());
}

#[actix_web::test]
async fn server_answers_over_http() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind failed");
    let port = listener.local_addr().expect("addr failed").port();
    let server = build_server(state(), listener).expect("server failed to start");
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let resp = reqwest::get(format!("http://127.0.0.1:{}/customers", port))
        .await
        .expect("request failed");
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["total"], 0);
    assert_eq!(body["limit"], 20);

    handle.stop(true).await;
}
