//! HTTP-level tests of the order workflow, run against the in-memory storage
//! so they need no database.

use actix_web::http::StatusCode;
use actix_web::{test, App};
use chrono::{Duration, Utc};
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde_json::{json, Value};
use storefront::configure_app;
use storefront::domain::ports::{ProductStore, Storage};
use storefront::domain::product::NewProduct;
use storefront::infrastructure::memory::InMemoryStorage;
use uuid::Uuid;

macro_rules! app {
    ($storage:expr) => {
        test::init_service(App::new().configure(configure_app($storage.clone()))).await
    };
}

fn seed_product(storage: &InMemoryStorage, name: &str, price: &str, stock: i32) -> Uuid {
    storage
        .transaction(|tx| {
            tx.insert_product(NewProduct {
                name: name.to_string(),
                description: String::new(),
                picture: String::new(),
                price: BigDecimal::from_str(price).unwrap(),
                stock,
                expiration_time: Utc::now() + Duration::days(3),
                is_sold_out: false,
                sold_out_at: None,
            })
        })
        .expect("seed product")
        .id
}

fn stock_of(storage: &InMemoryStorage, product_id: Uuid) -> i32 {
    storage
        .read(|conn| conn.find_product(product_id))
        .unwrap()
        .expect("product exists")
        .stock
}

#[actix_web::test]
async fn order_lifecycle_over_http() {
    let storage = InMemoryStorage::new();
    let app = app!(storage);
    let user_id = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri("/products")
        .set_json(json!({
            "name": "hojicha",
            "price": "3.50",
            "stock": 5,
            "expiration_time": (Utc::now() + Duration::days(3)).to_rfc3339(),
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let product: Value = test::read_body_json(resp).await;
    let product_id: Uuid = product["id"]
        .as_str()
        .and_then(|id| id.parse().ok())
        .expect("product id");

    // Place an order for two units.
    let req = test::TestRequest::post()
        .uri("/orders")
        .set_json(json!({
            "user_id": user_id,
            "note": "no bag please",
            "lines": [{ "product_id": product_id, "quantity": 2 }]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = test::read_body_json(resp).await;
    let order_id = order["id"].as_str().expect("order id").to_string();
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total_price"], "7.00");
    assert_eq!(order["lines"][0]["unit_price"], "3.50");
    assert_eq!(stock_of(&storage, product_id), 3);

    // Update: empty note is ignored, status is replaced.
    let req = test::TestRequest::patch()
        .uri(&format!("/orders/{}", order_id))
        .set_json(json!({ "status": "paid", "note": "" }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["status"], "paid");
    assert_eq!(updated["note"], "no bag please");

    // Cancel: stock comes back and the order disappears.
    let req = test::TestRequest::delete()
        .uri(&format!("/orders/{}", order_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(stock_of(&storage, product_id), 5);

    let req = test::TestRequest::get()
        .uri(&format!("/orders/{}", order_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // A second cancellation is rejected.
    let req = test::TestRequest::delete()
        .uri(&format!("/orders/{}", order_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(stock_of(&storage, product_id), 5);
}

#[actix_web::test]
async fn rejected_orders_map_to_client_errors() {
    let storage = InMemoryStorage::new();
    let app = app!(storage);
    let product_id = seed_product(&storage, "kettle", "40.00", 1);
    let user_id = Uuid::new_v4();

    let cases = [
        (json!([{ "product_id": product_id, "quantity": 0 }]), StatusCode::BAD_REQUEST),
        (json!([{ "product_id": product_id, "quantity": 2 }]), StatusCode::CONFLICT),
        (
            json!([{ "product_id": Uuid::new_v4(), "quantity": 1 }]),
            StatusCode::NOT_FOUND,
        ),
    ];

    for (lines, expected) in cases {
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({ "user_id": user_id, "lines": lines }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    let req = test::TestRequest::get().uri("/orders").to_request();
    let orders: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(orders.as_array().map(Vec::len), Some(0));
    assert_eq!(stock_of(&storage, product_id), 1);
}

#[actix_web::test]
async fn history_lookup_by_display_name() {
    let storage = InMemoryStorage::new();
    let app = app!(storage);
    let tea = seed_product(&storage, "sencha", "6.00", 10);
    let cup = seed_product(&storage, "cup", "2.00", 10);

    let req = test::TestRequest::put()
        .uri("/users")
        .set_json(json!({
            "external_id": "U-77",
            "display_name": "sora",
            "email": "sora@example.com",
            "access_token": "secret"
        }))
        .to_request();
    let user: Value = test::call_and_read_body_json(&app, req).await;
    assert!(user.get("access_token").is_none());
    let user_id = user["id"].as_str().expect("user id").to_string();

    for product in [tea, cup] {
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({
                "user_id": user_id,
                "lines": [{ "product_id": product, "quantity": 1 }]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get().uri("/orders/by-user/sora").to_request();
    let orders: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(orders.as_array().map(Vec::len), Some(2));

    let req = test::TestRequest::get()
        .uri(&format!("/orders/history?display_name=sora&product_id={}", tea))
        .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(history.as_array().map(Vec::len), Some(1));
    assert_eq!(history[0]["lines"][0]["product_id"], tea.to_string());

    let req = test::TestRequest::get().uri("/orders/by-user/nobody").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
