use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode as AxumStatus,
    response::{IntoResponse, Response},
    routing::{get, patch},
};
use chrono::Utc;
use reqwest::{StatusCode, Url};
use serde_json::{Value, json};

use autosales_api::app::{AppServices, build_app, router};
use autosales_core::{PaymentCode, SaleId};
use autosales_infra::{
    HttpInventoryClient, InMemorySaleStore, InventoryClient, InventoryConfig, SaleStore, SalesConfig,
};
use autosales_inventory::{Price, VehicleId};
use autosales_sales::{Cpf, Sale, SaleStatus};

// -------------------------
// Fake inventory service
// -------------------------

#[derive(Default)]
struct Recorded {
    vehicles: HashMap<String, Value>,
    failing: bool,
    gets: Vec<String>,
    list_queries: Vec<HashMap<String, String>>,
    patches: Vec<(String, Value)>,
}

#[derive(Clone, Default)]
struct FakeInventory {
    inner: Arc<Mutex<Recorded>>,
}

impl FakeInventory {
    fn with_vehicle(self, id: &str, body: Value) -> Self {
        self.inner.lock().unwrap().vehicles.insert(id.to_string(), body);
        self
    }

    fn failing(self) -> Self {
        self.inner.lock().unwrap().failing = true;
        self
    }

    fn patches(&self) -> Vec<(String, Value)> {
        self.inner.lock().unwrap().patches.clone()
    }

    fn gets(&self) -> Vec<String> {
        self.inner.lock().unwrap().gets.clone()
    }

    fn list_queries(&self) -> Vec<HashMap<String, String>> {
        self.inner.lock().unwrap().list_queries.clone()
    }

    async fn spawn(&self) -> SpawnedServer {
        let app = Router::new()
            .route("/vehicles", get(fake_list_vehicles))
            .route("/vehicles/:id", get(fake_get_vehicle))
            .route("/vehicles/:id/status", patch(fake_patch_status))
            .with_state(self.clone());
        SpawnedServer::spawn(app).await
    }
}

async fn fake_get_vehicle(State(fake): State<FakeInventory>, Path(id): Path<String>) -> Response {
    let mut inner = fake.inner.lock().unwrap();
    inner.gets.push(id.clone());
    if inner.failing {
        return AxumStatus::INTERNAL_SERVER_ERROR.into_response();
    }
    match inner.vehicles.get(&id) {
        Some(v) => Json(v.clone()).into_response(),
        None => (AxumStatus::NOT_FOUND, Json(json!({ "message": "not found" }))).into_response(),
    }
}

async fn fake_list_vehicles(
    State(fake): State<FakeInventory>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut inner = fake.inner.lock().unwrap();
    inner.list_queries.push(params);
    if inner.failing {
        return AxumStatus::SERVICE_UNAVAILABLE.into_response();
    }
    let list: Vec<Value> = inner.vehicles.values().cloned().collect();
    Json(list).into_response()
}

async fn fake_patch_status(
    State(fake): State<FakeInventory>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut inner = fake.inner.lock().unwrap();
    inner.patches.push((id.clone(), body));
    Json(json!({ "id": id, "status": "SOLD" })).into_response()
}

// -------------------------
// Harness
// -------------------------

struct SpawnedServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl SpawnedServer {
    async fn spawn(app: Router) -> Self {
        // Bind to an ephemeral port.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for SpawnedServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct TestServer {
    api: SpawnedServer,
    _inventory: Option<SpawnedServer>,
    store: Arc<InMemorySaleStore>,
}

impl TestServer {
    /// API wired to the given fake inventory and a fresh in-memory store.
    async fn spawn(fake: &FakeInventory) -> Self {
        let inventory_srv = fake.spawn().await;
        let config = InventoryConfig::new(Url::parse(&inventory_srv.base_url).unwrap());
        let client: Arc<dyn InventoryClient> = Arc::new(HttpInventoryClient::new(&config).unwrap());

        let store = Arc::new(InMemorySaleStore::new());
        let services = AppServices::new(Some(client), store.clone());
        let api = SpawnedServer::spawn(router(Arc::new(services))).await;

        Self {
            api,
            _inventory: Some(inventory_srv),
            store,
        }
    }

    /// API built from an empty environment: no inventory, in-memory store.
    async fn spawn_unconfigured() -> Self {
        let config = SalesConfig::from_lookup(|_: &str| None).unwrap();
        let app = build_app(&config).await.unwrap();
        Self {
            api: SpawnedServer::spawn(app).await,
            _inventory: None,
            store: Arc::new(InMemorySaleStore::new()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api.base_url, path)
    }

    async fn seed(&self, code: &str, vehicle_id: &str, price: u32, status: SaleStatus) -> Sale {
        let now = Utc::now();
        let sale = Sale {
            id: SaleId::new(),
            vehicle_id: VehicleId::new(vehicle_id),
            cpf_buyer: Cpf::parse("12345678901").unwrap(),
            price: Price::from(price),
            brand: "Ford".to_string(),
            model: "Fiesta".to_string(),
            color: "Preto".to_string(),
            payment_code: PaymentCode::parse(code).unwrap(),
            status,
            created_at: now,
            updated_at: now,
        };
        self.store.create(sale).await.unwrap()
    }
}

fn fiesta(status: &str) -> Value {
    json!({
        "id": "v1",
        "brand": "Ford",
        "model": "Fiesta",
        "color": "Preto",
        "price": 50000,
        "status": status
    })
}

async fn post_json(url: String, body: Value) -> (StatusCode, Value) {
    let res = reqwest::Client::new().post(url).json(&body).send().await.unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

async fn get_json(url: String) -> (StatusCode, Value) {
    let res = reqwest::Client::new().get(url).send().await.unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

// -------------------------
// Tests
// -------------------------

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn_unconfigured().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_sale_echoes_vehicle_snapshot() {
    let fake = FakeInventory::default().with_vehicle("v1", fiesta("AVAILABLE"));
    let srv = TestServer::spawn(&fake).await;

    let (status, body) = post_json(
        srv.url("/sales"),
        json!({ "vehicleId": "v1", "cpfBuyer": "12345678901" }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["vehicleId"], "v1");
    assert_eq!(body["cpfBuyer"], "12345678901");
    assert_eq!(body["price"].as_f64(), Some(50000.0));
    assert_eq!(body["brand"], "Ford");
    assert_eq!(body["model"], "Fiesta");
    assert_eq!(body["color"], "Preto");
    assert_eq!(body["status"], "PENDING_PAYMENT");
    assert!(!body["paymentCode"].as_str().unwrap().is_empty());
    assert!(body["id"].is_string());
    assert!(body["createdAt"].is_string());

    assert_eq!(fake.gets(), vec!["v1".to_string()]);
    assert_eq!(srv.store.len(), 1);
}

#[tokio::test]
async fn sold_vehicle_is_a_conflict() {
    let fake = FakeInventory::default().with_vehicle("v1", json!({ "status": "SOLD" }));
    let srv = TestServer::spawn(&fake).await;

    let (status, body) = post_json(
        srv.url("/sales"),
        json!({ "vehicleId": "v1", "cpfBuyer": "12345678901" }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "vehicle_unavailable");
    assert!(srv.store.is_empty());
}

#[tokio::test]
async fn vehicle_and_sale_not_found_are_distinct() {
    let fake = FakeInventory::default();
    let srv = TestServer::spawn(&fake).await;

    let (status, vehicle_body) = post_json(
        srv.url("/sales"),
        json!({ "vehicleId": "nope", "cpfBuyer": "12345678901" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(vehicle_body["error"], "vehicle_not_found");

    let (status, sale_body) = post_json(
        srv.url("/sales/payments/webhook"),
        json!({ "paymentCode": "missing", "status": "PAID" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(sale_body["error"], "sale_not_found");

    assert_ne!(vehicle_body["message"], sale_body["message"]);
    // Unknown payment code never reaches the inventory.
    assert!(fake.patches().is_empty());
}

#[tokio::test]
async fn missing_inventory_config_is_500_for_create_and_listing() {
    let srv = TestServer::spawn_unconfigured().await;

    let (status, body) = post_json(
        srv.url("/sales"),
        json!({ "vehicleId": "v1", "cpfBuyer": "12345678901" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "configuration_missing");

    let (status, body) = get_json(srv.url("/sales/available-vehicles")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "configuration_missing");

    // Sold listing only needs the store.
    let (status, body) = get_json(srv.url("/sales/sold-vehicles")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn paid_webhook_marks_vehicle_sold_once() {
    let fake = FakeInventory::default();
    let srv = TestServer::spawn(&fake).await;
    srv.seed("pay1", "v1", 50000, SaleStatus::PendingPayment).await;

    let (status, body) = post_json(
        srv.url("/sales/payments/webhook"),
        json!({ "paymentCode": "pay1", "status": "PAID" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "PAID");
    assert_eq!(body["paymentCode"], "pay1");
    assert_eq!(
        fake.patches(),
        vec![("v1".to_string(), json!({ "status": "SOLD" }))]
    );
}

#[tokio::test]
async fn canceled_webhook_leaves_inventory_alone() {
    let fake = FakeInventory::default();
    let srv = TestServer::spawn(&fake).await;
    srv.seed("pay1", "v1", 50000, SaleStatus::PendingPayment).await;

    let (status, body) = post_json(
        srv.url("/sales/payments/webhook"),
        json!({ "paymentCode": "pay1", "status": "CANCELED" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELED");
    assert!(fake.patches().is_empty());
    assert!(fake.gets().is_empty());
}

#[tokio::test]
async fn webhook_on_finalized_sale_with_other_outcome_is_conflict() {
    let fake = FakeInventory::default();
    let srv = TestServer::spawn(&fake).await;
    srv.seed("pay1", "v1", 50000, SaleStatus::Paid).await;

    let (status, body) = post_json(
        srv.url("/sales/payments/webhook"),
        json!({ "paymentCode": "pay1", "status": "CANCELED" }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "sale_already_finalized");
    assert!(fake.patches().is_empty());
}

#[tokio::test]
async fn invalid_payloads_are_400() {
    let fake = FakeInventory::default();
    let srv = TestServer::spawn(&fake).await;
    let client = reqwest::Client::new();

    // Per-field validation.
    let (status, body) = post_json(
        srv.url("/sales"),
        json!({ "vehicleId": "", "cpfBuyer": "123" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_payload");
    assert!(body["fields"]["vehicleId"].is_array());
    assert!(body["fields"]["cpfBuyer"].is_array());

    let (status, body) = post_json(
        srv.url("/sales/payments/webhook"),
        json!({ "paymentCode": "pay1", "status": "REFUNDED" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["status"].is_array());

    // Malformed JSON.
    let res = client
        .post(srv.url("/sales"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_payload");

    // Missing content type.
    let res = client
        .post(srv.url("/sales/payments/webhook"))
        .body(r#"{"paymentCode":"pay1","status":"PAID"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert!(fake.gets().is_empty());
    assert!(srv.store.is_empty());
}

#[tokio::test]
async fn available_vehicles_are_sorted_and_passed_through() {
    let fake = FakeInventory::default()
        .with_vehicle("a", json!({ "id": "a", "price": 30000, "status": "AVAILABLE", "year": 2020 }))
        .with_vehicle("b", json!({ "id": "b", "price": 10000, "status": "AVAILABLE" }))
        .with_vehicle("c", json!({ "id": "c", "price": 20000, "status": "AVAILABLE" }));
    let srv = TestServer::spawn(&fake).await;

    let (status, body) = get_json(srv.url("/sales/available-vehicles")).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["b", "c", "a"]);
    assert_eq!(body[2]["year"], 2020);

    let queries = fake.list_queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].get("status").map(String::as_str), Some("AVAILABLE"));
}

#[tokio::test]
async fn available_vehicles_keep_numeric_ids_and_sparse_records() {
    let fake = FakeInventory::default()
        .with_vehicle("7", json!({ "id": 7, "price": 20000, "status": "AVAILABLE" }))
        .with_vehicle("a", json!({ "id": "a", "price": 10000 }));
    let srv = TestServer::spawn(&fake).await;

    let (status, body) = get_json(srv.url("/sales/available-vehicles")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "a");
    assert_eq!(body[0]["price"].as_f64(), Some(10000.0));
    assert!(body[0].get("status").is_none());
    assert!(body[0].get("brand").is_none());
    assert_eq!(body[1]["id"], 7);
    assert_eq!(body[1]["status"], "AVAILABLE");
}

#[tokio::test]
async fn upstream_failure_is_bad_gateway() {
    let fake = FakeInventory::default().failing();
    let srv = TestServer::spawn(&fake).await;

    let (status, body) = get_json(srv.url("/sales/available-vehicles")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream_unavailable");

    let (status, _) = post_json(
        srv.url("/sales"),
        json!({ "vehicleId": "v1", "cpfBuyer": "12345678901" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn sold_vehicles_lists_paid_sales_by_price() {
    let fake = FakeInventory::default();
    let srv = TestServer::spawn(&fake).await;
    srv.seed("a", "v1", 30000, SaleStatus::Paid).await;
    srv.seed("b", "v2", 10000, SaleStatus::Paid).await;
    srv.seed("c", "v3", 5000, SaleStatus::PendingPayment).await;
    srv.seed("d", "v4", 1000, SaleStatus::Canceled).await;

    let (status, body) = get_json(srv.url("/sales/sold-vehicles")).await;

    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["paymentCode"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["b", "a"]);
}

#[tokio::test]
async fn create_then_pay_end_to_end() {
    let fake = FakeInventory::default().with_vehicle("v1", fiesta("AVAILABLE"));
    let srv = TestServer::spawn(&fake).await;

    let (_, created) = post_json(
        srv.url("/sales"),
        json!({ "vehicleId": "v1", "cpfBuyer": "12345678901" }),
    )
    .await;
    let code = created["paymentCode"].as_str().unwrap().to_string();

    let (status, paid) = post_json(
        srv.url("/sales/payments/webhook"),
        json!({ "paymentCode": code, "status": "PAID" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "PAID");
    assert_eq!(paid["id"], created["id"]);

    let (_, sold) = get_json(srv.url("/sales/sold-vehicles")).await;
    assert_eq!(sold.as_array().unwrap().len(), 1);
    assert_eq!(fake.patches().len(), 1);
}
