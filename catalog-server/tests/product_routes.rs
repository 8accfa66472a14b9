use catalog_server::models::{PaginatedResponse, Product};
use catalog_server::products::InMemoryProductStore;
use catalog_server::routes::products::{
    create_product, delete_product, get_product, list_products, update_product,
};
use catalog_server::test_support::{TestFixtures, TestRocketBuilder};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use rocket::routes;
use serde_json::{Value, json};
use std::sync::Arc;

async fn client_with(store: Arc<InMemoryProductStore>) -> Client {
    TestRocketBuilder::new()
        .manage_store(store)
        .mount_api_routes(routes![
            list_products,
            get_product,
            create_product,
            update_product,
            delete_product
        ])
        .async_client()
        .await
}

#[tokio::test]
async fn create_then_fetch_product() {
    let store = Arc::new(InMemoryProductStore::new());
    let client = client_with(store.clone()).await;

    let response = client
        .post("/api/v1/products")
        .header(ContentType::JSON)
        .body(json!({"name": " Widget ", "price": 9.99, "stock": 5}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let location = response
        .headers()
        .get_one("Location")
        .map(str::to_string)
        .expect("location header");
    let created: Product = response.into_json().await.expect("product payload");
    assert_eq!(created.name, "Widget");
    assert_eq!(created.description, "");
    assert_eq!(location, format!("/api/v1/products/{}", created.id));

    let fetched: Product = client
        .get(format!("/api/v1/products/{}", created.id))
        .dispatch()
        .await
        .into_json()
        .await
        .expect("product payload");
    assert_eq!(fetched, created);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn invalid_form_reports_every_field() {
    let store = Arc::new(InMemoryProductStore::new());
    let client = client_with(store.clone()).await;

    let response = client
        .post("/api/v1/products")
        .header(ContentType::JSON)
        .body(json!({"name": "", "price": -1.0, "stock": -4}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);

    let body: Value = response.into_json().await.expect("error payload");
    assert_eq!(body["error"], "ValidationError");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .expect("details array")
        .iter()
        .filter_map(|detail| detail["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["name", "price", "stock"]);
    assert!(store.is_empty());
}

#[tokio::test]
async fn list_filters_by_name_and_pages() {
    let store = Arc::new(InMemoryProductStore::new());
    let fixtures = TestFixtures::new(store.as_ref());
    fixtures.insert_products(12).await.expect("seed products");
    fixtures
        .insert_product("Oak desk", 120.0, 2)
        .await
        .expect("seed desk");
    let client = client_with(store).await;

    let first: PaginatedResponse<Product> = client
        .get("/api/v1/products")
        .dispatch()
        .await
        .into_json()
        .await
        .expect("page payload");
    assert_eq!(first.data.len(), 10);
    assert_eq!(first.page.total_items, 13);
    assert_eq!(first.page.total_pages, 2);

    let second: PaginatedResponse<Product> = client
        .get("/api/v1/products?page=2&size=10")
        .dispatch()
        .await
        .into_json()
        .await
        .expect("page payload");
    assert_eq!(second.data.len(), 3);
    assert_eq!(second.page.page, 2);

    let desks: PaginatedResponse<Product> = client
        .get("/api/v1/products?q=DESK")
        .dispatch()
        .await
        .into_json()
        .await
        .expect("page payload");
    assert_eq!(desks.page.total_items, 1);
    assert_eq!(desks.data[0].name, "Oak desk");
}

#[tokio::test]
async fn update_and_delete_product() {
    let store = Arc::new(InMemoryProductStore::new());
    let product = TestFixtures::new(store.as_ref())
        .insert_product("Lamp", 15.0, 3)
        .await
        .expect("seed lamp");
    let client = client_with(store.clone()).await;
    let uri = format!("/api/v1/products/{}", product.id);

    let response = client
        .put(uri.as_str())
        .header(ContentType::JSON)
        .body(json!({"name": "Desk lamp", "price": 18.5, "stock": 7, "description": "LED"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let updated: Product = response.into_json().await.expect("product payload");
    assert_eq!(updated.id, product.id);
    assert_eq!(updated.name, "Desk lamp");
    assert_eq!(updated.description, "LED");
    assert_eq!(updated.created_at, product.created_at);

    let response = client.delete(uri.as_str()).dispatch().await;
    assert_eq!(response.status(), Status::NoContent);
    assert!(store.is_empty());

    let response = client.get(uri.as_str()).dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    let body: Value = response.into_json().await.expect("error payload");
    assert_eq!(body["error"], "NotFound");

    let response = client.delete(uri.as_str()).dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
}
