use catalog_server::config::CatalogConfig;
use catalog_server::products::InMemoryProductStore;
use catalog_server::routes::transfer::{export_products, import_products};
use catalog_server::test_support::{TestFixtures, TestRocketBuilder};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use rocket::routes;
use serde_json::Value;
use std::io::{Cursor, Read};
use std::sync::Arc;
use tempfile::TempDir;

const BOUNDARY: &str = "catalog-test-boundary";

fn multipart_csv(csv: &str) -> String {
    format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"csv_file\"; filename=\"products.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {csv}\r\n\
         --{BOUNDARY}--\r\n"
    )
}

async fn client_with(store: Arc<InMemoryProductStore>, dirs: &TempDir) -> Client {
    let config = CatalogConfig::with_dirs(dirs.path().join("uploads"), dirs.path());
    TestRocketBuilder::new()
        .manage_store(store)
        .manage_config(config)
        .mount_api_routes(routes![import_products, export_products])
        .async_client()
        .await
}

#[tokio::test]
async fn uploaded_csv_is_stored_and_imported() {
    let dirs = tempfile::tempdir().expect("temp dir");
    let store = Arc::new(InMemoryProductStore::new());
    let client = client_with(store.clone(), &dirs).await;

    let response = client
        .post("/api/v1/products/import")
        .header(ContentType::new("multipart", "form-data").with_params(("boundary", BOUNDARY)))
        .body(multipart_csv(
            "name,price,stock,description\nWidget,9.99,5,A widget\nGadget,19.99,0,\n",
        ))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("summary payload");
    assert_eq!(body["data"]["imported"], 2);
    assert_eq!(store.len(), 2);

    let stored: Vec<_> = std::fs::read_dir(dirs.path().join("uploads"))
        .expect("upload dir exists")
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].starts_with("products-"));
}

#[tokio::test]
async fn malformed_upload_is_rejected_without_writes() {
    let dirs = tempfile::tempdir().expect("temp dir");
    let store = Arc::new(InMemoryProductStore::new());
    let client = client_with(store.clone(), &dirs).await;

    let response = client
        .post("/api/v1/products/import")
        .header(ContentType::new("multipart", "form-data").with_params(("boundary", BOUNDARY)))
        .body(multipart_csv(
            "name,price,stock,description\nWidget,9.99,5,ok\nBroken,abc,1,bad\n",
        ))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::UnprocessableEntity);
    let body: Value = response.into_json().await.expect("error payload");
    assert_eq!(body["error"], "ValidationError");
    assert_eq!(body["details"][0]["line"], 3);
    assert!(store.is_empty());
}

#[tokio::test]
async fn export_downloads_chunked_zip() {
    let dirs = tempfile::tempdir().expect("temp dir");
    let store = Arc::new(InMemoryProductStore::new());
    TestFixtures::new(store.as_ref())
        .insert_products(25)
        .await
        .expect("seed products");
    let client = client_with(store, &dirs).await;

    let response = client.get("/api/v1/products/export").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::ZIP));
    assert_eq!(
        response.headers().get_one("Content-Disposition"),
        Some("attachment; filename=\"exported_files.zip\"")
    );

    let bytes = response.into_bytes().await.expect("archive body");
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(
        sorted,
        vec!["export_part_1.csv", "export_part_2.csv", "export_part_3.csv"]
    );

    let mut last = String::new();
    archive
        .by_name("export_part_3.csv")
        .expect("third chunk")
        .read_to_string(&mut last)
        .expect("utf-8 chunk");
    assert!(last.starts_with("ID,Name,Price,Stock,Description,Created At\n"));
    assert_eq!(last.lines().count(), 6);

    let leftovers = std::fs::read_dir(dirs.path())
        .expect("work root")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("exported_files-"))
        .count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn export_of_empty_catalog_is_empty_zip() {
    let dirs = tempfile::tempdir().expect("temp dir");
    let client = client_with(Arc::new(InMemoryProductStore::new()), &dirs).await;

    let response = client.get("/api/v1/products/export").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let bytes = response.into_bytes().await.expect("archive body");
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    assert_eq!(archive.len(), 0);
}
