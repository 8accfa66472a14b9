use catalog_server::models::NewProduct;
use catalog_server::products::{InMemoryProductStore, ProductStore};
use catalog_server::transfer::{CsvExporter, CsvImporter, ExportOptions};
use catalog_server::test_support::TestFixtures;
use std::io::{Cursor, Read};

/// Rebuild an importable CSV from export chunks by dropping `ID` and `Created At`.
fn chunks_to_import_csv(archive_bytes: Vec<u8>) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes)).expect("valid zip");
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["name", "price", "stock", "description"])
        .expect("header");

    for n in 1..=archive.len() {
        let mut text = String::new();
        archive
            .by_name(&format!("export_part_{n}.csv"))
            .expect("chunk present")
            .read_to_string(&mut text)
            .expect("utf-8 chunk");

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        for record in reader.records() {
            let record = record.expect("well-formed chunk row");
            writer
                .write_record([&record[1], &record[2], &record[3], &record[4]])
                .expect("row");
        }
    }

    String::from_utf8(writer.into_inner().expect("flush")).expect("utf-8 csv")
}

#[tokio::test]
async fn export_then_import_preserves_product_fields() {
    let work_root = tempfile::tempdir().expect("temp dir");
    let source = InMemoryProductStore::new();
    let fixtures = TestFixtures::new(&source);
    fixtures.insert_products(23).await.expect("seed products");
    fixtures
        .insert_product("Desk, oak \"large\"", 249.95, 1)
        .await
        .expect("seed quoted product");
    for description in ["  indented note ", "\ttabbed\t", "first line\n  second line"] {
        source
            .create(NewProduct::new("Padded", 1.0, 1, description))
            .await
            .expect("seed padded description");
    }

    let archive = CsvExporter::new(
        &source,
        ExportOptions {
            work_root: work_root.path().to_path_buf(),
            page_size: 10,
        },
    )
    .export()
    .await
    .expect("export succeeds");
    assert_eq!(archive.chunk_count, 3);
    assert_eq!(archive.row_count, 27);

    let target = InMemoryProductStore::new();
    let summary = CsvImporter::new(&target)
        .import_reader(chunks_to_import_csv(archive.bytes).as_bytes())
        .await
        .expect("import succeeds");
    assert_eq!(summary.imported, 27);

    let fields = |store: &InMemoryProductStore| {
        store
            .snapshot()
            .into_iter()
            .map(|p| (p.name, p.price.to_bits(), p.stock, p.description))
            .collect::<Vec<_>>()
    };
    assert_eq!(fields(&source), fields(&target));

    let descriptions: Vec<String> = target
        .snapshot()
        .into_iter()
        .filter(|p| p.name == "Padded")
        .map(|p| p.description)
        .collect();
    assert_eq!(
        descriptions,
        vec!["  indented note ", "\ttabbed\t", "first line\n  second line"]
    );
}
