use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

use catalog_server::config::CatalogConfig;
use catalog_server::db;
use catalog_server::products::PgProductStore;
use catalog_server::transfer::{CsvExporter, CsvImporter};

#[derive(Parser, Debug)]
#[command(name = "catalog-cli", about = "Bulk CSV import and ZIP export for the product catalog")]
struct Args {
    /// Postgres connection string.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import every row of a CSV file in one batch.
    Import {
        #[arg(long)]
        file: PathBuf,
    },
    /// Write all products to a ZIP of chunked CSV files.
    Export {
        #[arg(long)]
        out: PathBuf,
        /// Directory for the temporary chunk files (defaults to CATALOG_EXPORT_WORK_ROOT).
        #[arg(long)]
        work_root: Option<PathBuf>,
        /// Products per chunk file (defaults to CATALOG_EXPORT_PAGE_SIZE).
        #[arg(long)]
        page_size: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&args.database_url)
        .await?;
    db::run_migrations(&pool).await?;

    let store = PgProductStore::new(pool.clone());

    match args.command {
        Command::Import { file } => {
            let summary = CsvImporter::new(&store).import_path(&file).await?;
            println!("imported {} product(s) from {}", summary.imported, file.display());
        }
        Command::Export {
            out,
            work_root,
            page_size,
        } => {
            let mut options = CatalogConfig::from_env().export_options();
            if let Some(root) = work_root {
                options.work_root = root;
            }
            if let Some(size) = page_size {
                options.page_size = size.max(1);
            }

            let archive = CsvExporter::new(&store, options).export().await?;
            tokio::fs::write(&out, &archive.bytes).await?;
            println!(
                "exported {} product(s) in {} chunk(s) to {}",
                archive.row_count,
                archive.chunk_count,
                out.display()
            );
            if let Some(err) = archive.cleanup_error {
                eprintln!("warning: temporary files were not removed: {err}");
            }
        }
    }

    pool.close().await;
    Ok(())
}
