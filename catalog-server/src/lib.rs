#[macro_use]
extern crate rocket;

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod products;
pub mod request_logger;
pub mod routes;
pub mod transfer;

use crate::config::CatalogConfig;
use crate::db::CatalogDb;
use crate::products::{PgProductStore, SharedProductStore};
use crate::request_logger::RequestLogger;
use env_logger::Env;
use rocket::fairing::AdHoc;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_db_pools::Database;
use rocket_okapi::{
    openapi_get_routes,
    rapidoc::{GeneralConfig, HideShowConfig, RapiDocConfig, make_rapidoc},
    settings::UrlObject,
    swagger_ui::{SwaggerUIConfig, make_swagger_ui},
};
use std::sync::{Arc, Once};

static LOGGER: Once = Once::new();

pub fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(
            Env::default().default_filter_or("info,rocket::server=warn,rocket::request=warn"),
        )
        .init();
    });
}

fn cors_options() -> CorsOptions {
    CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![Method::Get, Method::Post, Method::Put, Method::Delete]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allow_credentials(true)
}

pub fn rocket() -> Rocket<Build> {
    init_logger();

    let config = CatalogConfig::from_env();
    log::info!(
        "catalog config: uploads at {}, export work root {}, export page size {}",
        config.upload_dir.display(),
        config.export_work_root.display(),
        config.export_page_size
    );

    rocket::build()
        .attach(RequestLogger)
        .attach(CatalogDb::init())
        .attach(AdHoc::try_on_ignite("CORS", |rocket| async move {
            match cors_options().to_cors() {
                Ok(cors) => Ok(rocket.attach(cors)),
                Err(e) => {
                    log::error!("invalid CORS configuration: {}", e);
                    Err(rocket)
                }
            }
        }))
        .attach(AdHoc::try_on_ignite("Run Migrations", |rocket| async move {
            match CatalogDb::fetch(&rocket) {
                Some(db) => match db::run_migrations(&**db).await {
                    Ok(()) => {
                        log::info!("database migrations successful");
                        Ok(rocket)
                    }
                    Err(e) => {
                        log::error!("database migrations failed: {}", e);
                        Err(rocket)
                    }
                },
                None => {
                    log::error!("database pool not available for migrations");
                    Err(rocket)
                }
            }
        }))
        .attach(AdHoc::try_on_ignite(
            "Manage Product Store",
            |rocket| async move {
                match CatalogDb::fetch(&rocket) {
                    Some(db) => {
                        let store: SharedProductStore =
                            Arc::new(PgProductStore::new((**db).clone()));
                        Ok(rocket.manage(store))
                    }
                    None => Err(rocket),
                }
            },
        ))
        .attach(AdHoc::try_on_ignite(
            "Prepare Upload Directory",
            |rocket| async move {
                let upload_dir = match rocket.state::<CatalogConfig>() {
                    Some(config) => config.upload_dir.clone(),
                    None => return Err(rocket),
                };
                match tokio::fs::create_dir_all(&upload_dir).await {
                    Ok(()) => {
                        log::info!("upload directory initialized at {}", upload_dir.display());
                        Ok(rocket)
                    }
                    Err(e) => {
                        log::error!(
                            "failed to create upload directory {}: {}",
                            upload_dir.display(),
                            e
                        );
                        Err(rocket)
                    }
                }
            },
        ))
        .manage(config)
        .mount(
            "/api/v1",
            openapi_get_routes![
                routes::health::health_check,
                routes::products::list_products,
                routes::products::get_product,
                routes::products::create_product,
                routes::products::update_product,
                routes::products::delete_product,
            ],
        )
        .mount(
            "/api/v1",
            routes![
                routes::transfer::import_products,
                routes::transfer::export_products,
            ],
        )
        .mount(
            "/api/docs/swagger/",
            make_swagger_ui(&SwaggerUIConfig {
                url: "../../v1/openapi.json".to_owned(),
                ..Default::default()
            }),
        )
        .mount(
            "/api/docs/rapidoc/",
            make_rapidoc(&RapiDocConfig {
                general: GeneralConfig {
                    spec_urls: vec![UrlObject::new("Catalog API", "../../v1/openapi.json")],
                    ..Default::default()
                },
                hide_show: HideShowConfig {
                    allow_spec_url_load: false,
                    allow_spec_file_load: false,
                    ..Default::default()
                },
                ..Default::default()
            }),
        )
}

#[cfg_attr(not(test), allow(dead_code))]
pub mod test_support {
    use crate::config::CatalogConfig;
    use crate::models::{NewProduct, Product};
    use crate::products::{InMemoryProductStore, ProductStore, SharedProductStore, StoreResult};
    use rocket::config::LogLevel;
    use rocket::figment::Figment;
    use rocket::local::asynchronous::Client as AsyncClient;
    use rocket::local::blocking::Client;
    use rocket::{Build, Rocket, Route};
    use std::sync::Arc;

    pub use database::{TestDatabase, TestDatabaseError};

    /// Seeding helpers that work against any store.
    pub struct TestFixtures<'a> {
        store: &'a dyn ProductStore,
    }

    impl<'a> TestFixtures<'a> {
        pub fn new(store: &'a dyn ProductStore) -> Self {
            Self { store }
        }

        /// Insert one product with a generated description.
        pub async fn insert_product(
            &self,
            name: &str,
            price: f64,
            stock: i32,
        ) -> StoreResult<Product> {
            self.store
                .create(NewProduct::new(name, price, stock, format!("{name} description")))
                .await
        }

        /// Insert `count` products named `Product 1..=count`.
        pub async fn insert_products(&self, count: usize) -> StoreResult<Vec<Product>> {
            let mut products = Vec::with_capacity(count);
            for n in 1..=count {
                products.push(
                    self.insert_product(&format!("Product {n}"), n as f64, n as i32)
                        .await?,
                );
            }
            Ok(products)
        }
    }

    pub mod database {
        use crate::db::MIGRATOR;
        use log::LevelFilter;
        use rocket_db_pools::sqlx::postgres::{PgConnectOptions, PgPoolOptions};
        use rocket_db_pools::sqlx::{self, ConnectOptions, PgPool};
        use testcontainers_modules::postgres::Postgres;
        use testcontainers::{ContainerAsync, core::error::TestcontainersError, runners::AsyncRunner};
        use thiserror::Error;

        #[derive(Debug, Error)]
        pub enum TestDatabaseError {
            #[error("database error: {0}")]
            Sqlx(#[from] sqlx::Error),
            #[error("migration error: {0}")]
            Migration(#[from] sqlx::migrate::MigrateError),
            #[error("container error: {0}")]
            Container(#[from] TestcontainersError),
        }

        impl TestDatabaseError {
            /// True when no container runtime is reachable, so the test should be skipped.
            pub fn is_unavailable(&self) -> bool {
                matches!(self, TestDatabaseError::Container(_))
            }
        }

        /// Migrated Postgres instance in a disposable container.
        pub struct TestDatabase {
            pool: PgPool,
            _container: ContainerAsync<Postgres>,
        }

        impl TestDatabase {
            pub async fn new() -> Result<Self, TestDatabaseError> {
                let container = Postgres::default().start().await?;
                let host = container.get_host().await?.to_string();
                let port = container.get_host_port_ipv4(5432).await?;

                let options: PgConnectOptions =
                    format!("postgres://postgres:postgres@{host}:{port}/postgres").parse()?;
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .connect_with(options.log_statements(LevelFilter::Off))
                    .await?;

                MIGRATOR.run(&pool).await?;

                Ok(Self {
                    pool,
                    _container: container,
                })
            }

            pub fn pool(&self) -> &PgPool {
                &self.pool
            }

            pub fn pool_clone(&self) -> PgPool {
                self.pool.clone()
            }

            /// Close the pool; the container stops when `self` drops.
            pub async fn close(self) {
                self.pool.close().await;
            }
        }
    }

    /// Builder for constructing Rocket instances tailored for integration tests.
    #[derive(Default)]
    pub struct TestRocketBuilder {
        figment: Figment,
        mounts: Vec<(String, Vec<Route>)>,
        store: Option<SharedProductStore>,
        config: Option<CatalogConfig>,
    }

    impl TestRocketBuilder {
        /// Start a builder with sensible defaults: random port, logging disabled.
        pub fn new() -> Self {
            let figment = rocket::Config::figment()
                .merge(("port", 0))
                .merge(("log_level", LogLevel::Off))
                .merge(("cli_colors", false));

            Self {
                figment,
                ..Default::default()
            }
        }

        /// Mount routes under `/api/v1`.
        pub fn mount_api_routes(mut self, routes: Vec<Route>) -> Self {
            self.mounts.push(("/api/v1".to_string(), routes));
            self
        }

        pub fn manage_store(mut self, store: SharedProductStore) -> Self {
            self.store = Some(store);
            self
        }

        pub fn manage_config(mut self, config: CatalogConfig) -> Self {
            self.config = Some(config);
            self
        }

        /// Finish building the Rocket instance.
        ///
        /// Without an explicit store an empty [`InMemoryProductStore`] is
        /// managed; without a config, one rooted in the system temp dir.
        pub fn build(self) -> Rocket<Build> {
            let mut rocket = rocket::custom(self.figment);

            for (base, routes) in self.mounts {
                rocket = rocket.mount(base, routes);
            }

            let store = self
                .store
                .unwrap_or_else(|| Arc::new(InMemoryProductStore::new()));
            let config = self.config.unwrap_or_else(|| {
                let tmp = std::env::temp_dir();
                CatalogConfig::with_dirs(tmp.join("catalog-test-uploads"), tmp)
            });

            rocket.manage(store).manage(config)
        }

        /// Convenience helper to produce a blocking local client.
        pub fn blocking_client(self) -> Client {
            Client::tracked(self.build()).expect("valid Rocket instance")
        }

        /// Convenience helper to produce an asynchronous local client.
        pub async fn async_client(self) -> AsyncClient {
            AsyncClient::tracked(self.build())
                .await
                .expect("valid Rocket instance")
        }
    }
}
