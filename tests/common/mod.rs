#![allow(dead_code)]

use rater::configuration::{get_configuration, DatabaseSettings, Settings};
use rater::db::{InMemoryProductRepository, PgProductRepository, ProductRepository};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::net::TcpListener;
use std::sync::Arc;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "test-password";

pub struct TestApp {
    pub address: String,
    pub repository: Arc<dyn ProductRepository>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

pub fn test_configuration() -> Settings {
    let mut configuration = get_configuration().expect("Failed to get configuration");
    configuration.admin.username = ADMIN_USERNAME.to_string();
    configuration.admin.password = ADMIN_PASSWORD.to_string();
    configuration.seed = vec![];
    configuration
}

pub async fn spawn_app_with_repository(
    configuration: Settings,
    repository: Arc<dyn ProductRepository>,
) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let server = rater::startup::run(listener, repository.clone(), configuration)
        .await
        .expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        repository,
    }
}

// we have to run server in another task
pub async fn spawn_app() -> TestApp {
    let repository: Arc<dyn ProductRepository> = Arc::new(InMemoryProductRepository::new());
    spawn_app_with_repository(test_configuration(), repository).await
}

/// Same server over a fresh Postgres database, or `None` when no database is reachable.
pub async fn spawn_postgres_app() -> Option<TestApp> {
    let mut configuration = test_configuration();
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();

    let connection_pool = match configure_database(&configuration.database).await {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("Skipping tests: failed to connect to postgres: {}", err);
            return None;
        }
    };

    let repository: Arc<dyn ProductRepository> =
        Arc::new(PgProductRepository::new(connection_pool));
    Some(spawn_app_with_repository(configuration, repository).await)
}

pub async fn configure_database(config: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    let mut connection = PgConnection::connect(&config.connection_string_without_db()).await?;

    connection
        .execute(format!(r#"CREATE DATABASE "{}""#, config.database_name).as_str())
        .await?;

    let connection_pool = PgPool::connect(&config.connection_string()).await?;

    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await?;

    Ok(connection_pool)
}
