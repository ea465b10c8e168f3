use rater::configuration::{get_configuration, StorageBackend};
use rater::db::{InMemoryProductRepository, PgProductRepository, ProductRepository};
use rater::startup::{run, seed_products};
use rater::telemetry::{get_subscriber, init_subscriber};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber("rater".into(), "info".into());
    init_subscriber(subscriber);

    let settings = get_configuration().expect("Failed to read configuration.");

    let repository: Arc<dyn ProductRepository> = match settings.storage.backend {
        StorageBackend::Memory => {
            tracing::info!("Keeping products in memory");
            Arc::new(InMemoryProductRepository::new())
        }
        StorageBackend::Postgres => {
            tracing::info!(
                db_host = %settings.database.host,
                db_port = settings.database.port,
                db_name = %settings.database.database_name,
                "Connecting to PostgreSQL"
            );

            let connect_options = PgConnectOptions::new()
                .host(&settings.database.host)
                .port(settings.database.port)
                .username(&settings.database.username)
                .password(&settings.database.password)
                .database(&settings.database.database_name)
                .ssl_mode(PgSslMode::Prefer);

            let pg_pool = PgPoolOptions::new()
                .max_connections(settings.database.max_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect_with(connect_options)
                .await
                .expect("Failed to connect to database.");

            sqlx::migrate!("./migrations")
                .run(&pg_pool)
                .await
                .expect("Failed to migrate database.");

            Arc::new(PgProductRepository::new(pg_pool))
        }
    };

    seed_products(repository.as_ref(), &settings.seed)
        .await
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;

    let address = format!("{}:{}", settings.app_host, settings.app_port);
    tracing::info!("Start server at {:?}", &address);
    let listener = TcpListener::bind(&address)?;

    run(listener, repository, settings).await?.await
}
