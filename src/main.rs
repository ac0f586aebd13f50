use std::net::TcpListener;

use blogapi::configuration::get_configuration;
use blogapi::startup::run;
use blogapi::store;
use blogapi::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry("info");

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    if configuration.jwt.secret.is_empty() {
        // Startup still proceeds; token endpoints answer 500 until a secret
        // is configured.
        tracing::error!("APP__JWT__SECRET is not set, token issuance will fail");
    }

    let pool = store::connect(&configuration.database).await.map_err(|e| {
        tracing::error!("Failed to create connection pool: {}", e);
        std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "Database connection error",
        )
    })?;

    store::migrate(&pool).await.map_err(|e| {
        tracing::error!("Failed to run migrations: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, "Migration error")
    })?;

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, pool, configuration.jwt.clone())?;
    server.await
}
