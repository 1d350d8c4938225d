use kiro_sdk_rs::KiroSdk;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load KIRO_* overrides from .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let sdk = KiroSdk::from_env()?;

    println!("Connecting to Kiro at {}...", sdk.config().api_url);
    sdk.connect().await?;
    println!("Connected!");

    let health = sdk.health().await?;
    println!("Server: {} | Database: {}", health.server, health.database);

    let status = sdk.connection_status().await;
    println!(
        "Latency: {}ms | WebSocket: {}",
        status.latency_ms.unwrap_or_default(),
        sdk.socket_state()
    );

    for service in sdk.list_available_services().await {
        println!("  - {} v{} ({:?})", service.name, service.version, service.status);
    }

    println!("Disconnecting...");
    sdk.disconnect().await;
    println!("Disconnected!");

    Ok(())
}
