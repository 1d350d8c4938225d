use kiro_sdk_rs::{KiroSdk, SocketState};
use tracing_subscriber::EnvFilter;

/// Prints every event the Kiro server broadcasts until Ctrl+C
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let sdk = KiroSdk::from_env()?;

    // Subscriptions registered before connect() also see kiro:connected
    let (_all, mut events) = sdk.events("*");
    let mut states = sdk.socket_state_changes();

    sdk.connect().await?;
    println!("Watching events on {} (Ctrl+C to stop)\n", sdk.config().ws_url);

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                println!("[{}] {} from {}: {}", event.timestamp, event.event_type, event.source, event.data);
            }
            Ok(()) = states.changed() => {
                let state = *states.borrow_and_update();
                println!("-- socket {}", state);
                if state == SocketState::Stopped {
                    println!("Reconnect budget exhausted, exiting");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    sdk.disconnect().await;
    Ok(())
}
