use std::sync::Arc;

use posgate_auth::InMemoryIdentityStore;
use posgate_gateway::{app, config::GatewayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    posgate_observability::init();

    let config = GatewayConfig::from_env();

    // Dev-mode identity store; a real deployment wires its own backend.
    let mut store = InMemoryIdentityStore::new();
    match std::env::var("POSGATE_DEV_USER") {
        Ok(spec) => match parse_dev_user(&spec) {
            Some((db, uid, login, password, name)) => {
                store.add_user(&db, uid, &login, &password, &name);
                tracing::info!(%db, %login, "registered dev user");
            }
            None => {
                tracing::warn!("POSGATE_DEV_USER is not db:uid:login:password:name; ignoring");
            }
        },
        Err(_) => {
            tracing::warn!("no POSGATE_DEV_USER configured; sign-in will reject everyone");
        }
    }

    let app = app::build_app(&config, Arc::new(store));

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

fn parse_dev_user(spec: &str) -> Option<(String, i64, String, String, String)> {
    let mut parts = spec.splitn(5, ':');
    let db = parts.next()?.to_string();
    let uid = parts.next()?.parse().ok()?;
    let login = parts.next()?.to_string();
    let password = parts.next()?.to_string();
    let name = parts.next()?.to_string();
    Some((db, uid, login, password, name))
}
