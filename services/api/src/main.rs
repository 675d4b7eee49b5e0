mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::Response,
    routing::get,
    Router,
};
use clap::Parser;
use interview_core::{
    ClientEvent, GeminiModel, InterviewHub, QuestionBank, ResponseGenerator, SessionKey, TextModel,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};
use tracing_subscriber::fmt::time::ChronoLocal;

use crate::config::Config;

#[derive(Parser)]
struct Cli {
    /// Path to the question bank JSON document
    #[arg(long, default_value = "questions.json")]
    questions: PathBuf,
}

/// Handles WebSocket upgrade requests and hands the connection to
/// `handle_socket`.
async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<Arc<InterviewHub>>) -> Response {
    debug!("WebSocket upgrade request received");
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Manages one interview connection for its whole lifetime.
///
/// Each connection gets a fresh session key and its own task, so a key's
/// events are handled strictly in arrival order and one slow generation
/// never blocks another connection. Whatever way the loop exits, the hub is
/// told to clean the key up.
async fn handle_socket(mut socket: WebSocket, hub: Arc<InterviewHub>) {
    let key = SessionKey::new();
    info!(%key, "client connected");

    while let Some(frame) = socket.recv().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(err) => {
                debug!(%key, error = %err, "socket error, closing");
                break;
            }
        };
        let text = match frame {
            Message::Text(text) => text,
            Message::Close(_) => break,
            // Pings are answered by axum; binary frames have no meaning here.
            _ => continue,
        };

        let event = match serde_json::from_str::<ClientEvent>(&text) {
            Ok(event) => event,
            Err(err) => {
                warn!(%key, error = %err, "dropping unparseable frame");
                continue;
            }
        };

        for outbound in hub.handle(key, event).await {
            let payload = match serde_json::to_string(&outbound) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(%key, error = %err, "failed to encode outbound event");
                    continue;
                }
            };
            if socket.send(Message::Text(payload.into())).await.is_err() {
                // Peer went away mid-reply; the cleanup below handles it.
                info!(%key, "client disconnected mid-send");
                hub.disconnect(key);
                return;
            }
        }
    }

    hub.disconnect(key);
    info!(%key, "client disconnected");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load application configuration")?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    let args = Cli::parse();

    let bank = QuestionBank::from_path(&args.questions)
        .context("Failed to load the interview question bank")?;
    info!(
        levels = %bank.levels().collect::<Vec<_>>().join(", "),
        "question bank loaded"
    );

    let model: Option<Arc<dyn TextModel>> = match config.gemini_api_key.clone() {
        Some(key) => {
            info!(model = %config.chat_model, "Gemini model configured");
            Some(Arc::new(GeminiModel::new(key, config.chat_model.clone())))
        }
        None => {
            warn!("GEMINI_API_KEY not set; interviews will use canned fallback responses");
            None
        }
    };
    let hub = Arc::new(InterviewHub::new(bank, ResponseGenerator::new(model)));

    // A separate frontend serves the interview UI, so cross-origin upgrades
    // must be allowed.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(hub);

    info!(addr = %config.bind_addr, "starting interview gateway");
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
