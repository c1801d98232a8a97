use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use common::ServerConfig;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::figment::Figment;
use rocket::http::{Header, Status};
use rocket::response::content::RawHtml;
use rocket::serde::json::Json;
use rocket::{catch, catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::llm::repurpose::RepurposedContent;
use crate::processing::Repurposer;

/// Application state stored inside Rocket managed state.
#[derive(Clone)]
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub repurposer: Arc<Repurposer>,
}

impl AppState {
    pub fn new(repurposer: Repurposer) -> Self {
        Self {
            started_at: Utc::now(),
            repurposer: Arc::new(repurposer),
        }
    }
}

/// Request body for `/api/repurpose`.
#[derive(Debug, Deserialize)]
pub struct RepurposeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Body of every non-2xx JSON response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (Status, Json<ErrorBody>);

fn api_error(status: Status, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorBody { error: message.into() }))
}

impl From<PipelineError> for (Status, Json<ErrorBody>) {
    fn from(err: PipelineError) -> Self {
        let status = Status::from_code(err.status_code()).unwrap_or(Status::InternalServerError);
        api_error(status, err.to_string())
    }
}

/// Response structure for `/health`.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
    uptime_seconds: i64,
}

/// Single-page form posting to `/api/repurpose`
#[get("/")]
async fn index() -> RawHtml<&'static str> {
    RawHtml(include_str!("../static/index.html"))
}

#[get("/health")]
async fn health(state: &State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Server is running",
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
    })
}

#[post("/api/repurpose", data = "<body>")]
async fn repurpose(
    state: &State<AppState>,
    body: Json<RepurposeRequest>,
) -> Result<Json<RepurposedContent>, ApiError> {
    let url = body.into_inner().url.unwrap_or_default();

    match state.repurposer.repurpose(&url).await {
        Ok(content) => Ok(Json(content)),
        Err(e) => {
            if e.status_code() >= 500 {
                tracing::error!("Error processing request for '{}': {}", url, e);
            } else {
                tracing::warn!("Rejected request for '{}': {}", url, e);
            }
            Err(e.into())
        }
    }
}

/// CORS preflight for any path
#[options("/<_..>")]
async fn preflight() -> Status {
    Status::Ok
}

#[catch(default)]
fn json_catcher(status: Status, _req: &Request<'_>) -> ApiError {
    let message = match status.code {
        400 | 422 => "Invalid request body: expected JSON like {\"url\": \"https://...\"}",
        404 => "Not found",
        _ => status.reason().unwrap_or("Internal server error"),
    };
    api_error(status, message)
}

/// Adds permissive CORS headers to every response.
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _req: &'r Request<'_>, res: &mut Response<'r>) {
        res.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        res.set_header(Header::new("Access-Control-Allow-Methods", "GET, POST, OPTIONS"));
        res.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type"));
    }
}

/// Rocket figment with `server.bind` / `server.port` applied.
pub fn figment(server: &ServerConfig) -> Figment {
    rocket::Config::figment()
        .merge(("address", server.bind.clone()))
        .merge(("port", server.port))
}

/// Assemble the Rocket instance without launching it (used by tests with a local client).
pub fn build_rocket(figment: Figment, state: AppState) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(state)
        .attach(Cors)
        .mount("/", routes![index, health, repurpose, preflight])
        .register("/", catchers![json_catcher])
}

pub async fn launch_rocket(server: &ServerConfig, state: AppState) -> Result<()> {
    tracing::info!("Starting Rocket HTTP server on {}:{}", server.bind, server.port);
    tracing::info!("Health check: http://localhost:{}/health", server.port);

    build_rocket(figment(server), state)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}
