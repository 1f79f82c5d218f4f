use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use parking_lot::RwLock;
use search_core::{
    process_queries, process_queries_joined, remove_duplicates, Document, DocumentId,
    DocumentStatus, Rating, SearchError, SearchIndex,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

type ApiError = (StatusCode, String);

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Token expected in `X-ADMIN-TOKEN` for mutating routes. Mutations are
    /// refused when unset.
    pub admin_token: Option<String>,
    /// Allowed CORS origins; any origin when empty.
    pub cors_allow_origin: Vec<String>,
}

impl ServerConfig {
    /// Read `ADMIN_TOKEN` and `CORS_ALLOW_ORIGIN` (comma-separated).
    pub fn from_env() -> Self {
        let admin_token = std::env::var("ADMIN_TOKEN").ok();
        let cors_allow_origin = std::env::var("CORS_ALLOW_ORIGIN")
            .map(|val| val.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        Self { admin_token, cors_allow_origin }
    }
}

/// The index is shared behind a read-write lock: searches hold the read side,
/// adds and removals the write side, so no query runs during a mutation.
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<RwLock<SearchIndex>>,
    pub admin_token: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default, deserialize_with = "status_from_str")]
    pub status: Option<DocumentStatus>,
}

/// Accept a status in any letter case, the same way the CLI does.
fn status_from_str<'de, D>(deserializer: D) -> Result<Option<DocumentStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| s.parse().map_err(serde::de::Error::custom)).transpose()
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub results: Vec<Document>,
}

#[derive(Deserialize)]
pub struct MatchParams {
    pub q: String,
    pub id: DocumentId,
}

#[derive(Serialize)]
pub struct MatchResponse {
    pub document_id: DocumentId,
    pub status: DocumentStatus,
    pub words: Vec<String>,
    /// Document text with matched words wrapped in `<em>`.
    pub highlighted: String,
}

#[derive(Serialize)]
pub struct DocResponse {
    pub document_id: DocumentId,
    pub status: DocumentStatus,
    pub rating: Rating,
    pub text: String,
    pub frequencies: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
pub struct BatchRequest {
    pub queries: Vec<String>,
    #[serde(default)]
    pub joined: bool,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum BatchResponse {
    PerQuery(Vec<Vec<Document>>),
    Joined(Vec<Document>),
}

#[derive(Deserialize)]
pub struct AddDocumentRequest {
    pub id: DocumentId,
    pub text: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub ratings: Vec<Rating>,
}

pub fn build_app(index: SearchIndex, config: ServerConfig) -> axum::Router {
    let cors = if config.cors_allow_origin.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        let origins: Vec<_> = config.cors_allow_origin.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
    };

    let app_state = AppState { index: Arc::new(RwLock::new(index)), admin_token: config.admin_token };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/match", get(match_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/batch", post(batch_handler))
        .route("/documents", post(add_document))
        .route("/documents/:doc_id", delete(remove_document))
        .route("/dedupe", post(dedupe))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn api_error(err: SearchError) -> ApiError {
    let status = match err {
        SearchError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        SearchError::NotFound(_) => StatusCode::NOT_FOUND,
        SearchError::Io(_) | SearchError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let status = params.status.unwrap_or(DocumentStatus::Actual);
    let results = state.index.read().find_top_documents_by_status(&params.q, status).map_err(api_error)?;
    let took_s = start.elapsed().as_secs_f64();
    Ok(Json(SearchResponse { query: params.q, took_s, results }))
}

pub async fn match_handler(
    State(state): State<AppState>,
    Query(params): Query<MatchParams>,
) -> Result<Json<MatchResponse>, ApiError> {
    let index = state.index.read();
    let (words, status) = index.match_document(&params.q, params.id).map_err(api_error)?;
    let text = index.document_text(params.id).unwrap_or_default();
    let highlighted = highlight_terms(text, &words);
    Ok(Json(MatchResponse {
        document_id: params.id,
        status,
        words: words.into_iter().map(str::to_string).collect(),
        highlighted,
    }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocumentId>,
) -> Result<Json<DocResponse>, ApiError> {
    let index = state.index.read();
    let frequencies = index.get_word_frequencies(doc_id).map_err(api_error)?.clone();
    let not_found = || api_error(SearchError::NotFound(doc_id));
    Ok(Json(DocResponse {
        document_id: doc_id,
        status: index.document_status(doc_id).ok_or_else(not_found)?,
        rating: index.document_rating(doc_id).ok_or_else(not_found)?,
        text: index.document_text(doc_id).ok_or_else(not_found)?.to_string(),
        frequencies,
    }))
}

pub async fn batch_handler(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    // The rayon fan-out blocks, so keep it off the async workers.
    let index = Arc::clone(&state.index);
    let response = tokio::task::spawn_blocking(move || {
        let index = index.read();
        if request.joined {
            process_queries_joined(&index, &request.queries).map(BatchResponse::Joined)
        } else {
            process_queries(&index, &request.queries).map(BatchResponse::PerQuery)
        }
    })
    .await
    .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?
    .map_err(api_error)?;
    Ok(Json(response))
}

/// Wrap every whole-word occurrence of `terms` in `<em>`.
fn highlight_terms(text: &str, terms: &[&str]) -> String {
    let mut s = text.to_string();
    for t in terms {
        let pattern = format!(r"(^|\s){}($|\s)", regex::escape(t));
        let Ok(re) = regex::Regex::new(&pattern) else {
            continue;
        };
        // Matches may share a separating space, so run until nothing changes.
        loop {
            let next = re.replace_all(&s, |caps: &regex::Captures| {
                format!("{}<em>{}</em>{}", &caps[1], t, &caps[2])
            });
            if next == s {
                break;
            }
            s = next.into_owned();
        }
    }
    s
}

// --- Admin endpoints ---
async fn add_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(doc): Json<AddDocumentRequest>,
) -> Result<StatusCode, ApiError> {
    authorize(&state, &headers)?;
    state
        .index
        .write()
        .add_document(doc.id, &doc.text, doc.status, &doc.ratings)
        .map_err(api_error)?;
    tracing::info!(id = doc.id, "document added");
    Ok(StatusCode::CREATED)
}

async fn remove_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(doc_id): Path<DocumentId>,
) -> Result<StatusCode, ApiError> {
    authorize(&state, &headers)?;
    state.index.write().remove_document(doc_id);
    Ok(StatusCode::NO_CONTENT)
}

async fn dedupe(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<DocumentId>>, ApiError> {
    authorize(&state, &headers)?;
    let removed = remove_duplicates(&mut state.index.write());
    Ok(Json(removed))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlights_whole_words_only() {
        let out = highlight_terms("cat catalog cat cat", &["cat"]);
        assert_eq!(out, "<em>cat</em> catalog <em>cat</em> <em>cat</em>");
    }
}
