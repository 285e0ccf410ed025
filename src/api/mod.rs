//! Thin HTTP surface over the engine operations. Sessions, credential
//! hashing and upload validation are out of scope here: callers are trusted
//! to have done both before these endpoints are reached.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::{HeaderName, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

mod error;
mod state;

pub use error::ApiError;
pub use state::{create_app, App};

use crate::database::Record;
use crate::model::{HistogramEntry, User, Video};
use crate::service::{blobs, catalog, favorites, histogram, ledger, users};

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

pub fn create_router(app: App) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/videos", post(upload_video).get(list_videos))
        .route("/videos/:id", get(fetch_video))
        .route("/videos/:id/views", post(record_view))
        .route("/views", post(record_homepage_view))
        .route("/signups", post(record_signup))
        .route("/users", post(create_user))
        .route("/users/:id/favorites", get(list_favorites))
        .route("/users/:user/favorites/:video", post(toggle_favorite))
        .route("/stats", get(get_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct UploadParams {
    name: String,
    category: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadedResponse {
    pub id: String,
}

async fn upload_video(
    State(app): State<App>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadedResponse>)> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let video = Video::new(params.name, params.category, content_type, body.to_vec());
    let id = blobs::put(&app.database, video).await?;

    Ok((StatusCode::CREATED, Json(UploadedResponse { id: id.key() })))
}

async fn fetch_video(
    State(app): State<App>,
    Path(id): Path<String>,
) -> Result<([(HeaderName, String); 1], Vec<u8>)> {
    let video = blobs::get(&app.database, &Record::new(id)).await?;

    Ok(([(CONTENT_TYPE, video.content_type)], video.payload))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VideoListing {
    pub id: String,
    pub name: String,
    pub category: String,
}

async fn list_videos(
    State(app): State<App>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<VideoListing>>> {
    let summaries = catalog::list(&app.database, params.category.as_deref()).await?;

    let listing = summaries
        .into_iter()
        .map(|summary| VideoListing {
            id: summary.id.key(),
            name: summary.name,
            category: summary.category,
        })
        .collect();

    Ok(Json(listing))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ViewsResponse {
    pub views: u64,
}

async fn record_view(
    State(app): State<App>,
    Path(id): Path<String>,
) -> Result<Json<ViewsResponse>> {
    let views = ledger::record_view(&app.database, &Record::new(id)).await?;
    Ok(Json(ViewsResponse { views }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TotalViewsResponse {
    pub total_views: u64,
}

async fn record_homepage_view(State(app): State<App>) -> Result<Json<TotalViewsResponse>> {
    let total_views = ledger::record_homepage_view(&app.database).await?;
    Ok(Json(TotalViewsResponse { total_views }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    pub total_signups: u64,
}

async fn record_signup(State(app): State<App>) -> Result<Json<SignupResponse>> {
    let today = Utc::now().date_naive();
    let total_signups = histogram::record_signup(&app.database, today).await?;
    Ok(Json(SignupResponse { total_signups }))
}

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    id: String,
    credential: String,
    #[serde(default = "default_role")]
    role: String,
}

fn default_role() -> String {
    "member".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub role: String,
}

async fn create_user(
    State(app): State<App>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let user = User::new(Record::new(request.id), request.credential, request.role);
    let user = users::create(&app.database, user).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id.key(),
            role: user.role,
        }),
    ))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<String>,
}

async fn toggle_favorite(
    State(app): State<App>,
    Path((user, video)): Path<(String, String)>,
) -> Result<Json<FavoritesResponse>> {
    let favorites =
        favorites::toggle(&app.database, &Record::new(user), &Record::new(video)).await?;

    Ok(Json(FavoritesResponse {
        favorites: favorites.iter().map(|video| video.key()).collect(),
    }))
}

async fn list_favorites(
    State(app): State<App>,
    Path(id): Path<String>,
) -> Result<Json<Vec<VideoListing>>> {
    let summaries = favorites::resolve(&app.database, &Record::new(id)).await?;

    let listing = summaries
        .into_iter()
        .map(|summary| VideoListing {
            id: summary.id.key(),
            name: summary.name,
            category: summary.category,
        })
        .collect();

    Ok(Json(listing))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_signups: u64,
    pub total_views: u64,
    pub signup_history: Vec<HistogramEntry>,
}

async fn get_stats(State(app): State<App>) -> Result<Json<StatsResponse>> {
    let stats = ledger::stats(&app.database).await?;

    Ok(Json(StatsResponse {
        total_signups: stats.total_signups,
        total_views: stats.total_views,
        signup_history: stats.signup_history,
    }))
}
