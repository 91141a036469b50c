//! Web API module for Pageforge.
//!
//! REST surface the browser builder talks to: catalog listings, the AI
//! restyle proxy, and image uploads served back as static files.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/sections` - List section templates (optional ?category= ?search=)
//! - `GET /api/themes` - List preset themes
//! - `POST /api/ai/edit-section` - Proxy a restyle prompt to the annotation endpoint
//! - `POST /api/upload-image` - Multipart image upload
//! - `GET /uploads/{filename}` - Serve uploaded images

use std::net::SocketAddr;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::annotation::{Annotation, AnnotationClient};
use crate::config::{Config, ALLOWED_IMAGE_EXTENSIONS};
use crate::models::SectionCategory;
use crate::registry::{SectionRegistry, SectionTemplate};
use crate::themes::{Theme, ThemeTable};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the web API.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    config: Arc<Config>,
    /// Section template catalog (immutable after load)
    registry: Arc<SectionRegistry>,
    /// Theme catalog (immutable after load)
    themes: Arc<ThemeTable>,
    /// Remote annotation client
    annotation: AnnotationClient,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let registry = SectionRegistry::load()?;
        let themes = ThemeTable::load()?;
        let api_key = config.annotation_api_key();
        let annotation = AnnotationClient::new(&config.annotation, api_key)?;

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            themes: Arc::new(themes),
            annotation,
        })
    }

    /// Returns the upload directory.
    #[must_use]
    pub fn upload_dir(&self) -> &PathBuf {
        &self.config.uploads.upload_dir
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Current health status (e.g., "healthy").
    pub status: String,
    /// Application version.
    pub version: String,
}

/// Query parameters for section listing.
#[derive(Debug, Deserialize)]
pub struct SectionQuery {
    /// Category id to filter by.
    pub category: Option<String>,
    /// Search term matched against template names.
    pub search: Option<String>,
}

/// Section list response.
#[derive(Debug, Serialize)]
pub struct SectionListResponse {
    /// Matching section templates.
    pub sections: Vec<SectionInfo>,
    /// Total count of matching templates.
    pub total: usize,
}

/// Section template summary for API response.
#[derive(Debug, Serialize)]
pub struct SectionInfo {
    /// Template id (e.g., "hero-video").
    pub id: String,
    /// Category this template belongs to.
    pub category: SectionCategory,
    /// Display name.
    pub name: String,
}

impl From<&SectionTemplate> for SectionInfo {
    fn from(template: &SectionTemplate) -> Self {
        Self {
            id: template.id.clone(),
            category: template.category,
            name: template.name.clone(),
        }
    }
}

/// Theme list response.
#[derive(Debug, Serialize)]
pub struct ThemeListResponse {
    /// All preset themes.
    pub themes: Vec<Theme>,
}

/// AI restyle request.
#[derive(Debug, Deserialize)]
pub struct EditSectionRequest {
    /// The user's styling prompt.
    pub prompt: String,
    /// Category label of the section being restyled.
    #[serde(alias = "sectionType")]
    pub section_type: String,
    /// Current wrapper class string.
    #[serde(default, alias = "currentClasses")]
    pub current_classes: String,
}

/// AI restyle response envelope.
#[derive(Debug, Serialize)]
pub struct EditSectionResponse {
    /// Always `true`; errors use [`ApiError`] instead.
    pub success: bool,
    /// The parsed annotation.
    pub data: Annotation,
}

/// Image upload response.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Always `true`; errors use [`ApiError`] instead.
    pub success: bool,
    /// Public URL the uploaded image is served from.
    pub url: String,
    /// Stored filename.
    pub filename: String,
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Error message.
    pub error: String,
    /// Optional additional detail, typically an underlying cause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiError {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    fn with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Upload Validation
// ============================================================================

/// Extracts and validates the extension of an uploaded filename.
///
/// Only lowercase image extensions from the allow-list pass; everything else
/// is rejected before any bytes hit the disk.
fn validate_image_extension(filename: &str) -> Result<String, ApiError> {
    if filename.is_empty() {
        return Err(ApiError::new("Upload filename cannot be empty"));
    }

    let extension = FsPath::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .ok_or_else(|| ApiError::new("Upload filename has no extension"))?;

    if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ApiError::new(format!(
            "Unsupported image type '.{extension}': expected one of {}",
            ALLOWED_IMAGE_EXTENSIONS.join(", ")
        )));
    }

    Ok(extension)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /health - Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/sections - List section templates.
async fn list_sections(
    State(state): State<AppState>,
    Query(query): Query<SectionQuery>,
) -> Result<Json<SectionListResponse>, (StatusCode, Json<ApiError>)> {
    let mut templates: Vec<&SectionTemplate> = match &query.category {
        Some(id) => {
            let category = SectionCategory::from_id(id).ok_or_else(|| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(ApiError::new(format!("Unknown section category: {id}"))),
                )
            })?;
            state.registry.list_by_category(category)
        }
        None => state.registry.all().iter().collect(),
    };

    if let Some(search) = &query.search {
        let needle = search.to_lowercase();
        templates.retain(|t| t.name.to_lowercase().contains(&needle));
    }

    let sections: Vec<SectionInfo> = templates.into_iter().map(SectionInfo::from).collect();
    let total = sections.len();
    Ok(Json(SectionListResponse { sections, total }))
}

/// GET /api/themes - List preset themes.
async fn list_themes(State(state): State<AppState>) -> Json<ThemeListResponse> {
    Json(ThemeListResponse {
        themes: state.themes.list().to_vec(),
    })
}

/// POST /api/ai/edit-section - Proxy a restyle prompt to the annotation endpoint.
async fn edit_section(
    State(state): State<AppState>,
    Json(request): Json<EditSectionRequest>,
) -> Result<Json<EditSectionResponse>, (StatusCode, Json<ApiError>)> {
    if request.prompt.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("Prompt cannot be empty")),
        ));
    }

    let annotation = state
        .annotation
        .annotate(
            &request.prompt,
            &request.section_type,
            &request.current_classes,
        )
        .await
        .map_err(|e| {
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiError::with_message(
                    "Annotation request failed",
                    e.to_string(),
                )),
            )
        })?;

    Ok(Json(EditSectionResponse {
        success: true,
        data: annotation,
    }))
}

/// POST /api/upload-image - Multipart image upload.
async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, (StatusCode, Json<ApiError>)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::with_message(
                "Failed to read multipart body",
                e.to_string(),
            )),
        )
    })? {
        if field.name() != Some("image") {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let extension = validate_image_extension(&original_name)
            .map_err(|e| (StatusCode::BAD_REQUEST, Json(e)))?;

        let data = field.bytes().await.map_err(|e| {
            (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ApiError::with_message(
                    "Failed to read upload data",
                    e.to_string(),
                )),
            )
        })?;

        if data.len() as u64 > state.config.uploads.max_bytes {
            return Err((
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ApiError::new(format!(
                    "Upload exceeds size limit of {} bytes",
                    state.config.uploads.max_bytes
                ))),
            ));
        }

        let filename = format!("{}.{extension}", uuid::Uuid::new_v4());
        let upload_dir = state.upload_dir();

        tokio::fs::create_dir_all(upload_dir).await.map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::with_message(
                    "Failed to create upload directory",
                    e.to_string(),
                )),
            )
        })?;

        tokio::fs::write(upload_dir.join(&filename), &data)
            .await
            .map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiError::with_message(
                        "Failed to store upload",
                        e.to_string(),
                    )),
                )
            })?;

        info!(filename, bytes = data.len(), "Stored uploaded image");
        return Ok(Json(UploadResponse {
            success: true,
            url: format!("/uploads/{filename}"),
            filename,
        }));
    }

    Err((
        StatusCode::BAD_REQUEST,
        Json(ApiError::new("Multipart body had no 'image' field")),
    ))
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS is intended for local development only; the server is
    // designed to run on the user's machine alongside the frontend.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = usize::try_from(state.config.uploads.max_bytes)
        .unwrap_or(usize::MAX)
        // headroom for multipart framing around the file payload
        .saturating_add(64 * 1024);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/sections", get(list_sections))
        .route("/api/themes", get(list_themes))
        .route("/api/ai/edit-section", post(edit_section))
        .route("/api/upload-image", post(upload_image))
        .nest_service("/uploads", ServeDir::new(state.upload_dir()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the web server.
///
/// # Errors
///
/// Returns an error if state construction or binding fails.
pub async fn run_server(config: Config, addr: SocketAddr) -> anyhow::Result<()> {
    let state = AppState::new(config)?;
    let app = create_router(state);

    info!("Starting Pageforge web server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
