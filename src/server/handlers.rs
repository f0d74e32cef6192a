use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{ErrorKind, MatcherError};
use crate::input::{Document, DocumentInput, DocumentKind, Side};
use crate::processing::matcher::MatchResult;
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_ready: bool,
    pub model: Option<String>,
}

#[derive(Serialize)]
pub struct SkillsResponse {
    pub total_skills: usize,
    pub skills: Vec<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub kind: ErrorKind,
}

/// Error body plus the status it is sent with
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn from_multipart(err: MultipartError) -> Self {
        let status = err.status();
        log::warn!("Rejected multipart body: {}", err.body_text());
        Self {
            status: if status.is_client_error() {
                status
            } else {
                StatusCode::BAD_REQUEST
            },
            body: ErrorResponse {
                detail: format!("Invalid multipart body: {}", err.body_text()),
                kind: ErrorKind::Input,
            },
        }
    }
}

impl From<MatcherError> for ApiError {
    fn from(err: MatcherError) -> Self {
        let kind = err.kind();
        let status = if kind.is_caller_fault() {
            StatusCode::BAD_REQUEST
        } else {
            log::error!("Request failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        };

        Self {
            status,
            body: ErrorResponse {
                detail: err.to_string(),
                kind,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "name": "CV-to-Job Matcher API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "skills": "/skills",
            "match": "/match (POST)"
        }
    }))
}

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            model_ready: state.matcher.is_ready(),
            model: state.matcher.model_name().map(str::to_string),
        }),
    )
}

pub async fn skills_handler(State(state): State<AppState>) -> Json<SkillsResponse> {
    let listing = state.matcher.list_skills();
    Json(SkillsResponse {
        total_skills: listing.total,
        skills: listing.skills,
    })
}

/// Optional file and text collected for each side
#[derive(Default)]
struct MatchForm {
    cv_file: Option<Document>,
    cv_text: Option<String>,
    jd_file: Option<Document>,
    jd_text: Option<String>,
}

pub async fn match_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MatchResult>, ApiError> {
    let mut form = MatchForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(ApiError::from_multipart)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "cv_file" | "jd_file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(ApiError::from_multipart)?;

                // Browsers send an empty part for an untouched file input
                if data.is_empty() && file_name.is_empty() {
                    continue;
                }

                log::debug!("Received {} '{}' ({} bytes)", name, file_name, data.len());
                let document =
                    Document::new(data.to_vec(), DocumentKind::from_file_name(&file_name));
                if name == "cv_file" {
                    form.cv_file = Some(document);
                } else {
                    form.jd_file = Some(document);
                }
            }
            "cv_text" | "jd_text" => {
                let data = field.bytes().await.map_err(ApiError::from_multipart)?;
                let text = String::from_utf8(data.to_vec()).map_err(|_| {
                    MatcherError::InvalidInput(format!("{} is not valid UTF-8", name))
                })?;
                if name == "cv_text" {
                    form.cv_text = Some(text);
                } else {
                    form.jd_text = Some(text);
                }
            }
            other => log::debug!("Ignoring unknown form field '{}'", other),
        }
    }

    let cv = DocumentInput::resolve(Side::Cv, form.cv_file, form.cv_text)?;
    let jd = DocumentInput::resolve(Side::JobDescription, form.jd_file, form.jd_text)?;

    let result = state.matcher.match_documents_async(cv, jd).await?;
    Ok(Json(result))
}
