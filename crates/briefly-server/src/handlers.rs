//! API endpoint handlers.

use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Form, Json,
};
use briefly_core::error::ExtractionError;
use briefly_core::extract::{detect_format, DocumentFormat};
use briefly_core::{validate, Style};
use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use tokio::task::JoinError;
use tracing::{debug, error, info};

use super::error::ApiError;
use super::AppState;

/// Successful summarization.
#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub summary: String,
    pub style: Style,
}

/// Fields of a summarize request before validation.
#[derive(Debug, Default)]
struct SummarizeFields {
    text: Option<String>,
    style: Option<String>,
    max_tokens: Option<i64>,
    file: Option<Upload>,
}

#[derive(Debug)]
struct Upload {
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

#[derive(Debug, Deserialize)]
struct JsonBody {
    text: Option<String>,
    style: Option<String>,
    #[serde(default, deserialize_with = "int_or_numeric_string")]
    max_tokens: Option<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Str(String),
}

/// Accept `100` and `"100"`; anything else fails the body
fn int_or_numeric_string<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IntOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IntOrString::Int(n)) => Ok(Some(n)),
        Some(IntOrString::Str(s)) => s.trim().parse().map(Some).map_err(|_| {
            serde::de::Error::custom(format!("max_tokens must be an integer, got '{}'", s))
        }),
    }
}

/// Urlencoded forms carry strings only; `max_tokens` is parsed afterwards.
#[derive(Debug, Deserialize)]
struct FormBody {
    text: Option<String>,
    style: Option<String>,
    max_tokens: Option<String>,
}

/// Service banner.
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "document-summarizer",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Summarize typed text or an uploaded document.
pub async fn summarize(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let fields = read_fields(&state, request).await?;
    let text = resolve_text(&state, fields.text, fields.file).await?;

    let request = validate(text.as_deref(), fields.style.as_deref(), fields.max_tokens)?;
    info!(
        "Summarizing {} chars (style={}, max_tokens={:?})",
        request.text.len(),
        request.style,
        request.max_tokens
    );

    let summary = state
        .summarizer
        .summarize(&request.text, request.style, request.max_tokens)
        .await?;

    Ok(Json(SummarizeResponse {
        summary,
        style: request.style,
    }))
}

/// Read request fields according to the body's content type.
async fn read_fields(state: &AppState, request: Request) -> Result<SummarizeFields, ApiError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_lowercase)
        .unwrap_or_default();
    let limit = state.extractor.max_upload_bytes();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| ApiError::Unprocessable(e.body_text()))?;
        read_multipart(multipart, limit).await
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(form) = Form::<FormBody>::from_request(request, state)
            .await
            .map_err(|e| {
                if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    ApiError::too_large(limit)
                } else {
                    ApiError::Unprocessable(e.body_text())
                }
            })?;
        Ok(SummarizeFields {
            text: form.text,
            style: form.style,
            max_tokens: parse_max_tokens(form.max_tokens.as_deref())?,
            file: None,
        })
    } else if content_type.starts_with("application/json") || content_type.contains("+json") {
        let body = Bytes::from_request(request, state).await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::too_large(limit)
            } else {
                ApiError::Unprocessable(e.body_text())
            }
        })?;
        let json: JsonBody = serde_json::from_slice(&body)
            .map_err(|e| ApiError::Unprocessable(format!("Invalid JSON body: {}", e)))?;
        Ok(SummarizeFields {
            text: json.text,
            style: json.style,
            max_tokens: json.max_tokens,
            file: None,
        })
    } else {
        debug!("No readable fields for content type '{}'", content_type);
        Ok(SummarizeFields::default())
    }
}

async fn read_multipart(mut multipart: Multipart, limit: usize) -> Result<SummarizeFields, ApiError> {
    let mut fields = SummarizeFields::default();
    let map_err = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::too_large(limit)
        } else {
            ApiError::Unprocessable(format!("Malformed multipart body: {}", e.body_text()))
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(map_err)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "text" => fields.text = Some(field.text().await.map_err(map_err)?),
            "style" => fields.style = Some(field.text().await.map_err(map_err)?),
            "max_tokens" => {
                let raw = field.text().await.map_err(map_err)?;
                fields.max_tokens = parse_max_tokens(Some(&raw))?;
            }
            "file" => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(map_err)?;
                // Browsers send an empty part when no file was picked
                if !data.is_empty() {
                    fields.file = Some(Upload {
                        filename,
                        content_type,
                        data,
                    });
                }
            }
            other => debug!("Ignoring multipart field '{}'", other),
        }
    }

    Ok(fields)
}

/// Blank means absent; anything else must be an integer.
fn parse_max_tokens(raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| {
            ApiError::Unprocessable(format!("max_tokens must be an integer, got '{}'", value))
        }),
    }
}

/// Use the text field when it has content, otherwise extract the uploaded file.
async fn resolve_text(
    state: &AppState,
    text: Option<String>,
    file: Option<Upload>,
) -> Result<Option<String>, ApiError> {
    let has_text = text.as_deref().is_some_and(|t| !t.trim().is_empty());
    let upload = match file {
        Some(upload) if !has_text => upload,
        _ => return Ok(text),
    };

    info!(
        "Extracting text from upload (filename={:?}, {} bytes)",
        upload.filename,
        upload.data.len()
    );

    // Computed up front: the upload moves into the blocking task
    let format = detect_format(
        &upload.data,
        upload.filename.as_deref(),
        upload.content_type.as_deref(),
    )
    .unwrap_or(DocumentFormat::Text);

    let extractor = state.extractor.clone();
    let joined = tokio::task::spawn_blocking(move || {
        extractor.extract(
            &upload.data,
            upload.filename.as_deref(),
            upload.content_type.as_deref(),
        )
    })
    .await;

    extraction_outcome(joined, format).map(Some)
}

/// Flatten a blocking extraction; a crashed parser is a parse error for `format`.
fn extraction_outcome(
    joined: Result<briefly_core::Result<String>, JoinError>,
    format: DocumentFormat,
) -> Result<String, ApiError> {
    match joined {
        Ok(result) => Ok(result?),
        Err(e) => {
            error!("Extraction task failed: {}", e);
            Err(briefly_core::Error::from(ExtractionError::parse(
                format,
                "the parser crashed on this file",
            ))
            .into())
        }
    }
}
