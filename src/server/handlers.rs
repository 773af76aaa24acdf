//! Request handlers

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use log::debug;
use tokio::task;

use super::page;
use super::response::JsonError;
use super::upload::{body_rejection, multipart_rejection, DrawParams, UploadForm};
use super::AppState;
use crate::error::{Error, RenderError, ValidationError};
use crate::geometry::PolylineSet;
use crate::preview_with;

/// Run CPU-bound pipeline work off the async worker threads
async fn blocking<T, F>(work: F) -> Result<T, Error>
where
    F: FnOnce() -> Result<T, Error> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|e| RenderError::Worker(e.to_string()))?
}

pub(super) async fn index() -> Html<String> {
    Html(page::index())
}

pub(super) async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Html<String>, Error> {
    let multipart = multipart.map_err(multipart_rejection)?;
    let upload = UploadForm::read(multipart).await?.validate()?;
    debug!(
        "upload: '{}' ({} bytes) {:?}",
        upload.filename,
        upload.svg.len(),
        upload.request
    );

    let preview = blocking(move || {
        let preview = preview_with(
            state.source.as_ref(),
            &upload.svg,
            &upload.request,
            &state.raster,
        )?;
        Ok(page::result(&upload.filename, &preview))
    })
    .await?;
    Ok(Html(preview))
}

pub(super) async fn process(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PolylineSet>, JsonError> {
    let body = body.map_err(body_rejection)?;
    if body.trim_ascii().is_empty() {
        return Err(ValidationError::EmptyBody.into());
    }
    debug!("process: {} bytes", body.len());

    let polylines = blocking(move || Ok(state.source.parse(&body)?)).await?;
    Ok(Json(polylines))
}

pub(super) async fn preview_png(
    State(state): State<AppState>,
    Query(params): Query<DrawParams>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, Error> {
    let body = body.map_err(body_rejection)?;
    let request = params.to_request()?;
    debug!("preview.png: {} bytes {:?}", body.len(), request);

    let png = blocking(move || {
        let preview = preview_with(state.source.as_ref(), &body, &request, &state.raster)?;
        Ok(preview.png)
    })
    .await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}
