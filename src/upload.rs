use std::collections::HashMap;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::AppError;

/// A create/update body reduced to plain string fields plus the uploaded image, if any.
///
/// Accepts `multipart/form-data`, `application/json` and url-encoded forms. Only
/// multipart bodies can carry a file; a part counts as the file when it has a non-empty
/// filename and body.
/// The whole file is buffered in memory.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub fields: HashMap<String, String>,
    pub file: Option<Bytes>,
}

#[async_trait]
impl<S> FromRequest<S> for ProductForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = content_type(&req);

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return read_multipart(multipart).await;
        }

        if content_type.starts_with("application/json") {
            let Json(body) = Json::<Map<String, Value>>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Ok(Self {
                fields: json_fields(body),
                file: None,
            });
        }

        let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(Self { fields, file: None })
    }
}

/// A JSON or url-encoded body deserialized into `T`. A bodiless request without a
/// content type yields `T::default()` so the handler's own validation answers it.
#[derive(Debug)]
pub struct FormOrJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for FormOrJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = content_type(&req);

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Ok(Self(value));
        }

        if content_type.is_empty() {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            if body.is_empty() {
                return Ok(Self(T::default()));
            }
            return Err(AppError::BadRequest(
                "Missing Content-Type header".to_string(),
            ));
        }

        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(Self(value))
    }
}

fn content_type(req: &Request) -> String {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

async fn read_multipart(mut multipart: Multipart) -> Result<ProductForm, AppError> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if field.file_name().is_some() {
            let has_name = field.file_name().is_some_and(|f| !f.is_empty());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            // Browsers send an empty part for a file input left blank.
            if !has_name || bytes.is_empty() {
                continue;
            }
            if form.file.is_some() {
                warn!(field = %name, "Multiple files uploaded; keeping the last one");
            }
            form.file = Some(bytes);
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            form.fields.insert(name, text);
        }
    }

    Ok(form)
}

/// Flatten a JSON object into string fields. Strings are taken verbatim, `null`
/// drops the key, anything else uses its JSON text (so `50` becomes `"50"`).
fn json_fields(body: Map<String, Value>) -> HashMap<String, String> {
    body.into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect()
}
