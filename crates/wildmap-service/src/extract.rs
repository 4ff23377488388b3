//! Extractor wrappers that keep rejections on the wire error shape.
//!
//! axum's `Query` and `Json` answer malformed input with plain-text bodies;
//! these wrappers convert those rejections into `ApiError` so every response,
//! including type-level input failures, carries `{error, details?}`. The
//! rejection's status code is preserved.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// `Query` answering malformed query strings with the wire error shape.
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(query_rejection)?;
        Ok(Self(value))
    }
}

/// `Json` answering unparseable bodies with the wire error shape.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        Ok(Self(value))
    }
}

fn query_rejection(rejection: QueryRejection) -> ApiError {
    ApiError {
        status: rejection.status(),
        error: rejection.body_text(),
        details: None,
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError {
        status: rejection.status(),
        error: rejection.body_text(),
        details: None,
    }
}
