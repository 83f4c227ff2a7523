use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::infra::error::InfraError;

use super::ports::{MappingError, StoreError};

/// Diagnostic attached to error responses and picked up by the logging middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }

    pub fn from_message(source: &'static str, message: impl Into<String>) -> Self {
        Self {
            source,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: String,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        let report = ErrorReport::from_message(source, detail);
        Self {
            status,
            public_message: public_message.into(),
            report,
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: impl Into<String>,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, error);
        Self {
            status,
            public_message: public_message.into(),
            report,
        }
    }

    /// 404 whose body names what could not be found.
    pub fn not_found(source: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(source, StatusCode::NOT_FOUND, message.clone(), message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

impl From<MappingError> for HttpError {
    fn from(error: MappingError) -> Self {
        HttpError::from_error(
            "application::error::mapping_error_to_http_error",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Result mapping failed",
            &error,
        )
    }
}

impl From<StoreError> for HttpError {
    fn from(error: StoreError) -> Self {
        let status = match error {
            StoreError::Malformed(_) => StatusCode::NOT_FOUND,
            StoreError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let public_message = match status {
            StatusCode::NOT_FOUND => "Resource not found",
            _ => "Template could not be read",
        };
        HttpError::from_error(
            "application::error::store_error_to_http_error",
            status,
            public_message,
            &error,
        )
    }
}

/// Failures that end a command-line run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error("{0}")]
    NotFound(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
