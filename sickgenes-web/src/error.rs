//! Erros dos handlers e sua tradução para respostas HTTP

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use sickgenes_core::CoreError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Core(
                CoreError::UnknownEntityType(_) | CoreError::CohortNotFound(_) | CoreError::StudyNotFound(_),
            ) => StatusCode::NOT_FOUND,
            AppError::Core(
                CoreError::InvalidFindingType(_)
                | CoreError::NotResolved { .. }
                | CoreError::InvalidStudy(_)
                | CoreError::InvalidCohort(_)
                | CoreError::UnknownDisease(_),
            ) => StatusCode::BAD_REQUEST,
            AppError::Core(CoreError::DuplicateDoi(_)) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Falha ao processar requisição");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::from(CoreError::UnknownEntityType("x".into())).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::from(CoreError::CohortNotFound(1)).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::from(CoreError::InvalidFindingType("X".into())).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::from(CoreError::StudyNotFound(1)).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::from(CoreError::InvalidCohort("x".into())).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::from(CoreError::DuplicateDoi("10.1/x".into())).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::from(CoreError::Storage("down".into())).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
