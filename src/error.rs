use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use crate::models::ApiError;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("previous subscription has not ended (user {user_id}, service {service_name:?})")]
    OverlapError {
        user_id: Uuid,
        service_name: String,
    },

    #[error("Not found: {entity} {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Database error during {operation}: {source}")]
    DatabaseError {
        operation: &'static str,
        #[source]
        source: sea_orm::DbErr,
    },

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Wraps a storage failure with the operation it interrupted.
    pub fn database(operation: &'static str) -> impl FnOnce(sea_orm::DbErr) -> Self {
        move |source| AppError::DatabaseError { operation, source }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::OverlapError { .. } => "OVERLAP_ERROR",
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::DatabaseError { .. } => "DATABASE_ERROR",
            AppError::ConfigError(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::OverlapError { .. } => StatusCode::CONFLICT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::DatabaseError { .. } | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                msg.clone()
            }
            AppError::OverlapError { .. } => {
                log::warn!("{self}");
                "Previous subscription has not ended".to_string()
            }
            AppError::NotFound { entity, .. } => format!("{entity} not found"),
            AppError::DatabaseError { .. } => {
                log::error!("{self}");
                "Database error".to_string()
            }
            AppError::ConfigError(_) => {
                log::error!("Internal error: {self}");
                "Internal server error".to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": ApiError {
                code: self.code().to_string(),
                message,
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_variant() {
        let id = Uuid::new_v4();
        assert_eq!(
            AppError::ValidationError("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::OverlapError {
                user_id: id,
                service_name: "Netflix".into()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::NotFound {
                entity: "Subscription",
                id
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        let db = AppError::database("delete subscription")(sea_orm::DbErr::Custom("boom".into()));
        assert_eq!(db.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(db.code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_database_error_keeps_operation_context() {
        let err = AppError::database("list subscriptions")(sea_orm::DbErr::Custom("gone".into()));
        match &err {
            AppError::DatabaseError { operation, .. } => {
                assert_eq!(*operation, "list subscriptions")
            }
            other => panic!("unexpected variant: {other:?}"),
        }
        assert!(err.to_string().contains("list subscriptions"));
    }
}
