use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use axum_extra::typed_header::TypedHeaderRejection;
use cwksocial_application::{
    mediator::Mediator,
    operation::{ErrorCode, OperationFailure},
};
use cwksocial_common::model::auth::{TokenError, TokenService};
use json::Json;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::error;

mod auth;
mod json;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub mediator: Arc<Mediator>,
    pub tokens: Arc<TokenService>,
}

/// All routes, nested under the versioned base route.
pub fn routes() -> ServerRouter {
    Router::new()
        .nest("/api/v1", routes::routes())
        .fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Authorization header was missing or invalid: {0}")]
    InvalidAuthorizationHeader(TypedHeaderRejection),
    #[error(transparent)]
    InvalidToken(#[from] TokenError),
    #[error(transparent)]
    Operation(#[from] OperationFailure),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidAuthorizationHeader(rejection) if rejection.is_missing() => {
                StatusCode::UNAUTHORIZED
            }
            ServerError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            ServerError::PathRejection(_)
            | ServerError::JsonRejection(_)
            | ServerError::InvalidAuthorizationHeader(_) => StatusCode::BAD_REQUEST,
            ServerError::JsonResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Operation(failure) => operation_status(failure),
        }
    }

    /// The messages reported to the client.
    fn messages(&self) -> Vec<String> {
        match self {
            ServerError::Operation(failure) => {
                // A missing resource is reported on its own.
                if let Some(not_found) = failure.errors.iter().find(|e| e.code.is_not_found()) {
                    return vec![not_found.message.clone()];
                }
                failure
                    .errors
                    .iter()
                    .map(|error| error.message.clone())
                    .collect()
            }
            ServerError::JsonResponse(_) => {
                vec!["The response could not be serialized".to_owned()]
            }
            other => vec![other.to_string()],
        }
    }
}

fn operation_status(failure: &OperationFailure) -> StatusCode {
    // A missing resource takes precedence over the other errors.
    let code = failure
        .errors
        .iter()
        .map(|error| error.code)
        .find(|code| code.is_not_found())
        .or_else(|| failure.errors.first().map(|error| error.code));

    match code {
        Some(ErrorCode::NotFound | ErrorCode::IdentityUserDoesNotExist) => StatusCode::NOT_FOUND,
        Some(ErrorCode::ValidationError | ErrorCode::IncorrectPassword) => StatusCode::BAD_REQUEST,
        Some(ErrorCode::IdentityUserAlreadyExists) => StatusCode::CONFLICT,
        Some(
            ErrorCode::UnauthorizedAccountRemoval
            | ErrorCode::ProfileModificationNotAllowed
            | ErrorCode::PostUpdateNotPossible
            | ErrorCode::PostDeleteNotPossible
            | ErrorCode::InteractionRemovalNotAuthorized,
        ) => StatusCode::FORBIDDEN,
        Some(ErrorCode::ServerError | ErrorCode::UnknownError) | None => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    status_code: u16,
    status_phrase: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
    errors: Vec<String>,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            status_code: status.as_u16(),
            status_phrase: status.canonical_reason().unwrap_or_default(),
            timestamp: OffsetDateTime::now_utc(),
            errors: self.messages(),
        };
        (status, Json(error_response)).into_response()
    }
}
