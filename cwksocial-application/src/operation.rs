//! The result envelope every request handler returns.

use cwksocial_common::model::{
    auth::TokenError,
    identity::{InvalidPasswordError, InvalidUsernameError, PasswordHashError},
    post::InvalidTextContentError,
    user_profile::InvalidBasicInfoError,
};
use cwksocial_db::store::DbError;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use thiserror::Error;
use tracing::error;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
pub enum ErrorCode {
    NotFound,
    ServerError,
    ValidationError,
    IdentityUserAlreadyExists,
    IdentityUserDoesNotExist,
    IncorrectPassword,
    UnauthorizedAccountRemoval,
    ProfileModificationNotAllowed,
    PostUpdateNotPossible,
    PostDeleteNotPossible,
    InteractionRemovalNotAuthorized,
    UnknownError,
}

impl ErrorCode {
    #[must_use]
    pub fn code(self) -> u16 {
        match self {
            ErrorCode::NotFound => 404,
            ErrorCode::ServerError => 500,
            ErrorCode::ValidationError => 101,
            ErrorCode::IdentityUserAlreadyExists => 201,
            ErrorCode::IdentityUserDoesNotExist => 203,
            ErrorCode::IncorrectPassword => 204,
            ErrorCode::UnauthorizedAccountRemoval => 205,
            ErrorCode::ProfileModificationNotAllowed => 206,
            ErrorCode::PostUpdateNotPossible => 300,
            ErrorCode::PostDeleteNotPossible => 301,
            ErrorCode::InteractionRemovalNotAuthorized => 302,
            ErrorCode::UnknownError => 999,
        }
    }

    /// Whether the error means the addressed resource does not exist.
    #[must_use]
    pub fn is_not_found(self) -> bool {
        matches!(self, ErrorCode::NotFound | ErrorCode::IdentityUserDoesNotExist)
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize, Error)]
#[error("{code:?} ({}): {message}", .code.code())]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn validation(err: impl Display) -> Self {
        Self::new(ErrorCode::ValidationError, err.to_string())
    }

    fn server(err: &dyn std::error::Error) -> Self {
        error!(error = %err, "Request handler failed unexpectedly");
        Self::new(
            ErrorCode::ServerError,
            "The request could not be completed because of a server error",
        )
    }
}

impl From<DbError> for Error {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UsernameTaken(username) => Error::new(
                ErrorCode::IdentityUserAlreadyExists,
                format!("Provided username {username} is already taken"),
            ),
            err => Error::server(&err),
        }
    }
}

impl From<PasswordHashError> for Error {
    fn from(err: PasswordHashError) -> Self {
        Error::server(&err)
    }
}

impl From<TokenError> for Error {
    fn from(err: TokenError) -> Self {
        Error::server(&err)
    }
}

macro_rules! validation_errors {
    ($($error:ty),* $(,)?) => {
        $(
            impl From<$error> for Error {
                fn from(err: $error) -> Self {
                    Error::validation(err)
                }
            }
        )*
    };
}

validation_errors!(
    InvalidUsernameError,
    InvalidPasswordError,
    InvalidBasicInfoError,
    InvalidTextContentError,
);

/// All errors of a failed operation, in the order they were added.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
#[error("Operation failed: {}", DisplayErrors(.errors))]
pub struct OperationFailure {
    pub errors: Vec<Error>,
}

struct DisplayErrors<'a>(&'a [Error]);

impl Display for DisplayErrors<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, error) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            Display::fmt(error, f)?;
        }
        Ok(())
    }
}

/// Payload or errors of a handled request.
///
/// Whether the result is an error is derived from the error list, so adding an
/// error is all it takes to fail an operation.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct OperationResult<T> {
    payload: Option<T>,
    errors: Vec<Error>,
}

impl<T> OperationResult<T> {
    #[must_use]
    pub fn success(payload: T) -> Self {
        Self {
            payload: Some(payload),
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn failure(error: Error) -> Self {
        Self {
            payload: None,
            errors: vec![error],
        }
    }

    pub fn add_error(&mut self, code: ErrorCode, message: impl Into<String>) {
        self.errors.push(Error::new(code, message));
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    #[must_use]
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn into_result(self) -> Result<T, OperationFailure> {
        match self.payload {
            Some(payload) if self.errors.is_empty() => Ok(payload),
            _ if self.errors.is_empty() => Err(OperationFailure {
                errors: vec![Error::new(
                    ErrorCode::UnknownError,
                    "The operation produced neither a result nor an error",
                )],
            }),
            _ => Err(OperationFailure {
                errors: self.errors,
            }),
        }
    }
}

impl<T> From<Result<T, Error>> for OperationResult<T> {
    fn from(value: Result<T, Error>) -> Self {
        match value {
            Ok(payload) => Self::success(payload),
            Err(error) => Self::failure(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::operation::{Error, ErrorCode, OperationResult};
    use cwksocial_db::store::DbError;

    #[test]
    fn adding_an_error_marks_the_result_as_failed() {
        let mut result = OperationResult::success(5);
        assert!(!result.is_error());
        assert_eq!(result.payload(), Some(&5));

        result.add_error(ErrorCode::ValidationError, "first");
        result.add_error(ErrorCode::NotFound, "second");

        assert!(result.is_error());
        let failure = result.into_result().unwrap_err();
        let codes: Vec<_> = failure.errors.iter().map(|error| error.code).collect();
        assert_eq!(codes, [ErrorCode::ValidationError, ErrorCode::NotFound]);
        assert_eq!(
            failure.to_string(),
            "Operation failed: ValidationError (101): first; NotFound (404): second"
        );
    }

    #[test]
    fn converts_from_result() {
        let ok: OperationResult<u8> = Ok(1).into();
        assert_eq!(ok.into_result(), Ok(1));

        let failed: OperationResult<u8> = Err(Error::not_found("gone")).into();
        assert!(failed.is_error());
        assert_eq!(failed.errors(), [Error::not_found("gone")]);
    }

    #[test]
    fn store_errors_hide_their_details() {
        let error = Error::from(DbError::Sqlx(sqlx_error()));
        assert_eq!(error.code, ErrorCode::ServerError);
        assert!(!error.message.contains("pool"));

        let taken = Error::from(DbError::UsernameTaken("jane@example.com".to_owned()));
        assert_eq!(taken.code, ErrorCode::IdentityUserAlreadyExists);
    }

    fn sqlx_error() -> cwksocial_db::store::SqlxError {
        cwksocial_db::store::SqlxError::PoolTimedOut
    }
}
