//! Conversions from external infrastructure errors into domain errors.

use presencesync_domain::PresenceSyncError;
use reqwest::Error as HttpError;
use reqwest::StatusCode;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PresenceSyncError);

impl From<InfraError> for PresenceSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PresenceSyncError> for InfraError {
    fn from(value: PresenceSyncError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoPresenceSyncError {
    fn into_presencesync(self) -> PresenceSyncError;
}

/// Map a non-success HTTP status returned by a remote API.
///
/// `context` names the call, `body` is the (possibly truncated) response body.
pub fn status_error(context: &str, status: StatusCode, body: &str) -> PresenceSyncError {
    let reason = status.canonical_reason().unwrap_or("unknown status");
    let detail = body.trim();
    let message = if detail.is_empty() {
        format!("{context}: HTTP {} {reason}", status.as_u16())
    } else {
        format!("{context}: HTTP {} {reason}: {}", status.as_u16(), truncate(detail, 512))
    };

    match status.as_u16() {
        401 | 403 => PresenceSyncError::Auth(message),
        404 => PresenceSyncError::NotFound(message),
        408 | 429 | 500..=599 => PresenceSyncError::RemoteUnavailable(message),
        400..=499 => PresenceSyncError::InvalidInput(message),
        _ => PresenceSyncError::Network(message),
    }
}

fn truncate(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → PresenceSyncError */
/* -------------------------------------------------------------------------- */

impl IntoPresenceSyncError for SqlError {
    fn into_presencesync(self) -> PresenceSyncError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        PresenceSyncError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        PresenceSyncError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067 | 1555) => {
                        PresenceSyncError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::CannotOpen, _) => {
                        PresenceSyncError::Database(format!("unable to open database: {message}"))
                    }
                    _ => PresenceSyncError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                PresenceSyncError::NotFound("no rows returned by query".into())
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                PresenceSyncError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                PresenceSyncError::Database(format!("invalid column type for {name}: {ty}"))
            }
            RE::InvalidPath(path) => PresenceSyncError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => PresenceSyncError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_presencesync())
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(PresenceSyncError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → PresenceSyncError */
/* -------------------------------------------------------------------------- */

impl IntoPresenceSyncError for HttpError {
    fn into_presencesync(self) -> PresenceSyncError {
        if self.is_timeout() {
            return PresenceSyncError::RemoteUnavailable("HTTP request timed out".into());
        }

        if self.is_connect() {
            return PresenceSyncError::RemoteUnavailable("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            return status_error("request failed", status, "");
        }

        if self.is_decode() {
            return PresenceSyncError::Network(format!("invalid response body: {self}"));
        }

        PresenceSyncError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_presencesync())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
