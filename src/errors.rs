//! # Query errors
//!
//! Filter construction never fails: incomparable ranges and unknown suffixes are dropped,
//! and values that match no type fall back to text. The two failures a caller can see are
//! an invalid pagination marker, rejected before storage is touched, and an error coming
//! back from the storage executor.
//!
//! Storage errors are wrapped untouched and logged when turned into a response; the
//! client only ever sees a generic message.
//!
//! ```rust,ignore
//! async fn list(RawQuery(query): RawQuery) -> Result<Json<MarkerPage<Row>>, QueryError> {
//!     let params = QueryParams::parse(query.as_deref().unwrap_or_default());
//!     let direction: Direction = params.get("page").unwrap_or("first").parse()?;
//!     let marker = Marker::new("_id", boundary, direction);
//!     let page = marker.list_async(&store, &ByKey, &Filter::empty(), 20).await?;
//!     Ok(Json(page))
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::error::Error;
use std::fmt;

/// Boxed error returned by a storage executor.
pub type StorageError = Box<dyn Error + Send + Sync + 'static>;

#[derive(Debug)]
pub enum QueryError {
    /// 400 Bad Request - the marker cannot drive a query
    InvalidMarker {
        /// User-facing reason
        message: String,
    },

    /// 500 Internal Server Error - the executor failed (details logged, not exposed)
    Storage {
        /// User-facing generic message
        message: String,
        /// Executor error
        internal: StorageError,
    },
}

impl QueryError {
    // ============================================================================
    // Constructors
    // ============================================================================

    /// Create an invalid marker error
    ///
    /// # Example
    /// ```rust,ignore
    /// return Err(QueryError::invalid_marker("marker's field can't be empty"));
    /// ```
    pub fn invalid_marker(message: impl Into<String>) -> Self {
        Self::InvalidMarker {
            message: message.into(),
        }
    }

    /// Wrap an executor error
    ///
    /// # Example
    /// ```rust,ignore
    /// let rows = executor.execute(&filter, &sort, limit).map_err(QueryError::storage)?;
    /// ```
    pub fn storage(err: impl Into<StorageError>) -> Self {
        Self::Storage {
            message: "A storage error occurred".to_string(),
            internal: err.into(),
        }
    }

    #[must_use]
    pub const fn is_invalid_marker(&self) -> bool {
        matches!(self, Self::InvalidMarker { .. })
    }

    // ============================================================================
    // Internal methods
    // ============================================================================

    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidMarker { .. } => StatusCode::BAD_REQUEST,
            Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// User-facing message (sanitized)
    fn user_message(&self) -> &str {
        match self {
            Self::InvalidMarker { message } | Self::Storage { message, .. } => message,
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Storage { internal, .. } => {
                tracing::error!(error = %internal, "Storage error occurred");
            }
            Self::InvalidMarker { message } => {
                tracing::debug!(
                    error = %message,
                    status = %self.status_code(),
                    "Rejected pagination marker"
                );
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.user_message(),
        });
        (status, body).into_response()
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMarker { message } => f.write_str(message),
            Self::Storage { message, internal } => write!(f, "{message}: {internal}"),
        }
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage { internal, .. } => Some(internal.as_ref()),
            Self::InvalidMarker { .. } => None,
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

/// Any `SeaORM` error raised by a SQL-backed executor is a storage failure.
impl From<DbErr> for QueryError {
    fn from(err: DbErr) -> Self {
        Self::storage(err)
    }
}
