use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

/// Error taxonomy surfaced to clients as `{"message": "..."}` bodies.
///
/// Anything not in the taxonomy collapses to a generic 500; internal detail
/// (SQL errors, signing failures) stays in the logs.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    InvalidToken(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0}")]
    Validation(&'static str),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(e) = &self {
            error!(error = %e, "internal error");
        }
        let status = self.status();
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

/// `Json` whose rejection keeps the error contract: malformed or incomplete
/// bodies answer 400 with a `{"message"}` JSON body instead of axum's
/// plain-text 422.
#[derive(Debug)]
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => {
                warn!(error = %rejection, "request body rejected");
                Err(AppError::Validation("Invalid request body"))
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("User already exists")
            }
            _ => AppError::Internal(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_message(resp: Response) -> (StatusCode, String) {
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, v["message"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn invalid_credentials_is_401_with_message() {
        let (status, msg) = body_message(AppError::InvalidCredentials.into_response()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(msg, "Invalid credentials");
    }

    #[tokio::test]
    async fn forbidden_is_403() {
        let (status, msg) =
            body_message(AppError::Forbidden("Admin access required").into_response()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(msg, "Admin access required");
    }

    #[tokio::test]
    async fn conflict_is_409() {
        let (status, _) =
            body_message(AppError::Conflict("User already exists").into_response()).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[derive(Debug, serde::Deserialize)]
    struct Creds {
        username: String,
        #[allow(dead_code)]
        password: String,
    }

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn app_json_accepts_complete_body() {
        let req = json_request(r#"{"username":"alice","password":"pw1"}"#);
        let AppJson(creds) = AppJson::<Creds>::from_request(req, &())
            .await
            .expect("complete body should parse");
        assert_eq!(creds.username, "alice");
    }

    #[tokio::test]
    async fn app_json_turns_missing_field_into_400_json() {
        let req = json_request(r#"{"username":"alice"}"#);
        let err = AppJson::<Creds>::from_request(req, &()).await.unwrap_err();
        let (status, msg) = body_message(err.into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "Invalid request body");
    }

    #[tokio::test]
    async fn app_json_turns_garbage_body_into_400_json() {
        let req = json_request("not json at all");
        let err = AppJson::<Creds>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn internal_hides_detail() {
        let err = AppError::Internal(anyhow::anyhow!("connection reset by peer"));
        let (status, msg) = body_message(err.into_response()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(msg, "Internal server error");
    }
}
