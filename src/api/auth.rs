use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

use crate::services::RequestContext;

/// Header the fronting auth layer uses to convey the session username.
pub const SESSION_HEADER: &str = "x-session-username";

/// Opaque view of the session collaborator: the resolved username, if any.
///
/// The core never inspects session internals; everything it learns about
/// the caller arrives through this extractor, and handlers turn it into a
/// `RequestContext` for the service layer.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<String>);

impl CurrentUser {
    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.0.clone())
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Infallible> {
        let username = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        Ok(CurrentUser(username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> CurrentUser {
        let (mut parts, _) = request.into_parts();
        CurrentUser::from_request_parts(&mut parts, &())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn header_yields_username() {
        let request = Request::builder()
            .header(SESSION_HEADER, " asha ")
            .body(())
            .unwrap();
        let user = extract(request).await;
        assert_eq!(user.0.as_deref(), Some("asha"));
        assert_eq!(user.context().username(), Some("asha"));
    }

    #[tokio::test]
    async fn missing_or_blank_header_is_anonymous() {
        let request = Request::builder().body(()).unwrap();
        assert!(extract(request).await.0.is_none());

        let request = Request::builder()
            .header(SESSION_HEADER, "   ")
            .body(())
            .unwrap();
        assert!(extract(request).await.0.is_none());
    }
}
