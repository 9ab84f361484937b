pub mod booking;
pub mod catalog;
pub mod error;
pub mod fare;
pub mod notify;
pub mod pnr;
pub mod reports;
pub mod routes;
pub mod search;

pub use error::{BookingError, SearchError};

/// Per-request capability object carrying the authenticated identity.
///
/// The session layer is an external collaborator; the core only ever sees
/// the resolved username (or its absence) through this context, and each
/// operation decides authorization exactly once via `require_user`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    username: Option<String>,
}

impl RequestContext {
    pub fn new(username: Option<String>) -> Self {
        Self { username }
    }

    pub fn anonymous() -> Self {
        Self { username: None }
    }

    /// Username of the authenticated caller, or `Unauthorized`.
    pub fn require_user(&self) -> Result<&str, BookingError> {
        self.username.as_deref().ok_or(BookingError::Unauthorized)
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_context_is_unauthorized() {
        let err = RequestContext::anonymous().require_user().unwrap_err();
        assert!(matches!(err, BookingError::Unauthorized));
    }

    #[test]
    fn context_yields_username() {
        let ctx = RequestContext::new(Some("asha".into()));
        assert_eq!(ctx.require_user().unwrap(), "asha");
        assert_eq!(ctx.username(), Some("asha"));
    }
}
