use crossguard_session::SessionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsrfError {
    #[error("CSRF secret must not be empty")]
    MissingSecret,

    #[error("No CSRF salt established for this session")]
    MissingSalt,

    #[error("CSRF token mismatch")]
    TokenMismatch,

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

pub type Result<T> = std::result::Result<T, CsrfError>;

impl From<CsrfError> for crossguard_core::Error {
    fn from(err: CsrfError) -> Self {
        match err {
            CsrfError::MissingSalt | CsrfError::TokenMismatch => {
                crossguard_core::Error::Forbidden(err.to_string())
            }
            CsrfError::Session(e) => crossguard_core::Error::Session(e.to_string()),
            CsrfError::MissingSecret => crossguard_core::Error::Internal(err.to_string()),
        }
    }
}
