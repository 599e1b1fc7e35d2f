use thiserror::Error;

pub type Result<T> = std::result::Result<T, SourceError>;

/// Failures at the CMS boundary. None of these escape the service: each one
/// degrades the affected sub-query to "no records".
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("CMS responded with status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl SourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound(_) | SourceError::Status { status: 404, .. })
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Malformed(err.to_string())
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Malformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_404_counts_as_not_found() {
        let err = SourceError::Status { status: 404, url: "http://cms/x".into() };
        assert!(err.is_not_found());
        let err = SourceError::Status { status: 500, url: "http://cms/x".into() };
        assert!(!err.is_not_found());
    }

    #[test]
    fn json_errors_map_to_malformed() {
        let err: SourceError = serde_json::from_str::<Vec<u8>>("{").unwrap_err().into();
        assert!(matches!(err, SourceError::Malformed(_)));
    }
}
