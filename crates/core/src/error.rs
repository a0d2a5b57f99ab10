#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid backend URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("malformed backend response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("backend rejected range [{from}, {to}]: status {status}")]
    RangeRejected { from: usize, to: usize, status: u16 },

    #[error("lookup query failed: status {status}")]
    LookupRejected { status: u16 },

    #[error("signing rejected for {path}: status {status}")]
    SignRejected { path: String, status: u16 },

    #[error("signing response carried no signed URL")]
    MissingSignedUrl,

    #[error("entry not found: {0}")]
    EntryNotFound(i64),
}

pub type Result<T> = std::result::Result<T, Error>;
