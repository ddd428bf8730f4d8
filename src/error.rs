use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZepError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid role type: {0}. Must be one of: norole, system, assistant, user, function, tool")]
    InvalidRoleType(String),

    #[error("Invalid search scope: {0}. Must be one of: edges, nodes, episodes")]
    InvalidSearchScope(String),

    #[error("Invalid search type: {0}. Must be one of: similarity, mmr")]
    InvalidSearchType(String),

    #[error("Invalid episode type: {0}. Must be one of: text, json, message")]
    InvalidEpisodeType(String),

    #[error("{0}")]
    OpenAi(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ZepError {
    /// True for errors that mean the remote resource does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Api { status, .. } => *status == 404,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ZepError>;
