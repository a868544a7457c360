use thiserror::Error;

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Malformed request body: {0}")]
    DecodeError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("Failed to render document: {0}")]
    RenderError(String),
    #[error("Failed to deliver email: {0}")]
    DispatchError(String),
    #[error("Chat notification failed: {0}")]
    ChatError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RequestError>;
