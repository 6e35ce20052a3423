use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum TransformerError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("TME request failed: {0}")]
    TmeHttp(String),

    #[error("TME returned status {status}: {message}")]
    TmeStatus { status: u16, message: String },

    #[error("failed to parse TME taxonomy: {0}")]
    TmeParse(String),

    #[error("identifier {id} derived from both {first} and {second}")]
    IdentifierCollision {
        id: String,
        first: String,
        second: String,
    },

    #[error("index has not been built yet")]
    IndexNotReady,

    #[error("index build failed: {0}")]
    IndexBuildFailed(String),

    #[error("server error: {0}")]
    Server(String),
}
