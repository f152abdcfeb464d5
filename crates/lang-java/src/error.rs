use semgraph_core::GraphError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// The front end's contract guarantees the presence of a symbol or type;
    /// a miss means the feed is inconsistent and the run cannot continue.
    #[error("oracle consistency violation: {0}")]
    Oracle(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed oracle feed: {0}")]
    Feed(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BuildError>;
