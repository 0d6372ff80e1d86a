use thiserror::Error;

// Failure taxonomy for the percolation model. None of these are recovered
// locally; each aborts the current load/save/solve and surfaces to the caller.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("data set '{0}' not found")]
    NotFound(String),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parameter {name} out of range: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("numerical divergence at t = {t}: {message}")]
    Divergence { t: f64, message: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
