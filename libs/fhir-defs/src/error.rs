//! Error types for definition loading and lookup

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unresolvable content reference '{reference}' in {structure}")]
    UnresolvableContentReference { structure: String, reference: String },
}

pub type Result<T> = std::result::Result<T, Error>;
