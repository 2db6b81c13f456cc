//! Error kinds surfaced by the writer (spec §7).
//!
//! Every public writer call returns a `Result<_, IonWriterError>`. Nothing
//! is swallowed and nothing is retried inside the core: on failure the
//! caller should abandon the writer, since partial bytes may already have
//! reached the sink.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IonWriterError {
    #[error("writer handle is null")]
    BadHandle,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid writer state: {0}")]
    InvalidState(String),

    #[error("out of memory allocating scratch buffer")]
    NoMemory,

    #[error("sink wrote fewer bytes than requested")]
    WriteError,

    #[error("invalid unicode sequence: {0}")]
    InvalidUnicodeSequence(String),

    #[error("floating point classification returned an unknown class")]
    UnrecognizedFloat,
}

pub type IonWriterResult<T> = Result<T, IonWriterError>;
