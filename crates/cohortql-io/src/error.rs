use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] cohortql_core::error::Error),
}

impl From<Error> for cohortql_core::error::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Core(inner) => inner,
            Error::Io(io) => cohortql_core::error::Error::Store(io.to_string()),
        }
    }
}
