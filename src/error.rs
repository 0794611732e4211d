use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    #[error("The molecule has no atoms")]
    EmptyInput,
    #[error("No chain or ring could serve as the parent structure")]
    NoParentFound,
    #[error("{0} parent orientations remain tied after every rule")]
    UnresolvedTie(usize),
    #[error("Ring {ring} is malformed: {detail}")]
    MalformedRingData { ring: usize, detail: String },
    #[error("Substituent nesting exceeded {0} levels")]
    DepthExceeded(usize),
}
