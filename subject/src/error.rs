#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("observer is not attached to a subject")]
    Detached,
    #[error("observer is already registered with this subject")]
    AlreadyRegistered,
}
