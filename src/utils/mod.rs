pub mod error;

pub use error::{ErrorKind, JudoError};
