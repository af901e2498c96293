//! Application Error Types
//!
//! Failures while setting up the share and the snapshot cache. Operation
//! errors come from the catalog crate itself.

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load the configuration")]
    Config,
    #[display("could not set up the share")]
    Share,
    #[display("could not open the snapshot cache")]
    Cache,
}
