//! Types shared by the database connectors

mod error;

pub use error::{DatabaseError, DatabaseResult};
