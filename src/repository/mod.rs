//! Repository Layer
//!
//! Remote collection abstractions and the two deployment backends.

mod error_body;
mod http;
mod local;
mod traits;

pub use error_body::{failure_message, strip_markup};
pub use http::{HttpBackend, HttpCollection};
pub use local::{seed_data, LocalBackend, LocalCollection};
pub use traits::{CatalogBackend, Repository};
