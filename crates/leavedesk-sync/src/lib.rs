//! Input-supplier glue: pulls employee profiles and leave records from the
//! institute's Django backend so the balance engine has something to chew on.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{ApiClient, SyncError};
