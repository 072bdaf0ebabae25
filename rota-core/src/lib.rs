pub mod clock;
pub mod config;
pub mod db;
pub mod errors;
pub mod logging;
pub mod models;
pub mod session;
pub mod store;
pub mod timer;

#[cfg(feature = "uniffi")]
mod runtime;

#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();
#[cfg(feature = "uniffi")]
pub mod uniffi_interface;

pub use errors::SessionError;
pub use session::{SessionObserver, WorkoutSessionManager};
