pub mod errors;
pub mod logging;
pub mod objects;
pub mod session;

pub use errors::RotaError;
pub use session::{WorkoutSessionHandle, open_workout_session};
