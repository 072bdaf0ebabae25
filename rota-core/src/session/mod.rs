//! Workout session management.
//!
//! [`WorkoutSessionManager`] owns one in-progress workout attempt: it loads a
//! template, persists the attempt when it begins, records sets, keeps the
//! elapsed and rest clocks, and finishes or cancels the attempt. Its methods
//! are split by concern across the submodules.

mod session;
mod sets;
mod state;
mod timers;
mod workout;

#[cfg(test)]
mod tests;

pub use session::WorkoutSessionManager;
pub use state::SessionObserver;
