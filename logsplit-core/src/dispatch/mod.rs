//! The trigger dispatcher.
//!
//! A [`Dispatcher`] registers as a consumer of the source log, pulls
//! delivered entries in windows, decodes them and runs the fan-out for each.
//!
//! Lifecycle:
//!
//! ```text
//! Unregistered --register--> Registered --poll--> Running --> Registered
//!       |                        |
//!       +------ bad config / subscribe failure ------> Failed (terminal)
//! ```
//!
//! Per-entry problems never end the subscription. Undecodable entries are
//! logged and acknowledged. Entries whose fan-out fails stay pending in the
//! source and are retried through its redelivery, see [`Dispatcher::poll`].

mod dispatcher;
mod error;
mod outcome;
mod settings;

#[cfg(test)]
mod tests;

pub use dispatcher::{Dispatcher, DispatcherState};
pub use error::{DispatchError, RegisterError};
pub use outcome::{BatchReport, EventOutcome};
pub use settings::DispatchSettings;
