//! Completed-action events
//!
//! Every state-changing action publishes an [`ActionEvent`] on the
//! [`EventBus`] (a `tokio::sync::broadcast` channel). The synchronizer
//! reacts to the same events in-line; bus subscribers only observe.

mod bus;
mod types;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus};
pub use types::ActionEvent;
