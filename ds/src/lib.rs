//! DocStore - keyed JSON document persistence
//!
//! Each record type lives in its own collection and is stored as a JSON
//! document keyed by `(collection, id)` in a single SQLite database.
//!
//! # Example
//!
//! ```ignore
//! use docstore::{Record, Store};
//!
//! let mut store = Store::open(".docstore")?;
//! store.create(progression)?;
//! let loaded: Option<Progression> = store.get("019a3f-progression-blues")?;
//! ```

mod record;
mod store;

pub use record::{Record, now_ms};
pub use store::{DB_FILE, Store};
