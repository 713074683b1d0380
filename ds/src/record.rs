//! Record trait implemented by every stored document type

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A document that can be persisted in a [`Store`](crate::Store)
pub trait Record: Serialize + DeserializeOwned + Clone + Send + 'static {
    /// Unique identifier within the collection
    fn id(&self) -> &str;

    /// Last modification time (unix ms)
    fn updated_at(&self) -> i64;

    /// Collection (table namespace) this record type is stored under
    fn collection_name() -> &'static str;
}

/// Current time in unix milliseconds
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_is_monotonic_enough() {
        let a = now_ms();
        let b = now_ms();
        assert!(a > 0);
        assert!(b >= a);
    }
}
