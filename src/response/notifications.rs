use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Unread notification counts, keyed by notification type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notifications {
    /// Counts keyed by notification type, e.g. `"4"` for comments.
    pub notifications: HashMap<String, u32>,
}

impl Notifications {
    /// The total number of unread notifications.
    pub fn total(&self) -> u32 {
        self.notifications.values().sum()
    }
}
