//! Engine configuration.
//!
//! Every collaborator receives its configuration through constructor
//! parameters; nothing reads the process environment. Defaults mirror the
//! production deployment.

use std::time::Duration;

/// Canonical life-area names recognized from source labels.
pub const DEFAULT_AREA_NAMES: [&str; 7] = [
    "HOME",
    "HEALTH",
    "PROSPER",
    "WORK",
    "PERSONAL & FAMILY",
    "FINANCIAL",
    "FUN",
];

/// Tunable options for the synchronization engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Tag gating which source items are mirrored.
    pub eligibility_tag: String,
    /// Ordered set of recognized area canonical names.
    pub area_names: Vec<String>,
    /// Items in the source Inbox project are ineligible when `true`.
    pub skip_inbox: bool,
    /// Recurring items are ineligible when `true`.
    pub skip_recurring: bool,
    /// The engine may attach the eligibility tag to qualifying items.
    pub auto_label: bool,
    /// Destination URLs are appended to the source description on first
    /// sync.
    pub add_backlink: bool,
    /// Cron cadence consumed by the external scheduler that triggers
    /// reconciliation; the engine stores it for operator inspection only.
    pub reconcile_schedule: String,
    /// Number of concurrent worker tasks.
    pub worker_concurrency: usize,
    /// Attempt ceiling for retryable remote failures.
    pub retry_max: u32,
    /// Base delay for the exponential retry backoff.
    pub retry_base_delay: Duration,
    /// Timezone name used to interpret naive due times.
    pub default_timezone: String,
    /// Namespace prefix for persisted state keys, allowing multi-environment
    /// coexistence in one store.
    pub namespace: String,
    /// Maximum characters per destination body block before truncation.
    pub block_char_limit: usize,
}

impl SyncConfig {
    /// Returns the person-label form of the eligibility tag (`@` prefix),
    /// which must never be treated as a person name.
    #[must_use]
    pub fn eligibility_person_label(&self) -> String {
        format!("@{}", self.eligibility_tag)
    }

    /// Builds the retry policy from the configured ceiling and base delay.
    #[must_use]
    pub const fn retry_policy(&self) -> crate::remote::RetryPolicy {
        crate::remote::RetryPolicy::new(self.retry_max, self.retry_base_delay)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            eligibility_tag: "capsync".to_owned(),
            area_names: DEFAULT_AREA_NAMES.iter().map(|&s| s.to_owned()).collect(),
            skip_inbox: true,
            skip_recurring: true,
            auto_label: true,
            add_backlink: true,
            reconcile_schedule: "0 */2 * * *".to_owned(),
            worker_concurrency: 8,
            retry_max: 5,
            retry_base_delay: Duration::from_millis(250),
            default_timezone: "UTC".to_owned(),
            namespace: "todoist-notion-v1".to_owned(),
            block_char_limit: 2000,
        }
    }
}
