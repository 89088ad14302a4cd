pub mod usage_quota;

pub use usage_quota::{QuotaKind, UsageQuotaStore};
