//! Identifier and timestamp generation.
//!
//! Both storage backends and the notes service assign ids and timestamps
//! through this trait so tests can inject a deterministic provider.

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub trait IdentityProvider: Send + Sync {
    /// Globally-unique opaque string identifier
    fn new_id(&self) -> String;

    /// Current instant, UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Production provider: random UUID v4 + system clock
pub struct SystemIdentity;

impl IdentityProvider for SystemIdentity {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
