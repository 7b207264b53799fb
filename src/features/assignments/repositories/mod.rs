mod pg_office_roster;

pub use pg_office_roster::PgOfficeRoster;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::auth::Role;

/// Directory of the operators working for an office
#[async_trait]
pub trait OfficeRoster: Send + Sync {
    /// Pick the operator of `role` in the office with the fewest open assignments,
    /// lowest id first on ties. `None` when the office has nobody in that role.
    async fn pick_candidate(&self, office_id: i64, role: Role) -> Result<Option<i64>>;
}
