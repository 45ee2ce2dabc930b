use serde::Deserialize;
use uuid::Uuid;

use crate::sessions::repo::SessionStatus;

/// Request body for booking a session against a skill. The first
/// preferred slot is mandatory; slots two and three are optional but
/// must be complete date/time pairs when given.
#[derive(Debug, Deserialize)]
pub struct RequestSessionBody {
    pub skill_id: Uuid,
    pub preferred_date1: String,
    pub preferred_time1: String,
    pub preferred_date2: Option<String>,
    pub preferred_time2: Option<String>,
    pub preferred_date3: Option<String>,
    pub preferred_time3: Option<String>,
}

/// Which side of the session list to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionRole {
    #[serde(alias = "requested", alias = "learner")]
    Requester,
    #[serde(alias = "teaching", alias = "teacher")]
    Provider,
}

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: SessionRole,
}

/// Body of the status-decision endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateBody {
    pub status: SessionStatus,
}
