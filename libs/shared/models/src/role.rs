use serde::{Deserialize, Serialize};
use std::fmt;

/// Application role stored on each user directory record.
///
/// Role checks always run against a freshly fetched directory record, never
/// against the token claim, so a role change takes effect on the next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Writer,
    Medical,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Writer => "writer",
            UserRole::Medical => "medical",
            UserRole::Admin => "admin",
        }
    }

    /// Base role that has not been elevated yet; the only role allowed to
    /// submit a role application.
    pub fn is_base(&self) -> bool {
        matches!(self, UserRole::User)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
