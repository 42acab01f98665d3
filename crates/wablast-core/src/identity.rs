use serde::{Deserialize, Serialize};

/// Role of the operator driving the console.
///
/// Maps to the backend's numeric `x-user-level` header. Admins see every
/// account plus the withdrawal queue; operators only their own accounts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallerRole {
    Admin,
    #[default]
    Operator,
}

impl CallerRole {
    /// Wire value for the `x-user-level` header.
    pub fn level(&self) -> &'static str {
        match self {
            Self::Admin => "1",
            Self::Operator => "2",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Identity attached to every backend call.
///
/// Sent as the `x-user-id` / `x-user-level` header pair. Always passed in
/// explicitly; nothing reads it from ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub user_id: String,
    #[serde(default)]
    pub role: CallerRole,
}

impl CallerIdentity {
    pub fn new(user_id: impl Into<String>, role: CallerRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }
}
