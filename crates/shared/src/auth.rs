//! Authentication types for bearer tokens.
//!
//! Stayra does not manage users or passwords. The property host system
//! issues JWTs with a shared secret; these claims are what it encodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (staff ID in the host system).
    pub sub: Uuid,
    /// Staff display name.
    pub name: String,
    /// Staff role (e.g. "cashier", "manager").
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a staff member.
    #[must_use]
    pub fn new(staff_id: Uuid, name: &str, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: staff_id,
            name: name.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the staff ID from claims.
    #[must_use]
    pub const fn staff_id(&self) -> Uuid {
        self.sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_new_sets_fields() {
        let staff_id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::hours(1);

        let claims = Claims::new(staff_id, "Rina", "cashier", expires_at);

        assert_eq!(claims.sub, staff_id);
        assert_eq!(claims.staff_id(), staff_id);
        assert_eq!(claims.name, "Rina");
        assert_eq!(claims.role, "cashier");
        assert_eq!(claims.exp, expires_at.timestamp());
        assert!(claims.iat <= claims.exp);
    }
}
