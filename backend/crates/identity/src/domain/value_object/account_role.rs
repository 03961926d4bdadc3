use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role.
///
/// `is_admin` is a separate flag on the account, independent of the role;
/// an admin row still carries one of these role values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccountRole {
    #[default]
    Patient,
    Doctor,
    Admin,
}

impl AccountRole {
    #[inline]
    pub const fn code(&self) -> &'static str {
        use AccountRole::*;
        match self {
            Patient => "patient",
            Doctor => "doctor",
            Admin => "admin",
        }
    }

    #[inline]
    pub const fn is_doctor(&self) -> bool {
        matches!(self, AccountRole::Doctor)
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        use AccountRole::*;
        match code {
            "patient" => Some(Patient),
            "doctor" => Some(Doctor),
            "admin" => Some(Admin),
            _ => None,
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_code() {
        assert_eq!(AccountRole::from_code("patient"), Some(AccountRole::Patient));
        assert_eq!(AccountRole::from_code("doctor"), Some(AccountRole::Doctor));
        assert_eq!(AccountRole::from_code("admin"), Some(AccountRole::Admin));
        assert_eq!(AccountRole::from_code("nurse"), None);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(AccountRole::Patient.to_string(), "patient");
        assert_eq!(AccountRole::Doctor.to_string(), "doctor");
        assert_eq!(AccountRole::Admin.to_string(), "admin");
    }

    #[test]
    fn test_default_is_patient() {
        assert_eq!(AccountRole::default(), AccountRole::Patient);
    }

    #[test]
    fn test_is_doctor() {
        assert!(!AccountRole::Patient.is_doctor());
        assert!(AccountRole::Doctor.is_doctor());
        assert!(!AccountRole::Admin.is_doctor());
    }
}
