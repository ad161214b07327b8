//! Case records and the field set they carry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned surrogate key of a case.
pub type CaseId = i64;

/// The four non-key attributes of a case, as collected by an add/edit form.
///
/// An empty string means the attribute was left blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseFields {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub staff_id: String,
    #[serde(default)]
    pub email: String,
}

impl CaseFields {
    /// Build a field set from anything string-like.
    pub fn new(
        username: impl Into<String>,
        hostname: impl Into<String>,
        staff_id: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            hostname: hostname.into(),
            staff_id: staff_id.into(),
            email: email.into(),
        }
    }

    /// Value of a single attribute.
    #[must_use]
    pub fn get(&self, field: CaseField) -> &str {
        match field {
            CaseField::Username => &self.username,
            CaseField::Hostname => &self.hostname,
            CaseField::StaffId => &self.staff_id,
            CaseField::Email => &self.email,
        }
    }

    /// Mutable access to a single attribute, used by form editors.
    pub const fn get_mut(&mut self, field: CaseField) -> &mut String {
        match field {
            CaseField::Username => &mut self.username,
            CaseField::Hostname => &mut self.hostname,
            CaseField::StaffId => &mut self.staff_id,
            CaseField::Email => &mut self.email,
        }
    }
}

/// A stored case record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    #[serde(flatten)]
    pub fields: CaseFields,
}

/// Names one of the attributes of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseField {
    Username,
    Hostname,
    StaffId,
    Email,
}

impl CaseField {
    /// Every attribute, in column order.
    pub const ALL: [Self; 4] = [Self::Username, Self::Hostname, Self::StaffId, Self::Email];

    /// Column name in the `cases` table.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Hostname => "hostname",
            Self::StaffId => "staff_id",
            Self::Email => "email",
        }
    }

    /// Label shown in tables and forms.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Username => "Username",
            Self::Hostname => "Hostname",
            Self::StaffId => "Staff ID",
            Self::Email => "Email",
        }
    }
}

impl fmt::Display for CaseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_get_mut_address_the_same_attribute() {
        let mut fields = CaseFields::new("alice", "ws-01", "1042", "alice@corp.test");
        for field in CaseField::ALL {
            let before = fields.get(field).to_string();
            fields.get_mut(field).push('!');
            assert_eq!(fields.get(field), format!("{before}!"));
        }
    }

    #[test]
    fn case_serializes_flat() {
        let case = Case {
            id: 7,
            fields: CaseFields::new("bob", "", "", "bob@corp.test"),
        };
        let value = serde_json::to_value(&case).expect("serialize case");
        assert_eq!(value["id"], 7);
        assert_eq!(value["username"], "bob");
        assert_eq!(value["hostname"], "");
        assert_eq!(value["email"], "bob@corp.test");
    }
}
