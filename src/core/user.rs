use serde::{Deserialize, Serialize};

/// A team member from the users table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Chat-platform identity (the Discord ID column).
    pub external_id: String,
    pub name: String,
    pub role: String,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        external_id: impl Into<String>,
        name: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            external_id: external_id.into(),
            name: name.into(),
            role: role.into(),
        }
    }

    pub fn display_label(&self) -> String {
        if self.role.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.role)
        }
    }
}

/// Users loaded once per connection, kept in table order.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn find_by_id(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Empty ids never match, even if a row has a blank external id.
    pub fn find_by_external_id(&self, external_id: &str) -> Option<&User> {
        if external_id.is_empty() {
            return None;
        }
        self.users.iter().find(|u| u.external_id == external_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> UserDirectory {
        UserDirectory::new(vec![
            User::new("recA", "1001", "Ana", "Developer"),
            User::new("recB", "", "Bruno", "CEO"),
            User::new("recC", "1003", "Carla", "Operations"),
        ])
    }

    #[test]
    fn lookup_by_either_id() {
        let dir = directory();
        assert_eq!(dir.find_by_id("recC").map(|u| u.name.as_str()), Some("Carla"));
        assert_eq!(dir.find_by_external_id("1001").map(|u| u.id.as_str()), Some("recA"));
        assert!(dir.find_by_id("missing").is_none());
    }

    #[test]
    fn blank_external_id_never_matches() {
        let dir = directory();
        assert!(dir.find_by_external_id("").is_none());
    }

    #[test]
    fn display_label_includes_role() {
        let user = User::new("recA", "1001", "Ana", "Developer");
        assert_eq!(user.display_label(), "Ana (Developer)");
        let no_role = User::new("recZ", "9", "Zoe", "");
        assert_eq!(no_role.display_label(), "Zoe");
    }
}
