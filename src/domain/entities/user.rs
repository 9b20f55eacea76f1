//! Users, their permissions and browser sessions.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// A named capability that can be granted to a user.
///
/// Codenames follow the `catalog.<action>` convention and are what gets
/// stored in `user_permissions.codename`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    CanMarkReturned,
    AddAuthor,
    ChangeAuthor,
    DeleteAuthor,
    AddBook,
    ChangeBook,
    DeleteBook,
}

impl Permission {
    pub const ALL: [Permission; 7] = [
        Permission::CanMarkReturned,
        Permission::AddAuthor,
        Permission::ChangeAuthor,
        Permission::DeleteAuthor,
        Permission::AddBook,
        Permission::ChangeBook,
        Permission::DeleteBook,
    ];

    pub fn codename(self) -> &'static str {
        match self {
            Permission::CanMarkReturned => "catalog.can_mark_returned",
            Permission::AddAuthor => "catalog.add_author",
            Permission::ChangeAuthor => "catalog.change_author",
            Permission::DeleteAuthor => "catalog.delete_author",
            Permission::AddBook => "catalog.add_book",
            Permission::ChangeBook => "catalog.change_book",
            Permission::DeleteBook => "catalog.delete_book",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codename())
    }
}

impl FromStr for Permission {
    type Err = String;

    /// Accepts the full codename or the part after `catalog.`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Permission::ALL
            .into_iter()
            .find(|p| {
                let codename = p.codename();
                codename == name || codename.strip_prefix("catalog.") == Some(name)
            })
            .ok_or_else(|| format!("unknown permission '{name}'"))
    }
}

/// A registered user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
    pub permissions: Vec<Permission>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// Server-side state for one browser.
///
/// Anonymous visitors get a session too; `user_id` is filled in on login.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: i64,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub permissions: Vec<Permission>,
    pub num_visits: i64,
    pub csrf_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Anonymous sessions live only in memory until a page needs them stored.
    pub fn is_stored(&self) -> bool {
        self.id != 0
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.is_authenticated() && self.permissions.contains(&permission)
    }

    /// Librarians see the staff section of the navigation.
    pub fn is_librarian(&self) -> bool {
        self.has_permission(Permission::CanMarkReturned)
    }
}

/// Input for storing a new session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub id_hash: String,
    pub user_id: Option<i64>,
    pub num_visits: i64,
    pub csrf_token: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(user_id: Option<i64>, permissions: Vec<Permission>) -> Session {
        Session {
            id: 1,
            user_id,
            username: user_id.map(|_| "reader".to_string()),
            permissions,
            num_visits: 0,
            csrf_token: "csrf".into(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[test]
    fn test_permission_parse() {
        assert_eq!(
            "catalog.can_mark_returned".parse::<Permission>().unwrap(),
            Permission::CanMarkReturned
        );
        assert_eq!(
            "add_book".parse::<Permission>().unwrap(),
            Permission::AddBook
        );
        assert!("catalog.fly".parse::<Permission>().is_err());
    }

    #[test]
    fn test_permission_codenames_unique() {
        let mut names: Vec<_> = Permission::ALL.iter().map(|p| p.codename()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Permission::ALL.len());
    }

    #[test]
    fn test_anonymous_session_has_no_permissions() {
        // Permissions on an anonymous session are ignored even if present.
        let s = session(None, vec![Permission::CanMarkReturned]);
        assert!(!s.is_authenticated());
        assert!(!s.has_permission(Permission::CanMarkReturned));
        assert!(!s.is_librarian());
    }

    #[test]
    fn test_librarian_session() {
        let s = session(Some(7), vec![Permission::CanMarkReturned]);
        assert!(s.is_authenticated());
        assert!(s.is_librarian());
        assert!(!s.has_permission(Permission::DeleteBook));
    }
}
