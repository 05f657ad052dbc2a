//! User data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::Authenticatable;

/// User role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular user.
    #[default]
    User,
    /// Administrator.
    Admin,
}

impl Role {
    /// Authority name granted by this role.
    pub fn authority(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("unknown role: {}", s)),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// User entity from the identity store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub firstname: String,
    pub lastname: String,
    pub country: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub is_active: bool,
    pub created_at: String,
}

impl Authenticatable for User {
    fn username(&self) -> &str {
        &self.username
    }

    fn authorities(&self) -> Vec<String> {
        vec![self.role.authority().to_string()]
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Login input. Never persisted.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Request to register a new user.
#[derive(Clone, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub country: String,
    /// Defaults to [`Role::User`].
    #[serde(default)]
    pub role: Option<Role>,
}

impl std::fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("username", &self.username)
            .field("firstname", &self.firstname)
            .field("lastname", &self.lastname)
            .field("country", &self.country)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// A validated registration with the password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub firstname: String,
    pub lastname: String,
    pub country: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: Role) -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            firstname: "A".to_string(),
            lastname: "B".to_string(),
            country: "US".to_string(),
            role,
            is_active: true,
            created_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_authority() {
        assert_eq!(Role::User.authority(), "USER");
        assert_eq!(Role::Admin.authority(), "ADMIN");
    }

    #[test]
    fn test_user_is_authenticatable() {
        let user = sample_user(Role::Admin);
        assert_eq!(Authenticatable::username(&user), "alice");
        assert_eq!(user.authorities(), vec!["ADMIN".to_string()]);
        assert!(Authenticatable::is_active(&user));
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let json = serde_json::to_value(sample_user(Role::User)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn test_registration_request_role_defaults_to_none() {
        let request: RegistrationRequest = serde_json::from_str(
            r#"{"username":"alice","password":"pw123","firstname":"A","lastname":"B","country":"US"}"#,
        )
        .unwrap();
        assert!(request.role.is_none());
        assert!(!format!("{request:?}").contains("pw123"));
    }
}
