//! User Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum Role {
    #[serde(rename = "admin")]
    #[cfg_attr(feature = "db", sqlx(rename = "admin"))]
    Admin,
    #[serde(rename = "HR")]
    #[cfg_attr(feature = "db", sqlx(rename = "HR"))]
    Hr,
    #[serde(rename = "employee")]
    #[cfg_attr(feature = "db", sqlx(rename = "employee"))]
    Employee,
    #[serde(rename = "project manager")]
    #[cfg_attr(feature = "db", sqlx(rename = "project manager"))]
    ProjectManager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Hr => "HR",
            Role::Employee => "employee",
            Role::ProjectManager => "project manager",
        }
    }

    /// HR and admin share the back-office permissions
    pub fn is_hr_or_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Employee
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "HR" => Ok(Role::Hr),
            "employee" => Ok(Role::Employee),
            "project manager" => Ok(Role::ProjectManager),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// User account row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub verified: bool,
    #[serde(skip_serializing, default)]
    pub verification_pin_hash: Option<String>,
    #[serde(skip_serializing, default)]
    pub verification_pin_expires_at: Option<i64>,
    /// Guesses made against the current PIN
    #[serde(skip_serializing, default)]
    pub verification_pin_attempts: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Public view of the authenticated account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
}

/// Self-service registration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    /// Only `employee` may self-register
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login result; the token is also set as the `token` cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: i64,
    pub role: Role,
    pub token: String,
}

/// Asks for a password-reset PIN
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub email: String,
    pub pin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub pin: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Google sign-in with an ID token from the client library
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    #[serde(alias = "tokens")]
    pub id_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResignationRequest {
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_names() {
        assert_eq!(
            serde_json::to_string(&Role::ProjectManager).unwrap(),
            "\"project manager\""
        );
        assert_eq!(serde_json::to_string(&Role::Hr).unwrap(), "\"HR\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn role_from_str_round_trips_display() {
        for role in [Role::Admin, Role::Hr, Role::Employee, Role::ProjectManager] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("manager".parse::<Role>().is_err());
    }

    #[test]
    fn google_login_accepts_legacy_field_name() {
        let req: GoogleLoginRequest = serde_json::from_str(r#"{"tokens":"abc"}"#).unwrap();
        assert_eq!(req.id_token, "abc");
        let req: GoogleLoginRequest = serde_json::from_str(r#"{"idToken":"xyz"}"#).unwrap();
        assert_eq!(req.id_token, "xyz");
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            email: "a@b.c".into(),
            password_hash: "secret".into(),
            role: Role::Employee,
            verified: false,
            verification_pin_hash: Some("pin".into()),
            verification_pin_expires_at: Some(1),
            verification_pin_attempts: 0,
            created_at: 0,
            updated_at: 0,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("pin"));
    }
}
