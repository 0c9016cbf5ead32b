//! Authentication DTOs and result types.
//!
//! Registration and login answer with an [`AuthResult`]; role assignment
//! answers with a plain string where empty means success. Every domain
//! failure is an [`AuthFailure`] whose `Display` is the message returned to
//! the caller.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Registration request with the full profile and a plaintext password.
///
/// Profile length limits match the `users` column widths.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Alice")]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Liddell")]
    pub last_name: String,
    #[validate(length(min = 1, max = 50))]
    #[schema(example = "alice")]
    pub username: String,
    #[validate(email, length(max = 128))]
    #[schema(example = "a@x.com")]
    pub email: String,
    #[validate(length(min = 1, max = 256))]
    #[schema(example = "Pw1!")]
    pub password: String,
}

/// Login request.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    #[validate(email)]
    #[schema(example = "a@x.com")]
    pub email: String,
    #[validate(length(min = 1))]
    #[schema(example = "Pw1!")]
    pub password: String,
}

/// Role assignment request.
///
/// `user_id` stays a string: an id that does not parse is reported the same
/// way as an id that does not resolve.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddRoleRequest {
    #[validate(length(min = 1))]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[schema(example = "Admin")]
    pub role: String,
}

/// Response envelope for registration and login.
///
/// Build it with [`AuthResult::success`] or from an [`AuthFailure`]; the two
/// constructors are the only ways to get a well-formed value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub message: Option<String>,
    pub is_authenticated: bool,
    pub username: Option<String>,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub token: Option<String>,
    pub expires_on: Option<DateTime<Utc>>,
}

impl AuthResult {
    pub fn success(
        username: String,
        email: String,
        roles: Vec<String>,
        token: String,
        expires_on: DateTime<Utc>,
    ) -> Self {
        Self {
            message: None,
            is_authenticated: true,
            username: Some(username),
            email: Some(email),
            roles,
            token: Some(token),
            expires_on: Some(expires_on),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

impl From<AuthFailure> for AuthResult {
    fn from(failure: AuthFailure) -> Self {
        Self::failure(failure.to_string())
    }
}

/// Every way an authentication operation can be refused.
///
/// `InvalidCredentials` and `InvalidRoleTarget` each cover two underlying
/// conditions and render the same message for both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    DuplicateEmail,
    DuplicateUsername,
    /// Store validation errors in the order the store reported them.
    IdentityCreationRejected(Vec<String>),
    InvalidCredentials,
    InvalidRoleTarget,
    AlreadyInRole,
    RoleAssignmentFailed,
}

impl AuthFailure {
    /// Short machine-friendly label, used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateEmail => "duplicate_email",
            Self::DuplicateUsername => "duplicate_username",
            Self::IdentityCreationRejected(_) => "identity_creation_rejected",
            Self::InvalidCredentials => "invalid_credentials",
            Self::InvalidRoleTarget => "invalid_role_target",
            Self::AlreadyInRole => "already_in_role",
            Self::RoleAssignmentFailed => "role_assignment_failed",
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateEmail => f.write_str("Email Is Already Registered!"),
            Self::DuplicateUsername => f.write_str("UserName Is Already Registered!"),
            // each description is followed by a comma, including the last
            Self::IdentityCreationRejected(errors) => {
                for error in errors {
                    write!(f, "{},", error)?;
                }
                Ok(())
            }
            Self::InvalidCredentials => f.write_str("Email Or Password is incorrect"),
            Self::InvalidRoleTarget => f.write_str("Invalid User ID or Role"),
            Self::AlreadyInRole => f.write_str("User Already assigned to this role"),
            Self::RoleAssignmentFailed => f.write_str("Something went wrong"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            AuthFailure::DuplicateEmail.to_string(),
            "Email Is Already Registered!"
        );
        assert_eq!(
            AuthFailure::DuplicateUsername.to_string(),
            "UserName Is Already Registered!"
        );
        assert_eq!(
            AuthFailure::InvalidCredentials.to_string(),
            "Email Or Password is incorrect"
        );
        assert_eq!(
            AuthFailure::InvalidRoleTarget.to_string(),
            "Invalid User ID or Role"
        );
        assert_eq!(
            AuthFailure::AlreadyInRole.to_string(),
            "User Already assigned to this role"
        );
        assert_eq!(
            AuthFailure::RoleAssignmentFailed.to_string(),
            "Something went wrong"
        );
    }

    #[test]
    fn test_creation_errors_keep_order_and_duplicates() {
        let failure = AuthFailure::IdentityCreationRejected(vec![
            "too short".to_string(),
            "needs digit".to_string(),
            "too short".to_string(),
        ]);
        assert_eq!(failure.to_string(), "too short,needs digit,too short,");
    }

    #[test]
    fn test_failure_result_has_no_success_fields() {
        let result = AuthResult::from(AuthFailure::DuplicateEmail);
        assert_eq!(result.message.as_deref(), Some("Email Is Already Registered!"));
        assert!(!result.is_authenticated);
        assert!(result.username.is_none());
        assert!(result.email.is_none());
        assert!(result.roles.is_empty());
        assert!(result.token.is_none());
        assert!(result.expires_on.is_none());
    }

    #[test]
    fn test_success_result_has_no_message() {
        let result = AuthResult::success(
            "alice".to_string(),
            "a@x.com".to_string(),
            vec!["User".to_string()],
            "a.b.c".to_string(),
            Utc::now(),
        );
        assert!(result.message.is_none());
        assert!(result.is_authenticated);
        assert_eq!(result.roles, vec!["User"]);
    }

    #[test]
    fn test_auth_result_serializes_camel_case() {
        let result = AuthResult::failure("nope");
        let serialized = serde_json::to_string(&result).unwrap();
        assert!(serialized.contains(r#""isAuthenticated":false"#));
        assert!(serialized.contains(r#""expiresOn":null"#));
        assert!(serialized.contains(r#""message":"nope""#));
    }

    #[test]
    fn test_register_request_deserializes_camel_case() {
        let json = r#"{"firstName":"Alice","lastName":"Liddell","username":"alice","email":"a@x.com","password":"Pw1!"}"#;
        let request: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.first_name, "Alice");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_username_limit_matches_column_width() {
        let request = |username: String| RegisterRequest {
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            username,
            email: "a@x.com".to_string(),
            password: "Pw1!".to_string(),
        };
        assert!(request("a".repeat(50)).validate().is_ok());
        assert!(request("a".repeat(51)).validate().is_err());
    }

    #[test]
    fn test_register_request_rejects_bad_email() {
        let request = RegisterRequest {
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            username: "alice".to_string(),
            email: "not-an-email".to_string(),
            password: "Pw1!".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_register_request_rejects_long_username() {
        let request = RegisterRequest {
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            username: "a".repeat(51),
            email: "a@x.com".to_string(),
            password: "Pw1!".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_token_request_empty_password() {
        let request = TokenRequest {
            email: "a@x.com".to_string(),
            password: "".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_add_role_request_deserializes_camel_case() {
        let request: AddRoleRequest =
            serde_json::from_str(r#"{"userId":"abc","role":"Admin"}"#).unwrap();
        assert_eq!(request.user_id, "abc");
        assert_eq!(request.role, "Admin");
    }
}
