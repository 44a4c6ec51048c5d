use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Row of the `users` table. `password` holds an Argon2 PHC string, never plaintext.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub address: String,
}

// ── Request payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterUser {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub password: Option<String>,
}

/// Registration payload with every field present and non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub address: String,
    pub password: String,
}

impl RegisterUser {
    pub fn validate(self) -> AppResult<NewUser> {
        fn present(value: Option<String>) -> AppResult<String> {
            value
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::BadRequest("All fields are required".to_string()))
        }

        Ok(NewUser {
            name: present(self.name)?,
            username: present(self.username)?,
            email: present(self.email)?,
            address: present(self.address)?,
            password: present(self.password)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> RegisterUser {
        RegisterUser {
            name: Some("Ada".into()),
            username: Some("ada".into()),
            email: Some("ada@example.com".into()),
            address: Some("1 Engine Way".into()),
            password: Some("difference".into()),
        }
    }

    #[test]
    fn validate_accepts_complete_payload() {
        let user = full().validate().unwrap();
        assert_eq!(user.username, "ada");
        assert_eq!(user.password, "difference");
    }

    #[test]
    fn validate_rejects_missing_or_blank_field() {
        let mut missing = full();
        missing.address = None;
        assert!(matches!(missing.validate(), Err(AppError::BadRequest(_))));

        let mut blank = full();
        blank.email = Some("   ".into());
        assert!(matches!(blank.validate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn register_payload_tolerates_absent_keys() {
        let parsed: RegisterUser = serde_json::from_str(r#"{"username":"ada"}"#).unwrap();
        assert_eq!(parsed.username.as_deref(), Some("ada"));
        assert!(parsed.email.is_none());
    }
}
