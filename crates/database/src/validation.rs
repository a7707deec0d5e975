//! Input validation for registration fields.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid email format.
    InvalidEmail(String),
    /// Value too short.
    TooShort { field: String, min: usize, actual: usize },
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
    /// Check-out is not after check-in.
    InvalidStay,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
            ValidationError::TooShort { field, min, actual } => {
                write!(f, "{} is too short ({} chars, min {})", field, actual, min)
            }
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::InvalidStay => write!(f, "Check-out must be after check-in"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for email addresses.
pub const MAX_EMAIL_LENGTH: usize = 120;

/// Minimum username length.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 100;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate an email address.
///
/// Accepts `local@domain.tld` where the local part uses letters, digits and
/// `._%+-`, and the top-level domain is at least two letters.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Empty("email".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LENGTH,
            actual: email.len(),
        });
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ValidationError::InvalidEmail(
            "must contain exactly one @ symbol".to_string(),
        ));
    }

    let (local, domain) = (parts[0], parts[1]);

    if local.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing local part (before @)".to_string(),
        ));
    }

    if !local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c))
    {
        return Err(ValidationError::InvalidEmail(
            "local part contains invalid characters".to_string(),
        ));
    }

    let Some((host, tld)) = domain.rsplit_once('.') else {
        return Err(ValidationError::InvalidEmail(
            "domain must contain at least one dot".to_string(),
        ));
    };

    if host.is_empty()
        || host.starts_with('.')
        || host.contains("..")
        || !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ValidationError::InvalidEmail("invalid domain".to_string()));
    }

    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidEmail(
            "top-level domain must be at least two letters".to_string(),
        ));
    }

    Ok(())
}

/// Validate a username length.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Empty("username".to_string()));
    }

    let len = username.chars().count();
    if len < MIN_USERNAME_LENGTH {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: MIN_USERNAME_LENGTH,
            actual: len,
        });
    }

    if len > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: MAX_USERNAME_LENGTH,
            actual: len,
        });
    }

    Ok(())
}

/// Validate a plaintext password before hashing.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Empty("password".to_string()));
    }

    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
            actual: len,
        });
    }

    Ok(())
}
