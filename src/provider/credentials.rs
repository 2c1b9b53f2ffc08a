//! Client-side credential validation.
//!
//! These checks run before any provider round trip, so obviously malformed
//! input never leaves the device.

use crate::error::AuthError;
use crate::Result;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validate an email address.
pub fn validate_email(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(AuthError::EmptyEmail);
    }
    if !is_valid_email(email) {
        return Err(AuthError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

/// Validate a password.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(AuthError::EmptyPassword);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword {
            min_len: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Structural email check: `local@domain.tld`, no whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
