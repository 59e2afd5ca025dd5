//! Sign-in and registration input checks run before any network call.

#[cfg(test)]
#[path = "forms_test.rs"]
mod tests;

pub const LOGIN_INCOMPLETE: &str = "Enter both email and password.";
pub const REGISTER_INCOMPLETE: &str = "Enter email, password, and name.";
pub const EMAIL_INVALID: &str = "Enter a valid email address.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Trim the email and require both fields. Passwords are taken verbatim.
pub fn validate_login(email: &str, password: &str) -> Result<LoginForm, &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(LOGIN_INCOMPLETE);
    }
    check_email(email)?;
    Ok(LoginForm { email: email.to_owned(), password: password.to_owned() })
}

pub fn validate_register(email: &str, password: &str, name: &str) -> Result<RegisterForm, &'static str> {
    let email = email.trim();
    let name = name.trim();
    if email.is_empty() || password.is_empty() || name.is_empty() {
        return Err(REGISTER_INCOMPLETE);
    }
    check_email(email)?;
    Ok(RegisterForm { email: email.to_owned(), password: password.to_owned(), name: name.to_owned() })
}

// Shape only; the server owns real validation.
fn check_email(email: &str) -> Result<(), &'static str> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace) => {
            Ok(())
        }
        _ => Err(EMAIL_INVALID),
    }
}
