use validator::ValidateEmail;

/// Longest authorization code accepted before contacting a provider.
pub const MAX_AUTHORIZATION_CODE_LEN: usize = 512;

/// Longest display name accepted at registration or profile completion.
pub const MAX_DISPLAY_NAME_LEN: usize = 50;

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

/// Emails are stored and looked up trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates an OAuth2 authorization code before it is sent to a provider.
/// Rules:
/// - 1-512 characters
/// - Only ASCII letters, digits and `-`, `_`, `.`, `/` (Google codes look like `4/0AX...`)
pub fn is_valid_authorization_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_AUTHORIZATION_CODE_LEN
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
}

/// Validates a (trimmed) display name: 1-50 characters, no control characters.
pub fn is_valid_display_name(name: &str) -> bool {
    let count = name.chars().count();
    count > 0
        && count <= MAX_DISPLAY_NAME_LEN
        && name == name.trim()
        && !name.chars().any(char::is_control)
}
