//! Login and sign-up form validation, plus sign-up result mapping.
//!
//! Validation runs at handler entry; a form with field errors never reaches
//! the identity provider.

use regex::Regex;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::identity::{AuthError, SignUp};

pub const MIN_LOGIN_PASSWORD_LENGTH: usize = 6;
pub const MIN_SIGN_UP_PASSWORD_LENGTH: usize = 8;

pub const ACCOUNT_EXISTS_MESSAGE: &str =
    "An account with this email already exists. Please sign in instead or use a different email.";
const RATE_LIMITED_MESSAGE: &str = "Too many signup attempts. Please wait a moment and try again.";
const PROVIDER_PASSWORD_MESSAGE: &str = "Password must be at least 6 characters long.";
const PROVIDER_EMAIL_MESSAGE: &str = "Please enter a valid email address.";
const NO_USER_MESSAGE: &str = "Something went wrong. Please try again.";
const SIGN_UP_UNEXPECTED_MESSAGE: &str = "An unexpected error occurred. Please try again.";
const LOGIN_FALLBACK_MESSAGE: &str = "An error occurred";

/// Domains that skip the TLD plausibility check.
const COMMON_DOMAINS: [&str; 10] = [
    "gmail.com",
    "yahoo.com",
    "outlook.com",
    "hotmail.com",
    "icloud.com",
    "protonmail.com",
    "aol.com",
    "mail.com",
    "zoho.com",
    "yandex.com",
];

/// Misspelled domains that block sign-up outright.
const BLOCKED_TYPO_DOMAINS: [&str; 4] = ["gmial.com", "gmai.com", "yahooo.com", "hotmial.com"];

const DOMAIN_SUGGESTIONS: [(&str, &str); 9] = [
    ("gmial.com", "gmail.com"),
    ("gmai.com", "gmail.com"),
    ("gmil.com", "gmail.com"),
    ("yahooo.com", "yahoo.com"),
    ("yahho.com", "yahoo.com"),
    ("hotmial.com", "hotmail.com"),
    ("hotmil.com", "hotmail.com"),
    ("outlok.com", "outlook.com"),
    ("outloook.com", "outlook.com"),
];

/// Field-level validation errors, one message per field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_password: Option<String>,
}

impl FieldErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none() && self.repeat_password.is_none()
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// One line of a live checklist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct Check {
    pub text: String,
    pub met: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct PasswordStrength {
    /// 0 for an empty password, otherwise 1 to 5.
    pub score: u8,
    pub label: String,
}

impl Check {
    fn new(text: &str, met: bool) -> Self {
        Self {
            text: text.to_string(),
            met,
        }
    }
}

fn matches(pattern: &str, value: &str) -> bool {
    Regex::new(pattern).is_ok_and(|re| re.is_match(value))
}

/// Email syntax check in the spirit of common form validators.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    let local = email.split('@').next().unwrap_or_default();
    !local.starts_with('.')
        && !email.contains("..")
        && matches(
            r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$",
            email,
        )
}

fn domain_of(email: &str) -> Option<String> {
    email
        .split('@')
        .nth(1)
        .filter(|domain| !domain.is_empty())
        .map(str::to_lowercase)
}

/// A common mail provider, or at least a plausible `name.tld` shape.
#[must_use]
pub fn plausible_domain(email: &str) -> bool {
    domain_of(email).is_some_and(|domain| {
        COMMON_DOMAINS.contains(&domain.as_str()) || matches(r"^[a-z0-9.-]+\.[a-z]{2,}$", &domain)
    })
}

/// Corrected address for a known domain typo.
#[must_use]
pub fn suggest_email(email: &str) -> Option<String> {
    let (local, domain) = email.split_once('@')?;
    let domain = domain.to_lowercase();
    DOMAIN_SUGGESTIONS
        .iter()
        .find(|(typo, _)| *typo == domain)
        .map(|(_, fixed)| format!("{local}@{fixed}"))
}

#[must_use]
pub fn email_checklist(email: &str) -> Vec<Check> {
    [
        (r".+@.+\..+", "Valid email format"),
        (r"^[^\s@]+@[^\s@]+\.[^\s@]+$", "No spaces or special characters"),
        (r"^[^.][^@]*@[^@]*[^.]$", "No leading/trailing dots"),
        (r"^[^@]{1,64}@[^@]{1,255}$", "Appropriate length"),
    ]
    .into_iter()
    .map(|(pattern, text)| Check::new(text, matches(pattern, email)))
    .collect()
}

#[must_use]
pub fn password_checklist(password: &str) -> Vec<Check> {
    vec![
        Check::new(
            "At least 8 characters",
            password.chars().count() >= MIN_SIGN_UP_PASSWORD_LENGTH,
        ),
        Check::new(
            "One uppercase letter",
            password.chars().any(|c| c.is_ascii_uppercase()),
        ),
        Check::new(
            "One lowercase letter",
            password.chars().any(|c| c.is_ascii_lowercase()),
        ),
        Check::new("One number", password.chars().any(|c| c.is_ascii_digit())),
        Check::new(
            "One special character",
            password.chars().any(|c| !c.is_ascii_alphanumeric()),
        ),
    ]
}

#[must_use]
pub fn password_strength(password: &str) -> PasswordStrength {
    if password.is_empty() {
        return PasswordStrength {
            score: 0,
            label: String::new(),
        };
    }
    let met = password_checklist(password)
        .iter()
        .filter(|check| check.met)
        .count();
    let (score, label) = match met {
        0 | 1 => (1, "Weak"),
        2 => (2, "Fair"),
        3 => (3, "Good"),
        4 => (4, "Strong"),
        _ => (5, "Very Strong"),
    };
    PasswordStrength {
        score,
        label: label.to_string(),
    }
}

/// # Errors
/// Returns the field errors when the form is invalid.
pub fn validate_login(email: &str, password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if !valid_email(email) {
        errors.email = Some("Please enter a valid email address".to_string());
    }
    if password.chars().count() < MIN_LOGIN_PASSWORD_LENGTH {
        errors.password = Some("Password must be at least 6 characters".to_string());
    }
    errors.into_result()
}

fn sign_up_email_error(email: &str) -> Option<&'static str> {
    if email.is_empty() {
        return Some("Email is required");
    }
    if !valid_email(email) {
        return Some("Please enter a valid email address");
    }
    if !matches(r"^[^\s@]+@[^\s@]+\.[^\s@]+$", email) {
        return Some("Email format is invalid");
    }
    if !plausible_domain(email) {
        return Some("Please use a valid email domain");
    }
    let blocked =
        domain_of(email).is_some_and(|domain| BLOCKED_TYPO_DOMAINS.contains(&domain.as_str()));
    if blocked {
        return Some("Please check your email domain for typos");
    }
    None
}

fn sign_up_password_error(password: &str) -> Option<&'static str> {
    let checks: [Check; 5] = password_checklist(password).try_into().ok()?;
    let [length, upper, lower, digit, special] = checks;
    if !length.met {
        Some("Password must be at least 8 characters")
    } else if !upper.met {
        Some("Password must contain at least one uppercase letter")
    } else if !lower.met {
        Some("Password must contain at least one lowercase letter")
    } else if !digit.met {
        Some("Password must contain at least one number")
    } else if !special.met {
        Some("Password must contain at least one special character")
    } else {
        None
    }
}

/// # Errors
/// Returns the field errors when the form is invalid.
pub fn validate_sign_up(email: &str, password: &str, repeat_password: &str) -> Result<(), FieldErrors> {
    FieldErrors {
        email: sign_up_email_error(email).map(str::to_string),
        password: sign_up_password_error(password).map(str::to_string),
        repeat_password: (password != repeat_password).then(|| "Passwords do not match".to_string()),
    }
    .into_result()
}

/// Login failures show the provider message verbatim.
#[must_use]
pub fn login_error_message(err: &AuthError) -> String {
    err.provider_message()
        .unwrap_or(LOGIN_FALLBACK_MESSAGE)
        .to_string()
}

#[derive(Debug, PartialEq, Eq)]
pub enum SignUpError {
    AlreadyRegistered,
    /// Provider rejection, already mapped to user-facing text.
    Rejected(String),
    /// Neither a user nor an error came back.
    NoUser,
    Unexpected,
}

impl SignUpError {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::AlreadyRegistered => ACCOUNT_EXISTS_MESSAGE,
            Self::Rejected(message) => message,
            Self::NoUser => NO_USER_MESSAGE,
            Self::Unexpected => SIGN_UP_UNEXPECTED_MESSAGE,
        }
    }
}

/// Friendlier text for well-known provider sign-up errors.
#[must_use]
pub fn map_sign_up_error(message: &str) -> SignUpError {
    let lower = message.to_lowercase();
    let already = [
        "user already registered",
        "email already registered",
        "email already in use",
        "user with this email already exists",
    ];
    if already.iter().any(|phrase| lower.contains(phrase)) {
        SignUpError::AlreadyRegistered
    } else if lower.contains("rate limit") {
        SignUpError::Rejected(RATE_LIMITED_MESSAGE.to_string())
    } else if lower.contains("password") {
        SignUpError::Rejected(PROVIDER_PASSWORD_MESSAGE.to_string())
    } else if lower.contains("email") {
        SignUpError::Rejected(PROVIDER_EMAIL_MESSAGE.to_string())
    } else {
        SignUpError::Rejected(message.to_string())
    }
}

/// Interpret the provider's sign-up answer.
///
/// # Errors
/// See [`SignUpError`].
pub fn sign_up_outcome(result: Result<SignUp, AuthError>) -> Result<SignUp, SignUpError> {
    match result {
        Ok(sign_up) if sign_up.is_existing_account() => Err(SignUpError::AlreadyRegistered),
        Ok(sign_up) if sign_up.user.is_some() => Ok(sign_up),
        Ok(_) => Err(SignUpError::NoUser),
        Err(err) => match err.provider_message() {
            Some(message) => Err(map_sign_up_error(message)),
            None => {
                error!("Sign-up request failed: {err}");
                Err(SignUpError::Unexpected)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use serde_json::json;

    #[test]
    fn valid_email_accepts_common_shapes() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("first.last+tag@sub.example.co"));
        assert!(!valid_email("abc"));
        assert!(!valid_email("a@b"));
        assert!(!valid_email(".a@example.com"));
        assert!(!valid_email("a..b@example.com"));
        assert!(!valid_email("a b@example.com"));
    }

    #[test]
    fn gmial_gets_a_suggestion_and_is_blocked() {
        assert_eq!(suggest_email("user@gmial.com"), Some("user@gmail.com".to_string()));
        assert_eq!(suggest_email("user@Outlok.com"), Some("user@outlook.com".to_string()));
        assert_eq!(suggest_email("user@gmail.com"), None);
        assert_eq!(suggest_email("user"), None);

        let errors = validate_sign_up("user@gmial.com", "Abc12345!", "Abc12345!");
        assert_eq!(
            errors.map_err(|errors| errors.email),
            Err(Some("Please check your email domain for typos".to_string()))
        );
    }

    #[test]
    fn short_password_fails_length_and_classes() {
        let checks = password_checklist("abc");
        let failed: Vec<_> = checks
            .iter()
            .filter(|check| !check.met)
            .map(|check| check.text.as_str())
            .collect();
        assert_eq!(
            failed,
            vec!["At least 8 characters", "One uppercase letter", "One number", "One special character"]
        );
        assert_eq!(
            sign_up_password_error("abc"),
            Some("Password must be at least 8 characters")
        );
        assert_eq!(password_strength("abc").label, "Weak");
    }

    #[test]
    fn strong_password_passes_all_checks() {
        assert!(password_checklist("Abc12345!").iter().all(|check| check.met));
        assert_eq!(sign_up_password_error("Abc12345!"), None);
        assert_eq!(
            password_strength("Abc12345!"),
            PasswordStrength {
                score: 5,
                label: "Very Strong".to_string()
            }
        );
    }

    #[test]
    fn strength_scale() {
        assert_eq!(password_strength("").score, 0);
        assert_eq!(password_strength("").label, "");
        assert_eq!(password_strength("aB").label, "Fair");
        assert_eq!(password_strength("aB1").label, "Good");
        assert_eq!(password_strength("aB1!").label, "Strong");
    }

    #[test]
    fn sign_up_password_messages_follow_first_failure() {
        assert_eq!(
            sign_up_password_error("abcdefgh"),
            Some("Password must contain at least one uppercase letter")
        );
        assert_eq!(
            sign_up_password_error("ABCDEFGH"),
            Some("Password must contain at least one lowercase letter")
        );
        assert_eq!(
            sign_up_password_error("Abcdefgh"),
            Some("Password must contain at least one number")
        );
        assert_eq!(
            sign_up_password_error("Abcdefg1"),
            Some("Password must contain at least one special character")
        );
    }

    #[test]
    fn sign_up_email_messages() {
        assert_eq!(sign_up_email_error(""), Some("Email is required"));
        assert_eq!(sign_up_email_error("nope"), Some("Please enter a valid email address"));
        assert_eq!(sign_up_email_error("ada@example.com"), None);
        assert_eq!(sign_up_email_error("ada@gmail.com"), None);
    }

    #[test]
    fn email_checklist_reports_each_rule() {
        let checks = email_checklist("ada@example.com");
        assert_eq!(checks.len(), 4);
        assert!(checks.iter().all(|check| check.met));

        let checks = email_checklist("ada@example.");
        let dots = checks
            .iter()
            .find(|check| check.text == "No leading/trailing dots")
            .map(|check| check.met);
        assert_eq!(dots, Some(false));
    }

    #[test]
    fn repeat_password_must_match() {
        let errors = validate_sign_up("ada@example.com", "Abc12345!", "Abc12345?");
        assert_eq!(
            errors,
            Err(FieldErrors {
                repeat_password: Some("Passwords do not match".to_string()),
                ..FieldErrors::default()
            })
        );
        assert_eq!(validate_sign_up("ada@example.com", "Abc12345!", "Abc12345!"), Ok(()));
    }

    #[test]
    fn login_validation() {
        assert_eq!(validate_login("ada@example.com", "123456"), Ok(()));
        let errors = validate_login("ada", "123");
        assert_eq!(
            errors,
            Err(FieldErrors {
                email: Some("Please enter a valid email address".to_string()),
                password: Some("Password must be at least 6 characters".to_string()),
                repeat_password: None,
            })
        );
    }

    #[test]
    fn login_error_message_prefers_provider_text() {
        assert_eq!(
            login_error_message(&AuthError::api(400, "Invalid login credentials")),
            "Invalid login credentials"
        );
        assert_eq!(
            login_error_message(&AuthError::InvalidResponse("eof".to_string())),
            "An error occurred"
        );
    }

    #[test]
    fn sign_up_error_mapping() {
        assert_eq!(map_sign_up_error("User already registered"), SignUpError::AlreadyRegistered);
        assert_eq!(
            map_sign_up_error("email rate limit exceeded").message(),
            "Too many signup attempts. Please wait a moment and try again."
        );
        assert_eq!(
            map_sign_up_error("Password should be at least 6 characters").message(),
            "Password must be at least 6 characters long."
        );
        assert_eq!(
            map_sign_up_error("Unable to validate email address: invalid format").message(),
            "Please enter a valid email address."
        );
        assert_eq!(map_sign_up_error("Signups not allowed").message(), "Signups not allowed");
    }

    #[test]
    fn sign_up_outcomes() -> anyhow::Result<()> {
        let fresh = SignUp {
            user: Some(testing::user()),
            session: None,
        };
        assert!(sign_up_outcome(Ok(fresh)).is_ok());

        let existing = SignUp {
            user: Some(serde_json::from_value(json!({
                "id": testing::USER_ID,
                "identities": []
            }))?),
            session: None,
        };
        assert_eq!(
            sign_up_outcome(Ok(existing)).err(),
            Some(SignUpError::AlreadyRegistered)
        );
        assert_eq!(
            sign_up_outcome(Ok(SignUp::default())).err(),
            Some(SignUpError::NoUser)
        );
        assert_eq!(
            sign_up_outcome(Err(AuthError::InvalidResponse("eof".to_string()))).err(),
            Some(SignUpError::Unexpected)
        );
        Ok(())
    }
}
