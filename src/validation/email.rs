/// Predicate deciding whether a string is a syntactically valid email address
pub trait EmailValidator: Send + Sync {
    fn is_email(&self, candidate: &str) -> bool;
}

/// Trim surrounding whitespace and lowercase
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_LOCAL_LENGTH: usize = 64;
const MAX_LABEL_LENGTH: usize = 63;

/// Structural check of `local@domain`.
///
/// Accepts dot-atom local parts and dotted hostnames with an alphabetic TLD.
/// Quoted local parts and IP literal domains are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicEmailValidator;

impl EmailValidator for BasicEmailValidator {
    fn is_email(&self, candidate: &str) -> bool {
        if candidate.is_empty() || candidate.len() > MAX_EMAIL_LENGTH {
            return false;
        }

        let (local, domain) = match candidate.split_once('@') {
            Some(parts) => parts,
            None => return false,
        };

        if domain.contains('@') {
            return false;
        }

        validate_local(local) && validate_domain(domain)
    }
}

fn validate_local(local: &str) -> bool {
    const SPECIALS: &[char] = &[
        '!', '#', '$', '%', '&', '\'', '*', '+', '/', '=', '?', '^', '_', '`', '{', '|', '}', '~',
        '-', '.',
    ];

    if local.is_empty() || local.len() > MAX_LOCAL_LENGTH {
        return false;
    }

    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }

    local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || SPECIALS.contains(&c))
}

fn validate_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();

    if labels.len() < 2 {
        return false;
    }

    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LENGTH
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    let tld_ok = labels
        .last()
        .map(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or(false);

    labels_ok && tld_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.com\t"), "alice@example.com");
        assert_eq!(normalize_email("bob@example.com"), "bob@example.com");
    }

    #[test]
    fn test_valid_emails() {
        let v = BasicEmailValidator;
        for email in [
            "alice@example.com",
            "first.last@sub.example.co.uk",
            "user+tag@example.io",
            "o'brien@example.ie",
            "x@a-b.example.org",
        ] {
            assert!(v.is_email(email), "{} should be valid", email);
        }
    }

    #[test]
    fn test_invalid_emails() {
        let v = BasicEmailValidator;
        for email in [
            "",
            "plainaddress",
            "@example.com",
            "alice@",
            "alice@example",
            "alice@@example.com",
            "a@b@example.com",
            ".alice@example.com",
            "alice.@example.com",
            "al..ice@example.com",
            "alice@-example.com",
            "alice@example-.com",
            "alice@example.c",
            "alice@example.123",
            "ali ce@example.com",
            "alice@exa mple.com",
        ] {
            assert!(!v.is_email(email), "{} should be invalid", email);
        }
    }

    #[test]
    fn test_length_limits() {
        let v = BasicEmailValidator;
        let long_local = format!("{}@example.com", "a".repeat(65));
        assert!(!v.is_email(&long_local));

        let long_label = format!("alice@{}.com", "a".repeat(64));
        assert!(!v.is_email(&long_label));
    }
}
