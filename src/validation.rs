//! Form input validators.
//!
//! All validators are pure and total: they never panic and never touch I/O, so
//! they can be called on raw form input before anything reaches the database.
//! The database schema enforces the same rules again via CHECK constraints.

use chrono::{Datelike, Utc};

/// Accepts an optional leading `+` followed by at least ten characters drawn
/// from digits, spaces, hyphens, and parentheses.
pub fn validate_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    digits.chars().count() >= 10
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_whitespace() || matches!(c, '-' | '(' | ')'))
}

/// Accepts `local@domain.tld` with a 2+ letter TLD.
pub fn validate_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty()
        || !local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-'))
    {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty()
        && host.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'))
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Accepts integers between 1900 and next calendar year inclusive.
/// Parse failures are a `false`, not an error.
pub fn validate_year(year: &str) -> bool {
    match year.trim().parse::<i32>() {
        Ok(y) => (1900..=Utc::now().year() + 1).contains(&y),
        Err(_) => false,
    }
}

/// Accepts any float strictly greater than zero.
pub fn validate_cost(cost: &str) -> bool {
    match cost.trim().parse::<f64>() {
        Ok(c) => c > 0.0,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("123-456-7890"));
        assert!(validate_phone("+1 (555) 010-1234"));
        assert!(validate_phone("5550101234"));
        assert!(validate_phone("555 010 1234"));

        assert!(!validate_phone("123"));
        assert!(!validate_phone("123456789")); // nine characters
        assert!(!validate_phone("555-010-123x"));
        assert!(!validate_phone(""));
        assert!(!validate_phone("+"));
    }

    #[test]
    fn test_validate_phone_plus_not_counted() {
        // The leading + does not count towards the ten character minimum
        assert!(!validate_phone("+123456789"));
        assert!(validate_phone("+1234567890"));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("jane@example.com"));
        assert!(validate_email("jane.doe+tag@mail.example.co"));
        assert!(validate_email("a_b%c@host-name.org"));

        assert!(!validate_email("jane@example"));
        assert!(!validate_email("jane@example.c")); // one-letter TLD
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("jane@@example.com"));
        assert!(!validate_email("jane example@example.com"));
        assert!(!validate_email("jane@exam ple.com"));
        assert!(!validate_email(""));
    }

    #[test]
    fn test_validate_year() {
        assert!(validate_year("2020"));
        assert!(validate_year("1900"));
        let next_year = (Utc::now().year() + 1).to_string();
        assert!(validate_year(&next_year));

        assert!(!validate_year("1899"));
        assert!(!validate_year("1800"));
        let far_future = (Utc::now().year() + 2).to_string();
        assert!(!validate_year(&far_future));
        assert!(!validate_year("abc"));
        assert!(!validate_year(""));
        assert!(!validate_year("20.20"));
    }

    #[test]
    fn test_validate_cost() {
        assert!(validate_cost("0.01"));
        assert!(validate_cost("120.00"));
        assert!(validate_cost("1"));

        assert!(!validate_cost("0"));
        assert!(!validate_cost("0.0"));
        assert!(!validate_cost("-10"));
        assert!(!validate_cost("abc"));
        assert!(!validate_cost(""));
    }
}
