/// Turn free text into a username-safe slug: lowercase alphanumerics with
/// single underscores for everything else. "Jane Doe" -> "jane_doe".
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut last_was_separator = true;

    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_separator = false;
        } else if !last_was_separator {
            slug.push('_');
            last_was_separator = true;
        }
    }

    while slug.ends_with('_') {
        slug.pop();
    }

    slug
}

/// Derive a username from whatever identity fields were supplied: explicit
/// username first, then the display name, then the email local-part.
pub fn derive_username(
    username: Option<&str>,
    display_name: Option<&str>,
    email: &str,
) -> String {
    if let Some(username) = username.map(str::trim).filter(|u| !u.is_empty()) {
        return username.to_string();
    }

    if let Some(display_name) = display_name.map(str::trim).filter(|d| !d.is_empty()) {
        let slug = slugify(display_name);
        if !slug.is_empty() {
            return slug;
        }
    }

    slugify(email_local_part(email))
}

/// Derive a display name when none was supplied: fall back to the username.
pub fn derive_display_name(display_name: Option<&str>, username: &str) -> String {
    display_name
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(username)
        .to_string()
}

/// A username candidate with a collision counter: `base`, `base1`, `base2`...
pub fn username_candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}{}", base, attempt)
    }
}

fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_display_name() {
        assert_eq!(slugify("Jane Doe"), "jane_doe");
        assert_eq!(slugify("  Jane   Doe  "), "jane_doe");
        assert_eq!(slugify("Álvaro-99"), "lvaro_99");
    }

    #[test]
    fn test_username_from_display_name() {
        assert_eq!(
            derive_username(None, Some("Jane Doe"), "jane@example.com"),
            "jane_doe"
        );
    }

    #[test]
    fn test_explicit_username_wins() {
        assert_eq!(
            derive_username(Some("janed"), Some("Jane Doe"), "jane@example.com"),
            "janed"
        );
    }

    #[test]
    fn test_username_from_email_local_part() {
        assert_eq!(derive_username(None, None, "jane.doe@example.com"), "jane_doe");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        assert_eq!(derive_display_name(None, "jane_doe"), "jane_doe");
        assert_eq!(derive_display_name(Some("Jane"), "jane_doe"), "Jane");
        assert_eq!(derive_display_name(Some("   "), "jane_doe"), "jane_doe");
    }

    #[test]
    fn test_username_candidates() {
        assert_eq!(username_candidate("jane", 0), "jane");
        assert_eq!(username_candidate("jane", 1), "jane1");
        assert_eq!(username_candidate("jane", 12), "jane12");
    }
}
