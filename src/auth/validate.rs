/// Validate a role name: required, max 100 chars, no control characters.
pub fn validate_role_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if let Some(err) = validate_required(trimmed, "Name", 100) {
        return Some(err);
    }
    if trimmed.chars().any(char::is_control) {
        return Some("Name may not contain control characters".to_string());
    }
    None
}

/// Validate a role level: lower is more privileged, 1 is the top.
pub fn validate_level(level: i32) -> Option<String> {
    if level < 1 {
        return Some("Level must be at least 1".to_string());
    }
    None
}

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if !trimmed.is_empty() && trimmed.chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_name_rules() {
        assert_eq!(validate_role_name("  "), Some("Name is required".to_string()));
        assert!(validate_role_name(&"x".repeat(101)).is_some());
        assert!(validate_role_name("bad\nname").is_some());
        assert_eq!(validate_role_name("Auditor"), None);
    }

    #[test]
    fn level_must_be_positive() {
        assert!(validate_level(0).is_some());
        assert_eq!(validate_level(1), None);
    }

    #[test]
    fn optional_allows_empty() {
        assert_eq!(validate_optional("", "Description", 5), None);
        assert!(validate_optional("toolong", "Description", 5).is_some());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert_eq!(validate_required("角色名称", "Name", 4), None);
    }
}
