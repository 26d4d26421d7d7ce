// Identifier value objects

/// Backoffice member ids are all-digit and at least six characters long.
pub fn is_valid_member_id(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.len() >= 6 && trimmed.chars().all(|c| c.is_ascii_digit())
}

/// Splits free-form bulk input (one id per line, or comma separated).
pub fn split_member_ids(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == '\n' || c == ',' || c == ';')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}
