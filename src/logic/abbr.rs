/// Base used when a name yields no letters or digits at all.
const FALLBACK_BASE: &str = "P";

/// Abbreviation base for a plant name.
///
/// Words starting with a digit are kept whole; any other word contributes
/// its first letter, uppercased. Words starting with neither are skipped.
pub fn base_abbr(name: &str) -> String {
    let base: String = name
        .split_whitespace()
        .filter_map(|word| {
            let first = word.chars().next()?;
            if first.is_ascii_digit() {
                Some(word.to_string())
            } else if first.is_ascii_alphabetic() {
                Some(first.to_ascii_uppercase().to_string())
            } else {
                None
            }
        })
        .collect();

    if base.is_empty() {
        FALLBACK_BASE.to_string()
    } else {
        base
    }
}

/// True when `abbr` is `{base}-{digits}`.
pub fn is_numbered(abbr: &str, base: &str) -> bool {
    abbr.strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Next abbreviation for `name`, given how many active plants already use
/// the same base.
pub fn numbered_abbr(name: &str, taken: usize) -> String {
    format!("{}-{}", base_abbr(name), taken + 1)
}

pub const ABBR_MIN_LEN: usize = 2;
pub const ABBR_MAX_LEN: usize = 10;

/// True when a user-supplied abbreviation is 2 to 10 ASCII letters, digits
/// or `-`.
pub fn is_valid_abbr(abbr: &str) -> bool {
    (ABBR_MIN_LEN..=ABBR_MAX_LEN).contains(&abbr.len())
        && abbr.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
