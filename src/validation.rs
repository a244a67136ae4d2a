//! Structural and field-level validation for incoming commands, applied
//! before a command ever reaches a Room. Mirrors the inline checks the
//! teacher performs in `routes::rooms::create_room` (trim, length, charset)
//! but centralized since every command needs the same name/room-code rules.

/// `A-Z ∪ 1-9`, `0` excluded. Used both to validate and to generate codes.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ123456789";

pub const ROOM_CODE_LEN: usize = 4;
pub const NAME_MIN: usize = 1;
pub const NAME_MAX: usize = 30;
pub const QUESTION_MAX: usize = 200;
pub const CONFIG_STRING_MAX: usize = 100;
pub const TIMER_LIMIT_MIN: i64 = 10;
pub const TIMER_LIMIT_MAX: i64 = 3600;

/// Uppercases and rewrites the glyph `0` to `O`. Idempotent.
pub fn normalize_room_code(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            let upper = c.to_ascii_uppercase();
            if upper == '0' { 'O' } else { upper }
        })
        .collect()
}

pub fn is_valid_room_code(code: &str) -> bool {
    code.chars().count() == ROOM_CODE_LEN
        && code.chars().all(|c| ROOM_CODE_ALPHABET.contains(&(c as u8)))
}

/// `1-30` chars, `^[A-Za-z0-9 '.\-]+$`.
pub fn validate_name(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len < NAME_MIN || len > NAME_MAX {
        return Err(format!("name must be {NAME_MIN}-{NAME_MAX} characters"));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '\'' | '.' | '-'))
    {
        return Err("name contains characters outside [A-Za-z0-9 '.-]".to_string());
    }
    Ok(trimmed.to_string())
}

pub fn validate_question(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len < 1 || len > QUESTION_MAX {
        return Err(format!("poll question must be 1-{QUESTION_MAX} characters"));
    }
    Ok(trimmed.to_string())
}

pub fn validate_config_string(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > CONFIG_STRING_MAX {
        return Err(format!("config field must be at most {CONFIG_STRING_MAX} characters"));
    }
    Ok(trimmed.to_string())
}

pub fn clamp_limit_sec(seconds: i64) -> u32 {
    seconds.clamp(TIMER_LIMIT_MIN, TIMER_LIMIT_MAX) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_idempotent() {
        assert_eq!(normalize_room_code(normalize_room_code("a0b1").as_str()), normalize_room_code("a0b1"));
        assert_eq!(normalize_room_code("0"), "O");
        assert_eq!(normalize_room_code("aBcD"), "ABCD");
    }

    #[test]
    fn room_code_alphabet_excludes_zero() {
        assert!(!is_valid_room_code("AB0C"));
        assert!(is_valid_room_code("AB1C"));
        assert!(is_valid_room_code("ABCD"));
        assert!(!is_valid_room_code("ABC"));
        assert!(!is_valid_room_code("ABCDE"));
    }

    #[test]
    fn name_rules() {
        assert!(validate_name("Alice").is_ok());
        assert!(validate_name("  Bob  ").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"x".repeat(31)).is_err());
        assert!(validate_name("Bad$Name").is_err());
        assert_eq!(validate_name("O'Brien-Smith 2").unwrap(), "O'Brien-Smith 2");
    }

    #[test]
    fn limit_clamped() {
        assert_eq!(clamp_limit_sec(1), 10);
        assert_eq!(clamp_limit_sec(99999), 3600);
        assert_eq!(clamp_limit_sec(200), 200);
    }
}
