/// Named option colors and their hex values
const PALETTE: &[(&str, &str)] = &[
    ("GRAY", "#848d97"),
    ("RED", "#f85149"),
    ("ORANGE", "#db6d28"),
    ("YELLOW", "#d29922"),
    ("GREEN", "#3fb950"),
    ("BLUE", "#2f81f7"),
    ("PURPLE", "#a371f7"),
    ("PINK", "#db61a2"),
    ("BLACK", "#000000"),
    ("WHITE", "#ffffff"),
];

/// Strip an optional `#` and return the digits if they form a 3, 6 or 8
/// digit hex color
fn hex_digits(token: &str) -> Option<&str> {
    let digits = token.strip_prefix('#').unwrap_or(token);
    let valid_len = matches!(digits.len(), 3 | 6 | 8);
    if valid_len && digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        Some(digits)
    } else {
        None
    }
}

/// Resolve a raw option color token (hex string or palette name) to `#hex`.
///
/// Hex tokens keep their digits, minus any alpha channel. Palette names are
/// matched case-insensitively. Anything else resolves to `None`.
pub fn resolve_option_color(token: &str) -> Option<String> {
    let token = token.trim();
    if let Some(digits) = hex_digits(token) {
        let rgb = if digits.len() == 8 { &digits[..6] } else { digits };
        return Some(format!("#{}", rgb));
    }
    let upper = token.to_uppercase();
    PALETTE
        .iter()
        .find(|(name, _)| *name == upper)
        .map(|(_, hex)| hex.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_hex_passes_through() {
        assert_eq!(resolve_option_color("#abc").as_deref(), Some("#abc"));
        assert_eq!(resolve_option_color("abc").as_deref(), Some("#abc"));
    }

    #[test]
    fn test_six_digit_hex() {
        assert_eq!(resolve_option_color("d73a4a").as_deref(), Some("#d73a4a"));
        assert_eq!(resolve_option_color("#0E8A16").as_deref(), Some("#0E8A16"));
    }

    #[test]
    fn test_alpha_channel_dropped() {
        assert_eq!(resolve_option_color("#11223344").as_deref(), Some("#112233"));
        assert_eq!(resolve_option_color("aabbccdd").as_deref(), Some("#aabbcc"));
    }

    #[test]
    fn test_palette_names() {
        assert_eq!(resolve_option_color("green").as_deref(), Some("#3fb950"));
        assert_eq!(resolve_option_color("GRAY").as_deref(), Some("#848d97"));
        assert_eq!(resolve_option_color("Pink").as_deref(), Some("#db61a2"));
        assert_eq!(resolve_option_color("white").as_deref(), Some("#ffffff"));
    }

    #[test]
    fn test_unresolvable_tokens() {
        assert_eq!(resolve_option_color("not-a-color"), None);
        assert_eq!(resolve_option_color(""), None);
        assert_eq!(resolve_option_color("#"), None);
        assert_eq!(resolve_option_color("#abcd"), None); // 4 digits
        assert_eq!(resolve_option_color("#ggg"), None);
        assert_eq!(resolve_option_color("#1234567"), None); // 7 digits
    }

    #[test]
    fn test_multibyte_input_does_not_panic() {
        assert_eq!(resolve_option_color("ÿÿÿ"), None);
        assert_eq!(resolve_option_color("#éé"), None);
    }
}
