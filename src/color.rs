//! Channel colors
//!
//! Each namespace gets a stable color from a fixed palette of xterm-256 codes,
//! picked by a 32-bit string hash so the same name always gets the same color.

use is_terminal::IsTerminal;
use owo_colors::{OwoColorize, XtermColors};

/// Palette used when the terminal supports 256 colors
pub const DEFAULT_PALETTE: [u8; 76] = [
    20, 21, 26, 27, 32, 33, 38, 39, 40, 41, 42, 43, 44, 45, 56, 57, 62, 63, 68, 69, 74, 75, 76, 77,
    78, 79, 80, 81, 92, 93, 98, 99, 112, 113, 128, 129, 134, 135, 148, 149, 160, 161, 162, 163, 164,
    165, 166, 167, 168, 169, 170, 171, 172, 173, 178, 179, 184, 185, 196, 197, 198, 199, 200, 201,
    202, 203, 204, 205, 206, 207, 208, 209, 214, 215, 220, 221,
];

/// Hash a namespace over its UTF-16 code units (`hash * 31 + unit`, wrapping at 32 bits)
pub fn namespace_hash(namespace: &str) -> i32 {
    namespace
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32))
}

/// Pick the palette entry for a namespace
///
/// Falls back to [`DEFAULT_PALETTE`] when `palette` is empty.
pub fn select_color(namespace: &str, palette: &[u8]) -> u8 {
    let palette = if palette.is_empty() {
        &DEFAULT_PALETTE[..]
    } else {
        palette
    };
    let index = namespace_hash(namespace).unsigned_abs() as usize % palette.len();
    palette[index]
}

/// Wrap text in ANSI escapes for an xterm-256 color
pub fn apply_color(text: &str, color: u8, bold: bool) -> String {
    let colored = text.color(XtermColors::from(color));
    if bold {
        colored.bold().to_string()
    } else {
        colored.to_string()
    }
}

/// Interpret a `DEBUG_COLORS` style value; `None` if it is not a recognized boolean
pub fn parse_color_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "on" | "true" | "enabled" | "1" => Some(true),
        "no" | "off" | "false" | "disabled" | "0" => Some(false),
        _ => None,
    }
}

/// Whether stderr (where the default sink writes) is a terminal
pub fn stderr_supports_color() -> bool {
    std::io::stderr().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_matches_java_style_string_hash() {
        assert_eq!(namespace_hash(""), 0);
        assert_eq!(namespace_hash("a"), 97);
        assert_eq!(namespace_hash("ab"), 97 * 31 + 98);
    }

    #[test]
    fn test_hash_wraps_at_32_bits() {
        let long = "worker:".repeat(64);
        // Must not panic on overflow and must stay deterministic
        assert_eq!(namespace_hash(&long), namespace_hash(&long));
    }

    #[test]
    fn test_select_color_is_stable() {
        let a = select_color("worker:a", &DEFAULT_PALETTE);
        let b = select_color("worker:a", &DEFAULT_PALETTE);
        assert_eq!(a, b);
        assert!(DEFAULT_PALETTE.contains(&a));
    }

    #[test]
    fn test_select_color_small_palette() {
        // "a" hashes to 97, 97 % 3 == 1
        assert_eq!(select_color("a", &[1, 2, 3]), 2);
    }

    #[test]
    fn test_select_color_empty_palette_falls_back() {
        assert!(DEFAULT_PALETTE.contains(&select_color("x", &[])));
    }

    #[test]
    fn test_apply_color_wraps_text() {
        let plain = apply_color("ns", 20, false);
        let bold = apply_color("ns", 20, true);
        assert!(plain.contains("ns"));
        assert!(plain.starts_with('\u{1b}'));
        assert_ne!(plain, bold);
    }

    #[test]
    fn test_parse_color_flag() {
        assert_eq!(parse_color_flag("YES"), Some(true));
        assert_eq!(parse_color_flag("0"), Some(false));
        assert_eq!(parse_color_flag("maybe"), None);
    }
}
