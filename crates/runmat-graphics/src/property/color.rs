/// Named colours accepted wherever an RGB triple is.
const NAMED_COLORS: &[(&str, &str, [f64; 3])] = &[
    ("blue", "b", [0.0, 0.0, 1.0]),
    ("black", "k", [0.0, 0.0, 0.0]),
    ("red", "r", [1.0, 0.0, 0.0]),
    ("green", "g", [0.0, 1.0, 0.0]),
    ("yellow", "y", [1.0, 1.0, 0.0]),
    ("magenta", "m", [1.0, 0.0, 1.0]),
    ("cyan", "c", [0.0, 1.0, 1.0]),
    ("white", "w", [1.0, 1.0, 1.0]),
];

/// Parse a colour name: full names match by unique prefix (`"bla"` is
/// black), single letters use the short codes (`"b"` is blue).
pub fn parse_color_name(name: &str) -> Option<[f64; 3]> {
    let lowered = name.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return None;
    }
    if let Some((_, _, rgb)) = NAMED_COLORS.iter().find(|(_, short, _)| *short == lowered) {
        return Some(*rgb);
    }
    let mut hits = NAMED_COLORS
        .iter()
        .filter(|(long, _, _)| long.starts_with(&lowered));
    match (hits.next(), hits.next()) {
        (Some((_, _, rgb)), None) => Some(*rgb),
        _ => None,
    }
}

pub fn valid_rgb(rgb: &[f64]) -> bool {
    rgb.len() == 3 && rgb.iter().all(|c| (0.0..=1.0).contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_codes_and_prefixes() {
        assert_eq!(parse_color_name("b"), Some([0.0, 0.0, 1.0]));
        assert_eq!(parse_color_name("k"), Some([0.0, 0.0, 0.0]));
        assert_eq!(parse_color_name("bla"), Some([0.0, 0.0, 0.0]));
        assert_eq!(parse_color_name("Magenta"), Some([1.0, 0.0, 1.0]));
        assert_eq!(parse_color_name("bl"), None);
        assert_eq!(parse_color_name("purple"), None);
    }

    #[test]
    fn rgb_range() {
        assert!(valid_rgb(&[0.0, 0.5, 1.0]));
        assert!(!valid_rgb(&[0.0, 1.5, 1.0]));
        assert!(!valid_rgb(&[0.0, 0.5]));
    }
}
