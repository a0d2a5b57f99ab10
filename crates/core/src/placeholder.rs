//! Generated fallback visual for entries without a usable photo: the display
//! name's first letter on a color derived stably from the whole name, so the
//! same person always gets the same circle.

/// Fixed palette; hues picked to stay readable with a white initial.
pub const PALETTE: [(u8, u8, u8); 8] = [
    (0xe5, 0x73, 0x73), // red
    (0xba, 0x68, 0xc8), // purple
    (0x64, 0xb5, 0xf6), // blue
    (0x4d, 0xb6, 0xac), // teal
    (0x81, 0xc7, 0x84), // green
    (0xff, 0xb7, 0x4d), // orange
    (0xa1, 0x88, 0x7f), // brown
    (0x90, 0xa4, 0xae), // grey
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    pub initial: char,
    pub color: (u8, u8, u8),
}

/// Build the placeholder for a display name.
pub fn placeholder_for(name: &str) -> Placeholder {
    Placeholder {
        initial: initial(name),
        color: color_for(name),
    }
}

/// First alphanumeric character of the name, uppercased; `?` when the name
/// has none.
fn initial(name: &str) -> char {
    name.chars()
        .find(|c| c.is_alphanumeric())
        .map(|c| c.to_uppercase().next().unwrap_or(c))
        .unwrap_or('?')
}

/// FNV-1a over the full name, reduced onto the palette.
fn color_for(name: &str) -> (u8, u8, u8) {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in name.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x1000_0000_01b3);
    }
    PALETTE[(hash % PALETTE.len() as u64) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_is_first_alphanumeric_uppercased() {
        assert_eq!(placeholder_for("ada lovelace").initial, 'A');
        assert_eq!(placeholder_for("  maría").initial, 'M');
        assert_eq!(placeholder_for("\"quoted\" name").initial, 'Q');
        assert_eq!(placeholder_for("42 students").initial, '4');
    }

    #[test]
    fn test_empty_or_symbolic_name_falls_back() {
        assert_eq!(placeholder_for("").initial, '?');
        assert_eq!(placeholder_for("---").initial, '?');
    }

    #[test]
    fn test_color_is_stable_per_name() {
        let a = placeholder_for("Ada Lovelace");
        let b = placeholder_for("Ada Lovelace");
        assert_eq!(a.color, b.color);
        assert!(PALETTE.contains(&a.color));
    }

    #[test]
    fn test_palette_spread_across_names() {
        // Not a distribution guarantee, just a sanity check that different
        // names do not all collapse onto one palette slot.
        let colors: std::collections::HashSet<_> = [
            "Ada", "Grace", "Edsger", "Barbara", "Donald", "Radia", "Ken", "Frances",
        ]
        .iter()
        .map(|name| placeholder_for(name).color)
        .collect();
        assert!(colors.len() > 1);
    }
}
