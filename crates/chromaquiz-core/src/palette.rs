//! Static color catalogs and the option-count policy.
//!
//! Every palette is checked at compile time: hex codes are well formed, names
//! are unique within a palette, and each tier has at least as many colors as
//! it offers options. A bad catalog therefore fails the build instead of
//! producing a broken round at runtime.

use serde::Serialize;

use crate::model::Difficulty;

/// A named color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    /// Display name, unique within a palette.
    pub name: &'static str,
    /// `#rrggbb`.
    pub hex: &'static str,
}

impl Color {
    pub const fn new(name: &'static str, hex: &'static str) -> Self {
        Self { name, hex }
    }

    /// Red, green and blue components, or `None` if `hex` is not `#rrggbb`.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        if !hex_ok(self.hex) {
            return None;
        }
        let b = self.hex.as_bytes();
        Some((
            hex_byte(b[1], b[2]),
            hex_byte(b[3], b[4]),
            hex_byte(b[5], b[6]),
        ))
    }

    /// Name comparison used for answers and option uniqueness.
    pub fn same_name(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.hex)
    }
}

pub const EASY: [Color; 6] = [
    Color::new("Red", "#ef4444"),
    Color::new("Blue", "#3b82f6"),
    Color::new("Green", "#22c55e"),
    Color::new("Yellow", "#eab308"),
    Color::new("Purple", "#a855f7"),
    Color::new("Orange", "#f97316"),
];

pub const MEDIUM: [Color; 9] = [
    EASY[0],
    EASY[1],
    EASY[2],
    EASY[3],
    EASY[4],
    EASY[5],
    Color::new("Pink", "#ec4899"),
    Color::new("Cyan", "#06b6d4"),
    Color::new("Indigo", "#6366f1"),
];

pub const HARD: [Color; 12] = [
    Color::new("Red", "#ef4444"),
    Color::new("Crimson", "#dc2626"),
    Color::new("Blue", "#3b82f6"),
    Color::new("Navy", "#1e3a8a"),
    Color::new("Cyan", "#06b6d4"),
    Color::new("Teal", "#0d9488"),
    Color::new("Green", "#22c55e"),
    Color::new("Lime", "#84cc16"),
    Color::new("Purple", "#a855f7"),
    Color::new("Violet", "#7c3aed"),
    Color::new("Orange", "#f97316"),
    Color::new("Amber", "#d97706"),
];

/// Neutral words shown in normal mode.
pub const WORDS: [&str; 20] = [
    "APPLE", "OCEAN", "FOREST", "SUN", "GRAPE", "TIGER", "FLOWER", "SKY", "MOUNTAIN", "RIVER",
    "BIRD", "CLOUD", "STAR", "MOON", "FIRE", "WIND", "RAIN", "SNOW", "LEAF", "STONE",
];

const EASY_OPTIONS: usize = 3;
const MEDIUM_OPTIONS: usize = 6;
const HARD_OPTIONS: usize = 6;

const _: () = assert!(catalog_ok(&EASY, EASY_OPTIONS));
const _: () = assert!(catalog_ok(&MEDIUM, MEDIUM_OPTIONS));
const _: () = assert!(catalog_ok(&HARD, HARD_OPTIONS));

/// The palette for a tier.
pub fn palette_for(tier: Difficulty) -> &'static [Color] {
    match tier {
        Difficulty::Easy => &EASY,
        Difficulty::Medium => &MEDIUM,
        Difficulty::Hard => &HARD,
    }
}

/// How many options a round of this tier offers.
pub fn option_count_for(tier: Difficulty) -> usize {
    match tier {
        Difficulty::Easy => EASY_OPTIONS,
        Difficulty::Medium => MEDIUM_OPTIONS,
        Difficulty::Hard => HARD_OPTIONS,
    }
}

/// Look up a color in a tier's palette by name (case-insensitive).
pub fn find_color(tier: Difficulty, name: &str) -> Option<Color> {
    palette_for(tier).iter().copied().find(|c| c.same_name(name))
}

// ---------------------------------------------------------------------------
// Compile-time catalog checks
// ---------------------------------------------------------------------------

const fn catalog_ok(colors: &[Color], option_count: usize) -> bool {
    if option_count < 2 || option_count > colors.len() {
        return false;
    }
    let mut i = 0;
    while i < colors.len() {
        if !hex_ok(colors[i].hex) {
            return false;
        }
        let mut j = i + 1;
        while j < colors.len() {
            if ascii_eq_ignore_case(colors[i].name, colors[j].name) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const fn hex_ok(hex: &str) -> bool {
    let b = hex.as_bytes();
    if b.len() != 7 || b[0] != b'#' {
        return false;
    }
    let mut i = 1;
    while i < 7 {
        if !b[i].is_ascii_hexdigit() {
            return false;
        }
        i += 1;
    }
    true
}

const fn ascii_eq_ignore_case(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i].to_ascii_lowercase() != b[i].to_ascii_lowercase() {
            return false;
        }
        i += 1;
    }
    true
}

const fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

const fn hex_byte(hi: u8, lo: u8) -> u8 {
    (nibble(hi) << 4) | nibble(lo)
}
