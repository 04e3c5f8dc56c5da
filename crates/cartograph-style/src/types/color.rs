//! Color parsing for color-valued properties and color functions.

use std::fmt;

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parse `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa` or a color name.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        match value.strip_prefix('#') {
            Some(hex) => parse_hex(hex),
            None => named(value),
        }
    }

    /// Linear blend toward `other`; `t` is clamped to `0..=1`.
    pub fn lerp(self, other: Rgba, t: f64) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgba::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

/// Lowercase hex notation; the alpha byte is only written when not opaque.
impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let short = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let long = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba::opaque(short(0)?, short(1)?, short(2)?)),
        4 => Some(Rgba::new(short(0)?, short(1)?, short(2)?, short(3)?)),
        6 => Some(Rgba::opaque(long(0)?, long(2)?, long(4)?)),
        8 => Some(Rgba::new(long(0)?, long(2)?, long(4)?, long(6)?)),
        _ => None,
    }
}

fn named(name: &str) -> Option<Rgba> {
    let rgba = match name.to_ascii_lowercase().as_str() {
        "black" => Rgba::opaque(0, 0, 0),
        "white" => Rgba::opaque(255, 255, 255),
        "red" => Rgba::opaque(255, 0, 0),
        "green" => Rgba::opaque(0, 128, 0),
        "blue" => Rgba::opaque(0, 0, 255),
        "yellow" => Rgba::opaque(255, 255, 0),
        "cyan" | "aqua" => Rgba::opaque(0, 255, 255),
        "magenta" | "fuchsia" => Rgba::opaque(255, 0, 255),
        "gray" | "grey" => Rgba::opaque(128, 128, 128),
        "silver" => Rgba::opaque(192, 192, 192),
        "maroon" => Rgba::opaque(128, 0, 0),
        "olive" => Rgba::opaque(128, 128, 0),
        "lime" => Rgba::opaque(0, 255, 0),
        "navy" => Rgba::opaque(0, 0, 128),
        "purple" => Rgba::opaque(128, 0, 128),
        "teal" => Rgba::opaque(0, 128, 128),
        "orange" => Rgba::opaque(255, 165, 0),
        "brown" => Rgba::opaque(165, 42, 42),
        "transparent" => Rgba::new(0, 0, 0, 0),
        _ => return None,
    };
    Some(rgba)
}
