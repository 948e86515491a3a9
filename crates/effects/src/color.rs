//! Packed ARGB color helpers.
//!
//! Colors cross every boundary of the effect model as a single `u32` laid out
//! as `0xAARRGGBB`: alpha in the most significant byte, then red, green, blue.

/// Packs 8-bit channels into a single ARGB word.
pub const fn pack_argb(alpha: u8, red: u8, green: u8, blue: u8) -> u32 {
    ((alpha as u32) << 24) | ((red as u32) << 16) | ((green as u32) << 8) | blue as u32
}

/// Splits an ARGB word into `(alpha, red, green, blue)`.
pub const fn unpack_argb(color: u32) -> (u8, u8, u8, u8) {
    (
        (color >> 24) as u8,
        (color >> 16) as u8,
        (color >> 8) as u8,
        color as u8,
    )
}

/// Normalised `[r, g, b, a]` components in `0.0..=1.0`.
pub fn argb_to_rgba(color: u32) -> [f32; 4] {
    let (a, r, g, b) = unpack_argb(color);
    [
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        f32::from(a) / 255.0,
    ]
}

/// Inverse of [`argb_to_rgba`]; components are clamped and rounded to 8 bits.
pub fn rgba_to_argb(rgba: [f32; 4]) -> u32 {
    let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    pack_argb(
        channel(rgba[3]),
        channel(rgba[0]),
        channel(rgba[1]),
        channel(rgba[2]),
    )
}

/// Parses `#RRGGBB` (opaque) or `#AARRGGBB`. The leading `#` is optional.
pub fn parse_hex(raw: &str) -> Option<u32> {
    let digits = raw.trim();
    let digits = digits.strip_prefix('#').unwrap_or(digits);
    if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    match digits.len() {
        6 => u32::from_str_radix(digits, 16).ok().map(|rgb| 0xFF00_0000 | rgb),
        8 => u32::from_str_radix(digits, 16).ok(),
        _ => None,
    }
}

/// Formats the color channels as upper-case `#RRGGBB`; alpha is dropped.
pub fn format_hex(color: u32) -> String {
    format!("#{:06X}", color & 0x00FF_FFFF)
}

/// Converts one gamma-encoded sRGB component to linear light.
pub fn srgb_to_linear(component: f32) -> f32 {
    if component <= 0.04045 {
        component / 12.92
    } else {
        ((component + 0.055) / 1.055).powf(2.4)
    }
}
