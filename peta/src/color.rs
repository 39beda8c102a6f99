use serde::{Deserialize, Serialize};

/// Color representation.
///
/// Serialized as a `#RRGGBBAA` hex string; `#RRGGBB` is also accepted on input.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from_hex(&value).ok_or_else(|| format!("invalid color: {value}"))
    }
}

impl From<Color> for String {
    fn from(val: Color) -> Self {
        val.to_hex()
    }
}

impl Color {
    /// Transparent color: `#00000000`
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    /// Red color: `#FF0000FF`
    pub const RED: Color = Color::rgba(255, 0, 0, 255);
    /// Green color as used in legends: `#008000FF`
    pub const GREEN: Color = Color::rgba(0, 128, 0, 255);
    /// Orange color: `#FFA500FF`
    pub const ORANGE: Color = Color::rgba(255, 165, 0, 255);
    /// Blue color: `#0000FFFF`
    pub const BLUE: Color = Color::rgba(0, 0, 255, 255);
    /// White color: `#FFFFFFFF`
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    /// Black color: `#000000FF`
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    /// Gray color: `#808080FF`
    pub const GRAY: Color = Color::rgba(128, 128, 128, 255);
    /// Light gray color: `#D3D3D3FF`
    pub const LIGHT_GRAY: Color = Color::rgba(211, 211, 211, 255);

    /// Constructs color from its RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Converts the color into HEX8 string: `#RRGGBBAA`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }

    /// Parses a color from the hex string. Hex string can be either HEX6 (`#RRGGBB`) or HEX8 (`#RRGGBBAA`).
    pub fn try_from_hex(hex_string: &str) -> Option<Self> {
        if hex_string.len() != 7 && hex_string.len() != 9 || !hex_string.starts_with('#') {
            return None;
        }

        let channel = |i: usize| u8::from_str_radix(hex_string.get(i..i + 2)?, 16).ok();
        let a = if hex_string.len() == 9 {
            channel(7)?
        } else {
            255
        };

        Some(Self {
            r: channel(1)?,
            g: channel(3)?,
            b: channel(5)?,
            a,
        })
    }

    /// Returns a new color instance, copied from the base one but with the given alpha channel.
    pub fn with_alpha(&self, a: u8) -> Self {
        Self { a, ..*self }
    }

    /// Returns a copy of the color with opacity multiplied by `opacity` (`0.0..=1.0`).
    pub fn with_opacity(&self, opacity: f32) -> Self {
        let a = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        self.with_alpha(a)
    }

    /// Returns true if the color is fully transparent (`a == 0`).
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Red component of the color in RGBA space.
    pub fn r(&self) -> u8 {
        self.r
    }

    /// Green component of the color in RGBA space.
    pub fn g(&self) -> u8 {
        self.g
    }

    /// Blue component of the color in RGBA space.
    pub fn b(&self) -> u8 {
        self.b
    }

    /// Opacity component of the color.
    pub fn a(&self) -> u8 {
        self.a
    }

    pub(crate) fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

/// Qualitative palette used to give neighbouring features distinct colors (ColorBrewer "Set2").
pub const SET2: [Color; 8] = [
    Color::rgba(0x66, 0xC2, 0xA5, 255),
    Color::rgba(0xFC, 0x8D, 0x62, 255),
    Color::rgba(0x8D, 0xA0, 0xCB, 255),
    Color::rgba(0xE7, 0x8A, 0xC3, 255),
    Color::rgba(0xA6, 0xD8, 0x54, 255),
    Color::rgba(0xFF, 0xD9, 0x2F, 255),
    Color::rgba(0xE5, 0xC4, 0x94, 255),
    Color::rgba(0xB3, 0xB3, 0xB3, 255),
];

/// Color of the `index`-th feature when features are colored by their position in the layer.
pub fn categorical_color(index: usize) -> Color {
    SET2[index % SET2.len()]
}
