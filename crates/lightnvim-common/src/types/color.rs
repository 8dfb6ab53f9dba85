use serde::{Deserialize, Serialize};

use super::x11_colors::X11_COLORS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::from_rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::from_rgba(255, 255, 255, 255);

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse any supported color spec: a name, a hex form, `rgb()` or
    /// `rgba()`. Surrounding whitespace and case are ignored.
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if spec.starts_with('#') {
            return Self::from_hex(spec);
        }
        let lower = spec.to_ascii_lowercase();
        if lower.starts_with("rgb") {
            return Self::from_rgba_string(&lower);
        }
        Self::from_name(&lower)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if key == "transparent" {
            return Some(Self::from_rgba(0, 0, 0, 0));
        }
        X11_COLORS
            .binary_search_by_key(&key.as_str(), |(n, _)| *n)
            .ok()
            .map(|i| {
                let [r, g, b] = X11_COLORS[i].1;
                Self::from_rgba(r, g, b, 255)
            })
    }

    /// `#rgb`, `#rrggbb`, `#rrggbbaa`, `#rrrgggbbb` and `#rrrrggggbbbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 | 6 | 9 | 12 => {
                let w = hex.len() / 3;
                let r = scale_hex(&hex[0..w])?;
                let g = scale_hex(&hex[w..2 * w])?;
                let b = scale_hex(&hex[2 * w..3 * w])?;
                Some(Self { r, g, b, a: 255 })
            }
            8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
                Some(Self { r, g, b, a })
            }
            _ => None,
        }
    }

    /// `rgb(r,g,b)` or `rgba(r,g,b,a)`. Channels are `0-255` or
    /// percentages; alpha is `0.0-1.0`.
    pub fn from_rgba_string(s: &str) -> Option<Self> {
        let s = s.trim();
        let (inner, has_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
            (rest.strip_suffix(')')?, true)
        } else {
            (s.strip_prefix("rgb(")?.strip_suffix(')')?, false)
        };
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != if has_alpha { 4 } else { 3 } {
            return None;
        }
        let r = parse_channel(parts[0])?;
        let g = parse_channel(parts[1])?;
        let b = parse_channel(parts[2])?;
        let a = if has_alpha {
            let alpha = parts[3].parse::<f64>().ok()?;
            if !(0.0..=1.0).contains(&alpha) {
                return None;
            }
            (alpha * 255.0).round() as u8
        } else {
            255
        };
        Some(Self { r, g, b, a })
    }

    /// Normalized `[r, g, b, a]` in sRGB space.
    pub fn to_f32_array(&self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }
}

fn scale_hex(digits: &str) -> Option<u8> {
    let value = u32::from_str_radix(digits, 16).ok()?;
    let max = (1u32 << (4 * digits.len() as u32)) - 1;
    Some(((value * 255 + max / 2) / max) as u8)
}

fn parse_channel(s: &str) -> Option<u8> {
    if let Some(pct) = s.strip_suffix('%') {
        let pct = pct.trim().parse::<f64>().ok()?;
        if !(0.0..=100.0).contains(&pct) {
            return None;
        }
        return Some((pct * 255.0 / 100.0).round() as u8);
    }
    s.parse::<u8>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_from_hex_6() {
        let c = Color::from_hex("#ff8800").unwrap();
        assert_eq!(c, Color::from_rgba(255, 136, 0, 255));
    }

    #[test]
    fn color_from_hex_8() {
        let c = Color::from_hex("#ff880080").unwrap();
        assert_eq!(c, Color::from_rgba(255, 136, 0, 128));
    }

    #[test]
    fn color_from_hex_short_and_long_forms() {
        assert_eq!(Color::from_hex("#f80"), Color::from_hex("#ff8800"));
        assert_eq!(Color::from_hex("#fff000000"), Some(Color::from_rgba(255, 0, 0, 255)));
        assert_eq!(
            Color::from_hex("#ffff80800000"),
            Some(Color::from_rgba(255, 128, 0, 255))
        );
    }

    #[test]
    fn color_from_hex_invalid() {
        assert!(Color::from_hex("zzzzzz").is_none());
        assert!(Color::from_hex("#abcd").is_none());
        assert!(Color::from_hex("").is_none());
        assert!(Color::from_hex("#ééé").is_none());
    }

    #[test]
    fn color_from_hex_rejects_signs() {
        assert!(Color::from_hex("#+f+f+f").is_none());
        assert!(Color::from_hex("#+fffff").is_none());
        assert!(Color::from_hex("#-1ff").is_none());
        assert!(Color::from_hex("#ff8800+f").is_none());
    }

    #[test]
    fn color_from_rgb_function() {
        let c = Color::from_rgba_string("rgb(10, 20, 30)").unwrap();
        assert_eq!(c, Color::from_rgba(10, 20, 30, 255));
        let c = Color::from_rgba_string("rgb(100%,0%,50%)").unwrap();
        assert_eq!(c, Color::from_rgba(255, 0, 128, 255));
    }

    #[test]
    fn color_from_rgba_function() {
        let c = Color::from_rgba_string("rgba( 10 , 20 , 30 , 0.5 )").unwrap();
        assert_eq!(c, Color::from_rgba(10, 20, 30, 128));
    }

    #[test]
    fn color_from_rgba_string_invalid() {
        assert!(Color::from_rgba_string("rgba(10,20,30)").is_none());
        assert!(Color::from_rgba_string("rgb(10,20,30,1)").is_none());
        assert!(Color::from_rgba_string("rgba(10,20,30,2)").is_none());
        assert!(Color::from_rgba_string("rgb(300,0,0)").is_none());
    }

    #[test]
    fn parse_dispatches_on_form() {
        assert_eq!(Color::parse("  #000000 "), Some(Color::BLACK));
        assert_eq!(Color::parse("RGB(255,255,255)"), Some(Color::WHITE));
        assert_eq!(Color::parse("Navy Blue"), Some(Color::from_rgba(0, 0, 128, 255)));
        assert_eq!(Color::parse("transparent").map(|c| c.a), Some(0));
        assert!(Color::parse("no-such-color").is_none());
    }

    #[test]
    fn x11_names_ignore_case_and_spaces() {
        let dark_orange = Some(Color::from_rgba(255, 140, 0, 255));
        assert_eq!(Color::parse("DarkOrange"), dark_orange);
        assert_eq!(Color::parse("dark orange"), dark_orange);
        assert_eq!(Color::parse("Dark Slate Gray"), Color::parse("darkslategrey"));
        assert_eq!(Color::parse("SeaGreen"), Some(Color::from_rgba(46, 139, 87, 255)));
        assert_eq!(Color::parse("firebrick"), Some(Color::from_rgba(178, 34, 34, 255)));
        assert_eq!(Color::parse("DodgerBlue3"), Some(Color::from_rgba(24, 116, 205, 255)));
    }

    #[test]
    fn x11_gray_ramps() {
        assert_eq!(Color::parse("gray0"), Some(Color::BLACK));
        assert_eq!(Color::parse("grey100"), Some(Color::WHITE));
        assert_eq!(Color::parse("gray20"), Some(Color::from_rgba(51, 51, 51, 255)));
        assert_eq!(Color::parse("gray50"), Color::parse("grey50"));
        assert!(Color::parse("gray101").is_none());
    }

    #[test]
    fn x11_table_is_sorted() {
        assert!(X11_COLORS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn color_to_f32_array() {
        assert_eq!(Color::WHITE.to_f32_array(), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(Color::BLACK.to_f32_array()[..3], [0.0, 0.0, 0.0]);
    }
}
