//! Font descriptors parsed from editor font specs.
//!
//! A spec is `family[:attr]*`. Underscores in the family decode to spaces.
//! Recognized attributes, applied left to right:
//!
//! - `h<number>`: point size
//! - `b`: bold weight
//! - `i`: italic style
//!
//! Anything else is ignored, so parsing never fails.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FontDescriptor {
    pub family: String,
    /// Point size; `None` keeps the current size.
    pub size: Option<f32>,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl FontDescriptor {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn parse(spec: &str) -> Self {
        let mut parts = spec.split(':');
        let family = parts.next().unwrap_or_default().replace('_', " ");
        let mut font = Self {
            family,
            ..Self::default()
        };

        for attr in parts {
            let mut chars = attr.chars();
            match chars.next() {
                Some('h') => match chars.as_str().parse::<f32>() {
                    Ok(size) if size.is_finite() && size > 0.0 => font.size = Some(size),
                    _ => tracing::debug!(attr, "ignoring invalid font size"),
                },
                Some('b') => font.weight = FontWeight::Bold,
                Some('i') => font.style = FontStyle::Italic,
                Some(_) => tracing::debug!(attr, "ignoring unknown font attribute"),
                None => {}
            }
        }

        font
    }

    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }

    pub fn is_italic(&self) -> bool {
        self.style == FontStyle::Italic
    }

    /// Fill unset fields from `base`: an empty family or missing size.
    pub fn or(mut self, base: &FontDescriptor) -> Self {
        if self.family.trim().is_empty() {
            self.family = base.family.clone();
        }
        if self.size.is_none() {
            self.size = base.size;
        }
        self
    }
}

impl fmt::Display for FontDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.family.replace(' ', "_"))?;
        if let Some(size) = self.size {
            write!(f, ":h{size}")?;
        }
        if self.is_bold() {
            write!(f, ":b")?;
        }
        if self.is_italic() {
            write!(f, ":i")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_spec() {
        let font = FontDescriptor::parse("Monospace_10:h14:b:i");
        assert_eq!(font.family, "Monospace 10");
        assert_eq!(font.size, Some(14.0));
        assert!(font.is_bold());
        assert!(font.is_italic());
    }

    #[test]
    fn family_only() {
        let font = FontDescriptor::parse("DejaVu_Sans_Mono");
        assert_eq!(font.family, "DejaVu Sans Mono");
        assert_eq!(font.size, None);
        assert_eq!(font.weight, FontWeight::Normal);
        assert_eq!(font.style, FontStyle::Normal);
    }

    #[test]
    fn unknown_attribute_is_ignored() {
        let font = FontDescriptor::parse("Foo:x9");
        assert_eq!(font.family, "Foo");
        assert_eq!(font.size, None);
        assert!(!font.is_bold());
    }

    #[test]
    fn invalid_and_empty_attributes_are_ignored() {
        let font = FontDescriptor::parse("Foo::hbig:h-3:h12");
        assert_eq!(font.size, Some(12.0));
    }

    #[test]
    fn later_size_wins() {
        let font = FontDescriptor::parse("Foo:h10:h16.5");
        assert_eq!(font.size, Some(16.5));
    }

    #[test]
    fn empty_spec() {
        let font = FontDescriptor::parse("");
        assert!(font.family.is_empty());
        assert_eq!(font.size, None);
    }

    #[test]
    fn or_fills_missing_fields() {
        let base = FontDescriptor::new("Menlo", 13.0);
        let font = FontDescriptor::parse(":b").or(&base);
        assert_eq!(font.family, "Menlo");
        assert_eq!(font.size, Some(13.0));
        assert!(font.is_bold());

        let font = FontDescriptor::parse("Iosevka:h11").or(&base);
        assert_eq!(font.family, "Iosevka");
        assert_eq!(font.size, Some(11.0));
    }

    #[test]
    fn display_reencodes_spec() {
        let font = FontDescriptor::parse("Fira_Code:h12:i");
        assert_eq!(font.to_string(), "Fira_Code:h12:i");
    }
}
