//! Arbor Style - Inline style compilation
//!
//! Turns a style map into inline CSS text. Numeric values are pixel lengths
//! unless the property is unitless.

use std::fmt::Write;

/// Properties whose numeric values carry no unit
pub const UNITLESS_PROPERTIES: &[&str] = &[
    "opacity", "zIndex", "flex", "flexGrow", "flexShrink", "order",
];

/// A single style value
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Text(String),
    Number(f64),
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Text(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Text(value)
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Number(value)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        StyleValue::Number(f64::from(value))
    }
}

impl From<u32> for StyleValue {
    fn from(value: u32) -> Self {
        StyleValue::Number(f64::from(value))
    }
}

/// Ordered property → value map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleMap {
    entries: Vec<(String, StyleValue)>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, property: &str, value: impl Into<StyleValue>) -> Self {
        self.set(property, value);
        self
    }

    /// Set a property, keeping its original position when it already exists
    pub fn set(&mut self, property: &str, value: impl Into<StyleValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| name == property) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((property.to_string(), value)),
        }
    }

    /// Get a property
    pub fn get(&self, property: &str) -> Option<&StyleValue> {
        self.entries.iter().find(|(name, _)| name == property).map(|(_, v)| v)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<StyleValue>> FromIterator<(K, V)> for StyleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = StyleMap::new();
        for (k, v) in iter {
            map.set(k.as_ref(), v);
        }
        map
    }
}

/// Check if a property takes unitless numbers
pub fn is_unitless(property: &str) -> bool {
    UNITLESS_PROPERTIES.contains(&property)
}

/// `backgroundColor` → `background-color`
pub fn camel_to_dashed(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Format a number the way it reads in CSS (`16`, not `16.0`)
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Single `name: value;` row
fn style_row(name: &str, value: &StyleValue, out: &mut String) {
    let _ = write!(out, "{}: ", camel_to_dashed(name));
    match value {
        StyleValue::Text(text) => out.push_str(text),
        StyleValue::Number(n) => {
            out.push_str(&format_number(*n));
            if !is_unitless(name) {
                out.push_str("px");
            }
        }
    }
    out.push(';');
}

/// Compile a style map into inline CSS text
pub fn to_style(style: &StyleMap) -> String {
    let mut out = String::new();
    for (name, value) in style.iter() {
        if let StyleValue::Number(n) = value {
            if !n.is_finite() {
                tracing::warn!(property = name, "skipping non-finite style value");
                continue;
            }
        }
        style_row(name, value, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_to_dashed() {
        assert_eq!(camel_to_dashed("backgroundColor"), "background-color");
        assert_eq!(camel_to_dashed("borderTopLeftRadius"), "border-top-left-radius");
        assert_eq!(camel_to_dashed("color"), "color");
    }

    #[test]
    fn test_numbers_default_to_pixels() {
        let style = StyleMap::new().with("width", 300).with("marginTop", 32);
        assert_eq!(to_style(&style), "width: 300px;margin-top: 32px;");
    }

    #[test]
    fn test_unitless_properties() {
        let style = StyleMap::new()
            .with("opacity", 0.5)
            .with("zIndex", 10)
            .with("flex", 1);
        assert_eq!(to_style(&style), "opacity: 0.5;z-index: 10;flex: 1;");
    }

    #[test]
    fn test_text_values_verbatim() {
        let style = StyleMap::new().with("padding", "4px 8px");
        assert_eq!(to_style(&style), "padding: 4px 8px;");
    }

    #[test]
    fn test_set_keeps_position() {
        let mut style = StyleMap::new().with("color", "red").with("width", 1);
        style.set("color", "blue");
        assert_eq!(to_style(&style), "color: blue;width: 1px;");
    }

    #[test]
    fn test_non_finite_skipped() {
        let style = StyleMap::new().with("width", f64::NAN).with("height", 2);
        assert_eq!(to_style(&style), "height: 2px;");
    }
}
