// SPDX-License-Identifier: MPL-2.0
//! In-memory SVG document with an editable root viewport.
//!
//! The document is kept as the flat list of `quick-xml` events it was parsed
//! from. Only the root `<svg>` start tag is ever rebuilt; every other event is
//! written back untouched, so comments, doctype, entities and formatting survive
//! a parse/serialize cycle.

use crate::config::{SizingPolicy, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH};
use crate::domain::ScaleFactor;
use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::fmt;

/// Units accepted on the root `width`/`height` attributes.
const LENGTH_UNITS: [&str; 9] = ["", "px", "pt", "pc", "mm", "cm", "in", "em", "ex"];

// =============================================================================
// Length
// =============================================================================

/// A root viewport dimension: a non-negative number and its unit suffix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f64,
    pub unit: &'static str,
}

impl Length {
    /// A unitless (user unit / pixel) length.
    #[must_use]
    pub fn px(value: f64) -> Self {
        Self { value, unit: "" }
    }

    /// Parses `"24"`, `"24px"`, `" 10.5mm "`.
    ///
    /// Percentages, unknown units, negative and non-numeric values yield `None`
    /// and are treated by callers as if the attribute were absent.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let split = numeric_prefix_len(raw);
        if split == 0 {
            return None;
        }
        let value: f64 = raw[..split].parse().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let unit_text = raw[split..].trim();
        let unit = LENGTH_UNITS
            .iter()
            .copied()
            .find(|u| u.eq_ignore_ascii_case(unit_text))?;
        Some(Self { value, unit })
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

/// Length in bytes of the leading decimal number (sign, digits, dot, exponent).
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let mantissa_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
        i += 1;
    }
    if i == mantissa_start {
        return 0;
    }
    // An exponent needs at least one digit, otherwise the `e` starts a unit (`em`, `ex`).
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

// =============================================================================
// ViewBox
// =============================================================================

/// The `viewBox` rectangle of the root element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    /// Parses four numbers separated by whitespace and/or commas.
    ///
    /// Returns `None` unless width and height are positive.
    pub fn parse(raw: &str) -> Option<Self> {
        let numbers: Vec<f64> = raw
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect::<std::result::Result<_, _>>()
            .ok()?;
        match numbers.as_slice() {
            &[min_x, min_y, width, height] if width > 0.0 && height > 0.0 => Some(Self {
                min_x,
                min_y,
                width,
                height,
            }),
            _ => None,
        }
    }
}

// =============================================================================
// SvgDocument
// =============================================================================

/// Parsed SVG markup with access to the root viewport attributes.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    events: Vec<Event<'static>>,
    /// Index of the root `<svg>` start (or empty) tag in `events`.
    root: usize,
    width: Option<String>,
    height: Option<String>,
    view_box: Option<String>,
}

impl SvgDocument {
    /// Parses `content`, requiring a single well-formed `<svg>` root element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed XML, unbalanced or mismatched
    /// tags, malformed attributes, several root elements, or a root other
    /// than `<svg>`.
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().check_end_names = true;

        let mut events = Vec::new();
        let mut root = None;
        let mut depth: usize = 0;

        loop {
            let event = reader.read_event().map_err(|e| {
                Error::Parse(format!("{e} at byte {}", reader.buffer_position()))
            })?;
            match &event {
                Event::Eof => break,
                Event::Start(_) | Event::Empty(_) => {
                    if depth == 0 {
                        if root.is_some() {
                            return Err(Error::Parse(
                                "document has more than one root element".into(),
                            ));
                        }
                        root = Some(events.len());
                    }
                    if matches!(event, Event::Start(_)) {
                        depth += 1;
                    }
                }
                Event::End(_) => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| Error::Parse("unexpected closing tag".into()))?;
                }
                // Only whitespace may appear outside the root element.
                Event::Text(text) if depth == 0 => {
                    if !text.iter().all(u8::is_ascii_whitespace) {
                        return Err(Error::Parse(format!(
                            "text outside the root element at byte {}",
                            reader.buffer_position()
                        )));
                    }
                }
                Event::CData(_) if depth == 0 => {
                    return Err(Error::Parse("CDATA outside the root element".into()));
                }
                _ => {}
            }
            events.push(event.into_owned());
        }

        if depth != 0 {
            return Err(Error::Parse("unexpected end of document".into()));
        }
        let root = root.ok_or_else(|| Error::Parse("document has no root element".into()))?;

        let mut document = Self {
            events,
            root,
            width: None,
            height: None,
            view_box: None,
        };
        document.read_root_attributes()?;
        Ok(document)
    }

    fn root_element(&self) -> &BytesStart<'static> {
        match &self.events[self.root] {
            Event::Start(start) | Event::Empty(start) => start,
            _ => unreachable!("root index always points at a start tag"),
        }
    }

    /// Validates the root element and caches its viewport attributes.
    fn read_root_attributes(&mut self) -> Result<()> {
        let root = self.root_element();
        if root.local_name().as_ref() != b"svg" {
            return Err(Error::Parse(format!(
                "root element is <{}>, expected <svg>",
                String::from_utf8_lossy(root.name().as_ref())
            )));
        }

        let (mut width, mut height, mut view_box) = (None, None, None);
        for attr in root.attributes() {
            let attr = attr.map_err(|e| Error::Parse(e.to_string()))?;
            let slot = match attr.key.as_ref() {
                b"width" => &mut width,
                b"height" => &mut height,
                b"viewBox" => &mut view_box,
                _ => continue,
            };
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Parse(e.to_string()))?;
            *slot = Some(value.into_owned());
        }

        self.width = width;
        self.height = height;
        self.view_box = view_box;
        Ok(())
    }

    /// The root `width`, if present and understood.
    pub fn width(&self) -> Option<Length> {
        self.width.as_deref().and_then(Length::parse)
    }

    /// The root `height`, if present and understood.
    pub fn height(&self) -> Option<Length> {
        self.height.as_deref().and_then(Length::parse)
    }

    pub fn view_box(&self) -> Option<ViewBox> {
        self.view_box.as_deref().and_then(ViewBox::parse)
    }

    /// The viewport the renderer would use before scaling.
    ///
    /// Missing dimensions come from the `viewBox` under
    /// [`SizingPolicy::ViewBox`], otherwise from the 300x150 default.
    pub fn intrinsic_size(&self, sizing: SizingPolicy) -> (Length, Length) {
        let view_box = match sizing {
            SizingPolicy::ViewBox => self.view_box(),
            SizingPolicy::DefaultViewport => None,
        };
        let width = self.width().unwrap_or_else(|| {
            Length::px(view_box.map_or(DEFAULT_VIEWPORT_WIDTH, |vb| vb.width))
        });
        let height = self.height().unwrap_or_else(|| {
            Length::px(view_box.map_or(DEFAULT_VIEWPORT_HEIGHT, |vb| vb.height))
        });
        (width, height)
    }

    /// Overwrites (or adds) the root `width` and `height` attributes.
    pub fn set_dimensions(&mut self, width: Length, height: Length) {
        let width_text = width.to_string();
        let height_text = height.to_string();

        let rebuilt = {
            let original = self.root_element();
            let mut rebuilt = original.clone();
            rebuilt.clear_attributes();
            let (mut wrote_width, mut wrote_height) = (false, false);
            // Attributes were validated in `parse`, so errors cannot occur here.
            for attr in original.attributes().flatten() {
                match attr.key.as_ref() {
                    b"width" => {
                        rebuilt.push_attribute(("width", width_text.as_str()));
                        wrote_width = true;
                    }
                    b"height" => {
                        rebuilt.push_attribute(("height", height_text.as_str()));
                        wrote_height = true;
                    }
                    _ => rebuilt.push_attribute(attr),
                }
            }
            if !wrote_width {
                rebuilt.push_attribute(("width", width_text.as_str()));
            }
            if !wrote_height {
                rebuilt.push_attribute(("height", height_text.as_str()));
            }
            rebuilt
        };

        self.events[self.root] = match self.events[self.root] {
            Event::Empty(_) => Event::Empty(rebuilt),
            _ => Event::Start(rebuilt),
        };
        self.width = Some(width_text);
        self.height = Some(height_text);
    }

    /// Multiplies the root viewport by `scale` and writes it back.
    ///
    /// Returns the new `(width, height)`. Nested geometry is left alone; the
    /// SVG's own `viewBox` mapping makes the content follow the viewport.
    pub fn scale_viewport(&mut self, scale: ScaleFactor, sizing: SizingPolicy) -> (Length, Length) {
        let (width, height) = self.intrinsic_size(sizing);
        let (w, h) = scale.apply_to_dimensions(width.value, height.value);
        let (width, height) = (Length { value: w, ..width }, Length { value: h, ..height });
        self.set_dimensions(width, height);
        (width, height)
    }

    /// Serializes the document back to markup.
    pub fn to_svg_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        for event in &self.events {
            writer
                .write_event(event.clone())
                .map_err(|e| Error::Parse(format!("failed to serialize SVG: {e}")))?;
        }
        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::Parse(format!("serialized SVG is not UTF-8: {e}")))
    }
}
