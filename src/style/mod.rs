//! # Style System
//!
//! Box-model and text-style properties for document nodes. This is a small,
//! printer-shaped subset: no colors, no font files — the text attributes map
//! directly onto device control codes (bold, condensed, CPI, typeface,
//! print quality).
//!
//! `Style` is sparse: every field is an `Option` and an unset field inherits
//! from the parent's resolved style. Resolution is per-field and independent;
//! setting `condensed` never implicitly changes `cpi`.

use crate::model::{Dimension, Edges, Margin, Position};
use serde::{Deserialize, Serialize};

/// The complete set of style properties for a node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    // ── Box Model ──────────────────────────────────────────────
    /// Explicit width. Explicit sizes are box sizes: padding lives inside.
    pub width: Option<Dimension>,
    /// Explicit height.
    pub height: Option<Dimension>,
    pub min_width: Option<Dimension>,
    pub min_height: Option<Dimension>,
    pub max_width: Option<Dimension>,
    pub max_height: Option<Dimension>,

    /// Padding between the box edge and the content.
    #[serde(default)]
    pub padding: Option<Edges>,
    /// Margin outside the box. Sides may be `auto`.
    #[serde(default)]
    pub margin: Option<Margin>,
    /// Gap between children on the container's main axis, in dots.
    pub gap: Option<i32>,

    // ── Positioning ────────────────────────────────────────────
    pub position: Option<Position>,

    // ── Text attributes (inherited) ────────────────────────────
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub double_width: Option<bool>,
    pub double_height: Option<bool>,
    pub condensed: Option<bool>,
    pub proportional: Option<bool>,
    /// Characters per inch for fixed-pitch text.
    pub cpi: Option<f64>,
    pub typeface: Option<Typeface>,
    pub quality: Option<PrintQuality>,
    /// Extra dots between adjacent characters.
    pub letter_spacing: Option<i32>,
}

/// Device typeface selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Typeface {
    #[default]
    Roman,
    SansSerif,
    Courier,
    Script,
    Ocr,
}

/// Print quality selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintQuality {
    #[default]
    Draft,
    Nlq,
}

/// Resolved text style: every field concrete. This is what measurement and
/// the flatten pass work with, and what render items carry to the encoder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub double_width: bool,
    pub double_height: bool,
    pub condensed: bool,
    pub proportional: bool,
    pub cpi: f64,
    pub typeface: Typeface,
    pub quality: PrintQuality,
    pub letter_spacing: i32,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            underline: false,
            double_width: false,
            double_height: false,
            condensed: false,
            proportional: false,
            cpi: 10.0,
            typeface: Typeface::Roman,
            quality: PrintQuality::Draft,
            letter_spacing: 0,
        }
    }
}

impl ResolvedStyle {
    /// The pitch settings the text metrics provider needs.
    pub fn pitch(&self) -> Pitch {
        Pitch {
            cpi: self.cpi,
            proportional: self.proportional,
            condensed: self.condensed,
            double_width: self.double_width,
        }
    }
}

/// Character pitch settings for width measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pitch {
    pub cpi: f64,
    pub proportional: bool,
    pub condensed: bool,
    pub double_width: bool,
}

impl Default for Pitch {
    fn default() -> Self {
        ResolvedStyle::default().pitch()
    }
}

impl Style {
    /// Resolve this style's text attributes against an inherited style.
    /// Each field resolves independently: set → override, unset → inherit.
    pub fn resolve(&self, inherited: &ResolvedStyle) -> ResolvedStyle {
        ResolvedStyle {
            bold: self.bold.unwrap_or(inherited.bold),
            italic: self.italic.unwrap_or(inherited.italic),
            underline: self.underline.unwrap_or(inherited.underline),
            double_width: self.double_width.unwrap_or(inherited.double_width),
            double_height: self.double_height.unwrap_or(inherited.double_height),
            condensed: self.condensed.unwrap_or(inherited.condensed),
            proportional: self.proportional.unwrap_or(inherited.proportional),
            cpi: self.cpi.unwrap_or(inherited.cpi),
            typeface: self.typeface.unwrap_or(inherited.typeface),
            quality: self.quality.unwrap_or(inherited.quality),
            letter_spacing: self.letter_spacing.unwrap_or(inherited.letter_spacing),
        }
    }
}
