use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;

/// PostScript points per inch.
pub const INCH: f64 = 72.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::LETTER
    }
}

/// Everything a run needs to know about label geometry, template colours and
/// fonts. Lengths are in points.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub page_size: PageSize,
    pub label_width: f64,
    pub label_height: f64,
    pub margin_left: f64,
    pub margin_top: f64,
    pub h_spacing: f64,
    pub v_spacing: f64,
    pub template_path: PathBuf,
    pub stroke_color: String,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub show_label_name: bool,
    pub show_catalog_number: bool,
    pub title_font: String,
    pub artist_font: String,
    pub other_font: String,
    /// Maximum number of releases to render, `None` for all.
    pub limit: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::LETTER,
            label_width: 3.0 * INCH,
            label_height: 1.0 * INCH,
            margin_left: 0.5 * INCH,
            margin_top: 0.5 * INCH,
            h_spacing: 0.005 * INCH,
            v_spacing: 0.005 * INCH,
            template_path: PathBuf::from("label001.svg"),
            stroke_color: "#FF0000".to_string(),
            fill_color: "#FF0000".to_string(),
            fill_opacity: 0.25,
            show_label_name: true,
            show_catalog_number: true,
            title_font: "Helvetica-Bold".to_string(),
            artist_font: "Helvetica".to_string(),
            other_font: "Helvetica".to_string(),
            limit: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageSizeEntry {
    Named(String),
    Custom { width: f64, height: f64 },
}

/// On-disk YAML shape. Lengths in inches; keys match the label generator's
/// historical config file so existing files keep working.
#[derive(Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    page_size: Option<PageSizeEntry>,
    label_width: Option<f64>,
    label_height: Option<f64>,
    page_margin_left: Option<f64>,
    page_margin_top: Option<f64>,
    horizontal_spacing: Option<f64>,
    vertical_spacing: Option<f64>,
    label_template: Option<PathBuf>,
    label_color: Option<String>,
    label_color_fill: Option<String>,
    label_color_fill_opacity: Option<f64>,
    label_show_label: Option<bool>,
    label_show_catno: Option<bool>,
    label_font_title: Option<String>,
    label_font_artist: Option<String>,
    label_font_other: Option<String>,
    test_count: Option<usize>,
}

fn named_page_size(name: &str) -> Option<PageSize> {
    match name.to_ascii_lowercase().as_str() {
        "letter" => Some(PageSize::LETTER),
        "a4" => Some(PageSize::A4),
        _ => None,
    }
}

/// `#RGB` / `#RRGGBB`, or anything not starting with `#` (named colours are
/// left to the SVG parser).
fn is_valid_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => !value.trim().is_empty() && !value.contains([';', ':']),
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io_at(e, path))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_yaml_str(&text, base)
    }

    /// Parse a YAML config. A relative `label_template` resolves against `base_dir`.
    pub fn from_yaml_str(text: &str, base_dir: &Path) -> Result<Self, Error> {
        // An empty file is a valid "all defaults" config.
        let file: ConfigFile = if text.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(text)?
        };
        let d = RunConfig::default();

        let page_size = match file.page_size {
            None => d.page_size,
            Some(PageSizeEntry::Named(name)) => named_page_size(&name)
                .ok_or_else(|| Error::config(format!("unknown page size {name:?}")))?,
            Some(PageSizeEntry::Custom { width, height }) => PageSize { width, height },
        };

        let inches = |v: Option<f64>, default_pt: f64| v.map(|i| i * INCH).unwrap_or(default_pt);

        let template_path = match file.label_template {
            Some(p) if p.is_relative() => base_dir.join(p),
            Some(p) => p,
            None => base_dir.join(&d.template_path),
        };

        let config = RunConfig {
            page_size,
            label_width: inches(file.label_width, d.label_width),
            label_height: inches(file.label_height, d.label_height),
            margin_left: inches(file.page_margin_left, d.margin_left),
            margin_top: inches(file.page_margin_top, d.margin_top),
            h_spacing: inches(file.horizontal_spacing, d.h_spacing),
            v_spacing: inches(file.vertical_spacing, d.v_spacing),
            template_path,
            stroke_color: file.label_color.unwrap_or(d.stroke_color),
            fill_color: file.label_color_fill.unwrap_or(d.fill_color),
            fill_opacity: file.label_color_fill_opacity.unwrap_or(d.fill_opacity),
            show_label_name: file.label_show_label.unwrap_or(d.show_label_name),
            show_catalog_number: file.label_show_catno.unwrap_or(d.show_catalog_number),
            title_font: file.label_font_title.unwrap_or(d.title_font),
            artist_font: file.label_font_artist.unwrap_or(d.artist_font),
            other_font: file.label_font_other.unwrap_or(d.other_font),
            limit: file.test_count,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject geometry and colours that cannot produce a single label.
    pub fn validate(&self) -> Result<(), Error> {
        let positive = [
            ("page width", self.page_size.width),
            ("page height", self.page_size.height),
            ("label_width", self.label_width),
            ("label_height", self.label_height),
        ];
        for (name, v) in positive {
            if !(v.is_finite() && v > 0.0) {
                return Err(Error::config(format!("{name} must be positive, got {v}")));
            }
        }
        let non_negative = [
            ("page_margin_left", self.margin_left),
            ("page_margin_top", self.margin_top),
            ("horizontal_spacing", self.h_spacing),
            ("vertical_spacing", self.v_spacing),
        ];
        for (name, v) in non_negative {
            if !(v.is_finite() && v >= 0.0) {
                return Err(Error::config(format!("{name} must not be negative, got {v}")));
            }
        }
        if !(0.0..=1.0).contains(&self.fill_opacity) {
            return Err(Error::config(format!(
                "label_color_fill_opacity must be within 0..=1, got {}",
                self.fill_opacity
            )));
        }
        for (name, c) in [
            ("label_color", &self.stroke_color),
            ("label_color_fill", &self.fill_color),
        ] {
            if !is_valid_color(c) {
                return Err(Error::config(format!("{name} is not a colour: {c:?}")));
            }
        }
        if self.label_width + self.margin_left > self.page_size.width
            || self.label_height + self.margin_top > self.page_size.height
        {
            return Err(Error::config("a single label does not fit on the page"));
        }
        Ok(())
    }
}
