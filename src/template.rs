//! Label template loading and the per-run recoloring pass.
//!
//! A template is an SVG whose `style` attributes carry the colours. The first
//! `fill` in document order becomes the configured label colour and every later
//! one is painted white, so one drawing can describe a tinted outer shape with
//! neutral inner panels.

use std::ops::Range;
use std::path::Path;

use crate::config::RunConfig;
use crate::error::Error;

const NEUTRAL_FILL: &str = "#FFFFFF";
const NEUTRAL_OPACITY: &str = "1.0";

/// Colours substituted into the template.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateColors {
    pub stroke: String,
    pub fill: String,
    pub fill_opacity: f64,
}

impl TemplateColors {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            stroke: config.stroke_color.clone(),
            fill: config.fill_color.clone(),
            fill_opacity: config.fill_opacity,
        }
    }
}

/// Opacity as written into a style value; whole numbers keep one decimal.
fn format_opacity(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

/// Which single-use substitutions one traversal has already spent.
#[derive(Debug, Default)]
pub struct RecolorState {
    fill_used: bool,
    opacity_used: bool,
}

impl RecolorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite one `style` attribute value. Entries are trimmed and rejoined
    /// with `;`; unknown properties pass through untouched.
    pub fn rewrite_style(&mut self, style: &str, colors: &TemplateColors) -> String {
        style
            .split(';')
            .map(|entry| {
                let entry = entry.trim();
                let Some((name, _)) = entry.split_once(':') else {
                    return entry.to_string();
                };
                match name.trim() {
                    "stroke" => format!("stroke:{}", colors.stroke),
                    "fill" if !self.fill_used => {
                        self.fill_used = true;
                        format!("fill:{}", colors.fill)
                    }
                    "fill" => format!("fill:{NEUTRAL_FILL}"),
                    "fill-opacity" if !self.opacity_used => {
                        self.opacity_used = true;
                        format!("fill-opacity:{}", format_opacity(colors.fill_opacity))
                    }
                    "fill-opacity" => format!("fill-opacity:{NEUTRAL_OPACITY}"),
                    _ => entry.to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join(";")
    }
}

fn escape_attr(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' if quote == '"' => out.push_str("&quot;"),
            '\'' if quote == '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Recolor every `style` attribute of `svg`, depth-first in document order.
///
/// The markup outside the rewritten attribute values is copied byte for byte.
/// Presentation attributes such as `fill="..."` are not touched.
pub fn recolor_svg(svg: &str, colors: &TemplateColors) -> Result<String, Error> {
    let doc = roxmltree::Document::parse(svg)?;
    let mut state = RecolorState::new();
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();

    for node in doc.descendants().filter(|n| n.is_element()) {
        let Some(attr) = node
            .attributes()
            .find(|a| a.name() == "style" && a.namespace().is_none())
        else {
            continue;
        };
        let range = attr.range_value();
        let quote = range
            .start
            .checked_sub(1)
            .and_then(|i| svg.as_bytes().get(i))
            .map(|&b| b as char)
            .unwrap_or('"');
        let rewritten = state.rewrite_style(attr.value(), colors);
        edits.push((range, escape_attr(&rewritten, quote)));
    }

    edits.sort_by_key(|(range, _)| range.start);
    let mut out = String::with_capacity(svg.len() + edits.len() * 16);
    let mut cursor = 0;
    for (range, value) in edits {
        out.push_str(&svg[cursor..range.start]);
        out.push_str(&value);
        cursor = range.end;
    }
    out.push_str(&svg[cursor..]);
    Ok(out)
}

/// The recolored template, parsed once per run and shared by every label.
pub struct RecoloredTemplate {
    svg: String,
    tree: usvg::Tree,
}

impl RecoloredTemplate {
    pub fn load(path: &Path, colors: &TemplateColors) -> Result<Self, Error> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::template(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_source(&source, colors, path.parent())
    }

    /// `resources_dir` resolves relative hrefs inside the template.
    pub fn from_source(
        source: &str,
        colors: &TemplateColors,
        resources_dir: Option<&Path>,
    ) -> Result<Self, Error> {
        let svg = recolor_svg(source, colors)?;

        let mut opt = usvg::Options::default();
        opt.resources_dir = resources_dir.map(Path::to_path_buf);
        if svg.contains("<text") {
            opt.fontdb_mut().load_system_fonts();
        }
        let tree = usvg::Tree::from_str(&svg, &opt)?;
        Ok(Self { svg, tree })
    }

    /// Recolored SVG source.
    pub fn svg(&self) -> &str {
        &self.svg
    }

    pub(crate) fn tree(&self) -> &usvg::Tree {
        &self.tree
    }

    /// Native size of the drawing in points (one SVG user unit per point).
    pub fn size(&self) -> (f32, f32) {
        let size = self.tree.size();
        (size.width(), size.height())
    }
}
