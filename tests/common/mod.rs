#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use jukebox_labels::{INCH, LabelInfo, Release, RunConfig, TextMeasure, Track};
use regex::Regex;

/// Every character advances `em` × size, whatever the font.
pub struct FixedAdvance {
    pub em: f32,
}

impl FixedAdvance {
    pub fn half_em() -> Self {
        Self { em: 0.5 }
    }
}

impl TextMeasure for FixedAdvance {
    fn width(&self, text: &str, _font: &str, size: f32) -> f32 {
        text.chars().count() as f32 * self.em * size
    }
}

pub fn release(artists: &[&str], tracks: &[(&str, &str)]) -> Release {
    Release {
        title: tracks.first().map(|(_, t)| t.to_string()).unwrap_or_default(),
        artists: artists.iter().map(|a| a.to_string()).collect(),
        tracklist: tracks.iter().map(|(p, t)| Track::new(*p, *t)).collect(),
        labels: vec![LabelInfo {
            name: "Stax".to_string(),
            catalog_number: "S-101".to_string(),
        }],
    }
}

/// `n` distinct two-sided singles.
pub fn releases(n: usize) -> Vec<Release> {
    (1..=n)
        .map(|i| {
            let a = format!("Hit Number {i}");
            let b = format!("Flip Side {i}");
            release(&["The Testers"], &[("A", a.as_str()), ("B", b.as_str())])
        })
        .collect()
}

/// A 3 × 1 inch outline with one inner panel.
pub const TEMPLATE_SVG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="216" height="72" viewBox="0 0 216 72">
  <rect x="1" y="1" width="214" height="70" style="fill:#000000;fill-opacity:1;stroke:#000000;stroke-width:1"/>
  <rect x="10" y="24" width="196" height="24" style="fill:#000000;fill-opacity:1"/>
</svg>
"#;

/// Scratch directory holding `template.svg`.
pub struct Workspace {
    pub dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(dir.path().join("template.svg"), TEMPLATE_SVG).expect("write template");
        Self { dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }

    /// Default config pointing at the scratch template.
    pub fn config(&self) -> RunConfig {
        RunConfig {
            template_path: self.path("template.svg"),
            ..RunConfig::default()
        }
    }

    /// A config that fits exactly two columns and three rows (six labels) on a letter page.
    pub fn six_up_config(&self) -> RunConfig {
        RunConfig {
            margin_top: 792.0 - 3.0 * INCH - 1.0,
            v_spacing: 0.0,
            ..self.config()
        }
    }
}

pub fn read(path: &Path) -> Vec<u8> {
    fs::read(path).expect("read generated file")
}

/// Page objects in a generated document.
pub fn page_count(pdf: &[u8]) -> usize {
    let text = String::from_utf8_lossy(pdf);
    Regex::new(r"/Type /Page\b")
        .expect("valid regex")
        .find_iter(&text)
        .count()
}

/// `[w, h]` of every page MediaBox, in document order.
pub fn media_boxes(pdf: &[u8]) -> Vec<(f32, f32)> {
    let text = String::from_utf8_lossy(pdf);
    Regex::new(r"/MediaBox \[([^\]]*)\]")
        .expect("valid regex")
        .captures_iter(&text)
        .filter_map(|c| {
            let nums: Vec<f32> = c[1].split_whitespace().filter_map(|s| s.parse().ok()).collect();
            (nums.len() == 4).then(|| (nums[2] - nums[0], nums[3] - nums[1]))
        })
        .collect()
}

/// Every stream that inflates as zlib data, in document order.
pub fn inflated_streams(pdf: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(found) = find(&pdf[pos..], b"stream\n") {
        let start = pos + found;
        pos = start + b"stream\n".len();
        if start >= 3 && &pdf[start - 3..start] == b"end" {
            continue;
        }
        let Some(len) = find(&pdf[pos..], b"\nendstream") else {
            break;
        };
        if let Ok(data) = miniz_oxide::inflate::decompress_to_vec_zlib(&pdf[pos..pos + len]) {
            out.push(String::from_utf8_lossy(&data).into_owned());
        }
        pos += len;
    }
    out
}

/// Template placements (`x`, `y`) per page content stream.
pub fn label_origins_per_page(pdf: &[u8]) -> Vec<Vec<(f32, f32)>> {
    let re = Regex::new(r"([-\d.]+) ([-\d.]+) cm\s+/Tpl Do").expect("valid regex");
    inflated_streams(pdf)
        .iter()
        .filter(|s| s.contains("/Tpl Do"))
        .map(|s| {
            re.captures_iter(s)
                .map(|c| (c[1].parse().unwrap(), c[2].parse().unwrap()))
                .collect()
        })
        .collect()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {expected}, got {actual}"
    );
}
