use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::OnceLock;

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::{Face, GlyphId};

use crate::error::Error;
use crate::text::TextMeasure;

/// Family/style parsed from a PostScript-style name such as `Helvetica-BoldOblique`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FontRequest {
    pub(crate) family: String,
    pub(crate) bold: bool,
    pub(crate) italic: bool,
}

const STYLE_SUFFIXES: [(&str, bool, bool); 8] = [
    ("-BoldOblique", true, true),
    ("-BoldItalic", true, true),
    ("-Bold", true, false),
    ("-Oblique", false, true),
    ("-Italic", false, true),
    ("-Regular", false, false),
    ("-Roman", false, false),
    ("-Book", false, false),
];

pub(crate) fn parse_font_name(name: &str) -> FontRequest {
    let name = name.trim();
    for (suffix, bold, italic) in STYLE_SUFFIXES {
        if let Some(family) = name.strip_suffix(suffix)
            && !family.is_empty()
        {
            return FontRequest {
                family: family.to_string(),
                bold,
                italic,
            };
        }
    }
    FontRequest {
        family: name.to_string(),
        bold: false,
        italic: false,
    }
}

/// (lowercase family name, bold, italic) -> (file path, face index within TTC)
type FontLookup = HashMap<(String, bool, bool), (PathBuf, u32)>;

static FONT_INDEX: OnceLock<FontLookup> = OnceLock::new();

fn font_family_name(face: &Face) -> Option<String> {
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::FAMILY
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
    }
    None
}

fn read_font_style(data: &[u8], face_index: u32) -> Option<(String, bool, bool)> {
    let face = Face::parse(data, face_index).ok()?;
    let family = font_family_name(&face)?;
    Some((family, face.is_bold(), face.is_italic()))
}

fn font_directories() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    if let Ok(val) = std::env::var("JUKEBOX_LABELS_FONTS") {
        let sep = if cfg!(windows) { ';' } else { ':' };
        for part in val.split(sep) {
            let trimmed = part.trim();
            if !trimmed.is_empty() {
                dirs.push(PathBuf::from(trimmed));
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        dirs.extend([
            "/Library/Fonts".into(),
            "/System/Library/Fonts".into(),
            "/System/Library/Fonts/Supplemental".into(),
        ]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(&home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.extend(["/usr/share/fonts".into(), "/usr/local/share/fonts".into()]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(windir) = std::env::var("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        } else {
            dirs.push("C:\\Windows\\Fonts".into());
        }
    }

    dirs
}

fn is_font_file(path: &std::path::Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("ttf" | "otf" | "ttc")
    )
}

fn is_font_collection(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ttc"))
}

fn scan_font_dirs() -> FontLookup {
    let t0 = std::time::Instant::now();
    let mut index = FontLookup::new();
    let mut files_scanned = 0u32;
    let mut visited_dirs: HashSet<PathBuf> = HashSet::new();

    let mut stack: Vec<PathBuf> = font_directories();
    while let Some(dir) = stack.pop() {
        if !visited_dirs.insert(dir.clone()) {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if !is_font_file(&path) {
                continue;
            }
            files_scanned += 1;
            let Ok(file) = std::fs::File::open(&path) else {
                continue;
            };
            let Ok(data) = (unsafe { Mmap::map(&file) }) else {
                continue;
            };
            let face_count = if is_font_collection(&path) {
                ttf_parser::fonts_in_collection(&data).unwrap_or(1)
            } else {
                1
            };
            for face_idx in 0..face_count {
                if let Some((family, bold, italic)) = read_font_style(&data, face_idx) {
                    index
                        .entry((family.to_lowercase(), bold, italic))
                        .or_insert((path.clone(), face_idx));
                }
            }
        }
    }

    log::info!(
        "Font scan: {:.1}ms, {} files parsed → {} entries",
        t0.elapsed().as_secs_f64() * 1000.0,
        files_scanned,
        index.len(),
    );

    index
}

fn get_font_index() -> &'static FontLookup {
    FONT_INDEX.get_or_init(scan_font_dirs)
}

/// Look up a font file by family name and style.
/// Falls back to the regular variant if the requested bold/italic is not available.
fn find_font_file(req: &FontRequest) -> Option<(PathBuf, u32)> {
    let index = get_font_index();
    let key = req.family.to_lowercase();
    index
        .get(&(key.clone(), req.bold, req.italic))
        .or_else(|| {
            if req.bold || req.italic {
                index.get(&(key, false, false))
            } else {
                None
            }
        })
        .cloned()
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes, dropping unmappable chars.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(char_to_winansi)
        .filter(|&b| b != 0)
        .collect()
}

static HELVETICA_WIDTHS: OnceLock<Vec<f32>> = OnceLock::new();

/// Approximate Helvetica widths at 1000 units/em for WinAnsi chars 32..=255.
fn helvetica_widths() -> &'static [f32] {
    HELVETICA_WIDTHS.get_or_init(|| {
        (32u8..=255u8)
            .map(|b| match b {
                32 => 278.0,                          // space
                33..=47 => 333.0,                     // punctuation
                48..=57 => 556.0,                     // digits
                58..=64 => 333.0,                     // more punctuation
                73 | 74 => 278.0,                     // I J (narrow uppercase)
                77 => 833.0,                          // M (wide)
                65..=90 => 667.0,                     // uppercase A-Z (average)
                91..=96 => 333.0,                     // brackets etc.
                102 | 105 | 106 | 108 | 116 => 278.0, // narrow lowercase: f i j l t
                109 | 119 => 833.0,                   // m w (wide)
                97..=122 => 556.0,                    // lowercase a-z (average)
                _ => 556.0,
            })
            .collect()
    })
}

/// Width of `text` in a base-14 font, measured with the Helvetica table.
fn standard_width(text: &str, size: f32) -> f32 {
    let widths = helvetica_widths();
    to_winansi_bytes(text)
        .iter()
        .filter(|&&b| b >= 32)
        .map(|&b| widths[(b - 32) as usize])
        .sum::<f32>()
        * size
        / 1000.0
}

/// Text measurement with base-14 metrics only, for layout without a document.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardMetrics;

impl TextMeasure for StandardMetrics {
    fn width(&self, text: &str, _font: &str, size: f32) -> f32 {
        standard_width(text, size)
    }
}

/// Base-14 font used when nothing matching is installed.
fn standard_font_name(req: &FontRequest) -> &'static str {
    let family = req.family.to_lowercase();
    match (family.as_str(), req.bold, req.italic) {
        ("times" | "times new roman", false, false) => "Times-Roman",
        ("times" | "times new roman", true, false) => "Times-Bold",
        ("times" | "times new roman", false, true) => "Times-Italic",
        ("times" | "times new roman", true, true) => "Times-BoldItalic",
        ("courier" | "courier new", false, false) => "Courier",
        ("courier" | "courier new", true, false) => "Courier-Bold",
        ("courier" | "courier new", false, true) => "Courier-Oblique",
        ("courier" | "courier new", true, true) => "Courier-BoldOblique",
        (_, false, false) => "Helvetica",
        (_, true, false) => "Helvetica-Bold",
        (_, false, true) => "Helvetica-Oblique",
        (_, true, true) => "Helvetica-BoldOblique",
    }
}

struct TrueTypeFont {
    family: String,
    data: Vec<u8>,
    face_index: u32,
    units_per_em: f32,
    remapper: subsetter::GlyphRemapper,
    /// char -> (original gid, subset gid), filled as text is encoded.
    used: BTreeMap<char, (u16, u16)>,
}

impl TrueTypeFont {
    fn load(path: &std::path::Path, face_index: u32, family: &str) -> Option<Self> {
        let data = std::fs::read(path).ok()?;
        let face = Face::parse(&data, face_index).ok()?;
        let units_per_em = face.units_per_em() as f32;
        Some(Self {
            family: family.to_string(),
            data,
            face_index,
            units_per_em,
            remapper: subsetter::GlyphRemapper::new(),
            used: BTreeMap::new(),
        })
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, self.face_index).ok()
    }

    fn width(&self, text: &str, size: f32) -> f32 {
        let Some(face) = self.face() else {
            return 0.0;
        };
        // Missing glyphs are drawn as .notdef, so they take its advance.
        let units: f32 = text
            .chars()
            .map(|ch| face.glyph_index(ch).unwrap_or(GlyphId(0)))
            .filter_map(|gid| face.glyph_hor_advance(gid))
            .map(|adv| adv as f32)
            .sum();
        units / self.units_per_em * size
    }

    /// Big-endian 2-byte subset glyph IDs; unknown chars map to .notdef.
    fn encode(&mut self, text: &str) -> Vec<u8> {
        let Some(face) = Face::parse(&self.data, self.face_index).ok() else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(text.len() * 2);
        for ch in text.chars() {
            let new_gid = match self.used.get(&ch) {
                Some(&(_, new_gid)) => new_gid,
                None => match face.glyph_index(ch) {
                    Some(gid) => {
                        let new_gid = self.remapper.remap(gid.0);
                        self.used.insert(ch, (gid.0, new_gid));
                        new_gid
                    }
                    None => 0,
                },
            };
            out.extend_from_slice(&new_gid.to_be_bytes());
        }
        out
    }

    /// Embed a subset of the font as a CIDFont (Type0 composite) with Identity-H encoding.
    fn embed(&self, pdf: &mut Pdf, font_ref: Ref, alloc: &mut impl FnMut() -> Ref) -> Result<(), Error> {
        let face = self
            .face()
            .ok_or_else(|| Error::Pdf(format!("cannot re-parse font {}", self.family)))?;
        let units = self.units_per_em;
        let scale = |v: f32| v / units * 1000.0;

        let bb = face.global_bounding_box();
        let bbox = Rect::new(
            scale(bb.x_min as f32),
            scale(bb.y_min as f32),
            scale(bb.x_max as f32),
            scale(bb.y_max as f32),
        );
        let cap_height = face
            .capital_height()
            .map(|h| scale(h as f32))
            .unwrap_or(700.0);

        let subset_data = subsetter::subset(&self.data, self.face_index, &self.remapper)
            .unwrap_or_else(|e| {
                log::warn!("Font subsetting failed for {}: {e}, embedding full font", self.family);
                self.data.clone()
            });

        let descriptor_ref = alloc();
        let data_ref = alloc();
        let cid_font_ref = alloc();
        let tounicode_ref = alloc();

        let data_len = i32::try_from(subset_data.len())
            .map_err(|_| Error::Pdf(format!("font {} too large to embed", self.family)))?;
        pdf.stream(data_ref, &subset_data)
            .pair(Name(b"Length1"), data_len);

        let ps_name = self.family.replace(' ', "");

        pdf.font_descriptor(descriptor_ref)
            .name(Name(ps_name.as_bytes()))
            .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
            .bbox(bbox)
            .italic_angle(0.0)
            .ascent(scale(face.ascender() as f32))
            .descent(scale(face.descender() as f32))
            .cap_height(cap_height)
            .stem_v(80.0)
            .font_file2(data_ref);

        let system_info = pdf_writer::types::SystemInfo {
            registry: pdf_writer::Str(b"Adobe"),
            ordering: pdf_writer::Str(b"Identity"),
            supplement: 0,
        };
        {
            let mut cid = pdf.cid_font(cid_font_ref);
            cid.subtype(pdf_writer::types::CidFontType::Type2);
            cid.base_font(Name(ps_name.as_bytes()));
            cid.system_info(system_info);
            cid.font_descriptor(descriptor_ref);
            cid.default_width(0.0);
            cid.cid_to_gid_map_predefined(Name(b"Identity"));
            let mut gid_widths: Vec<(u16, f32)> = self
                .used
                .values()
                .map(|&(gid, new_gid)| {
                    let adv = face
                        .glyph_hor_advance(ttf_parser::GlyphId(gid))
                        .unwrap_or(0);
                    (new_gid, scale(adv as f32))
                })
                .collect();
            gid_widths.sort_by_key(|&(gid, _)| gid);
            if !gid_widths.is_empty() {
                let mut w = cid.widths();
                for &(gid, width) in &gid_widths {
                    w.consecutive(gid, [width]);
                }
            }
        }

        let cmap_name = format!("{}-UTF16", ps_name);
        let mut cmap = pdf_writer::types::UnicodeCmap::new(
            Name(cmap_name.as_bytes()),
            pdf_writer::types::SystemInfo {
                registry: pdf_writer::Str(b"Adobe"),
                ordering: pdf_writer::Str(b"Identity"),
                supplement: 0,
            },
        );
        for (&ch, &(_, new_gid)) in &self.used {
            cmap.pair(new_gid, ch);
        }
        let cmap_data = cmap.finish();
        pdf.stream(tounicode_ref, cmap_data.as_slice());

        pdf.type0_font(font_ref)
            .base_font(Name(ps_name.as_bytes()))
            .encoding_predefined(Name(b"Identity-H"))
            .descendant_font(cid_font_ref)
            .to_unicode(tounicode_ref);
        Ok(())
    }
}

enum FontKind {
    TrueType(TrueTypeFont),
    Standard { base_font: &'static str },
}

pub(crate) struct FontEntry {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    kind: FontKind,
}

impl FontEntry {
    fn width(&self, text: &str, size: f32) -> f32 {
        match &self.kind {
            FontKind::TrueType(tt) => tt.width(text, size),
            FontKind::Standard { .. } => standard_width(text, size),
        }
    }

    /// Bytes for a PDF string operand in this font's encoding.
    pub(crate) fn encode(&mut self, text: &str) -> Vec<u8> {
        match &mut self.kind {
            FontKind::TrueType(tt) => tt.encode(text),
            FontKind::Standard { .. } => to_winansi_bytes(text),
        }
    }
}

/// The fonts of one run, keyed by their configured name.
pub(crate) struct FontSet {
    entries: HashMap<String, FontEntry>,
    order: Vec<String>,
}

impl FontSet {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Resolve `font_name` to an installed font, falling back to a base-14 font.
    /// Registering the same name twice is a no-op.
    pub(crate) fn register(&mut self, font_name: &str, alloc: &mut impl FnMut() -> Ref) {
        if self.entries.contains_key(font_name) {
            return;
        }
        let t0 = std::time::Instant::now();
        let req = parse_font_name(font_name);

        let kind = find_font_file(&req)
            .and_then(|(path, face_index)| TrueTypeFont::load(&path, face_index, &req.family))
            .map(FontKind::TrueType)
            .unwrap_or_else(|| {
                let base_font = standard_font_name(&req);
                if !font_name.eq_ignore_ascii_case(base_font) {
                    log::warn!("Font not found: {font_name}, using {base_font}");
                }
                FontKind::Standard { base_font }
            });

        log::debug!(
            "register_font: {font_name} bold={} italic={} → {:.1}ms",
            req.bold,
            req.italic,
            t0.elapsed().as_secs_f64() * 1000.0,
        );

        let entry = FontEntry {
            pdf_name: format!("F{}", self.order.len() + 1),
            font_ref: alloc(),
            kind,
        };
        self.entries.insert(font_name.to_string(), entry);
        self.order.push(font_name.to_string());
    }

    pub(crate) fn get_mut(&mut self, font_name: &str) -> Option<&mut FontEntry> {
        self.entries.get_mut(font_name)
    }

    /// (resource name, object ref) pairs for page resource dictionaries.
    pub(crate) fn resource_pairs(&self) -> Vec<(String, Ref)> {
        self.order
            .iter()
            .map(|name| (self.entries[name].pdf_name.clone(), self.entries[name].font_ref))
            .collect()
    }

    /// Write every font object. Call once, after the last page has been drawn.
    pub(crate) fn embed_all(&self, pdf: &mut Pdf, alloc: &mut impl FnMut() -> Ref) -> Result<(), Error> {
        for name in &self.order {
            let entry = &self.entries[name];
            match &entry.kind {
                FontKind::TrueType(tt) => tt.embed(pdf, entry.font_ref, alloc)?,
                FontKind::Standard { base_font, .. } => {
                    pdf.type1_font(entry.font_ref)
                        .base_font(Name(base_font.as_bytes()))
                        .encoding_predefined(Name(b"WinAnsiEncoding"));
                }
            }
        }
        Ok(())
    }
}

impl TextMeasure for FontSet {
    fn width(&self, text: &str, font: &str, size: f32) -> f32 {
        match self.entries.get(font) {
            Some(entry) => entry.width(text, size),
            // Unregistered names measure as Helvetica so layout never panics.
            None => standard_width(text, size),
        }
    }
}
