use pdf_writer::{Content, Name, Str};

use crate::config::{INCH, RunConfig};
use crate::fonts::FontSet;
use crate::grid::Slot;
use crate::model::Release;
use crate::sides::{SideTitles, assign_sides};
use crate::text::{TextMeasure, fit_to_width, wrap};

const TITLE_START_SIZE: f32 = 12.0;
const ARTIST_SIZE: f32 = 10.0;
const FOOTER_SIZE: f32 = 6.0;
const TITLE_LINE_STEP: f32 = (0.15 * INCH) as f32;
const ARTIST_LINE_STEP: f32 = (0.12 * INCH) as f32;
const TEXT_PADDING: f32 = (0.05 * INCH) as f32;
const FOOTER_INSET: f32 = (0.06 * INCH) as f32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    Left,
    Center,
    Right,
}

/// One line of text with its baseline anchor point in page space.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedText {
    pub text: String,
    pub font: String,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub anchor: Anchor,
}

/// Everything drawn for one release, before anything touches the page.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelLayout {
    pub slot: Slot,
    pub sides: SideTitles,
    pub artists: String,
    pub side_a: Vec<PlacedText>,
    pub artist_lines: Vec<PlacedText>,
    pub side_b: Vec<PlacedText>,
    pub footer: Vec<PlacedText>,
}

impl LabelLayout {
    pub fn texts(&self) -> impl Iterator<Item = &PlacedText> {
        self.side_a
            .iter()
            .chain(&self.artist_lines)
            .chain(&self.side_b)
            .chain(&self.footer)
    }
}

fn stack_lines(
    lines: Vec<String>,
    font: &str,
    size: f32,
    x: f32,
    first_baseline: f32,
    step: f32,
) -> Vec<PlacedText> {
    lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| PlacedText {
            text,
            font: font.to_string(),
            size,
            x,
            y: first_baseline - i as f32 * step,
            anchor: Anchor::Center,
        })
        .collect()
}

/// Lay out the texts of one label in `slot`.
pub fn layout_label<M: TextMeasure + ?Sized>(
    release: &Release,
    slot: Slot,
    config: &RunConfig,
    measure: &M,
) -> LabelLayout {
    let (w, h) = (config.label_width as f32, config.label_height as f32);
    let (x, y) = (slot.x, slot.y);
    let center_x = x + w / 2.0;
    let text_width = w - 2.0 * TEXT_PADDING;

    let artists = release.artist_line();
    let sides = assign_sides(&release.tracklist);
    let (label_name, catalog_number) = release.primary_label();

    let title_font = config.title_font.as_str();

    let size_a = fit_to_width(measure, &sides.side_a, title_font, TITLE_START_SIZE, text_width);
    let side_a = stack_lines(
        wrap(measure, &sides.side_a, title_font, size_a, text_width),
        title_font,
        size_a,
        center_x,
        y + 3.0 * h / 4.0,
        TITLE_LINE_STEP,
    );

    let artist_lines = stack_lines(
        wrap(measure, &artists, &config.artist_font, ARTIST_SIZE, text_width),
        &config.artist_font,
        ARTIST_SIZE,
        center_x,
        y + h / 2.0 - ARTIST_SIZE / 3.0,
        ARTIST_LINE_STEP,
    );

    let size_b = fit_to_width(measure, &sides.side_b, title_font, TITLE_START_SIZE, text_width);
    let side_b = stack_lines(
        wrap(measure, &sides.side_b, title_font, size_b, text_width),
        title_font,
        size_b,
        center_x,
        y + h / 4.0 - size_b * 2.0 / 3.0,
        TITLE_LINE_STEP,
    );

    let mut footer = Vec::new();
    if config.show_label_name {
        footer.push(PlacedText {
            text: label_name.to_string(),
            font: config.other_font.clone(),
            size: FOOTER_SIZE,
            x: x + TEXT_PADDING,
            y: y + FOOTER_INSET,
            anchor: Anchor::Left,
        });
    }
    if config.show_catalog_number {
        footer.push(PlacedText {
            text: catalog_number.to_string(),
            font: config.other_font.clone(),
            size: FOOTER_SIZE,
            x: x + w - FOOTER_INSET,
            y: y + FOOTER_INSET,
            anchor: Anchor::Right,
        });
    }

    LabelLayout {
        slot,
        sides,
        artists,
        side_a,
        artist_lines,
        side_b,
        footer,
    }
}

/// Draw the template and every text of `layout` into a fresh content stream.
pub(super) fn draw_label(layout: &LabelLayout, template_name: &str, fonts: &mut FontSet) -> Content {
    let mut content = Content::new();

    content.save_state();
    content.transform([1.0, 0.0, 0.0, 1.0, layout.slot.x, layout.slot.y]);
    content.x_object(Name(template_name.as_bytes()));
    content.restore_state();

    content.set_fill_gray(0.0);
    for placed in layout.texts() {
        if placed.text.is_empty() {
            continue;
        }
        let width = fonts.width(&placed.text, &placed.font, placed.size);
        let start_x = match placed.anchor {
            Anchor::Left => placed.x,
            Anchor::Center => placed.x - width / 2.0,
            Anchor::Right => placed.x - width,
        };
        let Some(entry) = fonts.get_mut(&placed.font) else {
            log::warn!("Font {:?} was not registered; skipping text", placed.font);
            continue;
        };
        let bytes = entry.encode(&placed.text);
        content
            .begin_text()
            .set_font(Name(entry.pdf_name.as_bytes()), placed.size)
            .next_line(start_x, placed.y)
            .show(Str(&bytes))
            .end_text();
    }
    content
}
