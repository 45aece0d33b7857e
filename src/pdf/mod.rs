mod form;
mod label;

use std::path::Path;

use pdf_writer::{Filter, Name, Pdf, Rect, Ref};

use crate::config::RunConfig;
use crate::error::Error;
use crate::fonts::FontSet;
use crate::grid::{Grid, Slot};
use crate::model::Release;
use crate::template::{RecoloredTemplate, TemplateColors};

use form::{TemplateForm, write_template_form};

pub use label::{Anchor, LabelLayout, PlacedText, layout_label};

/// Streams labels onto pages and assembles the final PDF.
///
/// Pages are written to the document as soon as they are full, but nothing is
/// persisted until [`LabelWriter::finish`]; dropping the writer discards the run.
pub struct LabelWriter {
    pdf: Pdf,
    next_id: i32,
    pages_id: Ref,
    config: RunConfig,
    grid: Grid,
    fonts: FontSet,
    template: RecoloredTemplate,
    form: TemplateForm,
    page_refs: Vec<Ref>,
    /// Content of the page currently being filled.
    page_content: Vec<u8>,
    labels_on_page: usize,
    labels_total: usize,
}

impl LabelWriter {
    /// Load and recolor the configured template, then prepare an empty document.
    pub fn new(config: RunConfig) -> Result<Self, Error> {
        config.validate()?;
        let template =
            RecoloredTemplate::load(&config.template_path, &TemplateColors::from_config(&config))?;
        Self::with_template(config, template)
    }

    /// Like [`LabelWriter::new`] with a template the caller already recolored.
    pub fn with_template(config: RunConfig, template: RecoloredTemplate) -> Result<Self, Error> {
        let grid = Grid::new(&config)?;
        log::info!(
            "Page layout: {} x {} labels ({} per page)",
            grid.labels_per_row(),
            grid.labels_per_column(),
            grid.labels_per_page(),
        );

        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let pages_id = alloc();

        let mut fonts = FontSet::new();
        for font in [&config.title_font, &config.artist_font, &config.other_font] {
            fonts.register(font, &mut alloc);
        }

        let form = write_template_form(&mut pdf, &template, &mut alloc);

        Ok(Self {
            pdf,
            next_id,
            pages_id,
            config,
            grid,
            fonts,
            template,
            form,
            page_refs: Vec::new(),
            page_content: Vec::new(),
            labels_on_page: 0,
            labels_total: 0,
        })
    }

    fn alloc(&mut self) -> Ref {
        let r = Ref::new(self.next_id);
        self.next_id += 1;
        r
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn template(&self) -> &RecoloredTemplate {
        &self.template
    }

    pub fn labels_per_page(&self) -> usize {
        self.grid.labels_per_page()
    }

    /// Pages the document will contain if finished now.
    pub fn page_count(&self) -> usize {
        self.page_refs.len() + 1
    }

    pub fn label_count(&self) -> usize {
        self.labels_total
    }

    /// Write the page being filled and start an empty one.
    fn close_page(&mut self) {
        let page_id = self.alloc();
        let content_id = self.alloc();

        let raw = std::mem::take(&mut self.page_content);
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);
        self.pdf
            .stream(content_id, &compressed)
            .filter(Filter::FlateDecode);

        let font_pairs = self.fonts.resource_pairs();
        let size = self.config.page_size;
        let mut page = self.pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, size.width as f32, size.height as f32))
            .parent(self.pages_id)
            .contents(content_id);
        {
            let mut resources = page.resources();
            {
                let mut fonts = resources.fonts();
                for (name, font_ref) in &font_pairs {
                    fonts.pair(Name(name.as_bytes()), *font_ref);
                }
            }
            resources
                .x_objects()
                .pair(Name(self.form.pdf_name.as_bytes()), self.form.form_ref);
        }
        drop(page);

        log::debug!(
            "Closed page {} with {} labels ({} content bytes)",
            self.page_refs.len() + 1,
            self.labels_on_page,
            compressed.len(),
        );
        self.page_refs.push(page_id);
        self.labels_on_page = 0;
    }

    /// Place `release` in the next free slot, starting a new page when the
    /// current one is full.
    ///
    /// The label is laid out and drawn into its own buffer first and appended
    /// to the page in one piece.
    pub fn add_label(&mut self, release: &Release) -> Slot {
        let placement = self.grid.next_slot();
        if placement.starts_new_page {
            self.close_page();
            log::info!("Starting new page: {}", placement.slot.page_number);
        }

        let layout = layout_label(release, placement.slot, &self.config, &self.fonts);
        log::debug!(
            "Label {} (page {}, row {}, col {}): {} | A: {:?} | B: {:?}",
            self.labels_total + 1,
            placement.slot.page_number,
            placement.slot.row,
            placement.slot.col,
            layout.artists,
            layout.sides.side_a,
            layout.sides.side_b,
        );

        let content = label::draw_label(&layout, &self.form.pdf_name, &mut self.fonts);
        self.page_content
            .extend_from_slice(content.finish().as_slice());

        self.labels_on_page += 1;
        self.labels_total += 1;
        placement.slot
    }

    /// Close the last page, embed fonts and serialize the document.
    pub fn finish(mut self) -> Result<Vec<u8>, Error> {
        if self.labels_total == 0 {
            log::warn!("No labels were added; writing a single blank page");
        }
        self.close_page();

        let mut next_id = self.next_id;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };
        self.fonts.embed_all(&mut self.pdf, &mut alloc)?;

        let catalog_id = alloc();
        self.pdf.catalog(catalog_id).pages(self.pages_id);
        self.pdf
            .pages(self.pages_id)
            .kids(self.page_refs.iter().copied())
            .count(self.page_refs.len() as i32);

        log::info!(
            "Document finished: {} labels on {} pages",
            self.labels_total,
            self.page_refs.len(),
        );
        Ok(self.pdf.finish())
    }

    /// [`LabelWriter::finish`] and write the bytes to `path`.
    pub fn save(self, path: &Path) -> Result<usize, Error> {
        let bytes = self.finish()?;
        std::fs::write(path, &bytes).map_err(|e| Error::io_at(e, path))?;
        Ok(bytes.len())
    }
}
