use crate::config::RunConfig;
use crate::error::Error;

/// Where one label lands. `x`/`y` is the label's bottom-left corner in PDF
/// page space; row 0 is the top row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slot {
    /// 1-based page number.
    pub page_number: usize,
    pub row: usize,
    pub col: usize,
    pub x: f32,
    pub y: f32,
}

/// Result of asking the grid for the next label position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub slot: Slot,
    /// The previous page is full; it must be closed before drawing this slot.
    pub starts_new_page: bool,
}

/// Row-major tiling of fixed-size labels over identical pages.
#[derive(Clone, Debug)]
pub struct Grid {
    page_height: f64,
    label_width: f64,
    label_height: f64,
    margin_left: f64,
    margin_top: f64,
    h_spacing: f64,
    v_spacing: f64,
    per_row: usize,
    per_column: usize,
    index: usize,
    page_number: usize,
}

impl Grid {
    pub fn new(config: &RunConfig) -> Result<Self, Error> {
        let page_width = config.page_size.width;
        let page_height = config.page_size.height;
        let label_width = config.label_width;
        let label_height = config.label_height;
        let margin_left = config.margin_left;
        let margin_top = config.margin_top;
        let h_spacing = config.h_spacing;
        let v_spacing = config.v_spacing;

        // Truncating division: the trailing spacing after the last label
        // does not need to fit on the page.
        let per_row = ((page_width - margin_left + h_spacing) / (label_width + h_spacing)).floor();
        let per_column =
            ((page_height - margin_top + v_spacing) / (label_height + v_spacing)).floor();
        if !(per_row >= 1.0 && per_column >= 1.0) {
            return Err(Error::config(format!(
                "no label fits on a {:.1}x{:.1}pt page",
                page_width, page_height
            )));
        }

        Ok(Self {
            page_height,
            label_width,
            label_height,
            margin_left,
            margin_top,
            h_spacing,
            v_spacing,
            per_row: per_row as usize,
            per_column: per_column as usize,
            index: 0,
            page_number: 1,
        })
    }

    pub fn labels_per_row(&self) -> usize {
        self.per_row
    }

    pub fn labels_per_column(&self) -> usize {
        self.per_column
    }

    pub fn labels_per_page(&self) -> usize {
        self.per_row * self.per_column
    }

    /// Page the next slot would be placed on before any break.
    pub fn page_number(&self) -> usize {
        self.page_number
    }

    /// Number of slots handed out on the current page.
    pub fn used_on_page(&self) -> usize {
        self.index
    }

    pub fn label_size(&self) -> (f32, f32) {
        (self.label_width as f32, self.label_height as f32)
    }

    pub fn next_slot(&mut self) -> Placement {
        let starts_new_page = self.index >= self.labels_per_page();
        if starts_new_page {
            self.index = 0;
            self.page_number += 1;
        }

        let i = self.index;
        let col = i % self.per_row;
        let row = i / self.per_row;
        let x = self.margin_left + col as f64 * (self.label_width + self.h_spacing);
        let y = self.page_height
            - self.margin_top
            - (row + 1) as f64 * (self.label_height + self.v_spacing)
            + self.v_spacing;
        self.index += 1;

        Placement {
            slot: Slot {
                page_number: self.page_number,
                row,
                col,
                x: x as f32,
                y: y as f32,
            },
            starts_new_page,
        }
    }
}
