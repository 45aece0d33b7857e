pub mod collect;
pub mod config;
mod error;
mod fonts;
pub mod grid;
pub mod model;
mod pdf;
pub mod sides;
pub mod template;
pub mod text;

pub use config::{INCH, PageSize, RunConfig};
pub use error::Error;
pub use fonts::StandardMetrics;
pub use grid::{Grid, Placement, Slot};
pub use model::{LabelInfo, Release, Track};
pub use pdf::{Anchor, LabelLayout, LabelWriter, PlacedText, layout_label};
pub use sides::{SideTitles, assign_sides};
pub use template::{RecoloredTemplate, TemplateColors};
pub use text::TextMeasure;

use std::path::Path;
use std::time::Instant;

/// Output file name used when the caller does not choose one.
pub const DEFAULT_OUTPUT: &str = "Discogs_Jukebox_Labels.pdf";

const PROGRESS_EVERY: usize = 10;

/// Read a JSON array of release records.
pub fn load_releases(path: &Path) -> Result<Vec<Release>, Error> {
    let data = std::fs::read(path).map_err(|e| Error::io_at(e, path))?;
    Ok(serde_json::from_slice(&data)?)
}

/// Render `releases` into a finished PDF, honouring `config.limit`.
pub fn render_labels(config: &RunConfig, releases: &[Release]) -> Result<Vec<u8>, Error> {
    let mut writer = LabelWriter::new(config.clone())?;
    render_into(&mut writer, releases);
    writer.finish()
}

fn render_into(writer: &mut LabelWriter, releases: &[Release]) {
    let count = writer
        .config()
        .limit
        .map_or(releases.len(), |n| n.min(releases.len()));
    if count < releases.len() {
        log::info!("Limiting run to {} of {} releases", count, releases.len());
    }

    for (i, release) in releases[..count].iter().enumerate() {
        writer.add_label(release);
        if (i + 1) % PROGRESS_EVERY == 0 {
            log::info!("Processed {} labels...", i + 1);
        }
    }
}

/// Render `releases` and write the document to `output`.
pub fn generate_labels(config: &RunConfig, releases: &[Release], output: &Path) -> Result<(), Error> {
    let t0 = Instant::now();

    let mut writer = LabelWriter::new(config.clone())?;
    let t_template = t0.elapsed();

    render_into(&mut writer, releases);
    let labels = writer.label_count();
    let pages = writer.page_count();
    let t_render = t0.elapsed();

    let bytes = writer.finish()?;
    std::fs::write(output, &bytes).map_err(|e| Error::io_at(e, output))?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: template={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms ({} labels, {} pages, output {} bytes)",
        t_template.as_secs_f64() * 1000.0,
        (t_render - t_template).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        labels,
        pages,
        bytes.len(),
    );
    log::info!("Labels saved to {}", output.display());

    Ok(())
}
