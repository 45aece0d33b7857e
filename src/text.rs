/// Smallest size `fit_to_width` shrinks to.
pub const MIN_FONT_SIZE: f32 = 6.0;
/// Decrement applied per shrink step.
pub const FONT_SIZE_STEP: f32 = 2.0;

/// Text measurement supplied by the rendering backend.
pub trait TextMeasure {
    /// Advance width of `text` set in `font` at `size`, in points.
    fn width(&self, text: &str, font: &str, size: f32) -> f32;
}

/// Shrink `start_size` by [`FONT_SIZE_STEP`] until `text` fits `max_width` or
/// [`MIN_FONT_SIZE`] is reached.
pub fn fit_to_width<M: TextMeasure + ?Sized>(
    measure: &M,
    text: &str,
    font: &str,
    start_size: f32,
    max_width: f32,
) -> f32 {
    fit_to_width_with(
        measure,
        text,
        font,
        start_size,
        max_width,
        MIN_FONT_SIZE,
        FONT_SIZE_STEP,
    )
}

/// Like [`fit_to_width`] with explicit bounds. The returned size may still
/// overflow when even `min_size` is too wide; overflowing text is drawn as is.
/// A non-positive `step` never shrinks.
pub fn fit_to_width_with<M: TextMeasure + ?Sized>(
    measure: &M,
    text: &str,
    font: &str,
    start_size: f32,
    max_width: f32,
    min_size: f32,
    step: f32,
) -> f32 {
    let mut size = start_size;
    if step.is_nan() || step <= 0.0 {
        return size;
    }
    while measure.width(text, font, size) > max_width && size > min_size {
        size -= step;
    }
    size
}

/// Greedy word wrap on single spaces.
///
/// A word that does not fit closes the current line even when that line is
/// still empty, and the last line is always emitted, so `wrap("")` is `[""]`.
pub fn wrap<M: TextMeasure + ?Sized>(
    measure: &M,
    text: &str,
    font: &str,
    size: f32,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in text.split(' ') {
        current.push(word);
        let candidate = current.join(" ");
        if measure.width(&candidate, font, size) > max_width {
            current.pop();
            lines.push(current.join(" "));
            current.clear();
            current.push(word);
        }
    }
    lines.push(current.join(" "));
    lines
}
