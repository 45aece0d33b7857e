use std::collections::HashMap;

use pdf_writer::types::{LineCapStyle, LineJoinStyle};
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref};
use usvg::tiny_skia_path::PathSegment;

use crate::template::RecoloredTemplate;

/// The template written once as a Form XObject and placed per label with `Do`.
pub(super) struct TemplateForm {
    pub(super) pdf_name: String,
    pub(super) form_ref: Ref,
}

/// Alpha pairs (fill, stroke) quantised to 1/1000 so equal opacities share a state.
type AlphaKey = (u16, u16);

struct FormBuilder {
    content: Content,
    alpha_states: HashMap<AlphaKey, String>,
    unsupported_paint: usize,
    skipped_images: usize,
}

fn quantise(alpha: f32) -> u16 {
    (alpha.clamp(0.0, 1.0) * 1000.0).round() as u16
}

impl FormBuilder {
    fn set_alpha(&mut self, fill: f32, stroke: f32) {
        let key = (quantise(fill), quantise(stroke));
        if key == (1000, 1000) {
            return;
        }
        let next = self.alpha_states.len() + 1;
        let name = self
            .alpha_states
            .entry(key)
            .or_insert_with(|| format!("Gs{next}"))
            .clone();
        self.content.set_parameters(Name(name.as_bytes()));
    }

    fn paint_rgb(&mut self, paint: &usvg::Paint) -> [f32; 3] {
        match paint {
            usvg::Paint::Color(c) => [
                c.red as f32 / 255.0,
                c.green as f32 / 255.0,
                c.blue as f32 / 255.0,
            ],
            _ => {
                self.unsupported_paint += 1;
                [0.0, 0.0, 0.0]
            }
        }
    }

    fn trace(&mut self, data: &usvg::tiny_skia_path::Path) {
        let mut last = (0.0f32, 0.0f32);
        for seg in data.segments() {
            match seg {
                PathSegment::MoveTo(p) => {
                    self.content.move_to(p.x, p.y);
                    last = (p.x, p.y);
                }
                PathSegment::LineTo(p) => {
                    self.content.line_to(p.x, p.y);
                    last = (p.x, p.y);
                }
                PathSegment::QuadTo(c, p) => {
                    // Degree elevation: PDF only has cubic curves.
                    let c1 = (last.0 + 2.0 / 3.0 * (c.x - last.0), last.1 + 2.0 / 3.0 * (c.y - last.1));
                    let c2 = (p.x + 2.0 / 3.0 * (c.x - p.x), p.y + 2.0 / 3.0 * (c.y - p.y));
                    self.content.cubic_to(c1.0, c1.1, c2.0, c2.1, p.x, p.y);
                    last = (p.x, p.y);
                }
                PathSegment::CubicTo(c1, c2, p) => {
                    self.content.cubic_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y);
                    last = (p.x, p.y);
                }
                PathSegment::Close => {
                    self.content.close_path();
                }
            }
        }
    }

    fn path(&mut self, path: &usvg::Path, group_opacity: f32) {
        if !path.is_visible() || (path.fill().is_none() && path.stroke().is_none()) {
            return;
        }
        let t = path.abs_transform();

        self.content.save_state();
        self.content.transform([t.sx, t.ky, t.kx, t.sy, t.tx, t.ty]);

        let fill_alpha = path.fill().map_or(1.0, |f| f.opacity().get()) * group_opacity;
        let stroke_alpha = path.stroke().map_or(1.0, |s| s.opacity().get()) * group_opacity;
        self.set_alpha(fill_alpha, stroke_alpha);

        if let Some(fill) = path.fill() {
            let [r, g, b] = self.paint_rgb(fill.paint());
            self.content.set_fill_rgb(r, g, b);
        }
        if let Some(stroke) = path.stroke() {
            let [r, g, b] = self.paint_rgb(stroke.paint());
            self.content.set_stroke_rgb(r, g, b);
            self.content.set_line_width(stroke.width().get());
            self.content.set_line_cap(match stroke.linecap() {
                usvg::LineCap::Butt => LineCapStyle::ButtCap,
                usvg::LineCap::Round => LineCapStyle::RoundCap,
                usvg::LineCap::Square => LineCapStyle::ProjectingSquareCap,
            });
            self.content.set_line_join(match stroke.linejoin() {
                usvg::LineJoin::Miter | usvg::LineJoin::MiterClip => LineJoinStyle::MiterJoin,
                usvg::LineJoin::Round => LineJoinStyle::RoundJoin,
                usvg::LineJoin::Bevel => LineJoinStyle::BevelJoin,
            });
            self.content.set_miter_limit(stroke.miterlimit().get());
            if let Some(dashes) = stroke.dasharray() {
                self.content
                    .set_dash_pattern(dashes.iter().copied(), stroke.dashoffset());
            }
        }

        self.trace(path.data());

        let even_odd = path
            .fill()
            .is_some_and(|f| f.rule() == usvg::FillRule::EvenOdd);
        match (path.fill().is_some(), path.stroke().is_some(), even_odd) {
            (true, true, false) => self.content.fill_nonzero_and_stroke(),
            (true, true, true) => self.content.fill_even_odd_and_stroke(),
            (true, false, false) => self.content.fill_nonzero(),
            (true, false, true) => self.content.fill_even_odd(),
            _ => self.content.stroke(),
        };
        self.content.restore_state();
    }

    fn group(&mut self, group: &usvg::Group, parent_opacity: f32) {
        let opacity = parent_opacity * group.opacity().get();
        for node in group.children() {
            match node {
                usvg::Node::Group(g) => self.group(g.as_ref(), opacity),
                usvg::Node::Path(p) => self.path(p.as_ref(), opacity),
                usvg::Node::Text(t) => self.group(t.flattened(), opacity),
                usvg::Node::Image(_) => self.skipped_images += 1,
            }
        }
    }
}

/// Write the template drawing as a Form XObject whose origin is the bottom-left
/// corner of the label.
pub(super) fn write_template_form(
    pdf: &mut Pdf,
    template: &RecoloredTemplate,
    alloc: &mut impl FnMut() -> Ref,
) -> TemplateForm {
    let (width, height) = template.size();
    let mut builder = FormBuilder {
        content: Content::new(),
        alpha_states: HashMap::new(),
        unsupported_paint: 0,
        skipped_images: 0,
    };

    // SVG is y-down from the top-left corner.
    builder.content.save_state();
    builder.content.transform([1.0, 0.0, 0.0, -1.0, 0.0, height]);
    builder.group(template.tree().root(), 1.0);
    builder.content.restore_state();

    if builder.unsupported_paint > 0 {
        log::warn!(
            "Template: {} gradient/pattern paints drawn as solid black",
            builder.unsupported_paint
        );
    }
    if builder.skipped_images > 0 {
        log::warn!("Template: {} embedded images skipped", builder.skipped_images);
    }

    let mut alpha_refs: Vec<(String, Ref, AlphaKey)> = builder
        .alpha_states
        .into_iter()
        .map(|(key, name)| (name, alloc(), key))
        .collect();
    alpha_refs.sort_by(|a, b| a.0.cmp(&b.0));
    for (_, gs_ref, (fill, stroke)) in &alpha_refs {
        pdf.ext_graphics(*gs_ref)
            .non_stroking_alpha(*fill as f32 / 1000.0)
            .stroking_alpha(*stroke as f32 / 1000.0);
    }

    let raw = builder.content.finish();
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
    let form_ref = alloc();
    {
        let mut form = pdf.form_xobject(form_ref, &compressed);
        form.filter(Filter::FlateDecode);
        form.bbox(Rect::new(0.0, 0.0, width, height));
        if !alpha_refs.is_empty() {
            let mut resources = form.resources();
            let mut states = resources.ext_g_states();
            for (name, gs_ref, _) in &alpha_refs {
                states.pair(Name(name.as_bytes()), *gs_ref);
            }
        }
    }

    log::debug!(
        "Template form: {:.1}x{:.1}pt, {} compressed bytes, {} alpha states",
        width,
        height,
        compressed.len(),
        alpha_refs.len(),
    );

    TemplateForm {
        pdf_name: "Tpl".to_string(),
        form_ref,
    }
}
