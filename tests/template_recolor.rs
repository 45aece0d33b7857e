mod common;

use jukebox_labels::template::{RecolorState, recolor_svg};
use jukebox_labels::{Error, RecoloredTemplate, TemplateColors};

fn red_half() -> TemplateColors {
    TemplateColors {
        stroke: "#00FF00".to_string(),
        fill: "#FF0000".to_string(),
        fill_opacity: 0.5,
    }
}

fn styles(svg: &str) -> Vec<String> {
    let doc = roxmltree::Document::parse(svg).unwrap();
    doc.descendants()
        .filter_map(|n| n.attribute("style").map(str::to_string))
        .collect()
}

#[test]
fn first_fill_takes_the_label_colour_later_ones_go_white() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
        <rect style="fill:#000000;fill-opacity:1"/>
        <rect style="fill:#000000;fill-opacity:1"/>
    </svg>"#;
    let out = recolor_svg(svg, &red_half()).unwrap();
    assert_eq!(
        styles(&out),
        vec!["fill:#FF0000;fill-opacity:0.5", "fill:#FFFFFF;fill-opacity:1.0"]
    );
}

#[test]
fn stroke_is_rewritten_everywhere() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
        <rect style="stroke:#000000;stroke-width:2"/>
        <g><path style="stroke:blue"/></g>
    </svg>"#;
    let out = recolor_svg(svg, &red_half()).unwrap();
    assert_eq!(
        styles(&out),
        vec!["stroke:#00FF00;stroke-width:2", "stroke:#00FF00"]
    );
}

#[test]
fn fill_and_opacity_are_spent_independently() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
        <rect style="fill:#123456"/>
        <rect style="fill-opacity:0.2;fill:#123456"/>
        <rect style="fill-opacity:0.3"/>
    </svg>"#;
    let out = recolor_svg(svg, &red_half()).unwrap();
    assert_eq!(
        styles(&out),
        vec![
            "fill:#FF0000",
            "fill-opacity:0.5;fill:#FFFFFF",
            "fill-opacity:1.0",
        ]
    );
}

#[test]
fn document_order_is_depth_first() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
        <g style="fill:#111111"><rect style="fill:#222222"/></g>
        <rect style="fill:#333333"/>
    </svg>"#;
    let out = recolor_svg(svg, &red_half()).unwrap();
    assert_eq!(
        styles(&out),
        vec!["fill:#FF0000", "fill:#FFFFFF", "fill:#FFFFFF"]
    );
}

#[test]
fn presentation_attributes_and_markup_are_untouched() {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg"><!-- outline -->
  <rect fill="#000000" x="1" style="fill:black;  font-size:4px ;" id='r1'/>
</svg>"##;
    let out = recolor_svg(svg, &red_half()).unwrap();
    let expected = r##"<svg xmlns="http://www.w3.org/2000/svg"><!-- outline -->
  <rect fill="#000000" x="1" style="fill:#FF0000;font-size:4px;" id='r1'/>
</svg>"##;
    assert_eq!(out, expected);
}

#[test]
fn whole_opacity_is_written_with_one_decimal() {
    let colors = TemplateColors {
        fill_opacity: 1.0,
        ..red_half()
    };
    let mut state = RecolorState::new();
    assert_eq!(state.rewrite_style("fill-opacity:0.1", &colors), "fill-opacity:1.0");
    assert_eq!(state.rewrite_style("fill-opacity:0.1", &colors), "fill-opacity:1.0");
}

#[test]
fn state_carries_across_calls() {
    let colors = red_half();
    let mut state = RecolorState::new();
    assert_eq!(state.rewrite_style("fill:#000", &colors), "fill:#FF0000");
    assert_eq!(state.rewrite_style("fill:#000", &colors), "fill:#FFFFFF");

    let mut fresh = RecolorState::new();
    assert_eq!(fresh.rewrite_style("fill:#000", &colors), "fill:#FF0000");
}

#[test]
fn entries_without_a_colon_pass_through() {
    let mut state = RecolorState::new();
    assert_eq!(state.rewrite_style("bogus;fill:#000", &red_half()), "bogus;fill:#FF0000");
}

#[test]
fn malformed_template_is_a_template_error() {
    let err = recolor_svg("<svg><rect></svg>", &red_half()).unwrap_err();
    assert!(matches!(err, Error::Template(_)), "{err}");
}

#[test]
fn missing_template_file_is_a_template_error() {
    let ws = common::Workspace::new();
    let err = RecoloredTemplate::load(&ws.path("nope.svg"), &red_half()).err().unwrap();
    assert!(matches!(err, Error::Template(_)), "{err}");
}

#[test]
fn loaded_template_reports_native_size() {
    let ws = common::Workspace::new();
    let template = RecoloredTemplate::load(&ws.path("template.svg"), &red_half()).unwrap();
    assert_eq!(template.size(), (216.0, 72.0));
    assert_eq!(
        styles(template.svg()),
        vec![
            "fill:#FF0000;fill-opacity:0.5;stroke:#00FF00;stroke-width:1",
            "fill:#FFFFFF;fill-opacity:1.0",
        ]
    );
}
