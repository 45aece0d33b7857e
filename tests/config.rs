mod common;

use std::path::Path;

use common::assert_close;
use jukebox_labels::{Error, INCH, PageSize, RunConfig};

#[test]
fn empty_file_means_defaults() {
    let config = RunConfig::from_yaml_str("", Path::new("/labels")).unwrap();
    let d = RunConfig::default();
    assert_eq!(config.page_size, PageSize::LETTER);
    assert_eq!(config.label_width, 216.0);
    assert_eq!(config.label_height, 72.0);
    assert_eq!(config.fill_opacity, 0.25);
    assert_eq!(config.title_font, "Helvetica-Bold");
    assert_eq!(config.artist_font, "Helvetica");
    assert_eq!(config.other_font, "Helvetica");
    assert_eq!(config.template_path, Path::new("/labels").join(&d.template_path));
    assert!(config.show_label_name && config.show_catalog_number);
    assert_eq!(config.limit, None);
}

#[test]
fn keys_of_the_historical_config_file() {
    let yaml = r##"
discogs_token: not-used-here
label_template: templates/label002.svg
label_color: "#0000FF"
label_color_fill: "#00AA00"
label_color_fill_opacity: 0.4
label_show_label: false
label_show_catno: true
label_font_title: Times-Bold
label_font_artist: Times-Italic
label_font_other: Courier
test_count: 12
"##;
    let config = RunConfig::from_yaml_str(yaml, Path::new("/cfg")).unwrap();
    assert_eq!(config.template_path, Path::new("/cfg/templates/label002.svg"));
    assert_eq!(config.stroke_color, "#0000FF");
    assert_eq!(config.fill_color, "#00AA00");
    assert_eq!(config.fill_opacity, 0.4);
    assert!(!config.show_label_name);
    assert!(config.show_catalog_number);
    assert_eq!(config.title_font, "Times-Bold");
    assert_eq!(config.artist_font, "Times-Italic");
    assert_eq!(config.other_font, "Courier");
    assert_eq!(config.limit, Some(12));
}

#[test]
fn geometry_is_given_in_inches() {
    let yaml = "
page_size: a4
label_width: 2.5
label_height: 0.75
page_margin_left: 0.25
page_margin_top: 0.4
horizontal_spacing: 0.1
vertical_spacing: 0
";
    let config = RunConfig::from_yaml_str(yaml, Path::new(".")).unwrap();
    assert_eq!(config.page_size, PageSize::A4);
    assert_close(config.label_width as f32, (2.5 * INCH) as f32);
    assert_close(config.label_height as f32, 54.0);
    assert_close(config.margin_left as f32, 18.0);
    assert_close(config.margin_top as f32, 28.8);
    assert_close(config.h_spacing as f32, 7.2);
    assert_eq!(config.v_spacing, 0.0);
}

#[test]
fn custom_page_size_in_points() {
    let yaml = "page_size: { width: 400, height: 300 }";
    let config = RunConfig::from_yaml_str(yaml, Path::new(".")).unwrap();
    assert_eq!(
        config.page_size,
        PageSize {
            width: 400.0,
            height: 300.0
        }
    );
}

#[test]
fn absolute_template_path_is_kept() {
    let config =
        RunConfig::from_yaml_str("label_template: /srv/tpl.svg", Path::new("/cfg")).unwrap();
    assert_eq!(config.template_path, Path::new("/srv/tpl.svg"));
}

fn rejected(yaml: &str) -> String {
    match RunConfig::from_yaml_str(yaml, Path::new(".")) {
        Err(Error::Config(msg)) => msg,
        other => panic!("expected a config error for {yaml:?}, got {other:?}"),
    }
}

#[test]
fn invalid_values_are_rejected() {
    assert!(rejected("label_width: 0").contains("label_width"));
    assert!(rejected("label_height: -1").contains("label_height"));
    assert!(rejected("page_margin_left: -0.5").contains("page_margin_left"));
    assert!(rejected("label_color_fill_opacity: 1.5").contains("opacity"));
    assert!(rejected("label_color: \"#12345\"").contains("label_color"));
    assert!(rejected("label_color_fill: \"red;stroke:blue\"").contains("label_color_fill"));
    assert!(rejected("page_size: tabloid").contains("tabloid"));
    assert!(rejected("label_width: 20").contains("does not fit"));
}

#[test]
fn malformed_yaml_is_a_config_error() {
    rejected("label_width: [1, 2");
    rejected("label_width: wide");
}

#[test]
fn load_resolves_against_the_config_directory() {
    let ws = common::Workspace::new();
    let path = ws.write("labels.yaml", "label_template: template.svg\n");
    let config = RunConfig::load(&path).unwrap();
    assert_eq!(config.template_path, ws.path("template.svg"));
}

#[test]
fn missing_config_file_is_an_io_error() {
    let ws = common::Workspace::new();
    let err = RunConfig::load(&ws.path("absent.yaml")).unwrap_err();
    match err {
        Error::Io(e) => assert!(e.to_string().contains("absent.yaml")),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}
