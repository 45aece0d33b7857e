mod common;

use std::path::Path;

use common::assert_close;
use jukebox_labels::{Error, Grid, PageSize, RunConfig};

#[test]
fn default_letter_sheet_holds_twenty_labels() {
    let grid = Grid::new(&RunConfig::default()).unwrap();
    assert_eq!(grid.labels_per_row(), 2);
    assert_eq!(grid.labels_per_column(), 10);
    assert_eq!(grid.labels_per_page(), 20);
    assert_eq!(grid.label_size(), (216.0, 72.0));
}

#[test]
fn first_row_positions() {
    let mut grid = Grid::new(&RunConfig::default()).unwrap();

    let first = grid.next_slot();
    assert!(!first.starts_new_page);
    assert_eq!((first.slot.page_number, first.slot.row, first.slot.col), (1, 0, 0));
    assert_close(first.slot.x, 36.0);
    assert_close(first.slot.y, 684.0);

    let second = grid.next_slot().slot;
    assert_eq!((second.row, second.col), (0, 1));
    assert_close(second.x, 36.0 + 216.36);
    assert_close(second.y, 684.0);

    let third = grid.next_slot().slot;
    assert_eq!((third.row, third.col), (1, 0));
    assert_close(third.x, 36.0);
    assert_close(third.y, 684.0 - 72.36);
}

#[test]
fn slots_follow_row_major_order_across_pages() {
    let mut grid = Grid::new(&RunConfig::default()).unwrap();
    let k = grid.labels_per_page();
    let per_row = grid.labels_per_row();

    for i in 0..(2 * k + 3) {
        let placement = grid.next_slot();
        assert_eq!(placement.slot.row, (i % k) / per_row, "row of label {i}");
        assert_eq!(placement.slot.col, i % per_row, "col of label {i}");
        assert_eq!(placement.slot.page_number, i / k + 1, "page of label {i}");
        assert_eq!(placement.starts_new_page, i > 0 && i % k == 0, "break before label {i}");
    }
}

#[test]
fn page_break_happens_on_the_next_request_not_when_full() {
    let mut grid = Grid::new(&RunConfig::default()).unwrap();
    for _ in 0..grid.labels_per_page() {
        grid.next_slot();
    }
    assert_eq!(grid.page_number(), 1);
    assert_eq!(grid.used_on_page(), 20);

    let next = grid.next_slot();
    assert!(next.starts_new_page);
    assert_eq!(grid.page_number(), 2);
    assert_eq!(grid.used_on_page(), 1);
    assert_eq!((next.slot.row, next.slot.col), (0, 0));
    assert_close(next.slot.y, 684.0);
}

#[test]
fn trailing_spacing_is_not_required_to_fit() {
    // Two labels plus one gap exactly fill the printable width.
    let config = RunConfig {
        page_size: PageSize {
            width: 10.0 + 2.0 * 100.0 + 5.0,
            height: 100.0,
        },
        label_width: 100.0,
        label_height: 50.0,
        margin_left: 10.0,
        margin_top: 0.0,
        h_spacing: 5.0,
        v_spacing: 0.0,
        ..RunConfig::default()
    };
    let grid = Grid::new(&config).unwrap();
    assert_eq!(grid.labels_per_row(), 2);
    assert_eq!(grid.labels_per_column(), 2);
}

#[test]
fn a4_sheet_holds_eleven_rows() {
    let config = RunConfig {
        page_size: PageSize::A4,
        ..RunConfig::default()
    };
    let grid = Grid::new(&config).unwrap();
    assert_eq!(grid.labels_per_row(), 2);
    assert_eq!(grid.labels_per_column(), 11);
}

#[test]
fn page_too_small_for_a_label_is_rejected() {
    let config = RunConfig {
        page_size: PageSize {
            width: 200.0,
            height: 200.0,
        },
        ..RunConfig::default()
    };
    assert!(matches!(Grid::new(&config), Err(Error::Config(_))));
}

#[test]
fn exact_fit_from_inch_config_keeps_the_last_row() {
    // 0.1" margin and spacing: (792 - 7.2 + 7.2) / 79.2 is exactly 10 rows.
    let yaml = "
label_height: 1.0
page_margin_top: 0.1
vertical_spacing: 0.1
";
    let config = RunConfig::from_yaml_str(yaml, Path::new(".")).unwrap();
    let grid = Grid::new(&config).unwrap();
    assert_eq!(grid.labels_per_column(), 10);
}
