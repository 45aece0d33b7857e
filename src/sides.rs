use crate::model::Track;

const TITLE_SEPARATOR: &str = " / ";

/// Titles printed on the two faces of a label.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SideTitles {
    pub side_a: String,
    pub side_b: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    A,
    B,
}

/// Which face a position code belongs to. "AA" is the double-A reissue
/// convention: a second hit still pressed on the B face.
fn side_for_position(position: &str) -> Option<Side> {
    if position == "AA" {
        return Some(Side::B);
    }
    match position.chars().next()? {
        'A' => Some(Side::A),
        'B' => Some(Side::B),
        _ => None,
    }
}

fn append_title(side: &mut String, title: &str) {
    if !side.is_empty() {
        side.push_str(TITLE_SEPARATOR);
    }
    side.push_str(title);
}

/// Split a tracklist into A and B side titles.
///
/// A two-track release is taken in order regardless of position codes. Otherwise
/// tracks are grouped by the first letter of their position; empty and
/// unrecognised codes (C, D, numeric, ...) are dropped.
pub fn assign_sides(tracks: &[Track]) -> SideTitles {
    if let [a, b] = tracks {
        return SideTitles {
            side_a: a.title.clone(),
            side_b: b.title.clone(),
        };
    }

    let mut titles = SideTitles::default();
    for track in tracks {
        match side_for_position(&track.position) {
            Some(Side::A) => append_title(&mut titles.side_a, &track.title),
            Some(Side::B) => append_title(&mut titles.side_b, &track.title),
            None if track.position.is_empty() => {
                log::debug!("Skipping track without position: {:?}", track.title);
            }
            None => {
                log::debug!(
                    "Skipping track with unrecognised position {:?}: {:?}",
                    track.position,
                    track.title
                );
            }
        }
    }
    titles
}
