use serde::Deserialize;

use crate::error::Error;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_LABEL: &str = "Unknown Label";
pub const NO_CATALOG_NUMBER: &str = "N/A";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    /// Catalog position code ("A", "B1", "AA", ...). Empty for malformed entries.
    pub position: String,
    pub title: String,
}

impl Track {
    pub fn new(position: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            position: position.into(),
            title: title.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelInfo {
    pub name: String,
    pub catalog_number: String,
}

/// One vinyl single to print a label for.
///
/// Deserializes from a Discogs-shaped release record; missing optional data is
/// normalised here so the renderer never sees nulls.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawRelease")]
pub struct Release {
    /// Release title, used for progress logging only.
    pub title: String,
    pub artists: Vec<String>,
    pub tracklist: Vec<Track>,
    pub labels: Vec<LabelInfo>,
}

impl Release {
    pub fn artist_line(&self) -> String {
        if self.artists.is_empty() {
            UNKNOWN_ARTIST.to_string()
        } else {
            self.artists.join(", ")
        }
    }

    /// Name and catalog number of the primary label, or placeholders.
    pub fn primary_label(&self) -> (&str, &str) {
        match self.labels.first() {
            Some(l) => (l.name.as_str(), l.catalog_number.as_str()),
            None => (UNKNOWN_LABEL, NO_CATALOG_NUMBER),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawArtist {
    Name(String),
    Entry { name: Option<String> },
}

#[derive(Deserialize)]
struct RawTrack {
    #[serde(default)]
    position: Option<String>,
    title: Option<String>,
}

#[derive(Deserialize)]
struct RawLabel {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "catno")]
    catalog_number: Option<String>,
}

#[derive(Deserialize)]
struct RawRelease {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    artists: Vec<RawArtist>,
    #[serde(default)]
    tracklist: Vec<RawTrack>,
    #[serde(default)]
    labels: Vec<RawLabel>,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl TryFrom<RawRelease> for Release {
    type Error = Error;

    fn try_from(raw: RawRelease) -> Result<Self, Error> {
        let title = non_blank(raw.title).unwrap_or_default();

        let artists = raw
            .artists
            .into_iter()
            .filter_map(|a| match a {
                RawArtist::Name(n) => non_blank(Some(n)),
                RawArtist::Entry { name } => non_blank(name),
            })
            .collect();

        let mut tracklist = Vec::with_capacity(raw.tracklist.len());
        for (i, t) in raw.tracklist.into_iter().enumerate() {
            // Position codes are case-significant and kept verbatim apart from
            // surrounding whitespace.
            let position = t.position.map(|p| p.trim().to_string()).unwrap_or_default();
            let Some(title) = t.title else {
                return Err(Error::InvalidRelease(format!(
                    "{}: track {} ({:?}) has no title",
                    if title.is_empty() { "<untitled>" } else { title.as_str() },
                    i + 1,
                    position,
                )));
            };
            tracklist.push(Track { position, title });
        }

        let labels = raw
            .labels
            .into_iter()
            .map(|l| LabelInfo {
                name: non_blank(l.name).unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                catalog_number: non_blank(l.catalog_number)
                    .unwrap_or_else(|| NO_CATALOG_NUMBER.to_string()),
            })
            .collect();

        Ok(Release {
            title,
            artists,
            tracklist,
            labels,
        })
    }
}
