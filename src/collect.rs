//! Boundary to the services that feed the label engine.
//!
//! Recording, song recognition and catalog access are capabilities supplied by
//! a front end. [`IdentifyService`] composes them into the "play a record, find
//! the release, file it into a jukebox slot" workflow. Nothing here touches the
//! network itself.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::Error;
use crate::model::Release;

/// A song recognised from an audio sample.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recognition {
    pub title: String,
    pub artists: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    pub title: String,
    pub artist: String,
    /// Restrict to releases from this country; `None` searches worldwide.
    pub country: Option<String>,
}

/// One catalog search result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchHit {
    pub release_id: u64,
    pub title: String,
    /// Format descriptors as reported by the catalog ("Vinyl", "7\"", "Single", ...).
    pub formats: Vec<String>,
    pub country: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Folder {
    pub id: u64,
    pub name: String,
}

pub trait AudioRecorder {
    /// Record a sample and return the path of the audio file.
    fn record(&mut self) -> Result<PathBuf, Error>;
}

pub trait Recognizer {
    /// `Ok(None)` when the service answered but did not recognise the sample.
    fn recognize(&self, audio: &Path) -> Result<Option<Recognition>, Error>;
}

pub trait CatalogClient {
    fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, Error>;
    fn get_or_create_folder(&self, name: &str) -> Result<Folder, Error>;
    /// Add a release to a collection folder and record its jukebox slot.
    fn add_release_to_folder(&self, folder_id: u64, release_id: u64, slot: u32) -> Result<(), Error>;
    fn release(&self, release_id: u64) -> Result<Release, Error>;
}

/// One rung of the search fallback ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStep {
    /// Configured country, 7" singles only.
    Strict,
    /// Any country, 7" singles only.
    AnyCountry,
    /// Any country, every format.
    Unfiltered,
}

impl SearchStep {
    pub const DEFAULT_LADDER: [SearchStep; 2] = [SearchStep::Strict, SearchStep::AnyCountry];
}

/// Strip parenthesised and bracketed qualifiers: "Song (Remastered 2009) [Live]" → "Song".
pub fn clean_title(raw: &str) -> String {
    static QUALIFIERS: OnceLock<Regex> = OnceLock::new();
    let re = QUALIFIERS.get_or_init(|| {
        Regex::new(r"\s*\([^)]*\)|\s*\[[^\]]*\]").expect("qualifier pattern is valid")
    });
    re.replace_all(raw, "").trim().to_string()
}

/// A 7" single: some format mentions "single" and some mentions `7"`.
pub fn is_vinyl_single(hit: &SearchHit) -> bool {
    let formats: Vec<String> = hit.formats.iter().map(|f| f.to_lowercase()).collect();
    formats.iter().any(|f| f.contains("single")) && formats.iter().any(|f| f.contains("7\""))
}

/// Outcome of one identify attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identified {
    /// The recogniser did not know the sample.
    Unrecognized,
    Found {
        recognition: Recognition,
        /// Title after qualifier stripping, as searched.
        title: String,
        /// Step of the ladder that produced the hits, `None` if none did.
        step: Option<SearchStep>,
        hits: Vec<SearchHit>,
    },
}

pub struct IdentifyService<A, R, C> {
    recorder: A,
    recognizer: R,
    catalog: C,
    country: String,
    ladder: Vec<SearchStep>,
}

impl<A: AudioRecorder, R: Recognizer, C: CatalogClient> IdentifyService<A, R, C> {
    pub fn new(recorder: A, recognizer: R, catalog: C, country: impl Into<String>) -> Self {
        Self {
            recorder,
            recognizer,
            catalog,
            country: country.into(),
            ladder: SearchStep::DEFAULT_LADDER.to_vec(),
        }
    }

    /// Replace the fallback ladder; steps are tried in order until one has hits.
    pub fn with_ladder(mut self, ladder: Vec<SearchStep>) -> Self {
        self.ladder = ladder;
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Search the catalog for `title` by `artist`, walking the fallback ladder.
    pub fn search(&self, title: &str, artist: &str) -> Result<(Option<SearchStep>, Vec<SearchHit>), Error> {
        for &step in &self.ladder {
            let query = SearchQuery {
                title: title.to_string(),
                artist: artist.to_string(),
                country: match step {
                    SearchStep::Strict => Some(self.country.clone()),
                    SearchStep::AnyCountry | SearchStep::Unfiltered => None,
                },
            };
            let mut hits = self.catalog.search(&query)?;
            if step != SearchStep::Unfiltered {
                hits.retain(is_vinyl_single);
            }
            if !hits.is_empty() {
                log::info!("Search {step:?}: {} hits for {title:?} by {artist}", hits.len());
                return Ok((Some(step), hits));
            }
            log::info!("Search {step:?}: no results for {title:?} by {artist}");
        }
        Ok((None, Vec::new()))
    }

    /// Record, recognise and look the sample up in the catalog.
    pub fn identify(&mut self) -> Result<Identified, Error> {
        let audio = self.recorder.record()?;
        let Some(recognition) = self.recognizer.recognize(&audio)? else {
            log::info!("Could not identify song from {}", audio.display());
            return Ok(Identified::Unrecognized);
        };
        let title = clean_title(&recognition.title);
        let artist = recognition.artists.join(", ");
        log::info!("Identified {title:?} by {artist}");

        let (step, hits) = self.search(&title, &artist)?;
        Ok(Identified::Found {
            recognition,
            title,
            step,
            hits,
        })
    }

    /// File `release_id` into the named folder (created on demand) at `slot`.
    pub fn file(&self, folder_name: &str, release_id: u64, slot: u32) -> Result<Folder, Error> {
        let folder = self.catalog.get_or_create_folder(folder_name)?;
        self.catalog.add_release_to_folder(folder.id, release_id, slot)?;
        log::info!("Added release {release_id} to folder {:?}, slot {slot}", folder.name);
        Ok(folder)
    }

    /// Fetch the full records for chosen releases, ready for the label writer.
    pub fn releases(&self, release_ids: &[u64]) -> Result<Vec<Release>, Error> {
        release_ids.iter().map(|&id| self.catalog.release(id)).collect()
    }
}
