//! Fallback cascade — the ordered strategy chain every section extractor runs.
//!
//! Each strategy returns `Attempt::Found` or `Attempt::NotFound`; the cascade
//! stops at the first `Found` whose value is substantive. When nothing is found
//! the extractor yields an empty value, or illustrative placeholders when the
//! caller opted in, marked `is_fallback`.

use tracing::{debug, warn};

use crate::extraction::sections::{SectionContent, SectionKind};

/// Outcome of one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    Found(T),
    NotFound,
}

impl<T: Substantive> Attempt<T> {
    /// `Found` only when the value clears the substantive threshold.
    pub fn from_value(value: T) -> Self {
        if value.is_substantive() {
            Attempt::Found(value)
        } else {
            Attempt::NotFound
        }
    }
}

/// "Non-trivial output" threshold for a strategy result.
pub trait Substantive {
    fn is_substantive(&self) -> bool;
}

impl<T> Substantive for Vec<T> {
    fn is_substantive(&self) -> bool {
        !self.is_empty()
    }
}

/// Minimum length for free-text output such as a summary paragraph.
pub const MIN_TEXT_LEN: usize = 20;

impl Substantive for String {
    fn is_substantive(&self) -> bool {
        self.trim().chars().count() >= MIN_TEXT_LEN
    }
}

/// A named extraction strategy.
pub struct Strategy<T> {
    pub name: &'static str,
    pub run: fn(&SectionContent) -> Attempt<T>,
}

impl<T> Strategy<T> {
    pub fn new(name: &'static str, run: fn(&SectionContent) -> Attempt<T>) -> Self {
        Self { name, run }
    }
}

/// Which strategy produced an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Strategy(&'static str),
    Placeholder,
    Discarded,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction<T> {
    pub value: T,
    pub provenance: Provenance,
}

impl<T> Extraction<T> {
    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Placeholder
    }
}

/// Folds over the strategies in order, stopping at the first `Found`.
pub fn run_cascade<T>(
    content: &SectionContent,
    strategies: &[Strategy<T>],
) -> Option<(&'static str, T)> {
    strategies
        .iter()
        .find_map(|strategy| match (strategy.run)(content) {
            Attempt::Found(value) => Some((strategy.name, value)),
            Attempt::NotFound => None,
        })
}

/// Per-kind extractor: its strategy order plus the section's policies.
pub trait SectionExtractor {
    type Output: Substantive + Default;

    fn kind(&self) -> SectionKind;

    /// Strategies in the order they are attempted.
    fn strategies(&self) -> Vec<Strategy<Self::Output>>;

    /// Returns false when the section's raw content must be discarded wholesale.
    fn screen(&self, _content: &SectionContent) -> bool {
        true
    }

    /// Applies list caps and other post-processing to a found value.
    fn finish(&self, value: Self::Output) -> Self::Output {
        value
    }

    /// Illustrative entries, already marked `is_fallback`.
    fn placeholders(&self) -> Self::Output {
        Self::Output::default()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Substitute placeholders when a detected section yields nothing.
    pub fill_placeholders: bool,
}

/// Runs an extractor over a located section.
pub fn extract<E: SectionExtractor>(
    extractor: &E,
    content: Option<&SectionContent>,
    options: ExtractOptions,
) -> Extraction<E::Output> {
    let Some(content) = content else {
        return Extraction {
            value: E::Output::default(),
            provenance: Provenance::Empty,
        };
    };

    if !extractor.screen(content) {
        warn!(
            section = ?extractor.kind(),
            "Section content failed screening — discarding as mislabeled"
        );
        return Extraction {
            value: E::Output::default(),
            provenance: Provenance::Discarded,
        };
    }

    if let Some((name, value)) = run_cascade(content, &extractor.strategies()) {
        debug!(section = ?extractor.kind(), strategy = name, "Extraction strategy matched");
        return Extraction {
            value: extractor.finish(value),
            provenance: Provenance::Strategy(name),
        };
    }

    if options.fill_placeholders {
        warn!(
            section = ?extractor.kind(),
            "No strategy matched — substituting placeholder entries"
        );
        return Extraction {
            value: extractor.finish(extractor.placeholders()),
            provenance: Provenance::Placeholder,
        };
    }

    debug!(section = ?extractor.kind(), "No strategy matched — section left empty");
    Extraction {
        value: E::Output::default(),
        provenance: Provenance::Empty,
    }
}
