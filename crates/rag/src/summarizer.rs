//! Slide, deck and entity summaries over an extracted document.

use serde::Serialize;
use slidekit_ai::{ChatClient, ChatProvider};
use slidekit_core::{Document, EntityKind, Error, Result, Slide};
use std::fmt;
use std::str::FromStr;

/// System prompt used unless [`Summarizer::with_system_prompt`] overrides it.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are passed PPT Slide Information like text, \
tables, charts table, image OCR extracted text. You have to generate the summary of the \
slide. Make sure to cite your answer if answering from a table or charts and be accurate.";

const DECK_PREAMBLE: &str =
    "Generate a detailed Summary for each slides, explain the charts and tables in detail. \n\n";

/// Granularity of a summarization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryMode {
    /// One summary per slide.
    Slide,
    /// One summary of the whole deck.
    All,
    /// One summary of the slide with this number.
    Single(usize),
    /// Each non-text entity separately, then each slide's text.
    Object,
    /// Tables and charts only.
    Charts,
}

impl SummaryMode {
    /// Parse a mode name; `slide_number` is only used by `single`.
    pub fn parse(name: &str, slide_number: usize) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "slide" => Ok(SummaryMode::Slide),
            "all" => Ok(SummaryMode::All),
            "single" => Ok(SummaryMode::Single(slide_number)),
            "object" => Ok(SummaryMode::Object),
            "charts" => Ok(SummaryMode::Charts),
            other => Err(Error::InvalidArgument(format!(
                "Summary mode '{}' is not supported (expected slide, all, single, object or charts)",
                other
            ))),
        }
    }
}

impl FromStr for SummaryMode {
    type Err = Error;

    /// `single` parses with slide number 0, which fails validation until a
    /// number is supplied.
    fn from_str(s: &str) -> Result<Self> {
        SummaryMode::parse(s, 0)
    }
}

impl fmt::Display for SummaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryMode::Slide => f.write_str("slide"),
            SummaryMode::All => f.write_str("all"),
            SummaryMode::Single(n) => write!(f, "single({})", n),
            SummaryMode::Object => f.write_str("object"),
            SummaryMode::Charts => f.write_str("charts"),
        }
    }
}

/// One generated summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Slide the summary covers; `None` for a whole-deck summary.
    pub slide_number: Option<usize>,
    pub title: String,
    /// Entity kind for per-entity summaries.
    pub kind: Option<EntityKind>,
    pub summary: String,
}

/// A prompt waiting to be sent.
#[derive(Debug, Clone)]
struct Unit {
    slide_number: Option<usize>,
    title: String,
    kind: Option<EntityKind>,
    prompt: String,
}

impl Unit {
    fn slide(slide: &Slide, kind: Option<EntityKind>, prompt: impl Into<String>) -> Self {
        Self {
            slide_number: Some(slide.number),
            title: slide.title.clone(),
            kind,
            prompt: prompt.into(),
        }
    }
}

/// Builds summary prompts from a document and sends them one at a time.
pub struct Summarizer<'a> {
    document: &'a Document,
    chat: &'a dyn ChatProvider,
    system_prompt: String,
}

impl<'a> Summarizer<'a> {
    pub fn new(document: &'a Document, chat: &'a dyn ChatProvider) -> Self {
        Self {
            document,
            chat,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Validate `mode` and return the summaries as a lazy sequence.
    ///
    /// No completion is requested until the sequence is advanced; each item
    /// is a separate call with its own chat session. Call again to restart.
    pub fn summarize(&self, mode: SummaryMode) -> Result<Summaries<'a>> {
        let units = self.units(mode)?;
        log::info!("Summarizing in {} mode: {} completion(s)", mode, units.len());
        Ok(Summaries {
            units: units.into_iter(),
            chat: self.chat,
            system_prompt: self.system_prompt.clone(),
        })
    }

    fn units(&self, mode: SummaryMode) -> Result<Vec<Unit>> {
        let slides = self.document.slides();
        let units = match mode {
            SummaryMode::Slide => slides
                .iter()
                .map(|s| Unit::slide(s, None, s.text.as_str()))
                .collect(),

            SummaryMode::All => vec![Unit {
                slide_number: None,
                title: self.document.metadata().title.clone(),
                kind: None,
                prompt: deck_prompt(slides),
            }],

            SummaryMode::Single(number) => {
                if number == 0 || number > self.document.slide_count() {
                    return Err(Error::InvalidArgument(format!(
                        "Slide number {} is out of range 1..={}",
                        number,
                        self.document.slide_count()
                    )));
                }
                let slide = self.document.slide(number).ok_or_else(|| {
                    Error::InvalidArgument(format!("Slide {} was not extracted", number))
                })?;
                vec![Unit::slide(slide, None, slide.text.as_str())]
            }

            SummaryMode::Object => {
                let mut units = Vec::new();
                for slide in slides {
                    let mut text = Vec::new();
                    for entity in &slide.entities {
                        if entity.kind() == EntityKind::Text {
                            text.push(entity.text());
                        } else {
                            units.push(Unit::slide(slide, Some(entity.kind()), entity.text()));
                        }
                    }
                    let text = text.join(" ");
                    if !text.trim().is_empty() {
                        units.push(Unit::slide(slide, Some(EntityKind::Text), text));
                    }
                }
                units
            }

            SummaryMode::Charts => slides
                .iter()
                .flat_map(|slide| {
                    slide
                        .entities
                        .iter()
                        .filter(|e| e.kind().is_tabular())
                        .map(move |e| Unit::slide(slide, Some(e.kind()), e.text()))
                })
                .collect(),
        };
        Ok(units)
    }
}

/// Summaries produced on demand, in document order.
pub struct Summaries<'a> {
    units: std::vec::IntoIter<Unit>,
    chat: &'a dyn ChatProvider,
    system_prompt: String,
}

impl Summaries<'_> {
    /// Completions still to be requested.
    pub fn remaining(&self) -> usize {
        self.units.len()
    }
}

impl Iterator for Summaries<'_> {
    type Item = Result<Summary>;

    fn next(&mut self) -> Option<Self::Item> {
        let unit = self.units.next()?;
        let mut client = ChatClient::new(self.chat);
        client.set_system_prompt(self.system_prompt.as_str());
        Some(client.complete(unit.prompt).map(|summary| Summary {
            slide_number: unit.slide_number,
            title: unit.title,
            kind: unit.kind,
            summary,
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.units.size_hint()
    }
}

/// Whole-deck prompt: every slide's text behind a slide-number marker.
pub fn deck_prompt(slides: &[Slide]) -> String {
    let mut prompt = DECK_PREAMBLE.to_string();
    for slide in slides {
        prompt.push_str(&format!(" SLIDE NUMBER : {}\n\n", slide.number));
        prompt.push_str(&slide.text);
        prompt.push_str("\n\n");
    }
    prompt
}
