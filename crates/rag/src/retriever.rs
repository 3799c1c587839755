//! Question answering grounded in the most similar slides.

use slidekit_ai::{ChatClient, ChatProvider, EmbeddingProvider};
use slidekit_core::{cosine_similarity, Document, Error, Result, Slide};
use std::str::FromStr;

pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_MIN_SIMILARITY: f32 = 0.6;

/// Which slides go into the answer prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetrievalMode {
    /// The `top_k` slides most similar to the query.
    #[default]
    Similarity,
    /// Every slide, unranked.
    All,
}

impl FromStr for RetrievalMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "similarity" => Ok(RetrievalMode::Similarity),
            "all" => Ok(RetrievalMode::All),
            _ => Err(Error::InvalidArgument(format!(
                "Retrieval mode '{}' is not supported",
                s
            ))),
        }
    }
}

/// Answers questions about one extracted document.
///
/// Each call to [`Retriever::answer`] rescores the slides, so the similarity
/// stored on every slide reflects the latest query.
pub struct Retriever<'a> {
    document: Document,
    chat: &'a dyn ChatProvider,
    embedder: &'a dyn EmbeddingProvider,
    prompt: String,
    retrieved: Vec<usize>,
}

impl<'a> Retriever<'a> {
    pub fn new(
        document: Document,
        chat: &'a dyn ChatProvider,
        embedder: &'a dyn EmbeddingProvider,
    ) -> Self {
        Self {
            document,
            chat,
            embedder,
            prompt: String::new(),
            retrieved: Vec::new(),
        }
    }

    pub fn answer(
        &mut self,
        query: &str,
        mode: RetrievalMode,
        top_k: usize,
        min_similarity: f32,
    ) -> Result<String> {
        let selected: Vec<&Slide> = match mode {
            RetrievalMode::Similarity => {
                let query_embedding = self.embedder.embed(query)?;
                let scores: Vec<f32> = self
                    .document
                    .slides()
                    .iter()
                    .map(|slide| {
                        let score = slide
                            .embedding
                            .as_deref()
                            .map(|e| cosine_similarity(&query_embedding, e))
                            .unwrap_or(0.0);
                        if score >= min_similarity {
                            score
                        } else {
                            0.0
                        }
                    })
                    .collect();
                self.document.assign_similarities(&scores);

                let mut ranked: Vec<&Slide> = self.document.slides().iter().collect();
                ranked.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
                ranked.truncate(top_k);
                ranked
            }
            RetrievalMode::All => self.document.slides().iter().collect(),
        };

        log::info!(
            "Answering from {} of {} slides",
            selected.len(),
            self.document.slide_count()
        );

        self.retrieved = selected.iter().map(|s| s.number).collect();
        self.prompt = qna_prompt(query, selected);

        ChatClient::new(self.chat).complete(self.prompt.as_str())
    }

    /// The prompt sent for the most recent answer.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Numbers of the slides included in the most recent prompt, in prompt order.
    pub fn retrieved(&self) -> &[usize] {
        &self.retrieved
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

/// Prompt asking for an answer grounded in `slides`, citing each slide as `[n]`.
pub fn qna_prompt<'s>(query: &str, slides: impl IntoIterator<Item = &'s Slide>) -> String {
    let mut prompt = format!(
        "You are provided with PPT slide content. Based on the provided Slide Content try to \
         answer the following question. Be clear and answer accurately, if not answer 'I don't \
         know'. While answering cite the slide number as source. Example ( Correct cites : [1] \
         [2] [3] , Incorrect [1,2,3]). \n Question : {} Slide Wise Content : \n\n",
        query
    );
    for slide in slides {
        prompt.push_str(&format!("Slide [{}] :  {}\n", slide.number, slide.text));
    }
    prompt
}
