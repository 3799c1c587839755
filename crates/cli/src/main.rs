//! CLI for extracting, summarizing and questioning PowerPoint decks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use slidekit_ai::{
    image_extractor, CachedEmbedder, EmbeddingProvider, OpenAiChat, OpenAiEmbeddings,
    ProviderConfig, TokenCounter,
};
use slidekit_core::{export, Document, ExtractionConfig};
use slidekit_pptx::PptxParser;
use slidekit_rag::{
    Extractor, RetrievalMode, Retriever, Summarizer, SummaryMode, DEFAULT_MIN_SIMILARITY,
    DEFAULT_TOP_K,
};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Extract slide content from .pptx files, summarize it, or ask questions about it.
#[derive(Parser, Debug)]
#[command(name = "slidekit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API key for the embedding and chat provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Chat completion model
    #[arg(long, env = "SLIDEKIT_CHAT_MODEL", global = true)]
    chat_model: Option<String>,

    /// Embedding model
    #[arg(long, env = "SLIDEKIT_EMBEDDING_MODEL", global = true)]
    embedding_model: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "120", global = true)]
    timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract slides, entities, tokens and embeddings
    Extract {
        /// Input PowerPoint file (.pptx)
        file: PathBuf,

        /// Keep content in shape order instead of grouping it by kind
        #[arg(long)]
        maintain_order: bool,

        /// Skip slide embeddings (no API calls)
        #[arg(long)]
        no_embed: bool,

        #[command(flatten)]
        images: ImageArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write one `{n}.txt` per slide into this directory
        #[arg(long)]
        metadata_dir: Option<PathBuf>,

        /// Write a copy of the deck with every entity highlighted
        #[arg(long, value_name = "PATH")]
        highlight: Option<PathBuf>,
    },

    /// Summarize slides, the whole deck, or individual tables and charts
    Summarize {
        /// Input PowerPoint file (.pptx)
        file: PathBuf,

        /// slide, all, single, object or charts
        #[arg(short, long, default_value = "slide")]
        mode: String,

        /// Slide number for `single` mode
        #[arg(short, long, default_value = "0")]
        slide: usize,

        /// Replace the default system prompt
        #[arg(long)]
        system_prompt: Option<String>,

        #[command(flatten)]
        images: ImageArgs,
    },

    /// Answer a question from the most relevant slides
    Ask {
        /// Input PowerPoint file (.pptx)
        file: PathBuf,

        /// The question
        query: String,

        /// similarity or all
        #[arg(short, long, default_value = "similarity")]
        mode: String,

        /// Number of slides to include
        #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,

        /// Similarities below this count as zero
        #[arg(long, default_value_t = DEFAULT_MIN_SIMILARITY)]
        min_similarity: f32,

        /// Print the prompt sent to the model
        #[arg(long)]
        show_prompt: bool,

        #[command(flatten)]
        images: ImageArgs,
    },
}

#[derive(clap::Args, Debug)]
struct ImageArgs {
    /// Recognize text in pictures
    #[arg(long)]
    extract_from_image: bool,

    /// Read pictures as charts with a vision model instead of OCR
    #[arg(long)]
    chart_from_image: bool,

    /// OCR engine for pictures
    #[arg(long, default_value = "tesseract")]
    ocr_engine: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let providers = provider_config(&cli);

    match &cli.command {
        Command::Extract {
            file,
            maintain_order,
            no_embed,
            images,
            format,
            output,
            metadata_dir,
            highlight,
        } => {
            let config = ExtractionConfig {
                maintain_order: *maintain_order,
                embed: !*no_embed,
                ..extraction_config(images)
            };
            let embedder = OpenAiEmbeddings::new(&providers)?;
            let document = extract(file, config, &providers, Some(&embedder))?;

            if cli.verbose {
                eprintln!(
                    "  Extracted {} slides, {} tokens",
                    document.slide_count(),
                    document.total_tokens()
                );
            }

            if let Some(dir) = metadata_dir {
                export::write_slide_metadata(&document, dir).with_context(|| {
                    format!("Failed to write slide metadata to {}", dir.display())
                })?;
            }

            if let Some(path) = highlight {
                write_highlighted(file, &document, path)?;
            }

            write_document(&document, *format, output.as_deref())?;
        }

        Command::Summarize {
            file,
            mode,
            slide,
            system_prompt,
            images,
        } => {
            let mode = SummaryMode::parse(mode, *slide)?;
            let config = ExtractionConfig {
                embed: false,
                ..extraction_config(images)
            };
            let document = extract(file, config, &providers, None)?;

            let chat = OpenAiChat::new(&providers)?;
            let mut summarizer = Summarizer::new(&document, &chat);
            if let Some(prompt) = system_prompt {
                summarizer = summarizer.with_system_prompt(prompt.as_str());
            }

            let stdout = io::stdout();
            let mut out = stdout.lock();
            for summary in summarizer.summarize(mode)? {
                let summary = summary?;
                match (summary.slide_number, summary.kind) {
                    (Some(n), Some(kind)) => writeln!(out, "== Slide {} [{}] ==", n, kind)?,
                    (Some(n), None) => writeln!(out, "== Slide {}: {} ==", n, summary.title)?,
                    (None, _) => writeln!(out, "== {} ==", file.display())?,
                }
                writeln!(out, "{}\n", summary.summary)?;
                out.flush()?;
            }
        }

        Command::Ask {
            file,
            query,
            mode,
            top_k,
            min_similarity,
            show_prompt,
            images,
        } => {
            let mode: RetrievalMode = mode.parse()?;
            let config = ExtractionConfig {
                embed: mode == RetrievalMode::Similarity,
                ..extraction_config(images)
            };

            let cache_size =
                NonZeroUsize::new(256).context("Embedding cache size must be non-zero")?;
            let embedder = CachedEmbedder::new(OpenAiEmbeddings::new(&providers)?, cache_size);
            let document = extract(file, config, &providers, Some(&embedder))?;

            let chat = OpenAiChat::new(&providers)?;
            let mut retriever = Retriever::new(document, &chat, &embedder);
            let answer = retriever.answer(query, mode, *top_k, *min_similarity)?;

            if *show_prompt {
                println!("{}\n{}", retriever.prompt(), "-".repeat(60));
            }
            if cli.verbose {
                eprintln!("  Answered from slides {:?}", retriever.retrieved());
            }
            println!("{}", answer);
        }
    }

    Ok(())
}

/// Provider settings from the environment, overridden by flags.
fn provider_config(cli: &Cli) -> ProviderConfig {
    let mut config = ProviderConfig::from_env().with_timeout(Duration::from_secs(cli.timeout_secs));
    if let Some(key) = &cli.api_key {
        config = config.with_api_key(key.as_str());
    }
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url.as_str());
    }
    if let Some(model) = &cli.chat_model {
        config = config.with_chat_model(model.as_str());
    }
    if let Some(model) = &cli.embedding_model {
        config = config.with_embedding_model(model.as_str());
    }
    config
}

fn extraction_config(images: &ImageArgs) -> ExtractionConfig {
    ExtractionConfig {
        ocr_engine: images.ocr_engine.clone(),
        extract_from_image: images.extract_from_image || images.chart_from_image,
        chart_from_image: images.chart_from_image,
        ..ExtractionConfig::default()
    }
}

/// Extract a single presentation file.
fn extract(
    input_path: &Path,
    config: ExtractionConfig,
    providers: &ProviderConfig,
    embedder: Option<&dyn EmbeddingProvider>,
) -> Result<Document> {
    let counter = TokenCounter::cl100k()?;
    let mut extractor = Extractor::new(config.clone(), counter);

    if let Some(embedder) = embedder {
        extractor = extractor.with_embedder(embedder);
    }
    if config.extract_from_image {
        let reader = image_extractor(&config.ocr_engine, config.chart_from_image, providers)
            .context("Image extraction is not available")?;
        extractor = extractor.with_image_reader(reader);
    }

    log::debug!("Extracting {} with {:?}", input_path.display(), config);
    extractor
        .extract(input_path)
        .with_context(|| format!("Failed to extract {}", input_path.display()))
}

/// Write a highlighted copy of `source` to `target`.
fn write_highlighted(source: &Path, document: &Document, target: &Path) -> Result<()> {
    let reader = BufReader::new(
        File::open(source).with_context(|| format!("Failed to open {}", source.display()))?,
    );
    let mut file = PptxParser::new()
        .open(reader)
        .with_context(|| format!("Failed to read {}", source.display()))?;
    let out = File::create(target)
        .with_context(|| format!("Failed to create {}", target.display()))?;

    let drawn = slidekit_pptx::write_highlighted(&mut file, document, out)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    log::info!("Highlighted {} entities into {}", drawn, target.display());
    Ok(())
}

/// Write the extracted document in the requested format.
fn write_document(document: &Document, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    match format {
        OutputFormat::Text => writer.write_all(document.combined_text().as_bytes())?,
        OutputFormat::Json => {
            writer.write_all(export::to_json(document)?.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        OutputFormat::Csv => export::write_csv(document, &mut writer)?,
    }

    writer.flush()?;
    if let Some(path) = output {
        log::info!("Written to: {}", path.display());
    }
    Ok(())
}
