//! CLI subcommand handlers.

use crate::topics;
use anyhow::Context;
use citeguard_core::assistant::Assistant;
use citeguard_core::chunk::ChunkingStrategy;
use citeguard_core::collector::WikipediaCollector;
use citeguard_core::config::{AssistantConfig, load_config};
use citeguard_core::embeddings::{Embedder, HashEmbedder};
use citeguard_core::ingest::DocumentIngestor;
use citeguard_core::llm::OpenAiCompatProvider;
use citeguard_core::retrieval::VectorStore;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub async fn collect(workspace: &Path, topic: &str, max_articles: usize) -> anyhow::Result<()> {
    let config = load_workspace_config(workspace)?;

    let articles = topics::topic_articles(topic).with_context(|| {
        format!(
            "Unknown topic '{topic}'. Available topics: {}",
            topics::TOPIC_NAMES.join(", ")
        )
    })?;

    let collector = WikipediaCollector::new(&config.collection)?;
    let stats = collector.collect_articles(articles, max_articles).await;

    println!("Collection summary:");
    println!("  collected: {} articles", stats.collected);
    println!("  failed:    {} articles", stats.failed);
    println!("  data dir:  {}", config.collection.data_dir.display());
    for error in stats.errors.iter().take(5) {
        println!("  error: {error}");
    }
    Ok(())
}

pub async fn build(workspace: &Path) -> anyhow::Result<()> {
    let config = load_workspace_config(workspace)?;

    let embedder: Arc<dyn Embedder> =
        Arc::new(HashEmbedder::new(config.retrieval.embedding_dimensions));
    let mut store = VectorStore::new(embedder, config.retrieval.min_score);

    let strategy = ChunkingStrategy::recursive(
        config.collection.chunk_size,
        config.collection.chunk_overlap,
    );
    let ingestor = DocumentIngestor::new(strategy);

    let raw_dir = config.collection.data_dir.join("raw");
    let stats = ingestor
        .ingest_directory(&raw_dir, &mut store)
        .await
        .with_context(|| format!("Failed to ingest {}", raw_dir.display()))?;

    let index_path = index_path(workspace, &config);
    store.save(&index_path)?;

    println!("Vector index built:");
    println!("  documents: {}", stats.documents);
    println!("  chunks:    {}", stats.chunks);
    if stats.skipped > 0 {
        println!("  skipped:   {}", stats.skipped);
    }
    println!("  index:     {}", index_path.display());
    Ok(())
}

pub async fn ask(workspace: &Path, question: &str) -> anyhow::Result<()> {
    let mut assistant = open_assistant(workspace)?;
    let result = assistant.query(question).await?;
    render_result(&result);
    Ok(())
}

pub async fn chat(workspace: &Path) -> anyhow::Result<()> {
    let mut assistant = open_assistant(workspace)?;

    println!("Citeguard chat. Type a question, 'clear' to reset, 'quit' to exit.");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "exit" => break,
            "clear" => {
                assistant.clear_memory();
                println!("Conversation cleared.");
            }
            question => {
                match assistant.query(question).await {
                    Ok(result) => render_result(&result),
                    Err(e) => eprintln!("Backend failure: {e}"),
                }
            }
        }
    }
    Ok(())
}

pub fn config_init(workspace: &Path) -> anyhow::Result<()> {
    let config_dir = workspace.join(".citeguard");
    std::fs::create_dir_all(&config_dir)?;

    let config_path = config_dir.join("config.toml");
    if config_path.exists() {
        println!("Configuration file already exists at: {}", config_path.display());
        return Ok(());
    }

    let default_config = AssistantConfig::default();
    let toml_str = toml::to_string_pretty(&default_config)?;
    std::fs::write(&config_path, &toml_str)?;
    println!("Created default configuration at: {}", config_path.display());
    Ok(())
}

pub fn config_show(workspace: &Path) -> anyhow::Result<()> {
    let config = load_workspace_config(workspace)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

fn load_workspace_config(workspace: &Path) -> anyhow::Result<AssistantConfig> {
    let config = load_config(Some(workspace), None)
        .map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?;
    config.validate()?;
    Ok(config)
}

fn index_path(workspace: &Path, config: &AssistantConfig) -> PathBuf {
    if config.retrieval.index_path.is_absolute() {
        config.retrieval.index_path.clone()
    } else {
        workspace.join(&config.retrieval.index_path)
    }
}

fn open_assistant(workspace: &Path) -> anyhow::Result<Assistant> {
    let config = load_workspace_config(workspace)?;

    let embedder: Arc<dyn Embedder> =
        Arc::new(HashEmbedder::new(config.retrieval.embedding_dimensions));
    let index_path = index_path(workspace, &config);
    let store = VectorStore::load(&index_path, embedder, config.retrieval.min_score)
        .with_context(|| {
            format!(
                "Could not open the vector index at {}. Run `citeguard collect` and \
                 `citeguard build` first.",
                index_path.display()
            )
        })?;

    let llm = OpenAiCompatProvider::new(&config.llm)?;
    let assistant = Assistant::new(config, Arc::new(store), Arc::new(llm))?;
    Ok(assistant)
}

fn render_result(result: &citeguard_core::QueryResult) {
    println!("{}", result.answer);
    println!();
    println!("confidence: {:.2}", result.confidence);
    if !result.sources.is_empty() {
        println!("sources: {}", result.sources.join(", "));
    }
    for warning in &result.warnings {
        println!("warning: {warning}");
    }
}
