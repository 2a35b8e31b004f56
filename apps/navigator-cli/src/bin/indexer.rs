use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use navigator_advisor::KnowledgeBase;
use navigator_cli::{embedding_progress, load_settings};
use navigator_core::telemetry::init_tracing;
use navigator_embed::get_default_embedder;
use navigator_vector::VectorStore;

/// Build the course store and save it under `store.path`.
#[derive(Parser)]
#[command(name = "navigator-indexer", version)]
struct Args {
    /// Read saved pages (.html, .htm, .txt) instead of downloading.
    #[arg(long)]
    from_dir: Option<PathBuf>,
    /// Course page to download; repeatable. Defaults to `courses.urls`.
    #[arg(long = "url")]
    urls: Vec<String>,
    /// Rebuild even if a saved store exists.
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let settings = load_settings()?;
    let prefix = settings.store.path_prefix();

    println!("Course store indexer\n====================");
    println!("Store: {}", prefix.display());
    if VectorStore::exists(&prefix) && !args.force {
        println!("⚠️  Store already exists; pass --force to rebuild");
        return Ok(());
    }

    let embedder = get_default_embedder(&settings.embedding)?;
    let kb = KnowledgeBase::new(&settings, embedder.as_ref());
    let bar = embedding_progress()?;
    let progress = |done: usize, total: usize| {
        bar.set_length(total as u64);
        bar.set_position(done as u64);
    };

    let store = match &args.from_dir {
        Some(dir) => {
            println!("Pages directory: {}", dir.display());
            kb.build_from_dir(dir, progress)?
        }
        None => {
            let urls = if args.urls.is_empty() { settings.courses.urls.clone() } else { args.urls.clone() };
            println!("Downloading {} course pages", urls.len());
            kb.build_from_urls(&urls, progress).await?
        }
    };
    bar.finish_and_clear();
    kb.save(&store)?;

    println!("\n✅ Indexing completed successfully!");
    println!("📊 Stored {} chunks (dim {})", store.len(), store.dimension());
    println!("\n💡 Ask a question with: cargo run --bin navigator -- ask '<question>'");
    Ok(())
}
