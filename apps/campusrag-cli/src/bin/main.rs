use std::env;
use std::fs;
use std::sync::Arc;

use campusrag_chunk::chunk_corpus;
use campusrag_core::config::{expand_path, Config};
use campusrag_core::corpus::Corpus;
use campusrag_embed::SharedEmbedder;
use campusrag_retriever::{Retriever, DEFAULT_TOP_K};
use campusrag_store::VectorStore;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {} <query|stats|debug|chunks> [args...]", prog);
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn load_corpus(config: &Config) -> anyhow::Result<Corpus> {
    let knowledge_path: String = config
        .get("corpus.knowledge_path")
        .unwrap_or_else(|_| "data/knowledge.json".to_string());
    let locations_path: String = config
        .get("corpus.locations_path")
        .unwrap_or_else(|_| "data/locations.json".to_string());
    let knowledge = fs::read_to_string(expand_path(&knowledge_path))?;
    let locations = fs::read_to_string(expand_path(&locations_path))?;
    Corpus::from_json(&knowledge, &locations)
}

fn build_retriever(corpus: Corpus) -> (Retriever, Arc<VectorStore>) {
    let embedder = Arc::new(SharedEmbedder::with_default_backend());
    let store = Arc::new(VectorStore::new(embedder));
    (Retriever::new(corpus, store.clone()), store)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::load()?;
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "query" => {
            let query_text = args.first().cloned().unwrap_or_else(|| {
                eprintln!("Usage: campusrag query \"<question>\" [top_k]");
                std::process::exit(1)
            });
            let top_k = args
                .get(1)
                .and_then(|s| s.parse().ok())
                .or_else(|| config.get("search.top_k").ok())
                .unwrap_or(DEFAULT_TOP_K);
            let (retriever, _) = build_retriever(load_corpus(&config)?);
            let result = retriever.retrieve_context(&query_text, top_k).await;
            println!("{}", result.context);
            if !result.sources.is_empty() {
                println!("\nSources:");
                for source in &result.sources {
                    println!("  {}", serde_json::to_string(source)?);
                }
            }
        }
        "stats" => {
            let (retriever, store) = build_retriever(load_corpus(&config)?);
            retriever.ensure_ready().await?;
            println!("{}", serde_json::to_string_pretty(&store.stats())?);
        }
        "debug" => {
            let query_text = args.first().cloned().unwrap_or_else(|| {
                eprintln!("Usage: campusrag debug \"<question>\"");
                std::process::exit(1)
            });
            let (retriever, _) = build_retriever(load_corpus(&config)?);
            let report = retriever.debug_report(&query_text).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "chunks" => {
            let corpus = load_corpus(&config)?;
            let chunks = chunk_corpus(&corpus);
            println!("{} chunks", chunks.len());
            for chunk in &chunks {
                println!("  {}", serde_json::to_string(&chunk.metadata)?);
            }
        }
        _ => {
            eprintln!("Unknown command: {}", cmd);
            std::process::exit(1);
        }
    }
    Ok(())
}
