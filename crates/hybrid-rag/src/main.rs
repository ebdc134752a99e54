//! Command line front end for the hybrid retriever
//!
//! Usage:
//!   hybrid-rag route "How is the X200 related to the Y300?"
//!   hybrid-rag status --reconnect
//!   hybrid-rag ingest docs/catalog.md docs/history.csv
//!   hybrid-rag ask --ingest docs/catalog.md "What is the price of the X200?"
//!   hybrid-rag chat --ingest docs/catalog.md

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

use hybrid_rag::{
    GraphStoreConnector, HybridRetriever, KeywordRouter, QueryClassifier, RagConfig,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the route a query would take
    Route {
        query: String,
    },

    /// Report which stores are reachable
    Status {
        /// Repeat the graph connection sequence before reporting
        #[arg(long)]
        reconnect: bool,
    },

    /// Load files into the vector index and the knowledge graph
    Ingest {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Answer a single question
    Ask {
        query: String,

        /// Files to ingest before answering
        #[arg(long)]
        ingest: Vec<PathBuf>,
    },

    /// Answer questions read from stdin, one per line
    Chat {
        /// Files to ingest before the first question
        #[arg(long)]
        ingest: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    hybrid_rag::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Route { query } => {
            println!("{}", KeywordRouter::default().classify(&query));
        }
        Commands::Status { reconnect } => {
            let config = RagConfig::load().context("Failed to load configuration")?;
            match &config.vector.qdrant_url {
                Some(url) => println!("vector: qdrant {} ({})", url, config.vector.collection),
                None => println!("vector: in-memory"),
            }
            if config.graph.enabled {
                let mut connector = GraphStoreConnector::connect(config.graph.clone()).await;
                if reconnect {
                    connector.reconnect().await;
                }
                let state = connector.state();
                println!("graph: {} {}", state.transport, state.endpoint);
            } else {
                println!("graph: disabled");
            }
        }
        Commands::Ingest { paths } => {
            let retriever = build_retriever().await?;
            let summary = retriever.ingest(&paths).await.context("Ingestion failed")?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Ask { query, ingest } => {
            let retriever = build_retriever().await?;
            preload(&retriever, &ingest).await?;
            let answer = retriever.answer(&query).await.context("Answer generation failed")?;
            println!("{}\n", answer.text);
            println!(
                "route: {}, chunks: {}, latency: {:.0} ms (vector: {}, graph: {})",
                answer.route,
                answer.chunks.len(),
                answer.metrics.latency_ms,
                format_latency(answer.metrics.vector_store_latency_ms),
                format_latency(answer.metrics.graph_store_latency_ms)
            );
        }
        Commands::Chat { ingest } => {
            let retriever = build_retriever().await?;
            preload(&retriever, &ingest).await?;
            if !retriever.is_graph_available() {
                eprintln!("Graph store unavailable; answering from the vector index only");
            }

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                let query = line.trim();
                if query.is_empty() {
                    continue;
                }
                if matches!(query, "exit" | "quit") {
                    break;
                }
                match retriever.answer(query).await {
                    Ok(answer) => println!("[{}] {}\n", answer.route, answer.text),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
        }
    }

    Ok(())
}

fn format_latency(latency_ms: Option<f64>) -> String {
    latency_ms.map_or_else(|| "-".to_string(), |ms| format!("{:.0} ms", ms))
}

async fn build_retriever() -> Result<HybridRetriever> {
    let config = RagConfig::load().context("Failed to load configuration")?;
    HybridRetriever::from_config(&config)
        .await
        .context("Failed to initialize retriever")
}

async fn preload(retriever: &HybridRetriever, paths: &[PathBuf]) -> Result<()> {
    if paths.is_empty() {
        return Ok(());
    }
    let summary = retriever.ingest(paths).await.context("Ingestion failed")?;
    eprintln!(
        "Ingested {} chunks, {} entities, {} relations",
        summary.vector_chunks, summary.graph_entities, summary.graph_relations
    );
    Ok(())
}
