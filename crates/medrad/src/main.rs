//! Medra Daemon - dataset bias & coverage analysis service
//!
//! Loads the weighted disease knowledge base, wires up the scoring model,
//! and serves the analysis over HTTP for the dashboard.

mod config;
mod routes;
mod server;

use anyhow::{Context, Result};
use config::MedradConfig;
use medra_common::{BiasAnalyzer, KnowledgeBase, LogisticScorer, SimulationConfig};
use std::sync::Arc;
use tracing::{info, Level};

/// Bundled disease weight table, used when no knowledge file is configured.
const DEFAULT_KNOWLEDGE: &str = include_str!("../data/disease_weights.json");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Medra Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let config = MedradConfig::load();

    let knowledge = Arc::new(load_knowledge(&config)?);
    info!(
        "Knowledge base loaded: {} diseases, {} symptom slots",
        knowledge.len(),
        knowledge.symptom_counts().iter().sum::<usize>()
    );

    let scorer = Arc::new(LogisticScorer::new(Arc::clone(&knowledge)));
    let analyzer = BiasAnalyzer::new(
        knowledge,
        scorer,
        SimulationConfig {
            runs: config.analysis.simulation_runs,
            seed: config.analysis.simulation_seed,
        },
    );

    let state = server::AppState::new(analyzer);
    server::run(state, &config.server.bind).await
}

fn load_knowledge(config: &MedradConfig) -> Result<KnowledgeBase> {
    match &config.analysis.knowledge_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading knowledge file {path}"))?;
            KnowledgeBase::from_json_str(&raw)
                .with_context(|| format!("validating knowledge file {path}"))
        }
        None => KnowledgeBase::from_json_str(DEFAULT_KNOWLEDGE)
            .context("validating bundled knowledge base"),
    }
}
