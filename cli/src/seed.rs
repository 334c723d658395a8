// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Agent seed files for the in-memory directory.
//!
//! ```yaml
//! agents:
//!   - agent_name: translator.agents.example
//!     verified: true
//!     a2a:
//!       supported_tasks: [translate, summarize]
//!       negotiation: true
//!       token_budget: 4000
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use agora_core::domain::agent::AgentCapabilityRecord;
use agora_core::infrastructure::repositories::InMemoryAgentDirectory;

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    agents: Vec<AgentCapabilityRecord>,
}

pub fn parse_seed(yaml: &str) -> Result<Vec<AgentCapabilityRecord>> {
    let file: SeedFile = serde_yaml::from_str(yaml).context("Invalid agent seed file")?;
    Ok(file.agents)
}

/// Build an in-memory directory from a seed file. Every name is validated.
pub async fn load_directory(path: &Path) -> Result<InMemoryAgentDirectory> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read agent seed file {:?}", path))?;
    let records = parse_seed(&content)?;

    let directory = InMemoryAgentDirectory::new();
    let count = records.len();
    for record in records {
        let name = record.name().to_string();
        directory
            .register(record)
            .await
            .with_context(|| format!("Rejected seed agent '{}'", name))?;
    }

    tracing::info!("Seeded {} agents from {:?}", count, path);
    Ok(directory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::domain::repository::AgentDirectory;

    const SEED: &str = r#"
agents:
  - agent_name: translator.agents.example
    a2a:
      supported_tasks: [translate]
      negotiation: true
      token_budget: 4000
  - agent_name: retired.agents.example
    active: false
"#;

    #[test]
    fn test_parse_seed_defaults() {
        let records = parse_seed(SEED).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].active);
        assert!(records[0].negotiation_capable());
        assert_eq!(records[0].token_budget(), 4000);
        assert!(!records[1].active);
        assert!(records[1].supported_tasks().is_empty());
    }

    #[tokio::test]
    async fn test_load_directory_registers_agents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents.yaml");
        std::fs::write(&path, SEED).unwrap();

        let directory = load_directory(&path).await.unwrap();
        let found = directory.find_by_name("translator.agents.example").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_load_directory_rejects_bad_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents.yaml");
        std::fs::write(&path, "agents:\n  - agent_name: bad..name\n").unwrap();

        let Err(err) = load_directory(&path).await else {
            panic!("seed with an invalid agent name was accepted");
        };
        assert!(err.to_string().contains("bad..name"));
    }
}
