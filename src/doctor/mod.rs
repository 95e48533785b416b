//! Doctor command for deployment diagnostics
//!
//! Checks each collaborator the pipeline depends on without running a query.

use tokio::runtime::Handle;

use crate::config::Config;
use crate::generation::OpenAIChatClient;
use crate::rag::reranking::cross_encoder::ModelFiles;
use crate::vector_db::QdrantStore;

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Pass,
    Warn(String),
    Fail(String),
}

/// Individual health check
#[derive(Debug)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
        }
    }
}

/// Doctor diagnostics system
pub struct Doctor {
    config: Config,
}

impl Doctor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run all health checks
    ///
    /// Remote checks are skipped once configuration is known to be invalid.
    pub async fn run_diagnostics(&self) -> Vec<HealthCheck> {
        let mut checks = vec![self.check_configuration()];

        if checks[0].status == HealthStatus::Pass {
            checks.push(self.check_vector_store().await);
            checks.push(self.check_openai().await);
        }
        checks.push(self.check_reranker_model());

        checks
    }

    /// True when no check failed
    pub fn all_passed(checks: &[HealthCheck]) -> bool {
        checks
            .iter()
            .all(|c| !matches!(c.status, HealthStatus::Fail(_)))
    }

    /// Check 1: credentials and sizing
    fn check_configuration(&self) -> HealthCheck {
        match self.config.validate() {
            Ok(()) => HealthCheck::new("Configuration", HealthStatus::Pass),
            Err(e) => HealthCheck::new("Configuration", HealthStatus::Fail(e.to_string())),
        }
    }

    /// Check 2: Qdrant reachable and corpus collection present
    async fn check_vector_store(&self) -> HealthCheck {
        let name = "Vector Store";
        let store = match QdrantStore::connect(&self.config.qdrant, Handle::current()) {
            Ok(store) => store,
            Err(e) => return HealthCheck::new(name, HealthStatus::Fail(format!("{:#}", e))),
        };

        match store.health_check().await {
            Ok(true) => HealthCheck::new(name, HealthStatus::Pass),
            Ok(false) => HealthCheck::new(
                name,
                HealthStatus::Fail(format!("collection '{}' does not exist", store.collection())),
            ),
            Err(e) => HealthCheck::new(name, HealthStatus::Fail(format!("{:#}", e))),
        }
    }

    /// Check 3: OpenAI API reachable with the configured key
    async fn check_openai(&self) -> HealthCheck {
        let name = "OpenAI API";
        let client = match OpenAIChatClient::new(&self.config.openai) {
            Ok(client) => client,
            Err(e) => return HealthCheck::new(name, HealthStatus::Fail(format!("{:#}", e))),
        };

        match client.health_check().await {
            Ok(true) => HealthCheck::new(name, HealthStatus::Pass),
            Ok(false) => HealthCheck::new(
                name,
                HealthStatus::Fail("API unreachable or key rejected".to_string()),
            ),
            Err(e) => HealthCheck::new(name, HealthStatus::Fail(format!("{:#}", e))),
        }
    }

    /// Check 4: reranker files present locally (downloaded on first start otherwise)
    fn check_reranker_model(&self) -> HealthCheck {
        let name = "Reranker Model";
        match ModelFiles::from_cache(&self.config.reranker.model_id) {
            Some(_) => HealthCheck::new(name, HealthStatus::Pass),
            None => HealthCheck::new(
                name,
                HealthStatus::Warn(format!(
                    "'{}' not in local cache; it will be downloaded at startup",
                    self.config.reranker.model_id
                )),
            ),
        }
    }
}
