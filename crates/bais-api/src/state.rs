//! Application state.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use bais_analysis::AnalysisClient;
use bais_billing::{BillingService, KakaoPayClient, PendingPayment};
use bais_db::Database;
use bais_storage::S3Client;
use bais_worker::{PipelineConfig, UploadPipeline};

use crate::auth::SessionSigner;
use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub db: Database,
    pub storage: Arc<S3Client>,
    pub billing: Arc<BillingService>,
    pub pipeline: Arc<UploadPipeline>,
    pub sessions: Arc<SessionSigner>,
    /// Pending payment sessions between ready and approve, keyed by
    /// partner order id (single-instance semantics)
    pub pending_payments: Arc<RwLock<HashMap<String, PendingPayment>>>,
}

impl AppState {
    /// Create new application state from the environment.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::from_env().await?;
        db.migrate().await?;

        let storage = S3Client::from_env().await?;
        let analysis = AnalysisClient::from_env()?;
        let kakao = KakaoPayClient::from_env()?;

        let billing = BillingService::new(&db, kakao);
        let pipeline = UploadPipeline::new(
            storage.clone(),
            analysis,
            &db,
            PipelineConfig::from_env(),
        );

        let sessions = SessionSigner::new(
            config.session_secret.as_bytes().to_vec(),
            config.session_ttl,
        );

        Ok(Self {
            config,
            db,
            storage: Arc::new(storage),
            billing: Arc::new(billing),
            pipeline: Arc::new(pipeline),
            sessions: Arc::new(sessions),
            pending_payments: Arc::new(RwLock::new(HashMap::new())),
        })
    }
}
