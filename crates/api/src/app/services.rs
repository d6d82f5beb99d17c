//! Service wiring: credential store, sequence counters and record storage,
//! either in-memory (dev/tests) or Postgres-backed.

use std::sync::Arc;

use thiserror::Error;

use carehub_auth::{AuthConfig, AuthService, CredentialStore, TokenIssuer, TracingNotifier};
use carehub_infra::clinical::{ClinicalRecord, ClinicalRecords, RecordStore};
use carehub_infra::credential_store::{InMemoryCredentialStore, PostgresCredentialStore};
use carehub_infra::db;
use carehub_infra::read_model::{InMemoryTenantStore, PostgresRecordStore};
use carehub_infra::sequence::{
    InMemorySequenceStore, PostgresSequenceStore, RetryPolicy, SequenceStore, TenantSequenceAllocator,
};

use crate::config::{AppConfig, ConfigError};

pub type SharedCredentialStore = Arc<dyn CredentialStore>;
pub type SharedSequenceStore = Arc<dyn SequenceStore>;

/// Everything handlers need, shared behind one `Arc`.
pub struct AppServices {
    pub auth: Arc<AuthService<SharedCredentialStore>>,
    pub records: ClinicalRecords<SharedSequenceStore>,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("database setup failed: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppServices {
    fn assemble(
        config: &AppConfig,
        credentials: SharedCredentialStore,
        sequences: SharedSequenceStore,
        records: RecordStore,
    ) -> Result<Self, ServiceError> {
        let issuer = TokenIssuer::new(config.jwt_secret.as_bytes(), config.session_ttl()?);
        let auth_config = AuthConfig {
            password_pepper: config.password_pepper.clone(),
            min_password_length: config.min_password_length,
            public_base_url: config.public_base_url.clone(),
        };
        let auth = AuthService::new(credentials, issuer, Arc::new(TracingNotifier), auth_config);

        let policy = RetryPolicy {
            max_retries: config.sequence_max_retries,
            ..RetryPolicy::default()
        };
        let allocator = TenantSequenceAllocator::with_policy(sequences, policy);

        Ok(Self {
            auth: Arc::new(auth),
            records: ClinicalRecords::new(allocator, records),
        })
    }

    pub fn in_memory(config: &AppConfig) -> Result<Self, ServiceError> {
        let records: Arc<InMemoryTenantStore<ClinicalRecord>> = Arc::new(InMemoryTenantStore::new());
        Self::assemble(
            config,
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(InMemorySequenceStore::new()),
            records,
        )
    }

    pub async fn persistent(config: &AppConfig) -> Result<Self, ServiceError> {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let pool = db::connect_and_migrate(database_url, config.db_max_connections).await?;

        Self::assemble(
            config,
            Arc::new(PostgresCredentialStore::new(pool.clone())),
            Arc::new(PostgresSequenceStore::new(pool.clone())),
            Arc::new(PostgresRecordStore::new(pool)),
        )
    }
}

pub async fn build_services(config: &AppConfig) -> Result<AppServices, ServiceError> {
    if config.use_persistent_stores {
        tracing::info!("using Postgres stores");
        AppServices::persistent(config).await
    } else {
        tracing::warn!("using in-memory stores; data is lost on restart");
        AppServices::in_memory(config)
    }
}

