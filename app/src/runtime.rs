//! Wiring of codec, cache, service and sweeper

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{info, warn};
use ts_core::{
    ExpirySweeper, JwtCodec, SweeperConfig, SweeperHandle, TokenService, TokenServiceConfig,
};
use ts_shared::config::AppConfig;

/// Running token core: the shared service plus its sweeper task
pub struct Runtime {
    service: Arc<TokenService<JwtCodec>>,
    sweeper: SweeperHandle,
}

impl Runtime {
    /// Build the token service and start the cache sweeper
    ///
    /// Must be called from within a tokio runtime. Refuses to start in
    /// production with the built-in development secret.
    pub fn start(config: &AppConfig) -> anyhow::Result<Self> {
        if config.jwt.is_using_default_secret() {
            if config.environment.is_production() {
                bail!("JWT_SECRET must be set in production");
            }
            warn!("JWT_SECRET is not set, using the development secret");
        }

        let codec =
            JwtCodec::from_config(&config.jwt).context("invalid JWT configuration")?;
        let service = Arc::new(TokenService::new(
            codec,
            TokenServiceConfig::from(&config.jwt),
        ));

        let sweeper = ExpirySweeper::new(
            Arc::clone(service.cache()),
            SweeperConfig::from(&config.cache),
        )
        .start();

        info!(
            "Token service ready (sign ttl {}s, claims ttl {}s)",
            config.jwt.sign_ttl_seconds, config.jwt.claims_ttl_seconds
        );

        Ok(Self { service, sweeper })
    }

    /// Shared token service handed to request handlers
    pub fn service(&self) -> &Arc<TokenService<JwtCodec>> {
        &self.service
    }

    pub fn sweeper_running(&self) -> bool {
        self.sweeper.is_running()
    }

    /// Stop the sweeper and wait for it to exit
    pub async fn shutdown(self) {
        self.sweeper.shutdown().await;
        info!("Token service stopped");
    }
}
