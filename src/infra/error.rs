//! Failures that stop the process before or while it serves.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::LoadError;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] LoadError),
    #[error("failed to connect to the document store: {0}")]
    StoreConnect(#[source] sqlx::Error),
    #[error("document store migrations failed: {0}")]
    Migration(#[source] sqlx::Error),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("http server stopped: {0}")]
    Serve(#[source] std::io::Error),
}

impl InfraError {
    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
