//! Root client that hands out the per-resource sub-clients.

use crate::api::{DocumentClient, GraphClient, ThreadClient, UserClient};
use crate::config::ZepConfig;
use crate::error::Result;
use crate::http::HttpClient;

/// Entry point for the Zep API.
///
/// Cloning is cheap; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct Zep {
    http: HttpClient,
}

impl Zep {
    pub fn new(config: &ZepConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(config)?,
        })
    }

    /// Build from `ZEP_API_KEY` / `ZEP_API_URL`.
    pub fn from_env() -> Result<Self> {
        Self::new(&ZepConfig::from_env())
    }

    pub fn from_http(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn thread(&self) -> ThreadClient {
        ThreadClient::new(self.http.clone())
    }

    pub fn user(&self) -> UserClient {
        UserClient::new(self.http.clone())
    }

    pub fn graph(&self) -> GraphClient {
        GraphClient::new(self.http.clone())
    }

    pub fn document(&self) -> DocumentClient {
        DocumentClient::new(self.http.clone())
    }
}
