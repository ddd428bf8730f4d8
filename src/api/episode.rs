use crate::error::Result;
use crate::http::{query, HttpClient};
use crate::models::{ApiAck, Episode, EpisodeMentions, EpisodeResponse};

use super::graph::GraphOwner;
use super::require_id;

/// Episode lookups under `graph/episodes`
#[derive(Debug, Clone)]
pub struct EpisodeClient {
    http: HttpClient,
}

impl EpisodeClient {
    pub(crate) fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn get_by_user_id(&self, user_id: &str, lastn: Option<u32>) -> Result<EpisodeResponse> {
        self.list(GraphOwner::User(user_id), lastn).await
    }

    pub async fn get_by_graph_id(&self, graph_id: &str, lastn: Option<u32>) -> Result<EpisodeResponse> {
        self.list(GraphOwner::Graph(graph_id), lastn).await
    }

    /// Most recent episodes for an owner; `lastn` caps the count
    pub async fn list(&self, owner: GraphOwner<'_>, lastn: Option<u32>) -> Result<EpisodeResponse> {
        let [kind, id] = owner.segments()?;
        let q = query([("lastn", lastn.map(|n| n.to_string()))]);
        let episodes: Option<EpisodeResponse> = self
            .http
            .get_with_query(&["graph", "episodes", kind, id], &q)
            .await?;
        Ok(episodes.unwrap_or_default())
    }

    pub async fn get(&self, uuid: &str) -> Result<Episode> {
        let uuid = require_id(uuid, "uuid")?;
        self.http.get(&["graph", "episodes", uuid]).await
    }

    pub async fn delete(&self, uuid: &str) -> Result<ApiAck> {
        let uuid = require_id(uuid, "uuid")?;
        let ack: Option<ApiAck> = self.http.delete(&["graph", "episodes", uuid]).await?;
        Ok(ack.unwrap_or_default())
    }

    /// Nodes and edges extracted from an episode
    pub async fn get_nodes_and_edges(&self, uuid: &str) -> Result<EpisodeMentions> {
        let uuid = require_id(uuid, "uuid")?;
        let mentions: Option<EpisodeMentions> = self
            .http
            .get(&["graph", "episodes", uuid, "mentions"])
            .await?;
        Ok(mentions.unwrap_or_default())
    }
}
