use crate::error::Result;
use crate::http::HttpClient;
use crate::models::{EntityEdge, EntityNode, EpisodeResponse, GraphPageRequest};

use super::graph::GraphOwner;
use super::require_id;

/// Entity node lookups under `graph/node`
#[derive(Debug, Clone)]
pub struct NodeClient {
    http: HttpClient,
}

impl NodeClient {
    pub(crate) fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn get_by_user_id(&self, user_id: &str, page: &GraphPageRequest) -> Result<Vec<EntityNode>> {
        self.list(GraphOwner::User(user_id), page).await
    }

    pub async fn get_by_graph_id(&self, graph_id: &str, page: &GraphPageRequest) -> Result<Vec<EntityNode>> {
        self.list(GraphOwner::Graph(graph_id), page).await
    }

    pub async fn list(&self, owner: GraphOwner<'_>, page: &GraphPageRequest) -> Result<Vec<EntityNode>> {
        let [kind, id] = owner.segments()?;
        let nodes: Option<Vec<EntityNode>> = self.http.post(&["graph", "node", kind, id], page).await?;
        Ok(nodes.unwrap_or_default())
    }

    pub async fn get(&self, uuid: &str) -> Result<EntityNode> {
        let uuid = require_id(uuid, "uuid")?;
        self.http.get(&["graph", "node", uuid]).await
    }

    /// Edges touching a node
    pub async fn get_edges(&self, uuid: &str) -> Result<Vec<EntityEdge>> {
        let uuid = require_id(uuid, "uuid")?;
        let edges: Option<Vec<EntityEdge>> = self.http.get(&["graph", "node", uuid, "entity-edges"]).await?;
        Ok(edges.unwrap_or_default())
    }

    /// Episodes that mention a node
    pub async fn get_episodes(&self, uuid: &str) -> Result<EpisodeResponse> {
        let uuid = require_id(uuid, "uuid")?;
        let episodes: Option<EpisodeResponse> = self.http.get(&["graph", "node", uuid, "episodes"]).await?;
        Ok(episodes.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::http_for;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_by_user_id_posts_cursor() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/graph/node/user/jane")
            .match_body(Matcher::Json(json!({"limit": 2, "uuid_cursor": "n-0"})))
            .with_status(200)
            .with_body(r#"[{"uuid":"n-1","name":"Jane"},{"uuid":"n-2","name":"Adidas"}]"#)
            .create_async()
            .await;

        let client = NodeClient::new(http_for(&server));
        let page = GraphPageRequest {
            limit: Some(2),
            uuid_cursor: Some("n-0".to_string()),
        };
        let nodes = client.get_by_user_id("jane", &page).await.unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].name, "Adidas");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_edges_and_episodes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/graph/node/n-1/entity-edges")
            .with_status(200)
            .with_body(r#"[{"uuid":"e-1","fact":"Jane likes Adidas"}]"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/v2/graph/node/n-1/episodes")
            .with_status(200)
            .with_body(r#"{"episodes":[{"uuid":"ep-1","content":"hi"}]}"#)
            .create_async()
            .await;

        let client = NodeClient::new(http_for(&server));
        assert_eq!(client.get_edges("n-1").await.unwrap()[0].fact, "Jane likes Adidas");
        assert_eq!(client.get_episodes("n-1").await.unwrap().episodes.len(), 1);
    }
}
