use crate::error::Result;
use crate::http::HttpClient;
use crate::models::{ApiAck, EntityEdge, GraphPageRequest};

use super::graph::GraphOwner;
use super::require_id;

/// Fact (edge) lookups under `graph/edge`
#[derive(Debug, Clone)]
pub struct EdgeClient {
    http: HttpClient,
}

impl EdgeClient {
    pub(crate) fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn get_by_user_id(&self, user_id: &str, page: &GraphPageRequest) -> Result<Vec<EntityEdge>> {
        self.list(GraphOwner::User(user_id), page).await
    }

    pub async fn get_by_graph_id(&self, graph_id: &str, page: &GraphPageRequest) -> Result<Vec<EntityEdge>> {
        self.list(GraphOwner::Graph(graph_id), page).await
    }

    pub async fn list(&self, owner: GraphOwner<'_>, page: &GraphPageRequest) -> Result<Vec<EntityEdge>> {
        let [kind, id] = owner.segments()?;
        let edges: Option<Vec<EntityEdge>> = self.http.post(&["graph", "edge", kind, id], page).await?;
        Ok(edges.unwrap_or_default())
    }

    pub async fn get(&self, uuid: &str) -> Result<EntityEdge> {
        let uuid = require_id(uuid, "uuid")?;
        self.http.get(&["graph", "edge", uuid]).await
    }

    pub async fn delete(&self, uuid: &str) -> Result<ApiAck> {
        let uuid = require_id(uuid, "uuid")?;
        let ack: Option<ApiAck> = self.http.delete(&["graph", "edge", uuid]).await?;
        Ok(ack.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::http_for;

    #[tokio::test]
    async fn test_get_by_graph_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/graph/edge/graph/shop")
            .with_status(200)
            .with_body(
                r#"[{"uuid":"e-1","name":"SELLS","fact":"Shop sells trail shoes","valid_at":"2024-05-01T10:00:00Z"}]"#,
            )
            .create_async()
            .await;

        let client = EdgeClient::new(http_for(&server));
        let edges = client
            .get_by_graph_id("shop", &GraphPageRequest::default())
            .await
            .unwrap();
        assert_eq!(edges[0].name, "SELLS");
        assert_eq!(edges[0].valid_at.as_deref(), Some("2024-05-01T10:00:00Z"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_edge() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/v2/graph/edge/e-1")
            .with_status(200)
            .with_body(r#"{"message":"deleted"}"#)
            .create_async()
            .await;

        let client = EdgeClient::new(http_for(&server));
        assert_eq!(client.delete("e-1").await.unwrap().message.as_deref(), Some("deleted"));
        mock.assert_async().await;
    }
}
