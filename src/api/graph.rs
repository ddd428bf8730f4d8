use tracing::debug;

use crate::error::{Result, ZepError};
use crate::http::{query, HttpClient};
use crate::models::{
    AddDataRequest, ApiAck, CreateGraphRequest, EdgeType, EntityType, Episode, FactsResponse, Graph,
    GraphDataType, GraphListResponse, GraphSearchQuery, GraphSearchResults, Ontology, Reranker,
    UpdateGraphRequest,
};

use super::{require_id, EdgeClient, EpisodeClient, NodeClient};

/// Longest search query the server accepts
pub const MAX_QUERY_LENGTH: usize = 400;

/// Whose graph a listing targets: a user's personal graph or a named graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphOwner<'a> {
    User(&'a str),
    Graph(&'a str),
}

impl<'a> GraphOwner<'a> {
    /// Path segments `[kind, id]` used under `graph/node`, `graph/edge` and `graph/episodes`
    pub(crate) fn segments(&self) -> Result<[&'a str; 2]> {
        match *self {
            Self::User(id) => Ok(["user", require_id(id, "user_id")?]),
            Self::Graph(id) => Ok(["graph", require_id(id, "graph_id")?]),
        }
    }
}

/// Exactly one of `user_id` / `graph_id` must be present.
fn check_target(user_id: Option<&str>, graph_id: Option<&str>) -> Result<()> {
    let present = |v: Option<&str>| v.is_some_and(|s| !s.trim().is_empty());
    match (present(user_id), present(graph_id)) {
        (true, false) | (false, true) => Ok(()),
        (true, true) => Err(ZepError::InvalidArgument(
            "only one of user_id or graph_id may be set".to_string(),
        )),
        (false, false) => Err(ZepError::InvalidArgument(
            "either user_id or graph_id must be set".to_string(),
        )),
    }
}

#[derive(Debug, Clone)]
pub struct GraphClient {
    http: HttpClient,
}

impl GraphClient {
    pub(crate) fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn node(&self) -> NodeClient {
        NodeClient::new(self.http.clone())
    }

    pub fn edge(&self) -> EdgeClient {
        EdgeClient::new(self.http.clone())
    }

    pub fn episode(&self) -> EpisodeClient {
        EpisodeClient::new(self.http.clone())
    }

    // ========================================================================
    // Data
    // ========================================================================

    /// Ingest text, JSON or a message as a new episode.
    pub async fn add(&self, request: &AddDataRequest) -> Result<Episode> {
        check_target(request.user_id.as_deref(), request.graph_id.as_deref())?;
        if request.data.trim().is_empty() {
            return Err(ZepError::InvalidArgument("data must not be empty".to_string()));
        }
        if request.data_type == GraphDataType::Json {
            serde_json::from_str::<serde_json::Value>(&request.data).map_err(|e| {
                ZepError::InvalidArgument(format!("data is not valid JSON: {}", e))
            })?;
        }
        debug!(
            data_type = request.data_type.as_str(),
            len = request.data.len(),
            "adding graph data"
        );
        self.http.post(&["graph"], request).await
    }

    pub async fn search(&self, search: &GraphSearchQuery) -> Result<GraphSearchResults> {
        check_target(search.user_id.as_deref(), search.graph_id.as_deref())?;
        if search.query.trim().is_empty() {
            return Err(ZepError::InvalidArgument("query must not be empty".to_string()));
        }
        if search.query.chars().count() > MAX_QUERY_LENGTH {
            return Err(ZepError::InvalidArgument(format!(
                "query must be at most {} characters",
                MAX_QUERY_LENGTH
            )));
        }
        if let Some(lambda) = search.mmr_lambda {
            if !(0.0..=1.0).contains(&lambda) {
                return Err(ZepError::InvalidArgument(
                    "mmr_lambda must be between 0 and 1".to_string(),
                ));
            }
            if search.reranker != Some(Reranker::Mmr) {
                debug!("mmr_lambda is ignored unless the mmr reranker is used");
            }
        }
        let results: Option<GraphSearchResults> = self.http.post(&["graph", "search"], search).await?;
        Ok(results.unwrap_or_default())
    }

    // ========================================================================
    // Graph administration
    // ========================================================================

    pub async fn create(
        &self,
        graph_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Graph> {
        let body = CreateGraphRequest {
            graph_id: require_id(graph_id, "graph_id")?.to_string(),
            name: name.map(String::from),
            description: description.map(String::from),
        };
        self.http.post(&["graph", "create"], &body).await
    }

    pub async fn get(&self, graph_id: &str) -> Result<Graph> {
        let graph_id = require_id(graph_id, "graph_id")?;
        self.http.get(&["graph", graph_id]).await
    }

    pub async fn update(&self, graph_id: &str, request: &UpdateGraphRequest) -> Result<Graph> {
        let graph_id = require_id(graph_id, "graph_id")?;
        self.http.patch(&["graph", graph_id], request).await
    }

    pub async fn delete(&self, graph_id: &str) -> Result<ApiAck> {
        let graph_id = require_id(graph_id, "graph_id")?;
        let ack: Option<ApiAck> = self.http.delete(&["graph", graph_id]).await?;
        Ok(ack.unwrap_or_default())
    }

    pub async fn list_all(
        &self,
        page_number: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<GraphListResponse> {
        let q = query([
            ("pageNumber", page_number.map(|n| n.to_string())),
            ("pageSize", page_size.map(|n| n.to_string())),
        ]);
        self.http.get_with_query(&["graph", "list-all"], &q).await
    }

    /// Facts of a named graph; the server still routes these under `groups`.
    pub async fn get_facts(&self, graph_id: &str) -> Result<FactsResponse> {
        let graph_id = require_id(graph_id, "graph_id")?;
        let facts: Option<FactsResponse> = self.http.get(&["groups", graph_id, "facts"]).await?;
        Ok(facts.unwrap_or_default())
    }

    // ========================================================================
    // Ontology
    // ========================================================================

    /// Replace the project's custom entity and edge types.
    pub async fn set_ontology(&self, entity_types: &[EntityType], edge_types: &[EdgeType]) -> Result<ApiAck> {
        let body = Ontology {
            entity_types: entity_types.to_vec(),
            edge_types: edge_types.to_vec(),
        };
        let ack: Option<ApiAck> = self.http.put(&["entity-types"], &body).await?;
        Ok(ack.unwrap_or_default())
    }

    pub async fn list_ontology(&self) -> Result<Ontology> {
        let ontology: Option<Ontology> = self.http.get(&["entity-types"]).await?;
        Ok(ontology.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::http_for;
    use crate::models::{EntityProperty, EntityPropertyType, GraphSearchScope};
    use mockito::Matcher;
    use serde_json::json;

    fn search_for_user(q: &str) -> GraphSearchQuery {
        GraphSearchQuery {
            query: q.to_string(),
            user_id: Some("jane".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_check_target() {
        assert!(check_target(Some("u"), None).is_ok());
        assert!(check_target(None, Some("g")).is_ok());
        assert!(check_target(Some("u"), Some("g")).is_err());
        assert!(check_target(None, None).is_err());
        assert!(check_target(Some(""), None).is_err());
    }

    #[test]
    fn test_owner_segments() {
        assert_eq!(GraphOwner::User("jane").segments().unwrap(), ["user", "jane"]);
        assert_eq!(GraphOwner::Graph("shop").segments().unwrap(), ["graph", "shop"]);
        assert!(GraphOwner::Graph("").segments().is_err());
    }

    #[tokio::test]
    async fn test_add_text_data() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/graph")
            .match_body(Matcher::Json(json!({
                "data": "Jane bought trail shoes",
                "type": "text",
                "user_id": "jane"
            })))
            .with_status(202)
            .with_body(r#"{"uuid":"ep-1","content":"Jane bought trail shoes","source":"text"}"#)
            .create_async()
            .await;

        let client = GraphClient::new(http_for(&server));
        let episode = client
            .add(&AddDataRequest::for_user("jane", GraphDataType::Text, "Jane bought trail shoes"))
            .await
            .unwrap();
        assert_eq!(episode.uuid, "ep-1");
        assert_eq!(episode.source, Some(GraphDataType::Text));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_json() {
        let server = mockito::Server::new_async().await;
        let client = GraphClient::new(http_for(&server));
        let err = client
            .add(&AddDataRequest::for_graph("shop", GraphDataType::Json, "{not json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[tokio::test]
    async fn test_search_validation() {
        let server = mockito::Server::new_async().await;
        let client = GraphClient::new(http_for(&server));

        assert!(client.search(&search_for_user("")).await.is_err());
        assert!(client.search(&search_for_user(&"x".repeat(401))).await.is_err());

        let mut bad_lambda = search_for_user("shoes");
        bad_lambda.reranker = Some(Reranker::Mmr);
        bad_lambda.mmr_lambda = Some(1.5);
        assert!(client.search(&bad_lambda).await.is_err());
    }

    #[tokio::test]
    async fn test_search_returns_edges() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/graph/search")
            .match_body(Matcher::PartialJson(json!({"query": "shoes", "scope": "nodes"})))
            .with_status(200)
            .with_body(r#"{"nodes":[{"uuid":"n-1","name":"Adidas","summary":"Brand"}]}"#)
            .create_async()
            .await;

        let client = GraphClient::new(http_for(&server));
        let mut q = search_for_user("shoes");
        q.scope = Some(GraphSearchScope::Nodes);
        let results = client.search(&q).await.unwrap();
        assert_eq!(results.nodes[0].name, "Adidas");
        assert!(results.edges.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_set_ontology() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/v2/entity-types")
            .match_body(Matcher::PartialJson(json!({
                "entity_types": [{"name": "Brand"}]
            })))
            .with_status(200)
            .with_body(r#"{"message":"ok"}"#)
            .create_async()
            .await;

        let client = GraphClient::new(http_for(&server));
        let entity = EntityType {
            name: "Brand".to_string(),
            description: "A shoe brand".to_string(),
            properties: vec![EntityProperty::new("founded", EntityPropertyType::Int, "Year founded")],
        };
        let ack = client.set_ontology(&[entity], &[]).await.unwrap();
        assert_eq!(ack.message.as_deref(), Some("ok"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_graph_facts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/groups/shop/facts")
            .with_status(200)
            .with_body(r#"{"facts":[{"uuid":"f-1","fact":"Trail shoes restock monthly"}]}"#)
            .create_async()
            .await;

        let client = GraphClient::new(http_for(&server));
        let facts = client.get_facts("shop").await.unwrap();
        assert_eq!(facts.facts[0].fact, "Trail shoes restock monthly");
        mock.assert_async().await;

        assert!(client.get_facts("").await.is_err());
    }
}
