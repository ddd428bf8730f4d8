use serde_json::Value;

use crate::api::GraphOwner;
use crate::client::Zep;
use crate::error::{Result, ZepError};
use crate::graph_context::compose_context_string;
use crate::models::{
    AddDataRequest, EdgesData, EpisodesData, GraphDataType, GraphPageRequest, GraphSearchData,
    GraphSearchQuery, GraphSearchScope, NodesData, Reranker, SuccessResponse,
};

/// Pick the graph a command targets; exactly one of the two IDs must be set
pub fn resolve_owner<'a>(user_id: Option<&'a str>, graph_id: Option<&'a str>) -> Result<GraphOwner<'a>> {
    match (user_id, graph_id) {
        (Some(user_id), None) => Ok(GraphOwner::User(user_id)),
        (None, Some(graph_id)) => Ok(GraphOwner::Graph(graph_id)),
        _ => Err(ZepError::InvalidArgument(
            "exactly one of --user-id or --graph-id is required".to_string(),
        )),
    }
}

fn owner_ids(owner: GraphOwner<'_>) -> (Option<String>, Option<String>) {
    match owner {
        GraphOwner::User(id) => (Some(id.to_string()), None),
        GraphOwner::Graph(id) => (None, Some(id.to_string())),
    }
}

pub async fn add_data(
    zep: &Zep,
    owner: GraphOwner<'_>,
    data_type: GraphDataType,
    data: &str,
    source_description: Option<String>,
) -> Result<Value> {
    let mut request = match owner {
        GraphOwner::User(id) => AddDataRequest::for_user(id, data_type, data),
        GraphOwner::Graph(id) => AddDataRequest::for_graph(id, data_type, data),
    };
    request.source_description = source_description;
    let episode = zep.graph().add(&request).await?;
    Ok(serde_json::to_value(SuccessResponse::new(episode))?)
}

/// Search a graph and render the hits as a context block
pub async fn search(
    zep: &Zep,
    owner: GraphOwner<'_>,
    query: &str,
    scope: GraphSearchScope,
    limit: Option<u32>,
    reranker: Option<Reranker>,
) -> Result<Value> {
    let (user_id, graph_id) = owner_ids(owner);
    let request = GraphSearchQuery {
        query: query.to_string(),
        user_id,
        graph_id,
        scope: Some(scope),
        limit,
        reranker,
        ..Default::default()
    };
    let results = zep.graph().search(&request).await?;
    let context = compose_context_string(&results.edges, &results.nodes);
    Ok(serde_json::to_value(SuccessResponse::new(GraphSearchData {
        edges: results.edges,
        nodes: results.nodes,
        episodes: results.episodes,
        context,
    }))?)
}

pub async fn list_nodes(
    zep: &Zep,
    owner: GraphOwner<'_>,
    limit: Option<u32>,
    cursor: Option<String>,
) -> Result<Value> {
    let page = GraphPageRequest {
        limit,
        uuid_cursor: cursor,
    };
    let nodes = zep.graph().node().list(owner, &page).await?;
    let count = nodes.len();
    Ok(serde_json::to_value(SuccessResponse::new(NodesData { nodes, count }))?)
}

pub async fn list_edges(
    zep: &Zep,
    owner: GraphOwner<'_>,
    limit: Option<u32>,
    cursor: Option<String>,
) -> Result<Value> {
    let page = GraphPageRequest {
        limit,
        uuid_cursor: cursor,
    };
    let edges = zep.graph().edge().list(owner, &page).await?;
    let count = edges.len();
    Ok(serde_json::to_value(SuccessResponse::new(EdgesData { edges, count }))?)
}

pub async fn list_episodes(zep: &Zep, owner: GraphOwner<'_>, lastn: Option<u32>) -> Result<Value> {
    let response = zep.graph().episode().list(owner, lastn).await?;
    let count = response.episodes.len();
    Ok(serde_json::to_value(SuccessResponse::new(EpisodesData {
        episodes: response.episodes,
        count,
    }))?)
}

// ============================================================================
// Tests
// ============================================================================
