//! Knowledge-graph models: nodes, edges, episodes, search and ontology.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ZepError;

// ============================================================================
// Graph elements
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityNode {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub attributes: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// A fact connecting two entity nodes, with its validity window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityEdge {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    pub fact: String,
    #[serde(default)]
    pub source_node_uuid: String,
    #[serde(default)]
    pub target_node_uuid: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub valid_at: Option<String>,
    #[serde(default)]
    pub invalid_at: Option<String>,
    #[serde(default)]
    pub expired_at: Option<String>,
    #[serde(default)]
    pub episodes: Vec<String>,
    #[serde(default)]
    pub attributes: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Kind of content ingested as an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphDataType {
    Text,
    Json,
    Message,
}

impl GraphDataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Message => "message",
        }
    }
}

impl FromStr for GraphDataType {
    type Err = ZepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "message" => Ok(Self::Message),
            _ => Err(ZepError::InvalidEpisodeType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub uuid: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub source: Option<GraphDataType>,
    #[serde(default)]
    pub source_description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub processed: Option<bool>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub role_type: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeResponse {
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

/// Nodes and edges mentioned by an episode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeMentions {
    #[serde(default)]
    pub nodes: Vec<EntityNode>,
    #[serde(default)]
    pub edges: Vec<EntityEdge>,
}

/// Cursor pagination body for node and edge listings
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphPageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid_cursor: Option<String>,
}

// ============================================================================
// Adding data
// ============================================================================

/// Data to ingest into a user graph or a standalone graph
#[derive(Debug, Clone, Serialize)]
pub struct AddDataRequest {
    pub data: String,
    #[serde(rename = "type")]
    pub data_type: GraphDataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl AddDataRequest {
    pub fn for_user(user_id: impl Into<String>, data_type: GraphDataType, data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            data_type,
            user_id: Some(user_id.into()),
            graph_id: None,
            source_description: None,
            created_at: None,
        }
    }

    pub fn for_graph(graph_id: impl Into<String>, data_type: GraphDataType, data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            data_type,
            user_id: None,
            graph_id: Some(graph_id.into()),
            source_description: None,
            created_at: None,
        }
    }
}

// ============================================================================
// Search
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphSearchScope {
    #[default]
    Edges,
    Nodes,
    Episodes,
}

impl FromStr for GraphSearchScope {
    type Err = ZepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "edges" => Ok(Self::Edges),
            "nodes" => Ok(Self::Nodes),
            "episodes" => Ok(Self::Episodes),
            _ => Err(ZepError::InvalidSearchScope(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reranker {
    Rrf,
    Mmr,
    NodeDistance,
    EpisodeMentions,
    CrossEncoder,
}

impl FromStr for Reranker {
    type Err = ZepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rrf" => Ok(Self::Rrf),
            "mmr" => Ok(Self::Mmr),
            "node_distance" => Ok(Self::NodeDistance),
            "episode_mentions" => Ok(Self::EpisodeMentions),
            "cross_encoder" => Ok(Self::CrossEncoder),
            _ => Err(ZepError::InvalidArgument(format!(
                "Invalid reranker: {}. Must be one of: rrf, mmr, node_distance, episode_mentions, cross_encoder",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphSearchQuery {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<GraphSearchScope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reranker: Option<Reranker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mmr_lambda: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_node_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_fact_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_filters: Option<SearchFilters>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSearchResults {
    #[serde(default)]
    pub edges: Vec<EntityEdge>,
    #[serde(default)]
    pub nodes: Vec<EntityNode>,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

// ============================================================================
// Graph administration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub uuid: Option<String>,
    pub graph_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateGraphRequest {
    pub graph_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateGraphRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphListResponse {
    #[serde(default)]
    pub graphs: Vec<Graph>,
    #[serde(default)]
    pub row_count: Option<i64>,
    #[serde(default)]
    pub total_count: Option<i64>,
}

// ============================================================================
// Ontology
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityPropertyType {
    Text,
    Int,
    Float,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: EntityPropertyType,
    pub description: String,
}

impl EntityProperty {
    pub fn new(name: impl Into<String>, property_type: EntityPropertyType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            property_type,
            description: description.into(),
        }
    }
}

/// A custom entity type the server should extract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityType {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub properties: Vec<EntityProperty>,
}

/// Allowed (source, target) entity type pair for an edge type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityEdgeSourceTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeType {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub properties: Vec<EntityProperty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_targets: Vec<EntityEdgeSourceTarget>,
}

// ============================================================================
// Facts
// ============================================================================

/// A fact extracted from a user's or graph's episodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub uuid: String,
    pub fact: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub source_node_name: Option<String>,
    #[serde(default)]
    pub target_node_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub valid_at: Option<String>,
    #[serde(default)]
    pub invalid_at: Option<String>,
    #[serde(default)]
    pub expired_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactsResponse {
    #[serde(default)]
    pub facts: Vec<Fact>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ontology {
    #[serde(default)]
    pub entity_types: Vec<EntityType>,
    #[serde(default)]
    pub edge_types: Vec<EdgeType>,
}
