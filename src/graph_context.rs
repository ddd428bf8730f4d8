//! Render graph search results as a prompt-ready context block.

use chrono::{DateTime, NaiveDateTime};

use crate::models::{EntityEdge, EntityNode};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reformat an API timestamp; anything unparseable is returned as-is.
fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DATE_FORMAT).to_string();
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return dt.format(DATE_FORMAT).to_string();
        }
    }
    raw.to_string()
}

/// `"<valid_at> - <invalid_at>"` for a fact.
pub fn format_edge_date_range(edge: &EntityEdge) -> String {
    let valid = edge
        .valid_at
        .as_deref()
        .map(format_timestamp)
        .unwrap_or_else(|| "date unknown".to_string());
    let invalid = edge
        .invalid_at
        .as_deref()
        .map(format_timestamp)
        .unwrap_or_else(|| "present".to_string());
    format!("{} - {}", valid, invalid)
}

/// Build the FACTS / ENTITIES block from search results.
pub fn compose_context_string(edges: &[EntityEdge], nodes: &[EntityNode]) -> String {
    let facts: Vec<String> = edges
        .iter()
        .map(|e| format!("  - {} ({})", e.fact, format_edge_date_range(e)))
        .collect();
    let entities: Vec<String> = nodes
        .iter()
        .map(|n| format!("  - {}: {}", n.name, n.summary))
        .collect();

    format!(
        "\nFACTS and ENTITIES represent relevant context to the current conversation.\n\
\n\
# These are the most relevant facts and their valid date ranges\n\
# format: FACT (Date range: from - to)\n\
<FACTS>\n\
{}\n\
</FACTS>\n\
\n\
# These are the most relevant entities\n\
# ENTITY_NAME: entity summary\n\
<ENTITIES>\n\
{}\n\
</ENTITIES>\n",
        facts.join("\n"),
        entities.join("\n")
    )
}
