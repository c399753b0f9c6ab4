// src/domain/query.rs
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

/// System attribute holding a document's creation time.
pub const CREATED_AT: &str = "$createdAt";

/// One predicate of a document-listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Limit(usize),
    Search { attribute: String, value: String },
    Equal { attribute: String, value: String },
    OrderAsc(String),
    OrderDesc(String),
}

impl Query {
    pub fn limit(n: usize) -> Self {
        Query::Limit(n)
    }

    pub fn search(attribute: &str, value: &str) -> Self {
        Query::Search {
            attribute: attribute.to_string(),
            value: value.to_string(),
        }
    }

    pub fn equal(attribute: &str, value: impl Into<String>) -> Self {
        Query::Equal {
            attribute: attribute.to_string(),
            value: value.into(),
        }
    }

    pub fn order_asc(attribute: &str) -> Self {
        Query::OrderAsc(attribute.to_string())
    }

    pub fn order_desc(attribute: &str) -> Self {
        Query::OrderDesc(attribute.to_string())
    }

    pub fn is_ordering(&self) -> bool {
        matches!(self, Query::OrderAsc(_) | Query::OrderDesc(_))
    }

    /// JSON encoding understood by the REST document API.
    pub fn to_wire(&self) -> String {
        let wire = match self {
            Query::Limit(n) => WireQuery {
                method: "limit",
                attribute: None,
                values: vec![json!(n)],
            },
            Query::Search { attribute, value } => WireQuery {
                method: "search",
                attribute: Some(attribute),
                values: vec![json!(value)],
            },
            Query::Equal { attribute, value } => WireQuery {
                method: "equal",
                attribute: Some(attribute),
                values: vec![json!(value)],
            },
            Query::OrderAsc(attribute) => WireQuery {
                method: "orderAsc",
                attribute: Some(attribute),
                values: vec![],
            },
            Query::OrderDesc(attribute) => WireQuery {
                method: "orderDesc",
                attribute: Some(attribute),
                values: vec![],
            },
        };
        // a struct of strings and JSON values always serializes
        serde_json::to_string(&wire).unwrap_or_default()
    }
}

#[derive(Serialize)]
struct WireQuery<'a> {
    method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attribute: Option<&'a str>,
    values: Vec<Value>,
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Limit(n) => write!(f, "limit({n})"),
            Query::Search { attribute, value } => write!(f, "search({attribute}, {value:?})"),
            Query::Equal { attribute, value } => write!(f, "equal({attribute}, {value:?})"),
            Query::OrderAsc(attribute) => write!(f, "orderAsc({attribute})"),
            Query::OrderDesc(attribute) => write!(f, "orderDesc({attribute})"),
        }
    }
}
