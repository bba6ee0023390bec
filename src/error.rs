use thiserror::Error;

/// Errors surfaced by the shaping pipeline.
///
/// Every variant is a local, recoverable condition: the caller leaves the
/// affected chart section empty and carries on. Nothing here is process-fatal.
#[derive(Debug, Error)]
pub enum ShapeError {
    /// A field that must be ordered (year/date axis key) could not be parsed.
    #[error("cannot parse field `{field}` from `{raw}`")]
    Parse { field: String, raw: String },

    /// A percentage was requested against a zero reference total.
    #[error("division by zero: reference total is 0")]
    DivisionByZero,

    /// A flow link references a node index outside the node list.
    #[error("link {link} references node {node}, but the graph has {nodes} nodes")]
    InvalidGraphReference {
        link: usize,
        node: usize,
        nodes: usize,
    },

    /// The flow graph contains a cycle; the downstream layout would not terminate.
    #[error("flow graph contains a cycle")]
    CyclicGraph,

    /// A pipeline stage named a column the dataset does not have.
    #[error("dataset has no column `{0}`")]
    MissingColumn(String),

    /// A JSON dataset (pie records, flow graph) was malformed.
    #[error("malformed JSON dataset: {0}")]
    Json(#[from] serde_json::Error),

    /// The delimited input itself was malformed (ragged quoting etc.).
    #[error("malformed delimited input: {0}")]
    Csv(#[from] csv::Error),
}
