use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("fetch failed for section `{section}`: {reason}")]
    Fetch {
        section: &'static str,
        reason: String,
    },

    #[error("invalid raw token amount `{0}`")]
    Conversion(String),

    #[error("aggregation contract violated: {0}")]
    Aggregation(String),

    #[error("could not serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("could not write `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl MetricsError {
    pub fn fetch(section: &'static str, reason: impl Into<String>) -> Self {
        MetricsError::Fetch {
            section,
            reason: reason.into(),
        }
    }
}
