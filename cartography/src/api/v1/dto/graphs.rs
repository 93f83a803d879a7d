//! Graph DTOs for the v1 API.

use serde::Deserialize;

use crate::hub::RawFid;

/// Body of `POST /api/v1/graphs`.
///
/// Ids may be sent as JSON numbers or strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildGraphRequest {
    pub core_ids: Vec<RawFid>,
    /// Overrides the configured relevance cut-off for this build.
    #[serde(default)]
    pub top_n: Option<usize>,
}

impl BuildGraphRequest {
    /// Ids as strings. Blank entries are kept as empty strings so that id
    /// validation rejects them.
    pub fn core_id_strings(&self) -> Vec<String> {
        self.core_ids
            .iter()
            .map(|raw| raw.normalize().unwrap_or_default())
            .collect()
    }
}

/// Query of `GET /api/v1/graphs/{graphKey}/snapshot`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotQuery {
    /// Absolute cursor in network seconds. Wins over `position`.
    pub cursor: Option<i64>,
    /// Slider position in `[0, 100]` across the graph's time range.
    pub position: Option<f64>,
    /// Node whose shortest paths to the core nodes get highlighted.
    pub selected: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_request_accepts_numbers_and_strings() {
        let req: BuildGraphRequest =
            serde_json::from_str(r#"{"coreIds": [190000, "1 ", ""], "topN": 10}"#).unwrap();
        assert_eq!(req.core_id_strings(), vec!["190000", "1", ""]);
        assert_eq!(req.top_n, Some(10));
    }

    #[test]
    fn build_request_top_n_is_optional() {
        let req: BuildGraphRequest = serde_json::from_str(r#"{"coreIds": ["7"]}"#).unwrap();
        assert!(req.top_n.is_none());
    }
}
