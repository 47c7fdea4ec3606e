//! HTTP route handlers for Axum.

use std::path::Path;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::warn;

use crate::{
    api::types::{CategoryDto, RegionDto},
    insights::{graph::GraphExport, RunSummary},
};

use super::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

#[derive(Debug, Deserialize)]
pub struct RegionQuery {
    pub min_count: Option<u64>,
    pub limit: Option<usize>,
}

pub async fn list_categories(state: State<AppState>) -> ApiResult<Vec<CategoryDto>> {
    let counts: IndexMap<String, usize> =
        load_artefact(&state.settings.join_output("categories.json"))?;
    Ok(Json(
        counts
            .into_iter()
            .map(|(category, count)| CategoryDto { category, count })
            .collect(),
    ))
}

pub async fn list_regions(
    state: State<AppState>,
    Query(query): Query<RegionQuery>,
) -> ApiResult<Vec<RegionDto>> {
    let counts: IndexMap<String, u64> = load_artefact(&state.settings.join_output("regions.json"))?;
    let mut regions: Vec<RegionDto> = counts
        .into_iter()
        .map(|(region, count)| RegionDto { region, count })
        .filter(|r| query.min_count.map_or(true, |min| r.count >= min))
        .collect();
    regions.sort_by(|a, b| b.count.cmp(&a.count));
    regions.truncate(query.limit.unwrap_or(250));
    Ok(Json(regions))
}

pub async fn graph(state: State<AppState>) -> ApiResult<GraphExport> {
    load_artefact(&state.settings.join_output("graph.json")).map(Json)
}

pub async fn summary(state: State<AppState>) -> ApiResult<RunSummary> {
    load_artefact(&state.settings.join_output("summary.json")).map(Json)
}

fn load_artefact<T: DeserializeOwned>(path: &Path) -> Result<T, (StatusCode, String)> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content = std::fs::read_to_string(path).map_err(|err| {
        warn!(path = %path.display(), error = %err, "artefact unavailable");
        (
            StatusCode::NOT_FOUND,
            format!("{name} missing; run the pipeline first"),
        )
    })?;
    serde_json::from_str(&content).map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}
