use crate::dispatch::dispatch;
use crate::errors::AppError;
use crate::models::{SeriesResponse, TabContent};
use crate::state::{AppState, DashboardState};
use crate::ui::{render_error, render_page};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TabQuery {
    pub active_tab: Option<String>,
}

pub async fn index(State(state): State<AppState>) -> Result<Response, AppError> {
    match state.dashboard.as_ref() {
        DashboardState::Ready(dashboard) => Ok(Html(render_page(dashboard)?).into_response()),
        DashboardState::Failed { title, message } => {
            Ok((StatusCode::SERVICE_UNAVAILABLE, Html(render_error(title, message))).into_response())
        }
    }
}

pub async fn select_tab(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Query(query): Query<TabQuery>,
) -> Result<Response, AppError> {
    let dashboard = state.ready()?;
    let group = dashboard
        .group(&group_id)
        .ok_or_else(|| AppError::not_found(format!("unknown tab group '{group_id}'")))?;

    let active_tab = query.active_tab.as_deref().map(str::trim).filter(|tab| !tab.is_empty());
    let content: TabContent<'_> = dispatch(group, &dashboard.figures, active_tab);
    Ok(Json(content).into_response())
}

pub async fn get_series(State(state): State<AppState>) -> Result<Response, AppError> {
    let dashboard = state.ready()?;
    let response = SeriesResponse {
        last_updated: dashboard.last_updated,
        rows: dashboard.series.len(),
        series: &dashboard.series,
    };
    Ok(Json(response).into_response())
}

pub async fn healthz() -> &'static str {
    "ok"
}
