use crate::charts::Figures;
use crate::config::{Config, Variant};
use crate::derive::derive;
use crate::dispatch::TabGroup;
use crate::errors::AppError;
use crate::models::{DerivedSeries, Observation};
use chrono::NaiveDate;
use std::sync::Arc;

/// Everything the page needs, built once from the fetched dataset.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub title: String,
    pub last_updated: Option<NaiveDate>,
    pub groups: Vec<TabGroup>,
    pub figures: Figures,
    pub series: DerivedSeries,
}

impl Dashboard {
    pub fn build(title: impl Into<String>, variant: Variant, observations: Vec<Observation>) -> Self {
        let series = derive(observations);
        let groups = TabGroup::for_variant(variant);
        let figures = Figures::build(groups.iter().flat_map(|group| group.tabs.iter().copied()), &series);

        Self {
            title: title.into(),
            last_updated: series.last_updated(),
            groups,
            figures,
            series,
        }
    }

    pub fn group(&self, id: &str) -> Option<&TabGroup> {
        self.groups.iter().find(|group| group.id == id)
    }
}

#[derive(Debug)]
pub enum DashboardState {
    Ready(Dashboard),
    /// The startup fetch failed; nothing is rendered from partial data.
    Failed { title: String, message: String },
}

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<DashboardState>,
}

impl AppState {
    pub fn new(dashboard: DashboardState) -> Self {
        Self {
            dashboard: Arc::new(dashboard),
        }
    }

    pub fn ready(&self) -> Result<&Dashboard, AppError> {
        match self.dashboard.as_ref() {
            DashboardState::Ready(dashboard) => Ok(dashboard),
            DashboardState::Failed { message, .. } => Err(AppError::unavailable(message.clone())),
        }
    }
}

impl DashboardState {
    pub fn from_fetch<E: std::fmt::Display>(config: &Config, result: Result<Vec<Observation>, E>) -> Self {
        match result {
            Ok(observations) => DashboardState::Ready(Dashboard::build(&config.title, config.variant, observations)),
            Err(err) => DashboardState::Failed {
                title: config.title.clone(),
                message: format!("Unable to load data: {err}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FetchError;

    fn config(variant: Variant) -> Config {
        Config::from_lookup(|key| match key {
            "DASHBOARD_VARIANT" if variant == Variant::CasesAndDeaths => Some("cases-and-deaths".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn failed_fetch_blocks_every_dashboard_view() {
        let err: Result<Vec<Observation>, FetchError> = Err(FetchError::Status {
            url: "http://upstream/covidtesting.csv".to_string(),
            status: 503,
        });
        let state = AppState::new(DashboardState::from_fetch(&config(Variant::Cases), err));

        let err = state.ready().unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.message.starts_with("Unable to load data:"));
        assert!(err.message.contains("503"));
    }

    #[test]
    fn ready_dashboard_builds_figures_for_active_groups_only() {
        let rows = vec![Observation {
            reported_date: NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(),
            total_cases: Some(3),
            confirmed_positive: Some(2),
            deaths: Some(1),
        }];
        let ok: Result<_, FetchError> = Ok(rows.clone());
        let state = AppState::new(DashboardState::from_fetch(&config(Variant::Cases), ok));
        let dashboard = state.ready().unwrap();
        assert_eq!(dashboard.figures.len(), 3);
        assert!(dashboard.group("case-tabs").is_some());
        assert!(dashboard.group("death-tabs").is_none());

        let both = Dashboard::build("t", Variant::CasesAndDeaths, rows);
        assert_eq!(both.figures.len(), 5);
        assert_eq!(both.last_updated, NaiveDate::from_ymd_opt(2020, 6, 1));
    }
}
