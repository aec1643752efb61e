use crate::models::{ChartKind, ChartSpec, DerivedSeries, Figure, FigureLayout, Legend};
use std::collections::BTreeMap;

pub const BAR_OPACITY: f64 = 0.6;
pub const LINE_OPACITY: f64 = 0.8;
pub const MOVING_AVG_NAME: &str = "7-Day Moving Avg.";

pub fn build_chart(
    kind: ChartKind,
    xs: Vec<String>,
    ys: Vec<Option<f64>>,
    name: impl Into<String>,
    opacity: f64,
) -> ChartSpec {
    ChartSpec {
        kind,
        name: name.into(),
        opacity,
        x: xs,
        y: ys,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Chart {
    DailyCases,
    ActiveCases,
    TotalCases,
    DailyDeaths,
    TotalDeaths,
}

impl Chart {
    pub const ALL: [Chart; 5] = [
        Chart::DailyCases,
        Chart::ActiveCases,
        Chart::TotalCases,
        Chart::DailyDeaths,
        Chart::TotalDeaths,
    ];

    pub fn tab_id(self) -> &'static str {
        match self {
            Chart::DailyCases => "daily-cases",
            Chart::ActiveCases => "active-cases",
            Chart::TotalCases => "total-cases",
            Chart::DailyDeaths => "daily-deaths",
            Chart::TotalDeaths => "total-deaths",
        }
    }

    pub fn from_tab_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|chart| chart.tab_id() == id)
    }

    pub fn label(self) -> &'static str {
        match self {
            Chart::DailyCases | Chart::DailyDeaths => "Daily",
            Chart::ActiveCases => "Active",
            Chart::TotalCases | Chart::TotalDeaths => "Total",
        }
    }

    pub fn figure(self, series: &DerivedSeries) -> Figure {
        let xs: Vec<String> = series.dates.iter().map(|date| date.to_string()).collect();
        let bar = |ys: Vec<Option<f64>>, name: &str| build_chart(ChartKind::Bar, xs.clone(), ys, name, BAR_OPACITY);
        let avg = |ys: &[Option<f64>]| {
            build_chart(ChartKind::Line, xs.clone(), ys.to_vec(), MOVING_AVG_NAME, LINE_OPACITY)
        };

        let (traces, y_title) = match self {
            Chart::DailyCases => (
                vec![bar(signed(&series.daily_cases), "Daily Cases"), avg(&series.daily_cases_avg)],
                "Number of Cases",
            ),
            Chart::ActiveCases => (vec![bar(unsigned(&series.active_cases), "Active Cases")], "Number of Cases"),
            Chart::TotalCases => (vec![bar(unsigned(&series.total_cases), "Total Cases")], "Number of Cases"),
            Chart::DailyDeaths => (
                vec![bar(signed(&series.daily_deaths), "Daily Deaths"), avg(&series.daily_deaths_avg)],
                "Number of Deaths",
            ),
            Chart::TotalDeaths => (vec![bar(unsigned(&series.total_deaths), "Total Deaths")], "Number of Deaths"),
        };

        Figure {
            id: self.tab_id().to_string(),
            traces,
            layout: FigureLayout {
                x_title: "Date".to_string(),
                y_title: y_title.to_string(),
                legend: Legend { x: 0.0, y: 1.0 },
            },
        }
    }
}

fn signed(values: &[Option<i64>]) -> Vec<Option<f64>> {
    values.iter().map(|value| value.map(|v| v as f64)).collect()
}

fn unsigned(values: &[Option<u64>]) -> Vec<Option<f64>> {
    values.iter().map(|value| value.map(|v| v as f64)).collect()
}

/// Pre-built figures, one per chart the dashboard shows.
#[derive(Debug, Clone, Default)]
pub struct Figures {
    by_chart: BTreeMap<Chart, Figure>,
}

impl Figures {
    pub fn build(charts: impl IntoIterator<Item = Chart>, series: &DerivedSeries) -> Self {
        Self {
            by_chart: charts
                .into_iter()
                .map(|chart| (chart, chart.figure(series)))
                .collect(),
        }
    }

    pub fn get(&self, chart: Chart) -> Option<&Figure> {
        self.by_chart.get(&chart)
    }

    pub fn len(&self) -> usize {
        self.by_chart.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_chart.is_empty()
    }
}
