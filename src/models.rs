use chrono::NaiveDate;
use serde::Serialize;

/// One reporting day of the upstream dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    pub reported_date: NaiveDate,
    pub total_cases: Option<u64>,
    /// Active cases.
    pub confirmed_positive: Option<u64>,
    /// Absent for every row when the source has no deaths column.
    pub deaths: Option<u64>,
}

/// Columns aligned to the date-sorted observations. `None` marks an
/// undefined value (series boundary or a blank source cell), never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedSeries {
    pub dates: Vec<NaiveDate>,
    pub total_cases: Vec<Option<u64>>,
    pub active_cases: Vec<Option<u64>>,
    pub total_deaths: Vec<Option<u64>>,
    pub daily_cases: Vec<Option<i64>>,
    pub daily_cases_avg: Vec<Option<f64>>,
    pub daily_deaths: Vec<Option<i64>>,
    pub daily_deaths_avg: Vec<Option<f64>>,
}

impl DerivedSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn last_updated(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
}

/// Inert description of a single trace, consumed by the page renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub name: String,
    pub opacity: f64,
    pub x: Vec<String>,
    pub y: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureLayout {
    pub x_title: String,
    pub y_title: String,
    pub legend: Legend,
}

/// Everything shown for one tab: one or more traces sharing a layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub id: String,
    pub traces: Vec<ChartSpec>,
    pub layout: FigureLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TabContent<'a> {
    Chart { figure: &'a Figure },
    Placeholder { message: &'a str },
}

#[derive(Debug, Serialize)]
pub struct SeriesResponse<'a> {
    pub last_updated: Option<NaiveDate>,
    pub rows: usize,
    pub series: &'a DerivedSeries,
}
