use crate::models::{DerivedSeries, Observation};

pub const ROLLING_WINDOW: usize = 7;

/// Sorts by reporting date, then computes deltas and 7-day means.
pub fn derive(mut observations: Vec<Observation>) -> DerivedSeries {
    observations.sort_by_key(|obs| obs.reported_date);

    let total_cases: Vec<Option<u64>> = observations.iter().map(|obs| obs.total_cases).collect();
    let total_deaths: Vec<Option<u64>> = observations.iter().map(|obs| obs.deaths).collect();

    let daily_cases = diff(&total_cases);
    let daily_deaths = diff(&total_deaths);

    DerivedSeries {
        dates: observations.iter().map(|obs| obs.reported_date).collect(),
        active_cases: observations.iter().map(|obs| obs.confirmed_positive).collect(),
        daily_cases_avg: rolling_mean(&daily_cases, ROLLING_WINDOW),
        daily_deaths_avg: rolling_mean(&daily_deaths, ROLLING_WINDOW),
        total_cases,
        total_deaths,
        daily_cases,
        daily_deaths,
    }
}

/// `out[i] = values[i] - values[i - 1]`; the first entry, any entry touching
/// a missing value, and any delta outside `i64` are `None`. Decreases stay
/// negative.
pub fn diff(values: &[Option<u64>]) -> Vec<Option<i64>> {
    let mut out = Vec::with_capacity(values.len());
    out.extend(values.first().map(|_| None));
    out.extend(values.windows(2).map(|pair| match (pair[0], pair[1]) {
        (Some(prev), Some(curr)) => {
            let (prev, curr) = (i64::try_from(prev).ok()?, i64::try_from(curr).ok()?);
            curr.checked_sub(prev)
        }
        _ => None,
    }));
    out
}

/// Trailing arithmetic mean over `window` values, defined only where the
/// whole window is defined.
pub fn rolling_mean(values: &[Option<i64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|idx| {
            if idx + 1 < window {
                return None;
            }
            let slice = &values[idx + 1 - window..=idx];
            let sum = slice.iter().try_fold(0i64, |acc, value| value.and_then(|v| acc.checked_add(v)))?;
            Some(sum as f64 / window as f64)
        })
        .collect()
}
