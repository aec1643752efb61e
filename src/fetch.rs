//! CSV and CKAN JSON ingest. A blank or unreadable count is kept as missing.

use crate::config::{DataFormat, SourceConfig};
use crate::errors::FetchError;
use crate::models::Observation;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

pub const REPORTED_DATE: &str = "Reported Date";
pub const TOTAL_CASES: &str = "Total Cases";
pub const CONFIRMED_POSITIVE: &str = "Confirmed Positive";
pub const DEATHS: &str = "Deaths";

/// Counts must fit the signed deltas derived from them.
const MAX_COUNT: u64 = i64::MAX as u64;

pub async fn fetch(client: &Client, source: &SourceConfig) -> Result<Vec<Observation>, FetchError> {
    let network = |err: reqwest::Error| FetchError::Network {
        url: source.url.clone(),
        source: err,
    };

    let mut request = client.get(&source.url);
    if let DataFormat::Json { limit } = source.format {
        request = request.query(&[("limit", limit)]);
    }

    info!(url = %source.url, "fetching dataset");
    let response = request.send().await.map_err(network)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: source.url.clone(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(network)?;
    let observations = match source.format {
        DataFormat::Csv => parse_csv(&body)?,
        DataFormat::Json { .. } => parse_records(&body)?,
    };
    info!(rows = observations.len(), "dataset loaded");
    Ok(observations)
}

pub fn parse_csv(bytes: &[u8]) -> Result<Vec<Observation>, FetchError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let columns: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim_start_matches('\u{feff}'), idx))
        .collect();

    let required = |name: &str| {
        columns
            .get(name)
            .copied()
            .ok_or_else(|| FetchError::malformed(format!("missing column '{name}'")))
    };
    let date_idx = required(REPORTED_DATE)?;
    let total_idx = required(TOTAL_CASES)?;
    let active_idx = required(CONFIRMED_POSITIVE)?;
    let deaths_idx = columns.get(DEATHS).copied();

    let mut observations = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let line = row + 2;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        observations.push(Observation {
            reported_date: parse_date(cell(date_idx), line)?,
            total_cases: parse_count(TOTAL_CASES, cell(total_idx), line),
            confirmed_positive: parse_count(CONFIRMED_POSITIVE, cell(active_idx), line),
            deaths: deaths_idx.and_then(|idx| parse_count(DEATHS, cell(idx), line)),
        });
    }

    ensure_unique_dates(&observations)?;
    Ok(observations)
}

/// Parses a `{"result": {"records": [...]}}` body. Records are ordered by
/// their `_id` before any date is read.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<Observation>, FetchError> {
    let body: Value = serde_json::from_slice(bytes)?;
    let records = body
        .get("result")
        .and_then(|result| result.get("records"))
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::malformed("expected result.records array"))?;

    let mut keyed = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        let fields = record
            .as_object()
            .ok_or_else(|| FetchError::malformed(format!("record {idx} is not an object")))?;
        let id = fields
            .get("_id")
            .and_then(value_as_u64)
            .ok_or_else(|| FetchError::malformed(format!("record {idx} has no integer _id")))?;
        keyed.push((id, fields));
    }
    keyed.sort_by_key(|(id, _)| *id);

    let mut observations = Vec::with_capacity(keyed.len());
    for (id, fields) in keyed {
        let line = id as usize;
        let date = fields
            .get(REPORTED_DATE)
            .and_then(Value::as_str)
            .ok_or_else(|| FetchError::malformed(format!("record _id={id} has no '{REPORTED_DATE}'")))?;
        let count = |name: &str| fields.get(name).and_then(|value| json_count(name, value, line));

        observations.push(Observation {
            reported_date: parse_date(date, line)?,
            total_cases: count(TOTAL_CASES),
            confirmed_positive: count(CONFIRMED_POSITIVE),
            deaths: count(DEATHS),
        });
    }

    ensure_unique_dates(&observations)?;
    Ok(observations)
}

fn parse_date(raw: &str, line: usize) -> Result<NaiveDate, FetchError> {
    let raw = raw.trim();
    // The datastore API appends a midnight timestamp.
    let day = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|err| FetchError::malformed(format!("row {line}: bad date '{raw}': {err}")))
}

fn parse_count(field: &str, raw: &str, line: usize) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let count = match raw.parse::<u64>() {
        Ok(value) => Some(value).filter(|value| *value <= MAX_COUNT),
        Err(_) => raw.parse::<f64>().ok().and_then(whole_count),
    };
    if count.is_none() {
        debug!(field, line, raw, "unreadable count treated as missing");
    }
    count
}

fn json_count(field: &str, value: &Value, line: usize) -> Option<u64> {
    match value {
        Value::Null => None,
        Value::String(raw) => parse_count(field, raw, line),
        Value::Number(_) => value_as_u64(value).or_else(|| {
            debug!(field, line, %value, "unreadable count treated as missing");
            None
        }),
        other => {
            debug!(field, line, value = %other, "unexpected count type treated as missing");
            None
        }
    }
}

fn value_as_u64(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().and_then(whole_count))
        .or_else(|| value.as_str().and_then(|raw| raw.trim().parse().ok()))
        .filter(|count| *count <= MAX_COUNT)
}

fn whole_count(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value < MAX_COUNT as f64)
        .then_some(value as u64)
}

fn ensure_unique_dates(observations: &[Observation]) -> Result<(), FetchError> {
    let mut seen = HashSet::with_capacity(observations.len());
    for obs in observations {
        if !seen.insert(obs.reported_date) {
            return Err(FetchError::malformed(format!(
                "duplicate reporting date {}",
                obs.reported_date
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn csv_reads_required_and_optional_columns() {
        let body = "\u{feff}Reported Date,Confirmed Negative,Confirmed Positive,Deaths,Total Cases\n\
                    2020-03-01,10,3,,15\n\
                    2020-03-02,12,4,1,18.0\n";
        let rows = parse_csv(body.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].reported_date, date(2020, 3, 1));
        assert_eq!(rows[0].total_cases, Some(15));
        assert_eq!(rows[0].confirmed_positive, Some(3));
        assert_eq!(rows[0].deaths, None);
        assert_eq!(rows[1].total_cases, Some(18));
        assert_eq!(rows[1].deaths, Some(1));
    }

    #[test]
    fn csv_without_deaths_column_leaves_deaths_missing() {
        let body = "Reported Date,Total Cases,Confirmed Positive\n2020-03-01,5,2\n";
        let rows = parse_csv(body.as_bytes()).unwrap();
        assert_eq!(rows[0].deaths, None);
    }

    #[test]
    fn csv_blank_and_garbage_counts_are_missing_not_zero() {
        let body = "Reported Date,Total Cases,Confirmed Positive\n2020-03-01,,n/a\n2020-03-02,-4,1\n";
        let rows = parse_csv(body.as_bytes()).unwrap();
        assert_eq!(rows[0].total_cases, None);
        assert_eq!(rows[0].confirmed_positive, None);
        assert_eq!(rows[1].total_cases, None);
    }

    #[test]
    fn counts_beyond_i64_are_missing_and_derive_cleanly() {
        let body = "Reported Date,Total Cases,Confirmed Positive\n\
                    2020-03-01,1,1\n\
                    2020-03-02,9223372036854775808,1\n\
                    2020-03-03,9223372036854775807,1e30\n";
        let rows = parse_csv(body.as_bytes()).unwrap();
        assert_eq!(rows[1].total_cases, None);
        assert_eq!(rows[2].total_cases, Some(i64::MAX as u64));
        assert_eq!(rows[2].confirmed_positive, None);

        let series = crate::derive::derive(rows);
        assert_eq!(series.daily_cases, vec![None, None, None]);
    }

    #[test]
    fn records_counts_beyond_i64_are_missing() {
        let body = br#"{"result": {"records": [
            {"_id": 1, "Reported Date": "2020-03-01", "Total Cases": 18446744073709551615, "Confirmed Positive": "9223372036854775808"}
        ]}}"#;
        let rows = parse_records(body).unwrap();
        assert_eq!(rows[0].total_cases, None);
        assert_eq!(rows[0].confirmed_positive, None);
    }

    #[test]
    fn csv_missing_required_column_is_malformed() {
        let body = "Reported Date,Confirmed Positive\n2020-03-01,2\n";
        let err = parse_csv(body.as_bytes()).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(ref msg) if msg.contains("Total Cases")));
    }

    #[test]
    fn csv_bad_date_is_malformed() {
        let body = "Reported Date,Total Cases,Confirmed Positive\nyesterday,1,1\n";
        assert!(matches!(parse_csv(body.as_bytes()), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn csv_duplicate_date_is_malformed() {
        let body = "Reported Date,Total Cases,Confirmed Positive\n2020-03-01,1,1\n2020-03-01,2,1\n";
        let err = parse_csv(body.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn records_are_ordered_by_id_and_accept_mixed_values() {
        let body = serde_json::json!({
            "success": true,
            "result": {
                "records": [
                    { "_id": 2, "Reported Date": "2020-03-02T00:00:00", "Total Cases": "18", "Confirmed Positive": 4, "Deaths": null },
                    { "_id": 1, "Reported Date": "2020-03-01T00:00:00", "Total Cases": 15.0, "Confirmed Positive": 3 }
                ]
            }
        });
        let rows = parse_records(body.to_string().as_bytes()).unwrap();
        assert_eq!(rows[0].reported_date, date(2020, 3, 1));
        assert_eq!(rows[0].total_cases, Some(15));
        assert_eq!(rows[1].total_cases, Some(18));
        assert_eq!(rows[1].confirmed_positive, Some(4));
        assert_eq!(rows[1].deaths, None);
    }

    #[test]
    fn records_shape_mismatch_is_malformed() {
        let body = br#"{"result": {"rows": []}}"#;
        assert!(matches!(parse_records(body), Err(FetchError::Malformed(_))));

        let body = br#"{"result": {"records": [{"Reported Date": "2020-03-01"}]}}"#;
        let err = parse_records(body).unwrap_err();
        assert!(err.to_string().contains("_id"));
    }

    #[test]
    fn records_invalid_json_is_malformed() {
        assert!(matches!(parse_records(b"<html>"), Err(FetchError::Malformed(_))));
    }
}
