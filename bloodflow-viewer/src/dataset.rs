//! In-memory simulation datasets decoded from backend payloads.
//!
//! A dataset is built in full from one response body and never mutated
//! afterwards. Selecting another simulation replaces it wholesale.
//!
//! Decoding is shape-driven and lenient: a `null` frame or a missing `times`
//! entry become holes that the viewer skips, rather than decode errors.
//! Non-numeric values inside a frame are kept as `NaN` so the chart shows a gap
//! at that point.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Keys that may carry the shared spatial axis, in lookup order.
const AXIS_KEYS: &[&str] = &["x", "z"];

/// Keys that may carry the time samples, in lookup order.
const TIME_KEYS: &[&str] = &["times", "time"];

/// One named physical quantity, one optional frame per time sample.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSeries {
    pub key: String,
    pub frames: Vec<Option<Vec<f64>>>,
}

impl NamedSeries {
    /// Values at frame `index`, or `None` when the frame is missing.
    pub fn frame(&self, index: usize) -> Option<&[f64]> {
        self.frames.get(index)?.as_deref()
    }
}

/// Stacked time-series payload for one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationDataset {
    axis_key: String,
    axis: Vec<f64>,
    times: Vec<Option<f64>>,
    series: Vec<NamedSeries>,
}

/// View of a single frame across every series of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<'a> {
    pub index: usize,
    pub time: f64,
    pub axis: &'a [f64],
    pub values: Vec<(&'a str, &'a [f64])>,
}

impl SimulationDataset {
    /// Decode a response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, DatasetError> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(&value)
    }

    /// Decode an already parsed JSON document.
    ///
    /// Accepts `{x, times, a, q}`, `{z, time, pressure}` and any other object
    /// with an axis array, a time array and array-of-array members. Each
    /// remaining member that is a list of frames (arrays or `null`, at least one
    /// array) becomes a series; series are ordered by key. Metadata lists such
    /// as `"available": ["sim1"]` or `[]` are ignored.
    pub fn from_value(value: &Value) -> Result<Self, DatasetError> {
        let object = value.as_object().ok_or(DatasetError::NotAnObject)?;

        let (axis_key, axis) = AXIS_KEYS
            .iter()
            .find_map(|key| object.get(*key).map(|v| (key.to_string(), numbers(v))))
            .unwrap_or_else(|| (AXIS_KEYS[0].to_string(), Vec::new()));

        let times = TIME_KEYS
            .iter()
            .find_map(|key| object.get(*key).map(optional_numbers))
            .unwrap_or_default();

        let series = collect_series(object);

        Ok(Self {
            axis_key,
            axis,
            times,
            series,
        })
    }

    /// Name of the payload key that carried the spatial axis (`x` or `z`).
    pub fn axis_key(&self) -> &str {
        &self.axis_key
    }

    /// Shared horizontal axis.
    pub fn axis(&self) -> &[f64] {
        &self.axis
    }

    /// Number of time samples (`N_frames`).
    pub fn frame_count(&self) -> usize {
        self.times.len()
    }

    /// Number of spatial points (`N_space`).
    pub fn space_len(&self) -> usize {
        self.axis.len()
    }

    /// Time of frame `index`, when present and numeric.
    pub fn time_at(&self, index: usize) -> Option<f64> {
        self.times.get(index).copied().flatten()
    }

    pub fn series(&self) -> &[NamedSeries] {
        &self.series
    }

    pub fn series_keys(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.key.as_str())
    }

    /// Frame `index` across all series.
    ///
    /// Returns `None` when the index is out of range, the time sample is
    /// missing, or any series has a hole at that index.
    pub fn frame(&self, index: usize) -> Option<Frame<'_>> {
        let time = self.time_at(index)?;
        let values = self
            .series
            .iter()
            .map(|s| s.frame(index).map(|v| (s.key.as_str(), v)))
            .collect::<Option<Vec<_>>>()?;

        Some(Frame {
            index,
            time,
            axis: &self.axis,
            values,
        })
    }
}

fn collect_series(object: &Map<String, Value>) -> Vec<NamedSeries> {
    let reserved = |key: &str| AXIS_KEYS.contains(&key) || TIME_KEYS.contains(&key);

    // serde_json's default map is ordered by key
    object
        .iter()
        .filter(|(key, _)| !reserved(key.as_str()))
        .filter_map(|(key, value)| {
            let frames = value.as_array()?;
            let stacked = frames.iter().all(|f| f.is_array() || f.is_null())
                && frames.iter().any(Value::is_array);
            if !stacked {
                return None;
            }
            Some(NamedSeries {
                key: key.clone(),
                frames: frames
                    .iter()
                    .map(|frame| frame.as_array().map(|row| row.iter().map(number).collect()))
                    .collect(),
            })
        })
        .collect()
}

fn number(value: &Value) -> f64 {
    value.as_f64().unwrap_or(f64::NAN)
}

fn numbers(value: &Value) -> Vec<f64> {
    value
        .as_array()
        .map(|items| items.iter().map(number).collect())
        .unwrap_or_default()
}

fn optional_numbers(value: &Value) -> Vec<Option<f64>> {
    value
        .as_array()
        .map(|items| items.iter().map(Value::as_f64).collect())
        .unwrap_or_default()
}

/// Full-history payload of the artery monitor simulation.
///
/// Each monitored quantity is indexed by monitoring location first, then by
/// time sample.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ArteryPayload {
    pub t: Vec<f64>,
    pub monitor_z: Vec<f64>,
    #[serde(rename = "pressure_mmHg")]
    pub pressure_mmhg: Vec<Vec<f64>>,
    pub flow: Vec<Vec<f64>>,
    pub area: Vec<Vec<f64>>,
    #[serde(rename = "P_out_mmHg")]
    pub p_out_mmhg: Vec<f64>,
    #[serde(rename = "Q_out")]
    pub q_out: Vec<f64>,
    #[serde(rename = "P_wk_mmHg")]
    pub p_wk_mmhg: Vec<f64>,
}

/// Payload decoding errors.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,
}
