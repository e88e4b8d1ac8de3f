//! Time-indexed simulation viewer.
//!
//! The viewer owns the chart, the status label, the time slider and the state
//! of the currently selected simulation. A dataset is installed wholesale after
//! a successful load; installing one rebuilds the [`ViewState`], which drops the
//! cached global y-range.
//!
//! Rendering is synchronous. Each slider input produces exactly one render;
//! there is no coalescing of rapid input.

use std::cell::OnceCell;

use crate::chart::{
    Axis, ChartSurface, DrawKind, Figure, Layout, Legend, Margin, Range, Title, Trace,
};
use crate::dataset::{Frame, SimulationDataset};
use crate::fetcher::{DatasetSource, FetchError};
use crate::profile::{DisplayProfile, ProfileTable};

/// Fraction of the value span added below and above the global range.
const RANGE_PADDING: f64 = 0.2;

/// Line width of frame traces.
const LINE_WIDTH: f64 = 3.0;

/// Blocking message shown when no simulation was requested.
pub const MISSING_SIMULATION_ALERT: &str = "Missing simulation name! Example: ?sim=sim1";

/// Text shown next to the slider: load progress, errors, or the time label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLabel {
    text: String,
    alert: Option<String>,
}

impl StatusLabel {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Last blocking alert raised, if any.
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Raise a blocking alert.
    pub fn raise_alert(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(alert = %message, "Blocking alert");
        self.alert = Some(message);
    }
}

/// Range input selecting the frame index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slider {
    pub min: usize,
    pub max: usize,
    pub value: usize,
    wired: bool,
}

impl Slider {
    /// Bounds for a dataset of `frame_count` frames, positioned at frame 0.
    pub fn configure(&mut self, frame_count: usize) {
        self.min = 0;
        self.max = frame_count.saturating_sub(1);
        self.value = 0;
    }

    /// Whether input events reach the viewer.
    pub fn is_wired(&self) -> bool {
        self.wired
    }

    fn wire(&mut self) {
        self.wired = true;
    }

    /// Parse a raw input value and clamp it to the slider bounds.
    pub fn parse_input(&self, raw: &str) -> Option<usize> {
        let value: i64 = raw.trim().parse().ok()?;
        let clamped = value.clamp(self.min as i64, self.max as i64);
        Some(clamped as usize)
    }
}

/// Per-dataset view state.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Frame currently displayed.
    pub frame: usize,
    global_range: OnceCell<Option<Range>>,
}

impl ViewState {
    /// Cached global y-range, once the first frame has been rendered.
    ///
    /// `Some(None)` means the dataset holds no finite values.
    pub fn global_range(&self) -> Option<Option<Range>> {
        self.global_range.get().copied()
    }
}

/// Why a render did not draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoDataset,
    OutOfRange,
    MissingFrame,
    InvalidInput,
}

/// Result of a render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Drawn(DrawKind),
    Skipped(SkipReason),
}

impl RenderOutcome {
    pub fn is_drawn(&self) -> bool {
        matches!(self, RenderOutcome::Drawn(_))
    }
}

/// The dataset currently on screen and everything derived from it.
#[derive(Debug)]
struct Session {
    simulation_id: String,
    dataset: SimulationDataset,
    profile: DisplayProfile,
    state: ViewState,
}

/// Slider-driven viewer over one simulation dataset at a time.
pub struct Viewer<C: ChartSurface> {
    chart: C,
    profiles: ProfileTable,
    status: StatusLabel,
    slider: Slider,
    session: Option<Session>,
}

impl<C: ChartSurface> Viewer<C> {
    pub fn new(chart: C, profiles: ProfileTable) -> Self {
        Self {
            chart,
            profiles,
            status: StatusLabel::default(),
            slider: Slider::default(),
            session: None,
        }
    }

    pub fn chart(&self) -> &C {
        &self.chart
    }

    /// Mutable chart access, used to reflect user zoom/pan on the surface.
    pub fn chart_mut(&mut self) -> &mut C {
        &mut self.chart
    }

    pub fn status(&self) -> &StatusLabel {
        &self.status
    }

    pub fn slider(&self) -> &Slider {
        &self.slider
    }

    pub fn simulation_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.simulation_id.as_str())
    }

    pub fn dataset(&self) -> Option<&SimulationDataset> {
        self.session.as_ref().map(|s| &s.dataset)
    }

    pub fn view_state(&self) -> Option<&ViewState> {
        self.session.as_ref().map(|s| &s.state)
    }

    /// Load `simulation_id` from `source` and show its first frame.
    ///
    /// A missing identifier raises a blocking alert and issues no request. A
    /// failed load sets the status label to an error naming the simulation and
    /// leaves whatever was displayed before untouched.
    pub async fn load<S: DatasetSource>(
        &mut self,
        source: &S,
        simulation_id: Option<&str>,
    ) -> Result<(), FetchError> {
        let Some(simulation_id) = simulation_id.map(str::trim).filter(|id| !id.is_empty()) else {
            self.status.raise_alert(MISSING_SIMULATION_ALERT);
            return Err(FetchError::MissingSimulationId);
        };

        self.status.set(format!("Loading {}...", simulation_id));

        match source.load(simulation_id).await {
            Ok(dataset) => {
                self.install(simulation_id, dataset);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(simulation_id, error = %err, "Failed to load simulation");
                self.status
                    .set(format!("Error loading {}: {}", simulation_id, err));
                Err(err)
            }
        }
    }

    /// Switch to another simulation (multi-simulation selector).
    pub async fn select<S: DatasetSource>(
        &mut self,
        source: &S,
        simulation_id: &str,
    ) -> Result<(), FetchError> {
        self.load(source, Some(simulation_id)).await
    }

    /// Replace the current dataset and render its first frame.
    pub fn install(&mut self, simulation_id: &str, dataset: SimulationDataset) -> RenderOutcome {
        let profile = self.profiles.get(simulation_id).clone();

        tracing::info!(
            simulation_id,
            frames = dataset.frame_count(),
            points = dataset.space_len(),
            scaled = profile.scale.is_some(),
            "Installing simulation"
        );

        let frames = dataset.frame_count();
        self.slider.configure(frames);
        self.slider.wire();
        self.session = Some(Session {
            simulation_id: simulation_id.to_string(),
            dataset,
            profile,
            state: ViewState::default(),
        });

        let outcome = self.render(0);
        if !outcome.is_drawn() {
            // Frame 0 unavailable; replace the loading text
            self.status
                .set(format!("Loaded {} ({} frames)", simulation_id, frames));
        }
        outcome
    }

    /// Handle one slider `input` event.
    pub fn on_slider_input(&mut self, raw: &str) -> RenderOutcome {
        if !self.slider.is_wired() {
            return RenderOutcome::Skipped(SkipReason::NoDataset);
        }
        let Some(index) = self.slider.parse_input(raw) else {
            return RenderOutcome::Skipped(SkipReason::InvalidInput);
        };
        self.slider.value = index;
        self.render(index)
    }

    /// Draw frame `index`.
    ///
    /// Out-of-range indices and frames with holes are skipped and leave the
    /// chart, the label and the view state as they were.
    pub fn render(&mut self, index: usize) -> RenderOutcome {
        let Some(session) = self.session.as_mut() else {
            return RenderOutcome::Skipped(SkipReason::NoDataset);
        };
        let Session {
            simulation_id,
            dataset,
            profile,
            state,
        } = session;

        if index >= dataset.frame_count() {
            return RenderOutcome::Skipped(SkipReason::OutOfRange);
        }
        let Some(frame) = dataset.frame(index) else {
            tracing::debug!(index, "Skipping frame with missing data");
            return RenderOutcome::Skipped(SkipReason::MissingFrame);
        };

        let global = *state
            .global_range
            .get_or_init(|| global_range(dataset, profile));

        let time_text = profile.format_time(frame.time);
        self.status.set(format!("{} (index {})", time_text, index));

        let title = format!(
            "{} — {}",
            profile.label.as_deref().unwrap_or(simulation_id.as_str()),
            time_text
        );

        let kind = if self.chart.has_plot() {
            let view = self.chart.current_view();
            let figure = frame_figure(&frame, profile, title, view.x, view.y.or(global));
            self.chart.react(figure);
            DrawKind::React
        } else {
            let figure = frame_figure(&frame, profile, title, None, global);
            self.chart.new_plot(figure);
            DrawKind::NewPlot
        };

        state.frame = index;
        self.slider.value = index;
        RenderOutcome::Drawn(kind)
    }
}

/// Fixed y-range over every renderable frame of every series, padded by 20% of
/// the span. Frames past the last time sample are ignored.
///
/// The range is computed on raw values and its bounds then scaled, so a scaled
/// profile's range is exactly the unscaled range times the factor. A flat
/// dataset is padded by 20% of its magnitude (or by 1 at zero). Returns `None`
/// when there is no finite value at all.
pub fn global_range(dataset: &SimulationDataset, profile: &DisplayProfile) -> Option<Range> {
    let (min, max) = dataset
        .series()
        .iter()
        .flat_map(|s| s.frames.iter().take(dataset.frame_count()).flatten())
        .flat_map(|values| values.iter().copied())
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })?;

    let span = max - min;
    let pad = if span > 0.0 {
        span * RANGE_PADDING
    } else if max != 0.0 {
        max.abs() * RANGE_PADDING
    } else {
        1.0
    };

    let lo = profile.scale_value(min - pad);
    let hi = profile.scale_value(max + pad);
    Some([lo.min(hi), lo.max(hi)])
}

/// Chart for one frame: one scaled line trace per series over the shared axis.
fn frame_figure(
    frame: &Frame<'_>,
    profile: &DisplayProfile,
    title: String,
    x_range: Option<Range>,
    y_range: Option<Range>,
) -> Figure {
    let data = frame
        .values
        .iter()
        .map(|(key, values)| {
            let y = values.iter().map(|v| profile.scale_value(*v)).collect();
            let trace = Trace::lines(profile.series_name(key), frame.axis.to_vec(), y);
            match profile.series_color(key) {
                Some(color) => trace.with_line(color, LINE_WIDTH),
                None => trace,
            }
        })
        .collect();

    Figure {
        data,
        layout: Layout {
            title: Some(Title::new(title)),
            xaxis: Axis::titled(profile.x_title.as_str()).with_range(x_range),
            yaxis: Axis::titled(profile.y_title.as_str()).with_range(y_range),
            margin: Some(Margin::new(40, 40, 50, 20)),
            legend: profile.legend_below.then(|| Legend {
                orientation: "h".to_string(),
                y: -0.2,
            }),
            ..Layout::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::RecordingChart;
    use crate::dataset::ArteryPayload;
    use proptest::prelude::*;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory backend: known ids return their payload, others a 404.
    #[derive(Default)]
    struct FakeSource {
        payloads: HashMap<String, Value>,
        requests: AtomicUsize,
    }

    impl FakeSource {
        fn with(mut self, id: &str, payload: Value) -> Self {
            self.payloads.insert(id.to_string(), payload);
            self
        }

        fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    impl DatasetSource for FakeSource {
        async fn load(&self, simulation_id: &str) -> Result<SimulationDataset, FetchError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            match self.payloads.get(simulation_id) {
                Some(payload) => Ok(SimulationDataset::from_value(payload)?),
                None => Err(FetchError::Status {
                    status: 404,
                    body: format!("{{\"detail\":\"unknown simulation {}\"}}", simulation_id),
                }),
            }
        }

        async fn load_artery(&self) -> Result<ArteryPayload, FetchError> {
            Err(FetchError::Status {
                status: 404,
                body: String::new(),
            })
        }
    }

    fn sample_payload() -> Value {
        json!({
            "x": [0, 1, 2],
            "times": [0, 0.5, 1],
            "a": [[1, 2, 3], [4, 5, 6], [7, 8, 9]],
            "q": [[9, 8, 7], [6, 5, 4], [3, 2, 1]]
        })
    }

    fn viewer() -> Viewer<RecordingChart> {
        Viewer::new(RecordingChart::new(), ProfileTable::builtin())
    }

    fn installed(id: &str, payload: Value) -> Viewer<RecordingChart> {
        let mut viewer = viewer();
        let dataset = SimulationDataset::from_value(&payload).unwrap();
        viewer.install(id, dataset);
        viewer
    }

    fn figure(viewer: &Viewer<RecordingChart>) -> &Figure {
        viewer.chart().figure().expect("chart drawn")
    }

    #[test]
    fn test_render_frame_one() {
        let mut viewer = installed("sim1", sample_payload());

        assert!(viewer.render(1).is_drawn());
        let fig = figure(&viewer);
        assert_eq!(fig.data.len(), 2);
        assert_eq!(fig.data[0].x, vec![0.0, 1.0, 2.0]);
        assert_eq!(fig.data[0].y, vec![4.0, 5.0, 6.0]);
        assert_eq!(fig.data[0].name, "a(x, τ)");
        assert_eq!(fig.data[1].y, vec![6.0, 5.0, 4.0]);
        assert!(viewer.status().text().contains("0.50000"));
        assert_eq!(viewer.status().text(), "τ = 0.50000 (index 1)");
    }

    #[test]
    fn test_install_configures_slider_and_draws_frame_zero() {
        let viewer = installed("sim1", sample_payload());

        let slider = viewer.slider();
        assert_eq!((slider.min, slider.max, slider.value), (0, 2, 0));
        assert!(slider.is_wired());
        assert_eq!(viewer.chart().draws(), &[DrawKind::NewPlot]);
        assert_eq!(figure(&viewer).data[0].y, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_time_label_for_every_frame() {
        let mut viewer = installed("sim1", sample_payload());
        for (index, expected) in ["0.00000", "0.50000", "1.00000"].iter().enumerate() {
            viewer.render(index);
            assert_eq!(
                viewer.status().text(),
                format!("τ = {} (index {})", expected, index)
            );
        }
    }

    #[test]
    fn test_dimensional_time_precision() {
        let mut viewer = installed("Test_model_laxw_half_step", sample_payload());
        viewer.render(1);
        assert_eq!(viewer.status().text(), "t = 0.500 s (index 1)");
    }

    #[test]
    fn test_global_range_padded_and_fixed() {
        let mut viewer = installed("sim1", sample_payload());
        // values span [1, 9]; padding 20% of 8 each side
        let expected = [1.0 - 1.6, 9.0 + 1.6];

        assert_eq!(figure(&viewer).layout.yaxis.range, Some(expected));
        viewer.render(2);
        assert_eq!(figure(&viewer).layout.yaxis.range, Some(expected));
        assert_eq!(
            viewer.view_state().unwrap().global_range(),
            Some(Some(expected))
        );
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut viewer = installed("sim1", sample_payload());
        viewer.render(1);
        let before = figure(&viewer).clone();
        let label = viewer.status().text().to_string();

        assert_eq!(
            viewer.render(3),
            RenderOutcome::Skipped(SkipReason::OutOfRange)
        );
        assert_eq!(figure(&viewer), &before);
        assert_eq!(viewer.status().text(), label);
        assert_eq!(viewer.view_state().unwrap().frame, 1);
        assert_eq!(viewer.chart().draws().len(), 2);
    }

    #[test]
    fn test_hole_is_noop() {
        let mut viewer = installed(
            "sim1",
            json!({
                "x": [0, 1],
                "times": [0, 1, 2],
                "a": [[1, 2], null, [5, 6]],
                "q": [[1, 1], [2, 2], [3, 3]]
            }),
        );

        assert_eq!(
            viewer.render(1),
            RenderOutcome::Skipped(SkipReason::MissingFrame)
        );
        assert_eq!(figure(&viewer).data[0].y, vec![1.0, 2.0]);
        assert!(viewer.render(2).is_drawn());
    }

    #[test]
    fn test_render_without_dataset() {
        let mut viewer = viewer();
        assert_eq!(
            viewer.render(0),
            RenderOutcome::Skipped(SkipReason::NoDataset)
        );
        assert_eq!(
            viewer.on_slider_input("0"),
            RenderOutcome::Skipped(SkipReason::NoDataset)
        );
        assert!(!viewer.chart().has_plot());
    }

    #[test]
    fn test_zoom_preserved_across_frames() {
        let mut viewer = installed("sim1", sample_payload());
        viewer.chart_mut().relayout(Some([0.5, 1.5]), Some([2.0, 5.0]));

        viewer.render(2);
        let layout = &figure(&viewer).layout;
        assert_eq!(layout.xaxis.range, Some([0.5, 1.5]));
        assert_eq!(layout.yaxis.range, Some([2.0, 5.0]));
        assert_eq!(viewer.chart().draws(), &[DrawKind::NewPlot, DrawKind::React]);
    }

    #[test]
    fn test_unzoomed_falls_back_to_global_range() {
        let mut viewer = installed("sim1", sample_payload());
        viewer.chart_mut().relayout(Some([0.5, 1.5]), None);

        viewer.render(1);
        let layout = &figure(&viewer).layout;
        assert_eq!(layout.xaxis.range, Some([0.5, 1.5]));
        assert_eq!(layout.yaxis.range, Some([1.0 - 1.6, 9.0 + 1.6]));

        viewer.chart_mut().autoscale();
        viewer.render(2);
        let layout = &figure(&viewer).layout;
        assert_eq!(layout.xaxis.range, None);
        assert_eq!(layout.xaxis.autorange, Some(true));
    }

    #[test]
    fn test_scaled_profile_scales_values_and_range() {
        let mut plain = installed("sim1", sample_payload());
        let mut scaled = installed("health_wk_laxw", sample_payload());

        for index in [0, 2] {
            plain.render(index);
            scaled.render(index);
            let p = figure(&plain);
            let s = figure(&scaled);

            for (pt, st) in p.data.iter().zip(&s.data) {
                let expected: Vec<f64> = pt.y.iter().map(|v| v * 1e6).collect();
                assert_eq!(st.y, expected);
            }
            let [plo, phi] = p.layout.yaxis.range.unwrap();
            assert_eq!(s.layout.yaxis.range, Some([plo * 1e6, phi * 1e6]));
        }
        assert_eq!(figure(&scaled).data[0].name, "A(z, t) [mm²]");
        assert_eq!(figure(&scaled).layout.yaxis.title, Some(Title::new("A [mm²], Q [mL/s]")));
    }

    #[test]
    fn test_replacing_dataset_recomputes_range_and_keeps_zoom() {
        let mut viewer = installed("sim1", sample_payload());
        viewer.chart_mut().relayout(Some([0.0, 1.0]), None);

        let other = SimulationDataset::from_value(&json!({
            "x": [0, 1],
            "times": [0],
            "a": [[100, 200]],
            "q": [[100, 100]]
        }))
        .unwrap();
        viewer.install("sim1", other);

        let layout = &figure(&viewer).layout;
        assert_eq!(layout.yaxis.range, Some([80.0, 220.0]));
        assert_eq!(layout.xaxis.range, Some([0.0, 1.0]));
        assert_eq!(viewer.slider().max, 0);
    }

    #[test]
    fn test_scaled_then_unscaled_dataset_in_one_session() {
        let mut viewer = installed("health_wk_laxw", sample_payload());
        let scaled = figure(&viewer).layout.yaxis.range.unwrap();

        viewer.install("sim1", SimulationDataset::from_value(&sample_payload()).unwrap());
        let plain = figure(&viewer).layout.yaxis.range.unwrap();
        assert_eq!(scaled, [plain[0] * 1e6, plain[1] * 1e6]);

        viewer.install("health_wk_laxw", SimulationDataset::from_value(&sample_payload()).unwrap());
        assert_eq!(figure(&viewer).layout.yaxis.range.unwrap(), scaled);
    }

    #[test]
    fn test_slider_input() {
        let mut viewer = installed("sim1", sample_payload());

        assert!(viewer.on_slider_input("2").is_drawn());
        assert_eq!(viewer.slider().value, 2);
        assert_eq!(figure(&viewer).data[0].y, vec![7.0, 8.0, 9.0]);

        // Clamped to the slider bounds
        assert!(viewer.on_slider_input("99").is_drawn());
        assert_eq!(viewer.slider().value, 2);

        assert_eq!(
            viewer.on_slider_input("abc"),
            RenderOutcome::Skipped(SkipReason::InvalidInput)
        );

        // One render per event
        for raw in ["0", "1", "0", "1"] {
            viewer.on_slider_input(raw);
        }
        assert_eq!(viewer.chart().draws().len(), 7);
    }

    #[tokio::test]
    async fn test_load_success() {
        let source = FakeSource::default().with("sim1", sample_payload());
        let mut viewer = viewer();

        viewer.load(&source, Some("sim1")).await.unwrap();
        assert_eq!(viewer.simulation_id(), Some("sim1"));
        assert_eq!(viewer.status().text(), "τ = 0.00000 (index 0)");
        assert_eq!(figure(&viewer).data[1].y, vec![9.0, 8.0, 7.0]);
    }

    #[tokio::test]
    async fn test_load_failure_reports_id_and_draws_nothing() {
        let source = FakeSource::default();
        let mut viewer = viewer();

        let err = viewer.load(&source, Some("sim9")).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert!(viewer.status().text().contains("sim9"));
        assert!(viewer.status().text().starts_with("Error loading sim9"));
        assert!(!viewer.chart().has_plot());
        assert!(!viewer.slider().is_wired());
    }

    #[tokio::test]
    async fn test_missing_id_alerts_without_fetch() {
        let source = FakeSource::default().with("sim1", sample_payload());
        let mut viewer = viewer();

        let err = viewer.load(&source, None).await.unwrap_err();
        assert!(matches!(err, FetchError::MissingSimulationId));
        assert_eq!(viewer.status().alert(), Some(MISSING_SIMULATION_ALERT));

        viewer.load(&source, Some("  ")).await.unwrap_err();
        assert_eq!(source.requests(), 0);
    }

    #[tokio::test]
    async fn test_select_replaces_dataset() {
        let source = FakeSource::default()
            .with("t", json!({"z": [0.0, 0.15], "time": [0.0, 0.5], "pressure": [[80, 81], [90, 91]]}))
            .with("wk", json!({"z": [0.0, 0.15], "time": [0.0], "pressure": [[70, 71]]}));
        let mut viewer = viewer();

        viewer.select(&source, "t").await.unwrap();
        viewer.on_slider_input("1");
        assert_eq!(viewer.status().text(), "t = 0.500 s (index 1)");

        viewer.select(&source, "wk").await.unwrap();
        assert_eq!(viewer.simulation_id(), Some("wk"));
        assert_eq!(viewer.slider().value, 0);
        assert_eq!(figure(&viewer).data[0].y, vec![70.0, 71.0]);
        assert_eq!(figure(&viewer).data[0].name, "Pressure (mmHg)");
        assert_eq!(figure(&viewer).layout.legend.as_ref().unwrap().orientation, "h");
        assert!(figure(&viewer)
            .layout
            .title
            .as_ref()
            .unwrap()
            .text
            .starts_with("Windkessel-like (healthy_wk)"));
    }

    #[tokio::test]
    async fn test_failed_select_keeps_previous_dataset() {
        let source = FakeSource::default().with("sim1", sample_payload());
        let mut viewer = viewer();
        viewer.load(&source, Some("sim1")).await.unwrap();

        viewer.select(&source, "gone").await.unwrap_err();
        assert_eq!(viewer.simulation_id(), Some("sim1"));
        assert!(viewer.on_slider_input("1").is_drawn());
    }

    #[test]
    fn test_metadata_array_does_not_block_render() {
        let mut payload = sample_payload();
        payload["available"] = json!(["sim1", "TestC1"]);
        let mut viewer = installed("sim1", payload);

        assert!(viewer.chart().has_plot());
        assert_eq!(figure(&viewer).data.len(), 2);
        assert_eq!(viewer.status().text(), "τ = 0.00000 (index 0)");
        assert!(viewer.render(1).is_drawn());
    }

    #[tokio::test]
    async fn test_hole_at_frame_zero_clears_loading_label() {
        let source = FakeSource::default().with(
            "sim1",
            json!({
                "x": [0, 1],
                "times": [0, 1],
                "a": [null, [1, 2]]
            }),
        );
        let mut viewer = viewer();

        viewer.load(&source, Some("sim1")).await.unwrap();
        assert!(!viewer.chart().has_plot());
        assert!(viewer.slider().is_wired());
        assert_eq!(viewer.status().text(), "Loaded sim1 (2 frames)");

        assert!(viewer.on_slider_input("1").is_drawn());
        assert_eq!(viewer.status().text(), "τ = 1.00000 (index 1)");
    }

    #[test]
    fn test_range_ignores_frames_past_last_time() {
        let ds = SimulationDataset::from_value(&json!({
            "x": [0],
            "times": [0, 1],
            "a": [[1], [6], [1000]]
        }))
        .unwrap();
        // values 1..6 only; span 5, pad 1
        assert_eq!(global_range(&ds, &DisplayProfile::default()), Some([0.0, 7.0]));
    }

    #[test]
    fn test_flat_dataset_range() {
        let ds = SimulationDataset::from_value(&json!({
            "x": [0], "times": [0, 1], "a": [[5], [5]]
        }))
        .unwrap();
        assert_eq!(global_range(&ds, &DisplayProfile::default()), Some([4.0, 6.0]));

        let zeros = SimulationDataset::from_value(&json!({
            "x": [0], "times": [0], "a": [[0]]
        }))
        .unwrap();
        assert_eq!(global_range(&zeros, &DisplayProfile::default()), Some([-1.0, 1.0]));
    }

    #[test]
    fn test_range_ignores_non_finite() {
        let ds = SimulationDataset::from_value(&json!({
            "x": [0, 1], "times": [0], "a": [[1, "x"]]
        }))
        .unwrap();
        assert_eq!(global_range(&ds, &DisplayProfile::default()), Some([0.8, 1.2]));

        let empty = SimulationDataset::from_value(&json!({"x": [], "times": []})).unwrap();
        assert_eq!(global_range(&empty, &DisplayProfile::default()), None);
    }

    fn frames_strategy() -> impl Strategy<Value = Vec<Vec<f64>>> {
        prop::collection::vec(prop::collection::vec(-1.0e3f64..1.0e3, 4), 1..8)
    }

    proptest! {
        #[test]
        fn prop_global_range_covers_all_values(a in frames_strategy(), q in frames_strategy()) {
            let frames = a.len().min(q.len());
            let times: Vec<f64> = (0..frames).map(|i| i as f64).collect();
            let (a, q) = (&a[..frames], &q[..frames]);
            let payload = json!({
                "x": [0, 1, 2, 3],
                "times": times,
                "a": a,
                "q": q,
            });
            let mut viewer = installed("sim1", payload);
            let first = figure(&viewer).layout.yaxis.range.unwrap();

            for index in 0..frames {
                prop_assert!(viewer.render(index).is_drawn());
                let fig = figure(&viewer);
                prop_assert_eq!(fig.layout.yaxis.range, Some(first));
                for trace in &fig.data {
                    for v in &trace.y {
                        prop_assert!(first[0] <= *v && *v <= first[1]);
                    }
                }
            }
        }

        #[test]
        fn prop_out_of_range_never_draws(extra in 0usize..100) {
            let mut viewer = installed("sim1", sample_payload());
            let draws = viewer.chart().draws().len();
            prop_assert_eq!(
                viewer.render(3 + extra),
                RenderOutcome::Skipped(SkipReason::OutOfRange)
            );
            prop_assert_eq!(viewer.chart().draws().len(), draws);
        }
    }
}
