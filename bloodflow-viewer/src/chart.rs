//! Line-chart figure model and the surface it is drawn on.
//!
//! Figures serialize to the JSON shape the browser charting library consumes
//! (`{data: [...], layout: {...}}`), so the same value can be printed by the
//! CLI, handed to a page, or inspected by tests.

use serde::Serialize;

/// Axis range as `[lo, hi]`.
pub type Range = [f64; 2];

/// A complete chart: traces plus layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    /// Trace with the given display name.
    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.data.iter().find(|t| t.name == name)
    }
}

/// One line series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub name: String,
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
}

impl Trace {
    /// Plain line trace.
    pub fn lines(name: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            x,
            y,
            name: name.into(),
            mode: "lines".to_string(),
            line: None,
        }
    }

    pub fn with_line(mut self, color: &str, width: f64) -> Self {
        self.line = Some(LineStyle {
            color: color.to_string(),
            width,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
}

/// Chart layout. Unset members are omitted so the charting library applies
/// its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    /// Fixed range. `None` lets the chart autorange this axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autorange: Option<bool>,
}

impl Axis {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(Title::new(title)),
            ..Self::default()
        }
    }

    /// Pin the axis to `range`, or let it autorange when `None`.
    pub fn with_range(mut self, range: Option<Range>) -> Self {
        self.autorange = Some(range.is_none());
        self.range = range;
        self
    }
}

/// Plot margins in pixels. Unset sides keep the library default.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Margin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r: Option<u32>,
}

impl Margin {
    pub fn new(t: u32, l: u32, b: u32, r: u32) -> Self {
        Self {
            t: Some(t),
            l: Some(l),
            b: Some(b),
            r: Some(r),
        }
    }

    /// Only the top margin set.
    pub fn top(t: u32) -> Self {
        Self {
            t: Some(t),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub orientation: String,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub color: String,
}

/// Axis ranges the user set by zooming or panning.
///
/// An axis is `None` until the user interacts with it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewRanges {
    pub x: Option<Range>,
    pub y: Option<Range>,
}

/// A live chart that figures are drawn on.
pub trait ChartSurface {
    /// Whether a chart has been created on this surface.
    fn has_plot(&self) -> bool;

    /// Create a fresh chart, discarding any previous one and its view.
    fn new_plot(&mut self, figure: Figure);

    /// Update the existing chart in place.
    fn react(&mut self, figure: Figure);

    /// Ranges currently displayed because of user interaction.
    fn current_view(&self) -> ViewRanges;
}

/// How a figure reached the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawKind {
    NewPlot,
    React,
}

/// In-memory chart surface.
///
/// Keeps the last figure, a log of draw calls and the user view, which makes
/// the viewer usable headless from the CLI and observable in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingChart {
    figure: Option<Figure>,
    draws: Vec<DrawKind>,
    view: ViewRanges,
}

impl RecordingChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last figure drawn.
    pub fn figure(&self) -> Option<&Figure> {
        self.figure.as_ref()
    }

    pub fn draws(&self) -> &[DrawKind] {
        &self.draws
    }

    /// Simulate a user zoom/pan. `None` leaves that axis as it is.
    pub fn relayout(&mut self, x: Option<Range>, y: Option<Range>) {
        if x.is_some() {
            self.view.x = x;
        }
        if y.is_some() {
            self.view.y = y;
        }
    }

    /// Simulate the user resetting the axes (double click / autoscale).
    pub fn autoscale(&mut self) {
        self.view = ViewRanges::default();
    }
}

impl ChartSurface for RecordingChart {
    fn has_plot(&self) -> bool {
        self.figure.is_some()
    }

    fn new_plot(&mut self, figure: Figure) {
        self.view = ViewRanges::default();
        self.figure = Some(figure);
        self.draws.push(DrawKind::NewPlot);
    }

    fn react(&mut self, figure: Figure) {
        self.figure = Some(figure);
        self.draws.push(DrawKind::React);
    }

    fn current_view(&self) -> ViewRanges {
        self.view
    }
}
