//! Artery monitor view.
//!
//! Render-once dashboard of the artery + Windkessel run: each panel plots the
//! full time history of one quantity, with one trace per monitoring location
//! where the quantity is sampled at several points along the vessel.

use crate::chart::{Axis, ChartSurface, Figure, Font, Layout, Margin, Trace};
use crate::dataset::ArteryPayload;
use crate::fetcher::{DatasetSource, FetchError};
use crate::viewer::StatusLabel;

const BACKGROUND: &str = "#020617";
const FOREGROUND: &str = "#e5e7eb";
const TIME_AXIS_TITLE: &str = "Time [s]";

/// The six monitor panels, in page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Pressure,
    Flow,
    Area,
    OutletPressure,
    OutletFlow,
    WindkesselPressure,
}

impl Panel {
    pub const ALL: [Panel; 6] = [
        Panel::Pressure,
        Panel::Flow,
        Panel::Area,
        Panel::OutletPressure,
        Panel::OutletFlow,
        Panel::WindkesselPressure,
    ];

    /// Element id of the panel on the monitor page.
    pub fn element_id(&self) -> &'static str {
        match self {
            Panel::Pressure => "pressurePlot",
            Panel::Flow => "flowPlot",
            Panel::Area => "areaPlot",
            Panel::OutletPressure => "outletPressurePlot",
            Panel::OutletFlow => "outletFlowPlot",
            Panel::WindkesselPressure => "wkPressurePlot",
        }
    }

    pub fn y_title(&self) -> &'static str {
        match self {
            Panel::Pressure => "Pressure [mmHg]",
            Panel::Flow => "Flow Q̃ [m³/s]",
            Panel::Area => "Area [m²]",
            Panel::OutletPressure => "Outlet Pressure [mmHg]",
            Panel::OutletFlow => "Outlet Q̃ [m³/s]",
            Panel::WindkesselPressure => "Pressure [mmHg]",
        }
    }

    /// Figure for this panel.
    pub fn figure(&self, payload: &ArteryPayload) -> Figure {
        let t = &payload.t;
        let data = match self {
            Panel::Pressure => location_traces(t, &payload.monitor_z, &payload.pressure_mmhg),
            Panel::Flow => location_traces(t, &payload.monitor_z, &payload.flow),
            Panel::Area => location_traces(t, &payload.monitor_z, &payload.area),
            Panel::OutletPressure => {
                vec![Trace::lines("Outlet Pressure", t.clone(), payload.p_out_mmhg.clone())]
            }
            Panel::OutletFlow => vec![Trace::lines("Outlet Flow", t.clone(), payload.q_out.clone())],
            Panel::WindkesselPressure => {
                vec![Trace::lines("Windkessel Pressure", t.clone(), payload.p_wk_mmhg.clone())]
            }
        };

        Figure {
            data,
            layout: dark_layout(self.y_title()),
        }
    }
}

/// Legend label for monitoring location `index` of `count`.
pub fn location_label(index: usize, count: usize, z: f64) -> String {
    if index == 0 {
        format!("Inlet (z = {:.3} m)", z)
    } else if index + 1 == count {
        format!("Outlet (z = {:.3} m)", z)
    } else {
        format!("Mid (z = {:.3} m)", z)
    }
}

fn location_traces(t: &[f64], monitor_z: &[f64], series: &[Vec<f64>]) -> Vec<Trace> {
    series
        .iter()
        .enumerate()
        .map(|(i, values)| {
            let name = match monitor_z.get(i) {
                Some(z) => location_label(i, monitor_z.len(), *z),
                None => format!("Location {}", i),
            };
            Trace::lines(name, t.to_vec(), values.clone())
        })
        .collect()
}

fn dark_layout(y_title: &str) -> Layout {
    Layout {
        xaxis: Axis::titled(TIME_AXIS_TITLE),
        yaxis: Axis::titled(y_title),
        margin: Some(Margin::top(20)),
        paper_bgcolor: Some(BACKGROUND.to_string()),
        plot_bgcolor: Some(BACKGROUND.to_string()),
        font: Some(Font {
            color: FOREGROUND.to_string(),
        }),
        ..Layout::default()
    }
}

/// Multi-panel view; one chart surface per panel.
pub struct MonitorView<C: ChartSurface> {
    panels: Vec<(Panel, C)>,
    status: StatusLabel,
}

impl<C: ChartSurface + Default> MonitorView<C> {
    pub fn new() -> Self {
        Self {
            panels: Panel::ALL.iter().map(|p| (*p, C::default())).collect(),
            status: StatusLabel::default(),
        }
    }
}

impl<C: ChartSurface + Default> Default for MonitorView<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ChartSurface> MonitorView<C> {
    pub fn status(&self) -> &StatusLabel {
        &self.status
    }

    pub fn panel(&self, panel: Panel) -> Option<&C> {
        self.panels.iter().find(|(p, _)| *p == panel).map(|(_, c)| c)
    }

    pub fn panels(&self) -> impl Iterator<Item = (Panel, &C)> {
        self.panels.iter().map(|(p, c)| (*p, c))
    }

    /// Fetch the artery run and draw every panel.
    pub async fn run<S: DatasetSource>(&mut self, source: &S) -> Result<(), FetchError> {
        self.status.set("Running simulation...");

        let payload = match source.load_artery().await {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(error = %err, "Error running simulation");
                self.status.set(format!("Error: {}", err));
                return Err(err);
            }
        };

        self.status.set("Simulation complete. Rendering plots...");
        self.render(&payload);
        self.status.set("Done.");
        Ok(())
    }

    /// Draw every panel from `payload` as fresh charts.
    pub fn render(&mut self, payload: &ArteryPayload) {
        for (panel, chart) in &mut self.panels {
            chart.new_plot(panel.figure(payload));
        }
        tracing::info!(
            samples = payload.t.len(),
            locations = payload.monitor_z.len(),
            "Rendered monitor panels"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{DrawKind, RecordingChart};
    use crate::dataset::SimulationDataset;

    fn sample_payload() -> ArteryPayload {
        ArteryPayload {
            t: vec![0.0, 0.01, 0.02],
            monitor_z: vec![0.0, 0.075, 0.15],
            pressure_mmhg: vec![
                vec![80.0, 85.0, 90.0],
                vec![79.0, 84.0, 89.0],
                vec![78.0, 83.0, 88.0],
            ],
            flow: vec![vec![1.0, 2.0, 3.0]; 3],
            area: vec![vec![3.0, 3.1, 3.2]; 3],
            p_out_mmhg: vec![78.0, 83.0, 88.0],
            q_out: vec![1.0, 2.0, 3.0],
            p_wk_mmhg: vec![77.0, 82.0, 87.0],
        }
    }

    struct ArterySource(Option<ArteryPayload>);

    impl DatasetSource for ArterySource {
        async fn load(&self, _simulation_id: &str) -> Result<SimulationDataset, FetchError> {
            Err(FetchError::MissingSimulationId)
        }

        async fn load_artery(&self) -> Result<ArteryPayload, FetchError> {
            self.0.clone().ok_or(FetchError::Status {
                status: 500,
                body: "solver crashed".to_string(),
            })
        }
    }

    #[test]
    fn test_location_labels() {
        assert_eq!(location_label(0, 3, 0.0), "Inlet (z = 0.000 m)");
        assert_eq!(location_label(1, 3, 0.075), "Mid (z = 0.075 m)");
        assert_eq!(location_label(2, 3, 0.15), "Outlet (z = 0.150 m)");
    }

    #[test]
    fn test_pressure_panel_has_one_trace_per_location() {
        let fig = Panel::Pressure.figure(&sample_payload());
        assert_eq!(fig.data.len(), 3);
        assert_eq!(fig.data[0].name, "Inlet (z = 0.000 m)");
        assert_eq!(fig.data[2].y, vec![78.0, 83.0, 88.0]);
        assert_eq!(fig.data[1].x, vec![0.0, 0.01, 0.02]);
        assert_eq!(fig.layout.paper_bgcolor.as_deref(), Some("#020617"));
    }

    #[test]
    fn test_panel_sets_only_top_margin() {
        let fig = Panel::Area.figure(&sample_payload());
        let layout = serde_json::to_value(&fig.layout).unwrap();
        assert_eq!(layout["margin"], serde_json::json!({"t": 20}));
    }

    #[test]
    fn test_outlet_panels_have_single_trace() {
        let payload = sample_payload();
        for panel in [Panel::OutletPressure, Panel::OutletFlow, Panel::WindkesselPressure] {
            assert_eq!(panel.figure(&payload).data.len(), 1);
        }
        let fig = Panel::WindkesselPressure.figure(&payload);
        assert_eq!(fig.data[0].name, "Windkessel Pressure");
        assert_eq!(fig.data[0].y, vec![77.0, 82.0, 87.0]);
    }

    #[tokio::test]
    async fn test_run_draws_all_panels() {
        let mut view: MonitorView<RecordingChart> = MonitorView::new();
        view.run(&ArterySource(Some(sample_payload()))).await.unwrap();

        assert_eq!(view.status().text(), "Done.");
        for (panel, chart) in view.panels() {
            assert_eq!(chart.draws(), &[DrawKind::NewPlot], "panel {:?}", panel);
        }
        let flow = view.panel(Panel::Flow).unwrap().figure().unwrap();
        assert_eq!(flow.layout.yaxis.title.as_ref().unwrap().text, "Flow Q̃ [m³/s]");
    }

    #[tokio::test]
    async fn test_run_failure_sets_status() {
        let mut view: MonitorView<RecordingChart> = MonitorView::new();
        let err = view.run(&ArterySource(None)).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 500, .. }));
        assert_eq!(view.status().text(), "Error: backend returned HTTP 500");
        assert!(view.panels().all(|(_, chart)| !chart.has_plot()));
    }
}
