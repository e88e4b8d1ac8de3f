//! Per-simulation display settings.
//!
//! Some simulations are dimensionless, others carry SI values that read better
//! after a display-only rescale (m² → mm², m³/s → mL/s). Axis titles, series
//! names, the scale factor and the time label format are looked up here by
//! simulation identifier. Unknown identifiers get the dimensionless default.

use std::collections::HashMap;

/// How one series is labelled and drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesDisplay {
    pub key: String,
    pub name: String,
    pub color: Option<String>,
}

impl SeriesDisplay {
    fn new(key: &str, name: &str, color: Option<&str>) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            color: color.map(str::to_string),
        }
    }
}

/// Display policy for one simulation identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayProfile {
    /// Human-readable simulation name for titles and the selector label.
    pub label: Option<String>,
    pub x_title: String,
    pub y_title: String,
    pub series: Vec<SeriesDisplay>,
    /// Display-only multiplier applied to every plotted value.
    pub scale: Option<f64>,
    /// Decimal places of the time label.
    pub time_precision: usize,
    pub time_symbol: String,
    pub time_unit: Option<String>,
    /// Horizontal legend under the plot area.
    pub legend_below: bool,
}

impl DisplayProfile {
    /// Dimensionless `a`/`q` solution, time in units of τ.
    pub fn dimensionless() -> Self {
        Self {
            label: None,
            x_title: "x (dimensionless)".to_string(),
            y_title: "Value".to_string(),
            series: vec![
                SeriesDisplay::new("a", "a(x, τ)", Some("orange")),
                SeriesDisplay::new("q", "q(x, τ)", Some("blue")),
                SeriesDisplay::new("pressure", "Pressure (mmHg)", None),
            ],
            scale: None,
            time_precision: 5,
            time_symbol: "τ".to_string(),
            time_unit: None,
            legend_below: false,
        }
    }

    /// Area/flow solution in SI units, time in seconds.
    pub fn dimensional() -> Self {
        Self {
            label: None,
            x_title: "z [m]".to_string(),
            y_title: "A [m²], Q [m³/s]".to_string(),
            series: vec![
                SeriesDisplay::new("a", "A(z, t)", Some("orange")),
                SeriesDisplay::new("q", "Q(z, t)", Some("blue")),
            ],
            scale: None,
            time_precision: 3,
            time_symbol: "t".to_string(),
            time_unit: Some("s".to_string()),
            legend_below: false,
        }
    }

    /// Pressure along the vessel, in mmHg.
    pub fn pressure(label: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            x_title: "Length (m)".to_string(),
            y_title: "Pressure (mmHg)".to_string(),
            series: vec![SeriesDisplay::new("pressure", "Pressure (mmHg)", None)],
            scale: None,
            time_precision: 3,
            time_symbol: "t".to_string(),
            time_unit: Some("s".to_string()),
            legend_below: true,
        }
    }

    /// Display name for a series key, falling back to the key itself.
    pub fn series_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.series
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.name.as_str())
            .unwrap_or(key)
    }

    pub fn series_color(&self, key: &str) -> Option<&str> {
        self.series
            .iter()
            .find(|s| s.key == key)
            .and_then(|s| s.color.as_deref())
    }

    /// Apply the display scale to one value.
    pub fn scale_value(&self, value: f64) -> f64 {
        match self.scale {
            Some(factor) => value * factor,
            None => value,
        }
    }

    /// Format a time sample, e.g. `τ = 0.50000` or `t = 0.500 s`.
    pub fn format_time(&self, time: f64) -> String {
        let value = format!("{:.*}", self.time_precision, time);
        match &self.time_unit {
            Some(unit) => format!("{} = {} {}", self.time_symbol, value, unit),
            None => format!("{} = {}", self.time_symbol, value),
        }
    }
}

impl Default for DisplayProfile {
    fn default() -> Self {
        Self::dimensionless()
    }
}

/// Lookup table of display profiles keyed by simulation identifier.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    profiles: HashMap<String, DisplayProfile>,
    fallback: DisplayProfile,
}

impl ProfileTable {
    /// Empty table; every identifier resolves to `fallback`.
    pub fn with_fallback(fallback: DisplayProfile) -> Self {
        Self {
            profiles: HashMap::new(),
            fallback,
        }
    }

    /// Table with the profiles of the simulations the backend ships.
    pub fn builtin() -> Self {
        let mut table = Self::with_fallback(DisplayProfile::dimensionless());

        table.insert("sim1", DisplayProfile::dimensionless());
        table.insert("TestC1", DisplayProfile::dimensionless());
        table.insert("Test_model_laxw_half_step", DisplayProfile::dimensional());

        let mut scaled = DisplayProfile::dimensional();
        scaled.label = Some("Healthy artery + Windkessel".to_string());
        scaled.y_title = "A [mm²], Q [mL/s]".to_string();
        scaled.series = vec![
            SeriesDisplay::new("a", "A(z, t) [mm²]", Some("orange")),
            SeriesDisplay::new("q", "Q(z, t) [mL/s]", Some("blue")),
        ];
        scaled.scale = Some(1e6);
        table.insert("health_wk_laxw", scaled);

        table.insert("t", DisplayProfile::pressure("Temporal pulse (simulation_t)"));
        table.insert("z", DisplayProfile::pressure("Travelling wave (simulation_z)"));
        table.insert("wk", DisplayProfile::pressure("Windkessel-like (healthy_wk)"));

        table
    }

    pub fn insert(&mut self, simulation_id: &str, profile: DisplayProfile) {
        self.profiles.insert(simulation_id.to_string(), profile);
    }

    /// Profile for `simulation_id`, or the fallback.
    pub fn get(&self, simulation_id: &str) -> &DisplayProfile {
        self.profiles.get(simulation_id).unwrap_or(&self.fallback)
    }

    pub fn contains(&self, simulation_id: &str) -> bool {
        self.profiles.contains_key(simulation_id)
    }
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}
