#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and trial-history CSV parsing for the dial-in system.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The trial CSV loader enforces headers and maps each row to a flat
//!   record the CLI converts into core trial records.

use serde::Deserialize;

pub mod trial_csv;

/// Inclusive slider range for one brew parameter.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

/// Per-field input domains. The optimizer uses these as search bounds.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Ranges {
    pub grind_size: ParamRange,
    pub dose_coffee: ParamRange,
    pub basket_size: ParamRange,
    pub time: ParamRange,
    pub beverage_mass: ParamRange,
    pub tds: ParamRange,
    pub temp: ParamRange,
    pub tamp_pressure: ParamRange,
}

impl Default for Ranges {
    fn default() -> Self {
        Self {
            grind_size: ParamRange::new(0.0, 10.0, 0.1),
            dose_coffee: ParamRange::new(5.0, 30.0, 0.1),
            basket_size: ParamRange::new(5.0, 30.0, 1.0),
            time: ParamRange::new(15.0, 40.0, 1.0),
            beverage_mass: ParamRange::new(1.0, 150.0, 0.1),
            tds: ParamRange::new(1.0, 10.0, 1.0),
            temp: ParamRange::new(80.0, 100.0, 1.0),
            tamp_pressure: ParamRange::new(1.0, 8.0, 1.0),
        }
    }
}

/// Current session brew parameters (the trial about to be analyzed).
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct SessionCfg {
    pub grind_size: f64,
    pub dose_coffee: f64,
    pub basket_size: f64,
    pub time: f64,
    pub beverage_mass: f64,
    /// Measured TDS (%). Only meaningful when `use_measured_tds` is set.
    pub tds: Option<f64>,
    pub temp: f64,
    pub tamp_pressure: f64,
    pub use_measured_tds: bool,
}

impl Default for SessionCfg {
    fn default() -> Self {
        Self {
            grind_size: 5.0,
            dose_coffee: 18.0,
            basket_size: 18.0,
            time: 28.0,
            beverage_mass: 36.0,
            tds: None,
            temp: 93.0,
            tamp_pressure: 5.0,
            use_measured_tds: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GrinderKindCfg {
    #[default]
    Stepless,
    Stepped,
}

/// Grinder dial description. `dial_number` plus `extra_turns` locate the
/// current setting; `per_rev_max` is the number range of one full turn.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct GrinderCfg {
    pub kind: GrinderKindCfg,
    pub per_rev_max: f64,
    pub dial_number: f64,
    pub extra_turns: u32,
    /// Some grinders are reversed: higher numbers mean finer.
    pub high_dial_means_coarser: bool,
}

impl Default for GrinderCfg {
    fn default() -> Self {
        Self {
            kind: GrinderKindCfg::Stepless,
            per_rev_max: 10.0,
            dial_number: 3.0,
            extra_turns: 0,
            high_dial_means_coarser: true,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub session: SessionCfg,
    pub grinder: GrinderCfg,
    pub ranges: Ranges,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Validate ranges, grinder geometry, and session values.
    pub fn validate(&self) -> eyre::Result<()> {
        for (name, r) in [
            ("grind_size", self.ranges.grind_size),
            ("dose_coffee", self.ranges.dose_coffee),
            ("basket_size", self.ranges.basket_size),
            ("time", self.ranges.time),
            ("beverage_mass", self.ranges.beverage_mass),
            ("tds", self.ranges.tds),
            ("temp", self.ranges.temp),
            ("tamp_pressure", self.ranges.tamp_pressure),
        ] {
            if !(r.min.is_finite() && r.max.is_finite() && r.step.is_finite()) {
                eyre::bail!("range {name} has non-finite bounds");
            }
            if r.min >= r.max {
                eyre::bail!("range {name} requires min < max, got {} >= {}", r.min, r.max);
            }
            if r.step <= 0.0 {
                eyre::bail!("range {name} requires step > 0, got {}", r.step);
            }
        }
        if !(self.grinder.per_rev_max.is_finite() && self.grinder.per_rev_max > 0.0) {
            eyre::bail!("grinder per_rev_max must be > 0");
        }
        if self.grinder.dial_number < 0.0 || self.grinder.dial_number >= self.grinder.per_rev_max {
            eyre::bail!(
                "grinder dial_number must lie in [0, per_rev_max), got {}",
                self.grinder.dial_number
            );
        }
        let s = &self.session;
        for (name, v, r) in [
            ("grind_size", s.grind_size, self.ranges.grind_size),
            ("dose_coffee", s.dose_coffee, self.ranges.dose_coffee),
            ("basket_size", s.basket_size, self.ranges.basket_size),
            ("time", s.time, self.ranges.time),
            ("beverage_mass", s.beverage_mass, self.ranges.beverage_mass),
            ("temp", s.temp, self.ranges.temp),
            ("tamp_pressure", s.tamp_pressure, self.ranges.tamp_pressure),
        ] {
            if !v.is_finite() {
                eyre::bail!("session {name} is non-finite");
            }
            if !r.contains(v) {
                eyre::bail!(
                    "session {name} = {v} outside configured range [{}, {}]",
                    r.min,
                    r.max
                );
            }
        }
        if s.use_measured_tds && s.tds.is_none() {
            eyre::bail!("use_measured_tds is set but session tds is missing");
        }
        Ok(())
    }
}
