//! Shared value types for one espresso trial.

/// Brew parameters for a single shot. `Default` encodes the standard
/// session used everywhere a field would otherwise be unknown: grind 5,
/// dose 18 g, basket 18 g, time 28 s, beverage 36 g, temp 93 °C, tamp 5.
///
/// Dose and beverage mass use `<= 0` as "not recorded"; `ratio()` and the
/// TDS estimator treat zero like a missing measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrewParams {
    /// Grind setting, 0 = finest .. 10 = coarsest.
    pub grind_size: f64,
    /// Dry coffee in the basket (g).
    pub dose_coffee: f64,
    /// Nominal basket capacity (g). 0 disables the basket rule.
    pub basket_size: f64,
    /// Shot time from first drip (s).
    pub time: f64,
    /// Beverage mass in the cup (g).
    pub beverage_mass: f64,
    /// Measured total dissolved solids (%), when a refractometer is used.
    pub tds: Option<f64>,
    /// Group outlet temperature (°C).
    pub temp: f64,
    /// Tamp pressure, 1..=8.
    pub tamp_pressure: f64,
}

impl Default for BrewParams {
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
        }
    }
}

impl BrewParams {
    /// Beverage/dose ratio, when both masses are recorded.
    pub fn ratio(&self) -> Option<f64> {
        (self.dose_coffee > 0.0 && self.beverage_mass > 0.0)
            .then(|| self.beverage_mass / self.dose_coffee)
    }

    /// Flow proxy in g/s, when time is recorded.
    pub fn flow(&self) -> Option<f64> {
        (self.time > 0.0).then(|| self.beverage_mass / self.time)
    }
}

/// Sensory defect scores, each 0..=10.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Defects {
    pub sour: f64,
    pub bitter: f64,
    pub astringent: f64,
    pub weak: f64,
    pub harsh: f64,
}

impl Defects {
    pub fn sum(&self) -> f64 {
        self.sour + self.bitter + self.astringent + self.weak + self.harsh
    }
}

/// Positive attribute scores, each 0..=10.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Positives {
    pub balanced: f64,
    pub body: f64,
    pub aroma: f64,
    pub sweetness: f64,
}

impl Positives {
    pub fn sum(&self) -> f64 {
        self.balanced + self.body + self.aroma + self.sweetness
    }
}

/// Puck-preparation observations. These take priority over numeric tuning
/// in the recommender and penalize the extraction estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrepFlags {
    pub freshness: bool,
    pub bad_distribution: bool,
    pub uneven_tamp: bool,
    pub inaccurate_dose: bool,
    pub broken_puck: bool,
}

/// Derived metrics for the trial under analysis. `ey`/`tds` may be
/// measured or estimated; `None` means neither was available.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Metrics {
    pub ey: Option<f64>,
    pub tds: Option<f64>,
    pub ratio: Option<f64>,
}

impl Metrics {
    /// Compute metrics for the current session: measured EY from TDS when
    /// the refractometer flag is on, estimated EY/TDS otherwise.
    pub fn derive(params: &BrewParams, extras: &PrepFlags, use_measured_tds: bool) -> Self {
        let ratio = params.ratio();
        let measured_ey = if use_measured_tds {
            match (params.tds, ratio) {
                (Some(tds), Some(_)) if tds > 0.0 => {
                    Some(tds * params.beverage_mass / params.dose_coffee)
                }
                _ => None,
            }
        } else {
            None
        };
        let ey = if use_measured_tds {
            measured_ey
        } else {
            Some(crate::estimate::estimate_ey(params, extras, ratio))
        };
        let tds = match params.tds {
            Some(tds) if use_measured_tds && tds > 0.0 => Some(tds),
            _ => crate::estimate::estimate_tds(params, ey),
        };
        Self { ey, tds, ratio }
    }
}
