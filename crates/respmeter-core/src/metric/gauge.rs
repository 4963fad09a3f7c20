//! Gauges: values computed on read.

use std::sync::Arc;

use super::meter::Meter;

pub trait Gauge: Send + Sync {
    fn value(&self) -> f64;
}

/// Which moving-average window a ratio reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateWindow {
    OneMinute,
    FiveMinute,
}

impl RateWindow {
    /// Suffix used in gauge labels (`percent-4xx-1m`).
    pub fn suffix(self) -> &'static str {
        match self {
            RateWindow::OneMinute => "1m",
            RateWindow::FiveMinute => "5m",
        }
    }

    fn rate_of(self, meter: &Meter) -> f64 {
        match self {
            RateWindow::OneMinute => meter.one_minute_rate(),
            RateWindow::FiveMinute => meter.five_minute_rate(),
        }
    }
}

/// `numerator.rate(window) / denominator.rate(window)`, recomputed on every read.
///
/// A zero or non-finite denominator yields `NaN` instead of an infinity, so a
/// quiet filter reports "no data" rather than a 100% error share.
pub struct RatioGauge {
    numerator: Arc<Meter>,
    denominator: Arc<Meter>,
    window: RateWindow,
}

impl RatioGauge {
    pub fn new(numerator: Arc<Meter>, denominator: Arc<Meter>, window: RateWindow) -> Self {
        Self {
            numerator,
            denominator,
            window,
        }
    }

    pub fn window(&self) -> RateWindow {
        self.window
    }

    pub fn ratio(&self) -> f64 {
        let den = self.window.rate_of(&self.denominator);
        if den == 0.0 || !den.is_finite() {
            return f64::NAN;
        }
        self.window.rate_of(&self.numerator) / den
    }
}

impl Gauge for RatioGauge {
    fn value(&self) -> f64 {
        self.ratio()
    }
}
