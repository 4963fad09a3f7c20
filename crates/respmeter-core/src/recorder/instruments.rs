use std::sync::Arc;

use crate::admin::{AdminEndpoints, AdminRole};
use crate::classify::{RequestMethod, ResponseBucket};
use crate::config::FilterConfig;
use crate::error::Result;
use crate::metric::{Gauge, Meter, MetricRegistry, RateWindow, RatioGauge, Timer, TimerContext};
use crate::name::{labels, MetricName, MetricNamer};

/// Response classes that get a share-of-traffic gauge.
const RATIO_BUCKETS: [ResponseBucket; 3] = [
    ResponseBucket::Redirection,
    ResponseBucket::ClientError,
    ResponseBucket::ServerError,
];

const RATIO_WINDOWS: [RateWindow; 2] = [RateWindow::OneMinute, RateWindow::FiveMinute];

/// Every metric one initialized recorder updates. Immutable once built.
pub struct Instruments {
    config: FilterConfig,
    names: Vec<MetricName>,
    requests_per_second: Arc<Meter>,
    // Indexed by `RequestMethod::index`.
    timers: Vec<Arc<Timer>>,
    // Indexed by `ResponseBucket::index`.
    responses: Vec<Arc<Meter>>,
    ratios: Vec<(ResponseBucket, Arc<RatioGauge>)>,
    admin: AdminEndpoints,
}

/// Tracks names this init created so a failed init removes only those.
struct Registration<'a> {
    registry: &'a MetricRegistry,
    names: Vec<MetricName>,
}

impl Registration<'_> {
    fn meter(&mut self, name: MetricName) -> Result<Arc<Meter>> {
        let meter = self.registry.register_meter(&name)?;
        self.names.push(name);
        Ok(meter)
    }

    fn timer(&mut self, name: MetricName) -> Result<Arc<Timer>> {
        let timer = self.registry.register_timer(&name)?;
        self.names.push(name);
        Ok(timer)
    }

    fn gauge(&mut self, name: MetricName, gauge: Arc<RatioGauge>) -> Result<()> {
        self.registry.register_gauge(&name, gauge as Arc<dyn Gauge>)?;
        self.names.push(name);
        Ok(())
    }

    fn rollback(self) {
        for name in &self.names {
            self.registry.remove(name);
        }
    }
}

impl Instruments {
    pub(crate) fn register(registry: &MetricRegistry, config: FilterConfig) -> Result<Self> {
        let mut reg = Registration {
            registry,
            names: Vec::new(),
        };
        match Self::build(&mut reg, config) {
            Ok(mut instruments) => {
                instruments.names = reg.names;
                Ok(instruments)
            }
            Err(e) => {
                tracing::warn!(error = %e, "response-code metrics registration failed; rolling back");
                reg.rollback();
                Err(e)
            }
        }
    }

    fn build(reg: &mut Registration<'_>, config: FilterConfig) -> Result<Self> {
        let namer = MetricNamer::from_config(&config);

        let mut admin = AdminEndpoints::new();
        for role in AdminRole::ALL {
            let meter = reg.meter(namer.requests(role.metric_label()))?;
            admin.insert(config.endpoint(role), role, meter);
        }

        let requests_per_second = reg.meter(namer.requests(labels::REQUESTS_PER_SECOND))?;

        let mut responses = Vec::with_capacity(ResponseBucket::ALL.len());
        for bucket in ResponseBucket::ALL {
            responses.push(reg.meter(namer.responses(bucket.metric_label()))?);
        }

        let mut ratios = Vec::with_capacity(RATIO_BUCKETS.len() * RATIO_WINDOWS.len());
        for bucket in RATIO_BUCKETS {
            for window in RATIO_WINDOWS {
                let label = format!("percent-{}-{}", bucket.class(), window.suffix());
                let gauge = Arc::new(RatioGauge::new(
                    Arc::clone(&responses[bucket.index()]),
                    Arc::clone(&requests_per_second),
                    window,
                ));
                reg.gauge(namer.requests(&label), Arc::clone(&gauge))?;
                ratios.push((bucket, gauge));
            }
        }

        let mut timers = Vec::with_capacity(RequestMethod::ALL.len());
        for method in RequestMethod::ALL {
            timers.push(reg.timer(namer.requests(method.metric_label()))?);
        }

        Ok(Self {
            config,
            names: Vec::new(),
            requests_per_second,
            timers,
            responses,
            ratios,
            admin,
        })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Every name this instrument set registered.
    pub fn names(&self) -> &[MetricName] {
        &self.names
    }

    pub fn requests_per_second(&self) -> &Arc<Meter> {
        &self.requests_per_second
    }

    pub fn timer(&self, method: RequestMethod) -> &Arc<Timer> {
        &self.timers[method.index()]
    }

    pub fn response_meter(&self, bucket: ResponseBucket) -> &Arc<Meter> {
        &self.responses[bucket.index()]
    }

    pub fn ratio(&self, bucket: ResponseBucket, window: RateWindow) -> Option<&Arc<RatioGauge>> {
        self.ratios
            .iter()
            .find(|(b, g)| *b == bucket && g.window() == window)
            .map(|(_, g)| g)
    }

    pub fn admin(&self) -> &AdminEndpoints {
        &self.admin
    }

    /// Mark the status bucket and the total request meter.
    pub fn record_response(&self, status: i32) -> ResponseBucket {
        let bucket = ResponseBucket::of(status);
        self.responses[bucket.index()].mark();
        self.requests_per_second.mark();
        bucket
    }

    /// The single completion routine every path funnels into.
    pub fn complete(&self, timer: TimerContext, status: i32, path: &str) {
        timer.stop();
        self.record_response(status);
        self.admin.check_and_mark(path);
    }
}
