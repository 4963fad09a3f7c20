//! Recorder lifecycle and exactly-once completion accounting.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use respmeter_core::admin::AdminRole;
use respmeter_core::metric::{ManualClock, Metric, RateWindow};
use respmeter_core::{
    AsyncListener, FilterConfig, MetricNamer, MetricRegistry, MetricsListener, RequestMethod,
    RespMeterError, ResponseBucket, ResponseCodeMetrics, StatusCapture,
};

fn recorder() -> ResponseCodeMetrics {
    let metrics = ResponseCodeMetrics::new(Arc::new(MetricRegistry::new()));
    metrics.init(FilterConfig::default()).unwrap();
    metrics
}

fn run(metrics: &ResponseCodeMetrics, method: &str, path: &str, status: i32) {
    let in_flight = metrics
        .begin(method, path, Arc::new(StatusCapture::new()))
        .expect("initialized");
    in_flight.finish_with(status);
}

#[test]
fn init_registers_every_metric() {
    let metrics = recorder();
    let registry = metrics.registry();
    // 4 admin + requestsPerSecond + 6 responses + 6 ratios + 6 timers
    assert_eq!(registry.len(), 23);

    let cfg = FilterConfig::default();
    let namer = MetricNamer::from_config(&cfg);
    for label in [
        "requestsPerSecond",
        "get-requests",
        "post-requests",
        "put-requests",
        "head-requests",
        "delete-requests",
        "other-requests",
        "percent-3xx-1m",
        "percent-3xx-5m",
        "percent-4xx-1m",
        "percent-4xx-5m",
        "percent-5xx-1m",
        "percent-5xx-5m",
        "pingMonitoringRequests",
        "metricsMonitoringRequests",
        "healthMonitoringRequests",
        "threadsMonitoringRequests",
    ] {
        assert!(registry.contains(&namer.requests(label)), "missing {label}");
    }
    for label in [
        "1xx-responses",
        "2xx-responses",
        "3xx-responses",
        "4xx-responses",
        "5xx-responses",
        "unknown-responses",
    ] {
        assert!(registry.contains(&namer.responses(label)), "missing {label}");
    }
    assert!(matches!(
        registry.get(&namer.requests("get-requests")),
        Some(Metric::Timer(_))
    ));
    assert!(matches!(
        registry.get(&namer.requests("percent-5xx-1m")),
        Some(Metric::Gauge(_))
    ));
}

#[test]
fn second_init_is_rejected() {
    let metrics = recorder();
    let err = metrics.init(FilterConfig::default()).expect_err("must reject");
    assert!(matches!(err, RespMeterError::AlreadyInitialized));
    assert_eq!(metrics.registry().len(), 23);
}

#[test]
fn destroy_removes_everything_and_init_recreates() {
    let metrics = recorder();
    let before = metrics.registry().names();
    assert_eq!(metrics.destroy(), 23);
    assert!(metrics.registry().is_empty());
    assert!(!metrics.is_initialized());
    assert_eq!(metrics.destroy(), 0);

    metrics.init(FilterConfig::default()).unwrap();
    assert_eq!(metrics.registry().names(), before);
}

#[test]
fn destroy_leaves_other_instances_alone() {
    let registry = Arc::new(MetricRegistry::new());
    let a = ResponseCodeMetrics::new(registry.clone());
    let b = ResponseCodeMetrics::new(registry.clone());
    a.init(FilterConfig::default().with_filter_instance_name(Some("a".into())))
        .unwrap();
    b.init(FilterConfig::default().with_filter_instance_name(Some("b".into())))
        .unwrap();
    assert_eq!(registry.len(), 46);
    a.destroy();
    assert_eq!(registry.len(), 23);
    assert!(b.is_initialized());
}

#[test]
fn colliding_admin_paths_fail_init_without_registering() {
    let metrics = ResponseCodeMetrics::new(Arc::new(MetricRegistry::new()));
    let cfg = FilterConfig::default().with_endpoint(AdminRole::Health, Some("/metrics".into()));
    let err = metrics.init(cfg).expect_err("must reject");
    assert!(matches!(err, RespMeterError::AdminPathCollision { .. }));
    assert!(metrics.registry().is_empty());
    assert!(!metrics.is_initialized());
}

#[test]
fn type_clash_rolls_back_partial_registration() {
    let registry = Arc::new(MetricRegistry::new());
    let namer = MetricNamer::from_config(&FilterConfig::default());
    // Squat on a timer name with a meter.
    registry.meter(&namer.requests("other-requests")).unwrap();

    let metrics = ResponseCodeMetrics::new(registry.clone());
    let err = metrics.init(FilterConfig::default()).expect_err("must fail");
    assert!(matches!(err, RespMeterError::MetricTypeMismatch { .. }));
    assert!(!metrics.is_initialized());
    assert_eq!(registry.len(), 1);
}

#[test]
fn failed_init_keeps_metrics_it_did_not_create() {
    let registry = Arc::new(MetricRegistry::new());
    let namer = MetricNamer::from_config(&FilterConfig::default());
    let rps = namer.requests("requestsPerSecond");
    let foreign = registry.meter(&rps).unwrap();
    foreign.mark();

    let metrics = ResponseCodeMetrics::new(registry.clone());
    let err = metrics.init(FilterConfig::default()).expect_err("must fail");
    assert!(matches!(err, RespMeterError::MetricAlreadyRegistered { .. }));
    assert!(!metrics.is_initialized());
    assert_eq!(registry.len(), 1);
    match registry.get(&rps) {
        Some(Metric::Meter(m)) => assert_eq!(m.count(), 1),
        _ => panic!("foreign meter must survive"),
    }
}

#[test]
fn second_recorder_with_same_instance_name_is_rejected() {
    let registry = Arc::new(MetricRegistry::new());
    let a = ResponseCodeMetrics::new(registry.clone());
    let b = ResponseCodeMetrics::new(registry.clone());
    a.init(FilterConfig::default()).unwrap();

    let err = b.init(FilterConfig::default()).expect_err("names already held");
    assert!(matches!(err, RespMeterError::MetricAlreadyRegistered { .. }));
    assert!(!b.is_initialized());
    assert_eq!(registry.len(), 23);

    run(&a, "GET", "/x", 200);
    assert_eq!(b.destroy(), 0);
    assert_eq!(a.destroy(), 23);
    assert!(registry.is_empty());
}

#[test]
fn registered_ratio_gauges_are_the_ones_in_the_registry() {
    let metrics = recorder();
    let instruments = metrics.instruments().unwrap();
    let namer = MetricNamer::from_config(&FilterConfig::default());
    let name = namer.requests("percent-4xx-1m");
    let held = instruments
        .ratio(ResponseBucket::ClientError, RateWindow::OneMinute)
        .unwrap();
    match metrics.registry().get(&name) {
        Some(Metric::Gauge(g)) => {
            let registered = Arc::as_ptr(&g) as *const ();
            assert_eq!(registered, Arc::as_ptr(held) as *const ());
        }
        _ => panic!("gauge missing"),
    }
}

#[test]
fn begin_before_init_is_unmetered() {
    let metrics = ResponseCodeMetrics::new(Arc::new(MetricRegistry::new()));
    assert!(metrics
        .begin("GET", "/", Arc::new(StatusCapture::new()))
        .is_none());
}

#[test]
fn not_found_lands_in_4xx() {
    let metrics = recorder();
    run(&metrics, "GET", "/missing", 404);
    let i = metrics.instruments().unwrap();
    assert_eq!(i.response_meter(ResponseBucket::ClientError).count(), 1);
    assert_eq!(i.requests_per_second().count(), 1);
    assert_eq!(i.response_meter(ResponseBucket::Success).count(), 0);
}

#[test]
fn out_of_range_status_is_unknown() {
    let metrics = recorder();
    run(&metrics, "GET", "/", 600);
    let i = metrics.instruments().unwrap();
    assert_eq!(i.response_meter(ResponseBucket::Unknown).count(), 1);
    assert_eq!(i.requests_per_second().count(), 1);
}

#[test]
fn admin_path_hit_counts_alongside_method_timer() {
    let metrics = recorder();
    run(&metrics, "GET", "/metrics", 200);
    run(&metrics, "GET", "/metrics/extra", 200);
    let i = metrics.instruments().unwrap();
    assert_eq!(i.timer(RequestMethod::Get).count(), 2);
    assert_eq!(i.admin().meter(AdminRole::Metrics).unwrap().count(), 1);
    assert_eq!(i.admin().meter(AdminRole::Ping).unwrap().count(), 0);
}

#[test]
fn unset_status_defaults_to_200() {
    let metrics = recorder();
    metrics
        .begin("POST", "/", Arc::new(StatusCapture::new()))
        .unwrap()
        .finish();
    let i = metrics.instruments().unwrap();
    assert_eq!(i.response_meter(ResponseBucket::Success).count(), 1);
    assert_eq!(i.timer(RequestMethod::Post).count(), 1);
}

#[test]
fn dropped_in_flight_is_accounted_once() {
    let metrics = recorder();
    let capture = Arc::new(StatusCapture::new());
    let in_flight = metrics.begin("DELETE", "/ping", capture.clone()).unwrap();
    capture.set_status(503);
    drop(in_flight);
    let i = metrics.instruments().unwrap();
    assert_eq!(i.timer(RequestMethod::Delete).count(), 1);
    assert_eq!(i.response_meter(ResponseBucket::ServerError).count(), 1);
    assert_eq!(i.admin().meter(AdminRole::Ping).unwrap().count(), 1);
    assert_eq!(i.requests_per_second().count(), 1);
}

#[test]
fn listener_completes_exactly_once_across_notifications() {
    let metrics = recorder();
    let notify: [fn(&MetricsListener); 3] = [
        |l| l.on_complete(),
        |l| l.on_error(&"boom"),
        |l| l.on_timeout(),
    ];
    for first in notify {
        let listener = MetricsListener::new(
            metrics
                .begin("PUT", "/healthcheck", Arc::new(StatusCapture::new()))
                .unwrap(),
        );
        assert!(!listener.is_done());
        first(&listener);
        assert!(listener.is_done());
        // Everything after the first notification is ignored.
        for n in notify {
            n(&listener);
        }
    }
    let i = metrics.instruments().unwrap();
    assert_eq!(i.timer(RequestMethod::Put).count(), 3);
    assert_eq!(i.requests_per_second().count(), 3);
    assert_eq!(i.admin().meter(AdminRole::Health).unwrap().count(), 3);
}

#[test]
fn inline_and_deferred_completions_sum_exactly() {
    const INLINE: usize = 40;
    const DEFERRED: usize = 30;
    let metrics = Arc::new(recorder());

    let mut handles = Vec::new();
    for n in 0..INLINE {
        let metrics = metrics.clone();
        handles.push(thread::spawn(move || {
            run(&metrics, if n % 2 == 0 { "GET" } else { "POST" }, "/", 200);
        }));
    }
    for n in 0..DEFERRED {
        let listener = Arc::new(MetricsListener::new(
            metrics
                .begin("GET", "/", Arc::new(StatusCapture::new()))
                .unwrap(),
        ));
        // Two racing notifiers per request; only one may count.
        for k in 0..2 {
            let listener = listener.clone();
            handles.push(thread::spawn(move || match (n + k) % 3 {
                0 => listener.on_complete(),
                1 => listener.on_error(&"io"),
                _ => listener.on_timeout(),
            }));
        }
    }
    for h in handles {
        h.join().unwrap();
    }

    let i = metrics.instruments().unwrap();
    assert_eq!(i.requests_per_second().count(), (INLINE + DEFERRED) as u64);
    assert_eq!(
        i.timer(RequestMethod::Get).count() + i.timer(RequestMethod::Post).count(),
        (INLINE + DEFERRED) as u64
    );
}

#[test]
fn completion_after_destroy_is_harmless() {
    let metrics = recorder();
    let in_flight = metrics
        .begin("GET", "/", Arc::new(StatusCapture::new()))
        .unwrap();
    metrics.destroy();
    in_flight.finish_with(500);
    assert!(metrics.registry().is_empty());
}

#[test]
fn ratio_gauges_track_status_share() {
    let clock = Arc::new(ManualClock::new());
    let metrics = ResponseCodeMetrics::new(Arc::new(MetricRegistry::with_clock(clock.clone())));
    metrics.init(FilterConfig::default()).unwrap();

    for status in [200, 200, 200, 404, 500] {
        run(&metrics, "GET", "/", status);
    }
    clock.advance(Duration::from_secs(6));

    let i = metrics.instruments().unwrap();
    let four = i
        .ratio(ResponseBucket::ClientError, RateWindow::OneMinute)
        .unwrap();
    let five = i
        .ratio(ResponseBucket::ServerError, RateWindow::FiveMinute)
        .unwrap();
    let three = i
        .ratio(ResponseBucket::Redirection, RateWindow::OneMinute)
        .unwrap();
    assert!((four.ratio() - 0.2).abs() < 1e-9);
    assert!((five.ratio() - 0.2).abs() < 1e-9);
    assert_eq!(three.ratio(), 0.0);
    assert!(i.ratio(ResponseBucket::Success, RateWindow::OneMinute).is_none());
}

#[test]
fn snapshot_serializes_all_kinds() {
    let metrics = recorder();
    run(&metrics, "GET", "/ping", 200);
    let snap = metrics.registry().snapshot();
    assert_eq!(snap.len(), 23);
    let json = serde_json::to_value(&snap).unwrap();
    let arr = json.as_array().unwrap();
    let kinds: Vec<&str> = arr.iter().map(|m| m["kind"].as_str().unwrap()).collect();
    assert!(kinds.contains(&"meter"));
    assert!(kinds.contains(&"timer"));
    assert!(kinds.contains(&"gauge"));
    let get = arr
        .iter()
        .find(|m| m["name"]["name"] == "get-requests")
        .unwrap();
    assert_eq!(get["count"], 1);
    assert_eq!(get["name"]["scope"], "response-code-filter.requests");
}
