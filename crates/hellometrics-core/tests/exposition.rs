#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use hellometrics_core::{MetricOpts, ProcessCollector, Registry, CONTENT_TYPE};
use std::sync::Arc;

#[test]
fn content_type_is_text_004() {
    assert_eq!(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8");
}

#[test]
fn unlabeled_gauge_renders_zero_before_use() {
    let reg = Registry::new();
    reg.register_gauge_vec(MetricOpts::new("active_requests", "Number of active HTTP requests"))
        .unwrap();

    assert_eq!(
        reg.collect(),
        "# HELP active_requests Number of active HTTP requests\n\
         # TYPE active_requests gauge\n\
         active_requests 0\n"
    );
}

#[test]
fn histogram_renders_cumulative_buckets_in_label_order() {
    let reg = Registry::new();
    let hist = reg
        .register_histogram_vec(
            MetricOpts::new("http_request_duration_seconds", "Duration of HTTP requests in seconds")
                .labels(&["method", "route", "status"]),
            &[0.1, 1.0],
        )
        .unwrap();

    // Pair order does not matter; declared order does.
    hist.observe(&[("status", "200"), ("route", "/"), ("method", "GET")], 0.05);
    hist.observe(&[("method", "GET"), ("route", "/"), ("status", "200")], 0.5);

    let expected = "\
# HELP http_request_duration_seconds Duration of HTTP requests in seconds
# TYPE http_request_duration_seconds histogram
http_request_duration_seconds_bucket{method=\"GET\",route=\"/\",status=\"200\",le=\"0.1\"} 1
http_request_duration_seconds_bucket{method=\"GET\",route=\"/\",status=\"200\",le=\"1\"} 2
http_request_duration_seconds_bucket{method=\"GET\",route=\"/\",status=\"200\",le=\"+Inf\"} 2
http_request_duration_seconds_sum{method=\"GET\",route=\"/\",status=\"200\"} 0.55
http_request_duration_seconds_count{method=\"GET\",route=\"/\",status=\"200\"} 2
";
    assert_eq!(reg.collect(), expected);
}

#[test]
fn series_sorted_and_labels_escaped() {
    let reg = Registry::new();
    let counter = reg
        .register_counter_vec(MetricOpts::new("hits_total", "Hits.\nSecond line").labels(&["path"]))
        .unwrap();
    counter.inc(&[("path", "/z")]);
    counter.add(&[("path", "/a\"q\\")], 3);

    let out = reg.collect();
    assert!(out.contains("# HELP hits_total Hits.\\nSecond line\n"));
    let a = out.find("hits_total{path=\"/a\\\"q\\\\\"} 3").unwrap();
    let z = out.find("hits_total{path=\"/z\"} 1").unwrap();
    assert!(a < z);
    assert_eq!(counter.get(&[("path", "/z")]), 1);
}

#[test]
fn families_render_in_registration_order() {
    let reg = Registry::new();
    reg.register_gauge_vec(MetricOpts::new("b_metric", "second")).unwrap();
    reg.register_counter_vec(MetricOpts::new("a_metric", "first")).unwrap();

    let out = reg.collect();
    assert!(out.find("b_metric").unwrap() < out.find("a_metric").unwrap());
}

#[test]
fn process_collector_reports_start_time() {
    let reg = Registry::new();
    let process = Arc::new(ProcessCollector::new());
    let start = process.start_time();
    reg.register(process).unwrap();

    let out = reg.collect();
    assert!(out.contains("# TYPE process_start_time_seconds gauge\n"));
    assert!(out.contains(&format!("process_start_time_seconds {}\n", start)));
    #[cfg(target_os = "linux")]
    {
        assert!(out.contains("# TYPE process_cpu_seconds_total counter\n"));
        assert!(out.contains("# TYPE process_resident_memory_bytes gauge\n"));
        assert!(out.contains("# TYPE process_open_fds gauge\n"));
    }
}

#[test]
fn gauge_set_overrides_and_renders_per_series() {
    let reg = Registry::new();
    let gauge = reg
        .register_gauge_vec(MetricOpts::new("queue_depth", "Items waiting").labels(&["queue"]))
        .unwrap();

    gauge.inc(&[("queue", "a")]);
    gauge.set(&[("queue", "a")], 7.5);
    gauge.set(&[("queue", "b")], -2.0);
    gauge.dec(&[("queue", "b")]);

    assert_eq!(gauge.get(&[("queue", "a")]), 7.5);
    assert_eq!(gauge.get(&[("queue", "b")]), -3.0);
    assert_eq!(gauge.get(&[("queue", "never")]), 0.0);
    assert_eq!(
        reg.collect(),
        "# HELP queue_depth Items waiting\n\
         # TYPE queue_depth gauge\n\
         queue_depth{queue=\"a\"} 7.5\n\
         queue_depth{queue=\"b\"} -3\n"
    );
}
