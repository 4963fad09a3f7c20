//! Method classification and status bucketing.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use respmeter_core::{RequestMethod, ResponseBucket};

#[test]
fn classify_is_case_insensitive() {
    for m in ["get", "Get", "GET", "gEt"] {
        assert_eq!(RequestMethod::classify(m), RequestMethod::Get);
    }
    assert_eq!(RequestMethod::classify("post"), RequestMethod::Post);
    assert_eq!(RequestMethod::classify("Put"), RequestMethod::Put);
    assert_eq!(RequestMethod::classify("HEAD"), RequestMethod::Head);
    assert_eq!(RequestMethod::classify("delete"), RequestMethod::Delete);
}

#[test]
fn unknown_methods_are_other() {
    for m in ["", "PATCH", "OPTIONS", "TRACE", "GETS", " GET", "POSTGET"] {
        assert_eq!(RequestMethod::classify(m), RequestMethod::Other, "{m:?}");
    }
}

#[test]
fn method_labels_are_distinct() {
    let mut labels: Vec<_> = RequestMethod::ALL.iter().map(|m| m.metric_label()).collect();
    labels.sort();
    labels.dedup();
    assert_eq!(labels.len(), 6);
}

#[test]
fn bucket_follows_hundreds_digit_in_range() {
    for status in 100..=599 {
        let bucket = ResponseBucket::of(status);
        assert_eq!(bucket.index() as i32, status / 100 - 1, "status {status}");
    }
}

#[test]
fn bucket_is_total_over_out_of_range_input() {
    for status in [i32::MIN, -500, -100, -1, 0, 1, 99, 600, 601, 999, 1000, i32::MAX] {
        assert_eq!(ResponseBucket::of(status), ResponseBucket::Unknown, "status {status}");
        assert_eq!(ResponseBucket::of(status).index(), 5);
    }
}

#[test]
fn bucket_edges() {
    assert_eq!(ResponseBucket::of(100), ResponseBucket::Informational);
    assert_eq!(ResponseBucket::of(199), ResponseBucket::Informational);
    assert_eq!(ResponseBucket::of(200), ResponseBucket::Success);
    assert_eq!(ResponseBucket::of(302), ResponseBucket::Redirection);
    assert_eq!(ResponseBucket::of(404), ResponseBucket::ClientError);
    assert_eq!(ResponseBucket::of(599), ResponseBucket::ServerError);
    assert_eq!(ResponseBucket::of(600).metric_label(), "unknown-responses");
}
