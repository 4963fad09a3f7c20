//! Request method classification and response status bucketing.
//!
//! Both are total: every input maps somewhere, nothing errors.

/// Method categories that get their own timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Head,
    Delete,
    Other,
}

impl RequestMethod {
    pub const ALL: [RequestMethod; 6] = [
        RequestMethod::Get,
        RequestMethod::Post,
        RequestMethod::Put,
        RequestMethod::Head,
        RequestMethod::Delete,
        RequestMethod::Other,
    ];

    /// Case-insensitive; anything unrecognized (including "") is `Other`.
    pub fn classify(method: &str) -> Self {
        if method.eq_ignore_ascii_case("GET") {
            RequestMethod::Get
        } else if method.eq_ignore_ascii_case("POST") {
            RequestMethod::Post
        } else if method.eq_ignore_ascii_case("PUT") {
            RequestMethod::Put
        } else if method.eq_ignore_ascii_case("HEAD") {
            RequestMethod::Head
        } else if method.eq_ignore_ascii_case("DELETE") {
            RequestMethod::Delete
        } else {
            RequestMethod::Other
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn metric_label(self) -> &'static str {
        match self {
            RequestMethod::Get => "get-requests",
            RequestMethod::Post => "post-requests",
            RequestMethod::Put => "put-requests",
            RequestMethod::Head => "head-requests",
            RequestMethod::Delete => "delete-requests",
            RequestMethod::Other => "other-requests",
        }
    }
}

/// Response status classes. Discriminants are the meter index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseBucket {
    Informational = 0,
    Success = 1,
    Redirection = 2,
    ClientError = 3,
    ServerError = 4,
    Unknown = 5,
}

impl ResponseBucket {
    pub const ALL: [ResponseBucket; 6] = [
        ResponseBucket::Informational,
        ResponseBucket::Success,
        ResponseBucket::Redirection,
        ResponseBucket::ClientError,
        ResponseBucket::ServerError,
        ResponseBucket::Unknown,
    ];

    /// `status / 100` in 1..=5 picks that class; everything else is `Unknown`.
    pub fn of(status: i32) -> Self {
        match status / 100 {
            1 => ResponseBucket::Informational,
            2 => ResponseBucket::Success,
            3 => ResponseBucket::Redirection,
            4 => ResponseBucket::ClientError,
            5 => ResponseBucket::ServerError,
            _ => ResponseBucket::Unknown,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn metric_label(self) -> &'static str {
        match self {
            ResponseBucket::Informational => "1xx-responses",
            ResponseBucket::Success => "2xx-responses",
            ResponseBucket::Redirection => "3xx-responses",
            ResponseBucket::ClientError => "4xx-responses",
            ResponseBucket::ServerError => "5xx-responses",
            ResponseBucket::Unknown => "unknown-responses",
        }
    }

    /// Short class tag used in ratio gauge labels (`4xx`).
    pub fn class(self) -> &'static str {
        match self {
            ResponseBucket::Informational => "1xx",
            ResponseBucket::Success => "2xx",
            ResponseBucket::Redirection => "3xx",
            ResponseBucket::ClientError => "4xx",
            ResponseBucket::ServerError => "5xx",
            ResponseBucket::Unknown => "unknown",
        }
    }
}
