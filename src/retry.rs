/// Whether a failed delivery attempt is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Retryable,
    Terminal,
}

/// Classify a delivery outcome by its HTTP status code.
///
/// `None` means no response was obtained at all (connection refused, timeout,
/// protocol fault); those are always worth retrying since the remote never
/// saw the payload.
///
/// ## Retryable:
/// - No response obtained
/// - 5xx server errors
/// - 429 rate limiting
///
/// ## Terminal:
/// - Every other status: the remote answered and rejected the payload, so
///   repeating the same request cannot change the outcome. This includes
///   unexpected 2xx/3xx statuses and 4xx client errors other than 429.
pub fn classify(status: Option<u16>) -> Disposition {
    match status {
        None => Disposition::Retryable,
        Some(status) if status >= 500 => Disposition::Retryable,
        Some(429) => Disposition::Retryable,
        Some(_) => Disposition::Terminal,
    }
}
