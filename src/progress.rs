/// Receives progress updates from long-running calls.
///
/// `total` is `None` while the amount of work is still unknown (discovery).
/// Reporters only observe; they have no influence on results.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, current: usize, total: Option<usize>, message: &str);
}

impl<F> ProgressReporter for F
where
    F: Fn(usize, Option<usize>, &str) + Send + Sync,
{
    fn report(&self, current: usize, total: Option<usize>, message: &str) {
        self(current, total, message)
    }
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn report(&self, _current: usize, _total: Option<usize>, _message: &str) {}
}
