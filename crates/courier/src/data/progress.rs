/// Which way the instrumented bytes are flowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Request body, local to remote.
    Upload,
    /// Response body, remote to local.
    Download,
}

/// Snapshot of a transfer, handed to every progress handler.
///
/// `current` never decreases within one transfer. `total` is `None` when
/// the source does not expose a length (piped multipart bodies, responses
/// without a `Content-Length`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Bytes that have passed through the instrumented stream so far.
    pub current: u64,

    /// Expected size of the stream, if known up front.
    pub total: Option<u64>,

    pub direction: Direction,
}

impl Progress {
    pub fn new(total: Option<u64>, direction: Direction) -> Self {
        Self {
            current: 0,
            total,
            direction,
        }
    }

    /// Percentage of completion, `None` if `total` is unknown.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        self.total.map(|total| {
            if total == 0 {
                100.0
            } else {
                (self.current as f64 / total as f64) * 100.0
            }
        })
    }

    /// Returns `true` once `current` has reached a known `total`.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total.is_some_and(|total| self.current >= total)
    }
}
