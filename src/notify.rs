use std::fmt;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for NoticeSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NoticeSeverity::Info => "info",
            NoticeSeverity::Warning => "warning",
            NoticeSeverity::Error => "error",
        };
        f.write_str(label)
    }
}

/// Fire-and-forget notification sink. Background tasks report failures here
/// because their caller has already returned; nothing is awaited and no
/// result is consumed.
pub trait Notifier: Send + Sync {
    fn notify(&self, severity: NoticeSeverity, message: &str);
}

/// Default sink: forwards notices to the tracing pipeline.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, severity: NoticeSeverity, message: &str) {
        match severity {
            NoticeSeverity::Info => tracing::info!(%message, "notice"),
            NoticeSeverity::Warning => tracing::warn!(%message, "notice"),
            NoticeSeverity::Error => tracing::error!(%message, "notice"),
        }
    }
}
