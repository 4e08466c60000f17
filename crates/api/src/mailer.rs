use crate::error::AppError;

/// Outbound mail is an external collaborator: callers only need a
/// synchronous success/failure. The default implementation logs the message
/// instead of speaking SMTP.
pub trait Mailer: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError>;
}

pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        tracing::info!(to, subject, body, "outbound email");
        Ok(())
    }
}
