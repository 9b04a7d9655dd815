//! Direct-message notifications after a successful post.
//!
//! The notification client is an external collaborator behind the
//! [`Notifier`] trait. Fan-out is deliberately slow: one call per recipient
//! with a fixed pause in between, respecting platform rate limits. A failed
//! recipient is logged and skipped; the rest of the list still gets the
//! message.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("recipient not found: {0}")]
    UnknownRecipient(String),
    #[error("send failed: {0}")]
    Send(String),
}

/// Direct-message client seam.
pub trait Notifier {
    fn send_direct(&mut self, recipient: &str, message: &str) -> Result<(), NotifyError>;
}

/// Per-recipient delivery result.
#[derive(Debug)]
pub struct Delivery {
    pub recipient: String,
    pub result: Result<(), NotifyError>,
}

/// Send `message` to every recipient in order, pausing `delay` between
/// calls.
///
/// Failures do not abort the remaining recipients; each outcome lands in
/// the returned list. The delay also follows a failure, since a rejected
/// call still counts against rate limits.
pub fn notify_all(
    notifier: &mut dyn Notifier,
    recipients: &[String],
    message: &str,
    delay: Duration,
) -> Vec<Delivery> {
    let mut deliveries = Vec::with_capacity(recipients.len());
    for (i, recipient) in recipients.iter().enumerate() {
        let result = notifier.send_direct(recipient, message);
        match &result {
            Ok(()) => tracing::info!(recipient = %recipient, "direct message sent"),
            Err(e) => tracing::warn!(recipient = %recipient, error = %e, "direct message failed"),
        }
        deliveries.push(Delivery {
            recipient: recipient.clone(),
            result,
        });
        if i + 1 < recipients.len() {
            std::thread::sleep(delay);
        }
    }
    deliveries
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Notifier that records sends and fails for scripted recipients.
    #[derive(Default)]
    pub struct MockNotifier {
        pub sent: Vec<(String, String)>,
        pub fail_for: Vec<String>,
    }

    impl Notifier for MockNotifier {
        fn send_direct(&mut self, recipient: &str, message: &str) -> Result<(), NotifyError> {
            self.sent.push((recipient.to_string(), message.to_string()));
            if self.fail_for.iter().any(|r| r == recipient) {
                Err(NotifyError::Send("scripted failure".into()))
            } else {
                Ok(())
            }
        }
    }

    fn recipients(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn notifies_every_recipient_in_order() {
        let mut notifier = MockNotifier::default();
        let deliveries = notify_all(
            &mut notifier,
            &recipients(&["ana", "bo", "cy"]),
            "new post!",
            Duration::ZERO,
        );

        assert_eq!(deliveries.len(), 3);
        assert!(deliveries.iter().all(|d| d.result.is_ok()));
        let order: Vec<&str> = notifier.sent.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(order, vec!["ana", "bo", "cy"]);
        assert!(notifier.sent.iter().all(|(_, m)| m == "new post!"));
    }

    #[test]
    fn failure_does_not_abort_remaining_recipients() {
        let mut notifier = MockNotifier {
            fail_for: vec!["bo".to_string()],
            ..Default::default()
        };
        let deliveries = notify_all(
            &mut notifier,
            &recipients(&["ana", "bo", "cy"]),
            "hi",
            Duration::ZERO,
        );

        assert_eq!(notifier.sent.len(), 3);
        assert!(deliveries[0].result.is_ok());
        assert!(deliveries[1].result.is_err());
        assert!(deliveries[2].result.is_ok());
    }

    #[test]
    fn empty_recipient_list_is_a_no_op() {
        let mut notifier = MockNotifier::default();
        let deliveries = notify_all(&mut notifier, &[], "hi", Duration::ZERO);
        assert!(deliveries.is_empty());
        assert!(notifier.sent.is_empty());
    }
}
