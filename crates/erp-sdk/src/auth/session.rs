//! Observable "logged in" flag

use tokio::sync::watch;
use tracing::info;

/// Process-wide view of whether a session is active
///
/// Cloning yields a handle to the same flag. Readers either poll
/// [`SessionSignal::is_logged_in`] or [`SessionSignal::subscribe`] to be
/// woken on every transition.
#[derive(Debug, Clone)]
pub struct SessionSignal {
    sender: watch::Sender<bool>,
}

impl SessionSignal {
    pub fn new(logged_in: bool) -> Self {
        let (sender, _) = watch::channel(logged_in);
        Self { sender }
    }

    pub fn is_logged_in(&self) -> bool {
        *self.sender.borrow()
    }

    /// Set the flag. Subscribers are only notified when the value changes.
    pub fn set_logged_in(&self, logged_in: bool) {
        let changed = self.sender.send_if_modified(|current| {
            if *current == logged_in {
                return false;
            }
            *current = logged_in;
            true
        });
        if changed {
            info!(logged_in, "Session state changed");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

impl Default for SessionSignal {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_clones_share_state() {
        let signal = SessionSignal::default();
        let other = signal.clone();
        assert!(!other.is_logged_in());

        signal.set_logged_in(true);
        assert!(other.is_logged_in());
    }

    #[tokio::test]
    async fn test_subscriber_sees_logout() {
        let signal = SessionSignal::new(true);
        let mut rx = signal.subscribe();

        let waiter = tokio::spawn(async move {
            rx.wait_for(|logged_in| !*logged_in).await.map(|_| ())
        });

        signal.set_logged_in(false);
        let result = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("subscriber was not notified");
        assert!(result.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_unchanged_value_does_not_notify() {
        let signal = SessionSignal::new(true);
        let mut rx = signal.subscribe();
        rx.borrow_and_update();

        signal.set_logged_in(true);
        assert!(!rx.has_changed().unwrap());

        signal.set_logged_in(false);
        assert!(rx.has_changed().unwrap());
    }
}
