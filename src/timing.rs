use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// ADC settle time per active channel.
///
/// The unit round-robins its converter over all enabled channels, so the
/// time until a channel reading can be trusted grows linearly with the
/// number of active channels.
pub const CONVERSION_TIME_PER_CHANNEL: Duration = Duration::from_millis(750);

/// Earliest instant at which the next reading of a channel is trustworthy.
pub(crate) fn conversion_deadline(last_query: Instant, active_channels: usize) -> Instant {
    last_query + CONVERSION_TIME_PER_CHANNEL * active_channels as u32
}

/// Block until `deadline` has passed or `cancel` fires.
///
/// Parks the task on the timer wheel instead of polling the clock.
pub(crate) async fn wait_until(deadline: Instant, cancel: &CancellationToken) -> Result<()> {
    if deadline <= Instant::now() {
        return Ok(());
    }
    tokio::select! {
        _ = cancel.cancelled() => Err(Error::Cancelled),
        _ = tokio::time::sleep_until(deadline) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_grows_with_active_channels() {
        let t0 = Instant::now();
        let one = conversion_deadline(t0, 1);
        let two = conversion_deadline(t0, 2);
        assert_eq!(one - t0, Duration::from_millis(750));
        assert_eq!(two - t0, Duration::from_millis(1500));
        assert!(two > one);
    }

    #[test]
    fn test_deadline_with_no_active_channels() {
        let t0 = Instant::now();
        assert_eq!(conversion_deadline(t0, 0), t0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_blocks_until_deadline() {
        let t0 = Instant::now();
        let deadline = conversion_deadline(t0, 2);
        wait_until(deadline, &CancellationToken::new())
            .await
            .unwrap();
        assert!(Instant::now() - t0 >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_immediately_past_deadline() {
        let t0 = Instant::now();
        tokio::time::advance(Duration::from_secs(2)).await;
        let before = Instant::now();
        wait_until(conversion_deadline(t0, 1), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_is_cancellable() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let deadline = conversion_deadline(Instant::now(), 4);
        assert!(matches!(
            wait_until(deadline, &cancel).await,
            Err(Error::Cancelled)
        ));
    }
}
