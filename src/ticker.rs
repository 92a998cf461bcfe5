//! tokio-backed tick source. One task per schedule, stopped by dropping its handle.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::countdown::TickSource;
use crate::tui::Event;

pub struct IntervalTicks {
  event_tx: UnboundedSender<Event>,
  period: Duration,
}

impl IntervalTicks {
  pub fn new(event_tx: UnboundedSender<Event>, period: Duration) -> Self {
    Self { event_tx, period }
  }
}

/// Cancels the schedule's task when dropped.
pub struct IntervalHandle {
  _guard: DropGuard,
}

impl TickSource for IntervalTicks {
  type Handle = IntervalHandle;

  fn every_second(&self, generation: u64) -> IntervalHandle {
    let cancellation_token = CancellationToken::new();
    let cancelled = cancellation_token.clone();
    let event_tx = self.event_tx.clone();
    let period = self.period;
    tokio::spawn(async move {
      // First tick one full period out, like a browser interval.
      let mut interval = interval_at(Instant::now() + period, period);
      loop {
        tokio::select! {
          biased;
          _ = cancelled.cancelled() => {
            break;
          }
          _ = interval.tick() => {
            if let Err(e) = event_tx.send(Event::Tick(generation)) {
              error!("Failed to send tick {}: {}", generation, e);
              break;
            }
          }
        }
      }
    });
    IntervalHandle { _guard: cancellation_token.drop_guard() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::sync::mpsc::unbounded_channel;

  #[tokio::test(start_paused = true)]
  async fn test_first_tick_after_one_period() {
    let (event_tx, mut event_rx) = unbounded_channel();
    let ticks = IntervalTicks::new(event_tx, Duration::from_secs(1));
    let started = Instant::now();
    let _handle = ticks.every_second(7);

    let event = event_rx.recv().await;
    assert!(matches!(event, Some(Event::Tick(7))));
    assert!(started.elapsed() >= Duration::from_secs(1));

    let event = event_rx.recv().await;
    assert!(matches!(event, Some(Event::Tick(7))));
    assert!(started.elapsed() >= Duration::from_secs(2));
  }

  #[tokio::test(start_paused = true)]
  async fn test_drop_stops_ticks() {
    let (event_tx, mut event_rx) = unbounded_channel();
    let ticks = IntervalTicks::new(event_tx, Duration::from_secs(1));
    let handle = ticks.every_second(1);
    drop(handle);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(event_rx.try_recv().is_err());
  }

  #[tokio::test(start_paused = true)]
  async fn test_replaced_schedule_goes_quiet() {
    let (event_tx, mut event_rx) = unbounded_channel();
    let ticks = IntervalTicks::new(event_tx, Duration::from_secs(1));
    let first = ticks.every_second(1);
    assert!(matches!(event_rx.recv().await, Some(Event::Tick(1))));

    drop(first);
    let _second = ticks.every_second(2);
    for _ in 0..3 {
      assert!(matches!(event_rx.recv().await, Some(Event::Tick(2))));
    }
  }
}
