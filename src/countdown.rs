//! Countdown widget state.
//!
//! Holds the entered duration, the remaining seconds and the active/paused
//! flags, and owns the one periodic tick that drives the countdown. Every
//! transition ends in `reconcile()`, which makes sure exactly one tick is live
//! while running and none otherwise.

/// Something that can deliver a tick every second until its handle is dropped.
///
/// Each tick must carry the `generation` it was scheduled with so the widget
/// can tell ticks of a canceled schedule apart from the live one.
pub trait TickSource {
  type Handle;

  fn every_second(&self, generation: u64) -> Self::Handle;
}

/// Parse the duration input. Empty, non-numeric and zero all read as "no duration".
pub fn parse_duration(text: &str) -> Option<i64> {
  match text.trim().parse::<i64>() {
    Ok(0) | Err(_) => None,
    Ok(secs) => Some(secs),
  }
}

/// `MM:SS`; minutes keep growing past two digits instead of rolling into hours.
pub fn format_time(secs: u64) -> String {
  format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub struct Countdown<S: TickSource> {
  duration: Option<i64>,
  time_left: u64,
  is_active: bool,
  is_paused: bool,
  ticks: S,
  generation: u64,
  interval: Option<S::Handle>,
}

impl<S: TickSource> Countdown<S> {
  pub fn new(ticks: S) -> Self {
    Self {
      duration: None,
      time_left: 0,
      is_active: false,
      is_paused: false,
      ticks,
      generation: 0,
      interval: None,
    }
  }

  pub fn duration(&self) -> Option<i64> {
    self.duration
  }

  pub fn time_left(&self) -> u64 {
    self.time_left
  }

  pub fn is_active(&self) -> bool {
    self.is_active
  }

  pub fn is_paused(&self) -> bool {
    self.is_paused
  }

  pub fn is_running(&self) -> bool {
    self.is_active && !self.is_paused
  }

  pub fn start_label(&self) -> &'static str {
    if self.is_paused { "Resume" } else { "Start" }
  }

  pub fn display(&self) -> String {
    format_time(self.time_left)
  }

  /// Input change handler. Only records the value; nothing is applied until Set or Reset.
  pub fn set_input(&mut self, text: &str) {
    self.duration = parse_duration(text);
  }

  pub fn set_duration(&mut self) -> bool {
    let secs = match self.duration {
      Some(secs) if secs > 0 => secs as u64,
      other => {
        debug!("Ignoring set with duration {:?}", other);
        return false;
      }
    };
    self.time_left = secs;
    self.is_active = false;
    self.is_paused = false;
    self.reconcile();
    info!("Duration set to {} seconds", secs);
    true
  }

  pub fn start(&mut self) -> bool {
    if self.time_left == 0 {
      debug!("Ignoring start with nothing left");
      return false;
    }
    let resumed = self.is_paused;
    self.is_active = true;
    self.is_paused = false;
    self.reconcile();
    info!("{} at {}", if resumed { "Resumed" } else { "Started" }, self.display());
    true
  }

  pub fn pause(&mut self) -> bool {
    if !self.is_active {
      debug!("Ignoring pause while inactive");
      return false;
    }
    self.is_paused = true;
    self.is_active = false;
    self.reconcile();
    info!("Paused at {}", self.display());
    true
  }

  pub fn reset(&mut self) {
    self.is_active = false;
    self.is_paused = false;
    self.time_left = self.duration.map_or(0, |secs| u64::try_from(secs).unwrap_or(0));
    self.reconcile();
    info!("Reset to {}", self.display());
  }

  /// Apply one tick. Returns false when the tick belongs to a canceled schedule.
  pub fn tick(&mut self, generation: u64) -> bool {
    if self.interval.is_none() || generation != self.generation {
      trace!("Dropping stale tick {} (current {})", generation, self.generation);
      return false;
    }
    if self.time_left <= 1 {
      self.time_left = 0;
      self.is_active = false;
      self.reconcile();
      info!("Countdown finished");
    } else {
      self.time_left -= 1;
    }
    true
  }

  fn reconcile(&mut self) {
    if self.is_running() && self.interval.is_some() {
      return;
    }
    if self.interval.take().is_some() {
      trace!("Canceled tick schedule {}", self.generation);
    }
    if self.is_running() {
      self.generation += 1;
      self.interval = Some(self.ticks.every_second(self.generation));
      trace!("Scheduled tick schedule {}", self.generation);
    }
  }
}
