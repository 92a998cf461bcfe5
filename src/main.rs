/////////////////////
/// Countdown timer for the terminal.
///
/// Type a number of seconds, set it, and count it down in big digits.
/// - digits edit the duration, 's' sets it
/// - 'space' starts, or resumes after a pause
/// - 'p' pauses
/// - 'r' resets to the entered duration
/// - 'tab' moves focus between controls, 'enter' presses the focused one
///
pub const APP_VERSION: &str = "COUNTDOWN V0.1.0";
pub const TICK_INTERVAL_MS: u64 = 1000;       // Countdown tick interval in millisecs
const LOG_FILE_NAME: &str = "countdown.log";

use std::fs::File;
use std::time::Duration;
#[macro_use] extern crate log;
extern crate simplelog;
use simplelog::*;
#[macro_use]
extern crate ini;

use color_eyre::eyre::Result;
use build_time::build_time_local;

mod app;
mod config;
mod countdown;
mod ticker;
mod tui;

use app::CountdownApp;
use config::{Settings, CONF_FILE_NAME};
use countdown::Countdown;
use ticker::IntervalTicks;
use tui::Tui;

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;
  init_logging();
  info!("Logging for {} initialized (tick interval: {}ms)", APP_VERSION, TICK_INTERVAL_MS);

  let settings = Settings::load(CONF_FILE_NAME);

  let mut tui = Tui::new()?;
  let ticks = IntervalTicks::new(tui.sender(), Duration::from_millis(TICK_INTERVAL_MS));
  let mut app = CountdownApp::new(Countdown::new(ticks), settings);

  tui.enter()?;
  let outcome = app.run(&mut tui).await;
  drop(app);
  tui.exit()?;
  outcome?;

  println!("Thanks for using {} (built: {})\n", APP_VERSION, build_time_local!("%Y-%b-%d at %H:%M:%S"));
  Ok(())
}

fn init_logging() {
  let mut loggers: Vec<Box<dyn SharedLogger>> = vec![
    TermLogger::new(LevelFilter::Warn, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
  ];
  match File::create(LOG_FILE_NAME) {
    Ok(log_file) => loggers.push(WriteLogger::new(LevelFilter::Info, Config::default(), log_file)),
    Err(e) => {
      eprintln!("Warning: Could not create log file: {}", e);
      eprintln!("Continuing with terminal logging only.");
    }
  }

  if let Err(e) = CombinedLogger::init(loggers) {
    eprintln!("Warning: Could not initialize logger: {}", e);
  }
}
