use color_eyre::eyre::{eyre, Result};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{prelude::*, widgets::*};
use strum::EnumIs;
use tui_big_text::BigText;

use crate::config::Settings;
use crate::countdown::{Countdown, TickSource};
use crate::tui::{Event, Tui};
use crate::APP_VERSION;

const INPUT_PLACEHOLDER: &str = "Enter duration (sec)";
const MAX_INPUT_LEN: usize = 10;               // Keeps the value inside i64
const BIG_GLYPH_WIDTH: u16 = 8;                // Columns per big-text character

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, EnumIs)]
enum AppState {
  #[default]
  Running,
  Quitting,
}

/// Which control Enter presses.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, EnumIs)]
enum Focus {
  #[default]
  Input,
  Set,
  Start,
  Pause,
  Reset,
}

impl Focus {
  fn next(self) -> Self {
    match self {
      Focus::Input => Focus::Set,
      Focus::Set => Focus::Start,
      Focus::Start => Focus::Pause,
      Focus::Pause => Focus::Reset,
      Focus::Reset => Focus::Input,
    }
  }

  fn prev(self) -> Self {
    match self {
      Focus::Input => Focus::Reset,
      Focus::Set => Focus::Input,
      Focus::Start => Focus::Set,
      Focus::Pause => Focus::Start,
      Focus::Reset => Focus::Pause,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Message {
  Digit(char),
  Erase,
  SetDuration,
  Start,
  Pause,
  Reset,
  FocusNext,
  FocusPrev,
  Press,
  Tick(u64),
  Redraw,
  Quit,
}

pub struct CountdownApp<S: TickSource> {
  state: AppState,
  focus: Focus,
  input: String,
  countdown: Countdown<S>,
  settings: Settings,
}

impl<S: TickSource> CountdownApp<S> {
  pub fn new(countdown: Countdown<S>, settings: Settings) -> Self {
    let mut app = Self {
      state: Default::default(),
      focus: Default::default(),
      input: String::new(),
      countdown,
      settings,
    };
    if let Some(secs) = settings.duration {
      app.input = secs.to_string();
      app.countdown.set_input(&app.input);
    }
    app
  }

  pub async fn run(&mut self, tui: &mut Tui) -> Result<()> {
    while !self.state.is_quitting() {
      tui.draw(|f| self.ui(f))?;
      let event = tui.next().await.ok_or(eyre!("Unable to get event"))?; // blocks until next event
      let message = self.handle_event(event)?;
      self.update(message)?;
    }
    Ok(())
  }

  // Event handler (keyboard, ticks, resize)
  fn handle_event(&self, event: Event) -> Result<Message> {
    let msg = match event {
      Event::Key(key) => {
        match key.code {
          KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Message::Quit,
          KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Message::Quit,
          KeyCode::Char(c) if c.is_ascii_digit() => Message::Digit(c),
          KeyCode::Backspace => Message::Erase,
          KeyCode::Char('s') | KeyCode::Char('S') => Message::SetDuration,
          KeyCode::Char(' ') => Message::Start,
          KeyCode::Char('p') | KeyCode::Char('P') => Message::Pause,
          KeyCode::Char('r') | KeyCode::Char('R') => Message::Reset,
          KeyCode::Tab | KeyCode::Right => Message::FocusNext,
          KeyCode::BackTab | KeyCode::Left => Message::FocusPrev,
          KeyCode::Enter => Message::Press,
          _ => Message::Redraw,
        }
      },
      Event::Tick(generation) => Message::Tick(generation),
      Event::Resize => Message::Redraw,
      Event::Error => {
        warn!("Terminal reported an event error");
        Message::Redraw
      }
    };
    Ok(msg)
  }

  fn update(&mut self, message: Message) -> Result<()> {
    match message {
      Message::Digit(c) => self.type_digit(c),
      Message::Erase => self.erase(),
      Message::SetDuration => { self.countdown.set_duration(); },
      Message::Start => { self.countdown.start(); },
      Message::Pause => { self.countdown.pause(); },
      Message::Reset => self.countdown.reset(),
      Message::FocusNext => self.focus = self.focus.next(),
      Message::FocusPrev => self.focus = self.focus.prev(),
      Message::Press => return self.update(self.pressed()),
      Message::Tick(generation) => { self.countdown.tick(generation); },
      Message::Redraw => {}
      Message::Quit => self.quit(),
    }
    Ok(())
  }

  fn pressed(&self) -> Message {
    match self.focus {
      Focus::Input | Focus::Set => Message::SetDuration,
      Focus::Start => Message::Start,
      Focus::Pause => Message::Pause,
      Focus::Reset => Message::Reset,
    }
  }

  fn type_digit(&mut self, c: char) {
    if self.input.len() >= MAX_INPUT_LEN { return };
    self.input.push(c);
    self.countdown.set_input(&self.input);
  }

  fn erase(&mut self) {
    self.input.pop();
    self.countdown.set_input(&self.input);
  }

  fn quit(&mut self) {
    info!("Quitting at {}", self.countdown.display());
    self.state = AppState::Quitting;
  }

  fn ui(&self, f: &mut Frame) {
    let layout = self.layout(f.size());
    f.render_widget(self.title_paragraph(), layout[0]);
    self.render_input_row(f, layout[1]);
    f.render_widget(self.timer_paragraph(), centered(layout[2], self.timer_width()));
    f.render_widget(self.button_paragraph(), layout[3]);
    f.render_widget(self.help_paragraph(), layout[4]);
  }

  fn layout(&self, area: Rect) -> Vec<Rect> {
    let layout = Layout::default()
      .direction(Direction::Vertical)
      .constraints(vec![
        Constraint::Length(2), // top bar
        Constraint::Length(3), // input and set
        Constraint::Length(9), // timer
        Constraint::Length(2), // buttons
        Constraint::Length(2), // help
      ])
      .split(area);
    layout.to_vec()
  }

  fn render_input_row(&self, f: &mut Frame, area: Rect) {
    let row = Layout::default()
      .direction(Direction::Horizontal)
      .constraints(vec![Constraint::Min(10), Constraint::Length(9)])
      .split(area);
    f.render_widget(self.input_paragraph(), row[0]);
    f.render_widget(
      Paragraph::new(Line::from(self.button("Set", Focus::Set))).block(Block::default().padding(Padding::new(1, 0, 1, 0))),
      row[1],
    );
    if self.focus.is_input() {
      f.set_cursor(row[0].x + 1 + self.input.len() as u16, row[0].y + 1);
    }
  }

  fn title_paragraph(&self) -> Paragraph<'_> {
    let title_text = Line::from(vec![APP_VERSION.into(), " - Countdown ".into(), "Timer".dim()]);
    Paragraph::new(title_text).gray()
  }

  fn input_paragraph(&self) -> Paragraph<'_> {
    let border = if self.focus.is_input() { Style::new().white() } else { Style::new().dark_gray() };
    let block = Block::default().borders(Borders::ALL).border_style(border).title("Duration");
    let text: Line = if self.input.is_empty() {
      INPUT_PLACEHOLDER.dim().into()
    } else {
      self.input.as_str().into()
    };
    Paragraph::new(text).block(block)
  }

  fn timer_paragraph(&self) -> BigText<'_> {
    let lines = vec![self.countdown.display().into()];
    tui_big_text::BigTextBuilder::default()
      .lines(lines)
      .style(self.timer_style())
      .build()
      .expect("BigText lines are always set")
  }

  fn timer_style(&self) -> Style {
    if !self.countdown.is_running() {
      return Style::new().gray();
    }
    let time_left = self.countdown.time_left();
    if time_left > self.settings.warn_at {
      Style::new().green()
    } else if time_left > self.settings.alert_at {
      Style::new().yellow()
    } else {
      Style::new().red()
    }
  }

  fn timer_width(&self) -> u16 {
    self.countdown.display().chars().count() as u16 * BIG_GLYPH_WIDTH
  }

  fn button(&self, label: &str, target: Focus) -> Span<'static> {
    let text = format!("[ {} ]", label);
    if self.focus == target { Span::styled(text, Style::new().reversed()) } else { Span::raw(text) }
  }

  fn button_line(&self) -> Line<'static> {
    Line::from(vec![
      self.button(self.countdown.start_label(), Focus::Start),
      "  ".into(),
      self.button("Pause", Focus::Pause),
      "  ".into(),
      self.button("Reset", Focus::Reset),
    ])
  }

  fn button_paragraph(&self) -> Paragraph<'static> {
    Paragraph::new(self.button_line()).alignment(Alignment::Center)
  }

  fn help_paragraph(&self) -> Paragraph<'_> {
    let start_action = if self.countdown.is_paused() { "resume" } else { "start" };
    let help_text =
      Line::from(vec!["0-9 ".into(), "duration".dim(), " : s ".into(), "set".dim(), " : space ".into(),
        start_action.dim(), " : p ".into(), "pause".dim(), " : r ".into(), "reset".dim(),
        " : tab ".into(), "focus".dim(), " : enter ".into(), "press".dim(), " : q ".into(), "quit".dim()]);
    Paragraph::new(help_text).gray()
  }
}

/// Horizontally centre a block of `width` columns inside `area`.
fn centered(area: Rect, width: u16) -> Rect {
  let width = width.min(area.width);
  Rect { x: area.x + (area.width - width) / 2, width, ..area }
}
