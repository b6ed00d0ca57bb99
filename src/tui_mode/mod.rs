pub mod app;
mod ui;
mod helpers;

use anyhow::{Context, Result};
use app::{App, KeyMap, Theme};
use crossterm::{
    cursor::{SetCursorStyle, Show},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use fastcalc::config::Config;
use fastcalc::history::History;
use fastcalc::localization::Localization;
use helpers::theme_color;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

/// Runs the full-screen calculator until the user quits. History is saved on
/// the way out, even when the UI loop fails.
pub fn run_tui(config: &Config, texts: Localization, history: Option<History>) -> Result<()> {
    let theme = Theme {
        title: theme_color(&config.colors.title),
        accent: theme_color(&config.colors.accent),
    };
    let keys = KeyMap::from_config(&config.keys);
    let mut app = App::new(history, theme, keys, texts);

    let mut terminal = setup_terminal().context("initialising terminal")?;
    let outcome = ui::run_ui_loop(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;

    app.save_history();
    outcome
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetCursorStyle::BlinkingBar)?;
    Terminal::new(CrosstermBackend::new(stdout)).map_err(Into::into)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        Show,
        SetCursorStyle::DefaultUserShape
    )?;
    Ok(())
}
