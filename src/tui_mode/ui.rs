use super::app::{App, Tab};
use super::helpers::{highlight_functions, key_matches, wrap_text};
use crate::render_help::render_help;
use anyhow::Result;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use fastcalc::session::{display_value, format_with_spaces};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

const MIN_TERMINAL_WIDTH: u16 = 50;
const MIN_TERMINAL_HEIGHT: u16 = 14;

pub fn run_ui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if app.should_quit {
            break;
        }

        if crossterm::event::poll(Duration::from_millis(50))? {
            match crossterm::event::read()? {
                Event::Key(KeyEvent {
                    code,
                    modifiers,
                    kind: KeyEventKind::Press,
                    ..
                }) => handle_key_event(app, code, modifiers),
                Event::Mouse(event) => handle_mouse_event(app, event),
                _ => {}
            }
        }
    }
    Ok(())
}

fn handle_key_event(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);

    if key_matches(&app.keys.quit, code, modifiers) || (ctrl && code == KeyCode::Char('c')) {
        app.should_quit = true;
        return;
    }

    match code {
        KeyCode::Tab => {
            app.tab = app.tab.next();
            return;
        }
        KeyCode::F(1) => {
            app.tab = if app.tab == Tab::Help { Tab::Calculator } else { Tab::Help };
            return;
        }
        KeyCode::Esc => {
            app.tab = Tab::Calculator;
            return;
        }
        _ => {}
    }

    if app.tab != Tab::Calculator {
        match code {
            KeyCode::Down => app.scroll_view(1),
            KeyCode::Up => app.scroll_view(-1),
            KeyCode::PageDown => app.scroll_view(10),
            KeyCode::PageUp => app.scroll_view(-10),
            KeyCode::Home => app.scroll_view(isize::MIN),
            _ => {}
        }
        return;
    }

    if key_matches(&app.keys.clear_input, code, modifiers) {
        app.clear_input();
        return;
    }

    match code {
        KeyCode::Char(c) if !ctrl => app.insert_char(c),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete_at_cursor(),
        KeyCode::Left if ctrl => app.move_cursor_by_words(-1),
        KeyCode::Right if ctrl => app.move_cursor_by_words(1),
        KeyCode::Left => app.move_cursor(-1),
        KeyCode::Right => app.move_cursor(1),
        KeyCode::Home => {
            app.cursor_position = 0;
            app.input_scroll = 0;
        }
        KeyCode::End => app.cursor_position = app.input.chars().count(),
        KeyCode::Up => app.navigate_history(-1),
        KeyCode::Down => app.navigate_history(1),
        KeyCode::PageUp => app.scroll_history(-1),
        KeyCode::PageDown => app.scroll_history(1),
        KeyCode::Enter => app.submit(),
        _ => {}
    }
}

fn handle_mouse_event(app: &mut App, event: MouseEvent) {
    match event.kind {
        MouseEventKind::ScrollDown => app.scroll_view(3),
        MouseEventKind::ScrollUp => app.scroll_view(-3),
        _ => {}
    }
}

fn ui(frame: &mut Frame, app: &mut App) {
    let terminal_size = frame.size();

    app.terminal_too_small = terminal_size.width < MIN_TERMINAL_WIDTH ||
                             terminal_size.height < MIN_TERMINAL_HEIGHT;

    if app.terminal_too_small {
        render_resize_message(frame, terminal_size);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(terminal_size);

    render_tabs(frame, app, layout[0]);
    match app.tab {
        Tab::Calculator => {
            render_results(frame, app, layout[1]);
            app.list_height = layout[1].height.saturating_sub(2) as usize;
        }
        Tab::Help => render_help(frame, app, layout[1]),
        Tab::Log => render_log(frame, app, layout[1]),
    }
    render_status(frame, app, layout[2]);
    render_input(frame, app, layout[3]);
}

fn render_resize_message(frame: &mut Frame, area: Rect) {
    let message = format!(
        "Terminal too small! Min size: {}x{}. Current: {}x{}",
        MIN_TERMINAL_WIDTH,
        MIN_TERMINAL_HEIGHT,
        area.width,
        area.height
    );

    let text = vec![
        Line::from(Span::styled(
            message,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Please resize your terminal window",
            Style::default().fg(Color::Yellow)
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Resize Required ")
        .title_alignment(Alignment::Center);

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let title_color = app.theme.title.unwrap_or(Color::Yellow);
    let accent = app.theme.accent.unwrap_or(Color::Cyan);

    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|t| Line::from(t.title(&app.texts).to_string()))
        .collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(
                    format!(" {} ", app.texts.text("main.title", "fastcalc")),
                    Style::default().fg(title_color).add_modifier(Modifier::BOLD),
                ))
                .title_alignment(Alignment::Center),
        )
        .select(app.tab.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(accent).add_modifier(Modifier::BOLD));

    frame.render_widget(tabs, area);
}

fn detail_lines(text: String, wrap_width: usize, style: Style, items: &mut Vec<ListItem<'static>>) {
    for (idx, line) in wrap_text(&text, wrap_width).into_iter().enumerate() {
        let prefix = if idx == 0 { "    - " } else { "      " };
        let span = Span::styled(format!("{}{}", prefix, line), style);
        items.push(ListItem::new(Line::from(span)));
    }
}

fn render_results(frame: &mut Frame, app: &mut App, area: Rect) {
    let accent = app.theme.accent.unwrap_or(Color::Cyan);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Results ")
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    if app.entries.is_empty() {
        let message = app.texts.text(
            "main.results_empty",
            "No calculations yet. Enter an expression to see results here.",
        );
        let empty_msg = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty_msg, inner_area);
        return;
    }

    let mut items = Vec::new();
    app.item_start_indices.clear();

    let wrap_width = inner_area.width.saturating_sub(4) as usize;

    for (i, entry) in app.entries.iter().enumerate() {
        app.item_start_indices.push(items.len());

        let is_selected = i == app.cursor_history;
        let base_style = Style::default()
            .fg(if is_selected { Color::Yellow } else { accent });

        let input = format_with_spaces(&entry.input);
        let input_lines = wrap_text(&input, wrap_width);
        let last_line = input_lines.len().saturating_sub(1);

        for (line_idx, line) in input_lines.into_iter().enumerate() {
            let mut result_spans = vec![if line_idx == 0 {
                Span::styled("> ", Style::default().fg(Color::Green))
            } else {
                Span::raw("  ")
            }];
            result_spans.extend(highlight_functions(&line, base_style));

            if line_idx == last_line {
                result_spans.push(Span::styled(" = ", Style::default().fg(Color::Gray)));
                result_spans.push(match &entry.result {
                    Ok(val) => Span::styled(
                        val.clone(),
                        Style::default().fg(Color::LightMagenta).add_modifier(Modifier::BOLD),
                    ),
                    Err(e) => Span::styled(
                        format!("Error: {}", e),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                });
            }

            items.push(ListItem::new(Line::from(result_spans)));
        }

        if entry.detailed {
            for (j, step) in entry.steps.iter().enumerate() {
                let step_text = format!(
                    "Step {}: {} = {}",
                    j + 1,
                    step.operation,
                    display_value(step.result)
                );
                let style = Style::default().fg(Color::DarkGray);
                detail_lines(step_text, wrap_width, style, &mut items);
            }

            let time_str = format!("Time: {:.6} ms", entry.duration.as_secs_f64() * 1000.0);
            detail_lines(time_str, wrap_width, Style::default().fg(Color::Magenta), &mut items);
        }

        if i < app.entries.len() - 1 {
            let separator = Span::styled(
                "-".repeat(inner_area.width as usize),
                Style::default().fg(Color::DarkGray)
            );
            items.push(ListItem::new(Line::from(separator)));
        }
    }

    let max_scroll = items.len().saturating_sub(inner_area.height as usize);
    if app.scroll_to_bottom {
        app.history_scroll = max_scroll;
        app.scroll_to_bottom = false;
    }
    app.history_scroll = app.history_scroll.min(max_scroll);

    let selected_index = app.item_start_indices.get(app.cursor_history).copied();

    let list = List::new(items)
        .block(Block::default())
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let mut state = ListState::default()
        .with_selected(selected_index)
        .with_offset(app.history_scroll);

    frame.render_stateful_widget(list, inner_area, &mut state);
}

fn render_log(frame: &mut Frame, app: &mut App, area: Rect) {
    let title = match &app.history {
        Some(history) => format!(" {} ", history.path().display()),
        None => " History disabled ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title)
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let entries = app.log_entries();
    if entries.is_empty() {
        let empty_msg = Paragraph::new(app.texts.text("text_screen.empty", "History is empty."))
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty_msg, inner_area);
        return;
    }

    let items: Vec<ListItem> = entries
        .iter()
        .rev()
        .map(|entry| {
            let style = if entry.contains("= Error:") {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(entry.clone(), style)))
        })
        .collect();

    let max_scroll = items.len().saturating_sub(inner_area.height as usize);
    app.log_scroll = app.log_scroll.min(max_scroll);

    let mut state = ListState::default().with_offset(app.log_scroll);
    frame.render_stateful_widget(List::new(items), inner_area, &mut state);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let quit = (app.keys.quit.to_string(), "Quit");
    let keys: Vec<(String, &str)> = match app.tab {
        Tab::Calculator => vec![
            ("Enter".to_string(), "Calculate"),
            ("Up/Down".to_string(), "Recall"),
            ("PgUp/PgDn".to_string(), "Page"),
            ("Tab/F1".to_string(), "Tabs"),
            (app.keys.clear_input.to_string(), "Clear"),
            quit,
        ],
        Tab::Help | Tab::Log => vec![
            ("Up/Down".to_string(), "Scroll"),
            ("PgUp/PgDn".to_string(), "Page"),
            ("Tab".to_string(), "Next Tab"),
            ("Esc".to_string(), "Calculator"),
            quit,
        ],
    };
    let key_color = app.theme.title.unwrap_or(Color::Yellow);

    let spans: Vec<Span> = keys
        .into_iter()
        .flat_map(|(key, desc)| {
            vec![
                Span::styled(
                    key,
                    Style::default()
                        .fg(key_color)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {} ", desc),
                    Style::default().fg(Color::DarkGray),
                ),
            ]
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Expression ")
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let visible_width = (inner_area.width.saturating_sub(3)) as usize;
    let total_chars = app.input.chars().count();
    app.adjust_input_scroll(visible_width);

    let visible_input: String = app.input
        .chars()
        .skip(app.input_scroll)
        .take(visible_width)
        .collect();

    let mut line = vec![Span::styled("> ", Style::default().fg(Color::Green))];
    if app.input.is_empty() {
        line.push(Span::styled(
            app.texts.text("main.input_placeholder", "Enter expression...").to_string(),
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        line.extend(highlight_functions(&visible_input, Style::default()));
    }
    frame.render_widget(Paragraph::new(Line::from(line)), inner_area);

    if app.tab == Tab::Calculator {
        let visible_cursor = app.cursor_position.saturating_sub(app.input_scroll);
        let visible_prefix = visible_input.chars().take(visible_cursor).collect::<String>();
        let cursor_x = inner_area.x + 2 + visible_prefix.width() as u16;
        frame.set_cursor(cursor_x, inner_area.y);
    }

    let scroll_indicator_style = Style::default().fg(Color::DarkGray);

    if app.input_scroll > 0 {
        let left_indicator = Paragraph::new("<").style(scroll_indicator_style);
        frame.render_widget(left_indicator, Rect::new(inner_area.x, inner_area.y, 1, 1));
    }

    if total_chars > app.input_scroll + visible_width {
        let right_indicator = Paragraph::new(">").style(scroll_indicator_style);
        frame.render_widget(
            right_indicator,
            Rect::new(inner_area.x + inner_area.width - 1, inner_area.y, 1, 1),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui_mode::app::{KeyMap, Theme};
    use fastcalc::config::KeyBindings;
    use fastcalc::localization::Localization;

    fn app_with_keys(quit: &str, clear_input: &str) -> App {
        let keys = KeyBindings {
            quit: quit.to_string(),
            clear_input: clear_input.to_string(),
        };
        App::new(
            None,
            Theme {
                title: None,
                accent: None,
            },
            KeyMap::from_config(&keys),
            Localization::new("/nonexistent/fastcalc/lang"),
        )
    }

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        handle_key_event(app, code, modifiers);
    }

    #[test]
    fn default_keys() {
        let mut app = app_with_keys("ctrl+q", "ctrl+u");
        press(&mut app, KeyCode::Char('7'), KeyModifiers::NONE);
        press(&mut app, KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert!(app.input.is_empty());

        press(&mut app, KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }

    #[test]
    fn rebound_keys() {
        let mut app = app_with_keys("f10", "alt+x");
        press(&mut app, KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Char('4'), KeyModifiers::NONE);
        press(&mut app, KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert_eq!(app.input, "4");
        press(&mut app, KeyCode::Char('x'), KeyModifiers::ALT);
        assert!(app.input.is_empty());

        press(&mut app, KeyCode::F(10), KeyModifiers::NONE);
        assert!(app.should_quit);
    }

    #[test]
    fn ctrl_c_always_quits() {
        let mut app = app_with_keys("f10", "alt+x");
        press(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }
}
