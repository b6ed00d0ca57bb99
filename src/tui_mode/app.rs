use fastcalc::config::{KeyBindings, KeySpec};
use fastcalc::history::History;
use fastcalc::localization::Localization;
use fastcalc::session::{self, Command, Evaluation};
use log::warn;
use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Calculator,
    Help,
    Log,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Calculator, Tab::Help, Tab::Log];

    pub fn title(self, texts: &Localization) -> &str {
        match self {
            Tab::Calculator => texts.text("main.tabs.calculator", "Calculator"),
            Tab::Help => texts.text("main.tabs.help", "Help"),
            Tab::Log => texts.text("main.tabs.about", "History"),
        }
    }

    pub fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }
}

pub struct Theme {
    pub title: Option<Color>,
    pub accent: Option<Color>,
}

/// Configurable shell keys, parsed once.
#[derive(Debug, Clone, Copy)]
pub struct KeyMap {
    pub quit: KeySpec,
    pub clear_input: KeySpec,
}

impl KeyMap {
    pub fn from_config(keys: &KeyBindings) -> Self {
        KeyMap {
            quit: keys.quit(),
            clear_input: keys.clear_input(),
        }
    }
}

pub struct App {
    pub input: String,
    pub cursor_position: usize,
    pub input_scroll: usize,
    pub entries: Vec<Evaluation>,
    pub cursor_history: usize,
    pub should_quit: bool,
    pub tab: Tab,
    pub help_scroll: usize,
    pub log_scroll: usize,
    pub list_height: usize,
    pub item_start_indices: Vec<usize>,
    pub history_scroll: usize,
    pub scroll_to_bottom: bool,
    pub terminal_too_small: bool,
    pub history: Option<History>,
    pub theme: Theme,
    pub keys: KeyMap,
    pub texts: Localization,
}

impl App {
    pub fn new(history: Option<History>, theme: Theme, keys: KeyMap, texts: Localization) -> Self {
        App {
            input: String::new(),
            cursor_position: 0,
            input_scroll: 0,
            entries: Vec::new(),
            cursor_history: 0,
            should_quit: false,
            tab: Tab::Calculator,
            help_scroll: 0,
            log_scroll: 0,
            list_height: 5,
            item_start_indices: Vec::new(),
            history_scroll: 0,
            scroll_to_bottom: false,
            terminal_too_small: false,
            history,
            theme,
            keys,
            texts,
        }
    }

    pub fn adjust_input_scroll(&mut self, visible_width: usize) {
        let total_chars = self.input.chars().count();
        let cursor_pos = self.cursor_position;

        if cursor_pos < self.input_scroll {
            self.input_scroll = cursor_pos;
        }
        else if cursor_pos >= self.input_scroll + visible_width {
            self.input_scroll = cursor_pos - visible_width + 1;
        }

        if self.input_scroll > total_chars.saturating_sub(visible_width) {
            self.input_scroll = total_chars.saturating_sub(visible_width);
        }
    }

    pub fn submit(&mut self) {
        let input = self.input.clone();

        match session::parse_command(&input) {
            Command::Empty => return,
            Command::Quit => {
                self.should_quit = true;
                return;
            }
            Command::Clear => {
                self.entries.clear();
                self.cursor_history = 0;
                self.history_scroll = 0;
                self.clear_input();
                return;
            }
            Command::ClearHistory => {
                if let Some(history) = self.history.as_mut() {
                    history.clear();
                }
                self.tab = Tab::Log;
                self.log_scroll = 0;
                self.clear_input();
                return;
            }
            Command::Help => {
                self.tab = Tab::Help;
                self.help_scroll = 0;
                self.clear_input();
                return;
            }
            Command::Evaluate { expression, detailed } => {
                let evaluation = session::evaluate(expression, detailed);
                if let Some(history) = self.history.as_mut() {
                    history.record(&evaluation.input, &evaluation.result);
                }
                self.entries.push(evaluation);
            }
        }

        self.cursor_history = self.entries.len().saturating_sub(1);
        self.tab = Tab::Calculator;
        self.clear_input();
        self.scroll_to_bottom = true;
    }

    pub fn save_history(&self) {
        if let Some(history) = &self.history {
            if let Err(e) = history.save() {
                warn!("could not save history: {:#}", e);
            }
        }
    }

    pub fn log_entries(&self) -> &[String] {
        self.history.as_ref().map(History::entries).unwrap_or(&[])
    }

    pub fn move_cursor(&mut self, direction: i32) {
        match direction {
            -1 => self.cursor_position = self.cursor_position.saturating_sub(1),
            1 => self.cursor_position = (self.cursor_position + 1).min(self.input.chars().count()),
            _ => {}
        }
    }

    pub fn move_cursor_by_words(&mut self, direction: i32) {
        let input_chars: Vec<char> = self.input.chars().collect();
        let mut pos = self.cursor_position;

        if direction < 0 {
            while pos > 0 && !is_word_char(input_chars[pos - 1]) {
                pos -= 1;
            }
            while pos > 0 && is_word_char(input_chars[pos - 1]) {
                pos -= 1;
            }
        } else {
            let len = input_chars.len();
            while pos < len && is_word_char(input_chars[pos]) {
                pos += 1;
            }
            while pos < len && !is_word_char(input_chars[pos]) {
                pos += 1;
            }
        }

        self.cursor_position = pos;
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_idx = App::char_index_to_byte_index(&self.input, self.cursor_position);
        self.input.insert(byte_idx, c);
        self.cursor_position += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            self.delete_at_cursor();
        }
    }

    pub fn delete_at_cursor(&mut self) {
        let byte_idx = App::char_index_to_byte_index(&self.input, self.cursor_position);
        if let Some(c) = self.input[byte_idx..].chars().next() {
            self.input.drain(byte_idx..byte_idx + c.len_utf8());
        }
    }

    pub fn navigate_history(&mut self, direction: i32) {
        if direction < 0 && self.cursor_history > 0 {
            self.cursor_history -= 1;
        } else if direction > 0 && self.cursor_history < self.entries.len().saturating_sub(1) {
            self.cursor_history += 1;
        }

        if self.cursor_history < self.entries.len() {
            self.input = self.entries[self.cursor_history].input.clone();
        } else {
            self.input.clear();
        }
        self.cursor_position = self.input.chars().count();
        self.input_scroll = 0;
        self.scroll_to_bottom = false;
    }

    pub fn scroll_history(&mut self, direction: i32) {
        let step = self.list_height.saturating_sub(1);
        if direction < 0 {
            self.cursor_history = self.cursor_history.saturating_sub(step);
        } else {
            self.cursor_history = self.cursor_history.saturating_add(step)
                .min(self.entries.len().saturating_sub(1));
        }

        if self.cursor_history < self.entries.len() {
            self.input = self.entries[self.cursor_history].input.clone();
        }
        self.cursor_position = self.input.chars().count();
        self.input_scroll = 0;
        self.scroll_to_bottom = false;
    }

    /// Scrolls whatever the current tab shows.
    pub fn scroll_view(&mut self, delta: isize) {
        let target = match self.tab {
            Tab::Calculator => &mut self.history_scroll,
            Tab::Help => &mut self.help_scroll,
            Tab::Log => &mut self.log_scroll,
        };
        *target = target.saturating_add_signed(delta);
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor_position = 0;
        self.input_scroll = 0;
    }

    pub fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
        s.char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or_else(|| s.len())
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '.'
}
