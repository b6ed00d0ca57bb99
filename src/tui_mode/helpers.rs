use fastcalc::calc_engine::functions::is_known_name;
use crossterm::event::{KeyCode, KeyModifiers};
use fastcalc::config::{parse_color, ColorSpec, KeyName, KeySpec, NamedColor};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec!["".to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();

        if word_width > width {
            let mut remaining = word;
            while !remaining.is_empty() {
                let mut chunk = String::new();
                let mut chunk_width = 0;
                let mut chunk_byte_len = 0;

                for c in remaining.chars() {
                    let char_width = UnicodeWidthChar::width(c).unwrap_or(1);
                    if chunk_width + char_width > width && !chunk.is_empty() {
                        break;
                    }
                    chunk.push(c);
                    chunk_width += char_width;
                    chunk_byte_len += c.len_utf8();
                }

                if !current_line.is_empty() {
                    lines.push(std::mem::take(&mut current_line));
                    current_width = 0;
                }

                lines.push(chunk);
                remaining = &remaining[chunk_byte_len..];
            }
            continue;
        }

        if current_width + word_width + 1 > width && !current_line.is_empty() {
            lines.push(std::mem::take(&mut current_line));
            current_width = 0;
        }

        if !current_line.is_empty() {
            current_line.push(' ');
            current_width += 1;
        }

        current_line.push_str(word);
        current_width += word_width;
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}

/// Maps a configured color onto the terminal palette. `None` keeps the
/// terminal default.
pub fn theme_color(value: &str) -> Option<Color> {
    let color = match parse_color(value)? {
        ColorSpec::Rgb(r, g, b) => Color::Rgb(r, g, b),
        ColorSpec::Named(named) => match named {
            NamedColor::Black => Color::Black,
            NamedColor::Red => Color::Red,
            NamedColor::Green => Color::Green,
            NamedColor::Yellow => Color::Yellow,
            NamedColor::Blue => Color::Blue,
            NamedColor::Magenta => Color::Magenta,
            NamedColor::Cyan => Color::Cyan,
            NamedColor::White => Color::White,
            NamedColor::Gray => Color::Gray,
        },
    };
    Some(color)
}

/// Whether a key press is the configured binding. Shift is ignored, so
/// `ctrl+q` also matches Ctrl+Shift+Q.
pub fn key_matches(spec: &KeySpec, code: KeyCode, modifiers: KeyModifiers) -> bool {
    if spec.ctrl != modifiers.contains(KeyModifiers::CONTROL)
        || spec.alt != modifiers.contains(KeyModifiers::ALT)
    {
        return false;
    }

    match (spec.key, code) {
        (KeyName::Char(expected), KeyCode::Char(c)) => c.to_lowercase().eq(expected.to_lowercase()),
        (KeyName::F(expected), KeyCode::F(n)) => expected == n,
        (KeyName::Esc, KeyCode::Esc)
        | (KeyName::Tab, KeyCode::Tab)
        | (KeyName::Enter, KeyCode::Enter)
        | (KeyName::Backspace, KeyCode::Backspace)
        | (KeyName::Delete, KeyCode::Delete) => true,
        _ => false,
    }
}

fn is_operator(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '^' | '!' | '|')
}

pub fn highlight_functions(expr: &str, base_style: Style) -> Vec<Span<'static>> {
    let function_style = Style::default()
        .fg(Color::LightBlue)
        .add_modifier(Modifier::BOLD);

    let operator_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let number_style = Style::default()
        .fg(Color::LightGreen);

    let name_style = |name: &str| {
        if is_known_name(name) {
            function_style
        } else {
            base_style
        }
    };

    let mut spans = Vec::new();
    let mut current = String::new();
    let mut in_name = false;
    let mut in_number = false;

    for c in expr.chars() {
        if c.is_alphabetic() {
            if in_number {
                spans.push(Span::styled(std::mem::take(&mut current), number_style));
                in_number = false;
            }
            current.push(c);
            in_name = true;
        } else if c.is_ascii_digit() || c == '.' || (in_number && c == '\'') {
            if in_name {
                let style = name_style(&current);
                spans.push(Span::styled(std::mem::take(&mut current), style));
                in_name = false;
            }
            current.push(c);
            in_number = true;
        } else {
            if in_name {
                let style = name_style(&current);
                spans.push(Span::styled(std::mem::take(&mut current), style));
                in_name = false;
            } else if in_number {
                spans.push(Span::styled(std::mem::take(&mut current), number_style));
                in_number = false;
            }

            if is_operator(c) {
                spans.push(Span::styled(c.to_string(), operator_style));
            } else if c == ' ' {
                spans.push(Span::raw(" "));
            } else {
                spans.push(Span::styled(c.to_string(), base_style));
            }
        }
    }

    if in_name {
        let style = name_style(&current);
        spans.push(Span::styled(current, style));
    } else if in_number {
        spans.push(Span::styled(current, number_style));
    }

    spans
}
