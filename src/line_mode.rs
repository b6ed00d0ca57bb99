use crate::render_help::{help_sections, output_note};
use anyhow::{Context, Result};
use fastcalc::config::{Config, KeyName, KeySpec};
use fastcalc::history::History;
use fastcalc::localization::Localization;
use fastcalc::session::{self, display_value, format_with_spaces, Command};
use std::io::{stdin, stdout, Write};
use termion::{
    clear::CurrentLine as ClearLine,
    cursor::Left,
    event::Key,
    input::TermRead,
    raw::IntoRawMode,
};
use unicode_width::UnicodeWidthStr;

const PROMPT: &str = "Expression: ";

// Позиция символа -> байтовая позиция
fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or_else(|| s.len())
}

/// Raw mode needs an explicit carriage return on every line.
fn print_raw(out: &mut impl Write, text: &str) -> Result<()> {
    for line in text.split('\n') {
        write!(out, "{}\r\n", line)?;
    }
    out.flush()?;
    Ok(())
}

/// Whether a termion key is the configured binding. Termion reports Ctrl or
/// Alt only together with a character.
fn key_matches(spec: &KeySpec, key: &Key) -> bool {
    match (spec.ctrl, spec.alt, spec.key, key) {
        (true, false, KeyName::Char(c), &Key::Ctrl(k)) => k.to_ascii_lowercase() == c,
        (false, true, KeyName::Char(c), &Key::Alt(k)) => k.to_ascii_lowercase() == c,
        (false, false, KeyName::Char(c), &Key::Char(k)) => k == c,
        (false, false, KeyName::Tab, &Key::Char('\t')) => true,
        (false, false, KeyName::Enter, &Key::Char('\n')) => true,
        (false, false, KeyName::F(n), &Key::F(k)) => n == k,
        (false, false, KeyName::Esc, &Key::Esc)
        | (false, false, KeyName::Backspace, &Key::Backspace)
        | (false, false, KeyName::Delete, &Key::Delete) => true,
        _ => false,
    }
}

struct Shell<'a> {
    texts: &'a Localization,
    quit: KeySpec,
    clear_input: KeySpec,
}

impl Shell<'_> {
    fn print_help(&self, out: &mut impl Write) -> Result<()> {
        print_raw(out, output_note(self.texts))?;
        for (heading, lines) in help_sections(self.texts, self.quit, self.clear_input) {
            print_raw(out, &format!("\n{}", heading))?;
            for line in lines {
                print_raw(out, &line)?;
            }
        }
        print_raw(out, "")
    }
}

pub fn run_line(config: &Config, texts: &Localization, mut history: Option<History>) -> Result<()> {
    let shell = Shell {
        texts,
        quit: config.keys.quit(),
        clear_input: config.keys.clear_input(),
    };
    let result = edit_loop(&shell, &mut history);
    if let Some(history) = &history {
        history.save()?;
    }
    result
}

fn edit_loop(shell: &Shell, history: &mut Option<History>) -> Result<()> {
    let mut stdout = stdout().into_raw_mode().context("switching terminal to raw mode")?;
    print_raw(&mut stdout, "fastcalc console calculator")?;
    print_raw(&mut stdout, "Operators: + - * / ^ ! |x|, functions sin, sqrt, log(x, b) ...")?;
    print_raw(
        &mut stdout,
        "Commands: 'help', 'clear', 'quit'; add 'details' for step-by-step evaluation\n",
    )?;

    let mut recall: Vec<String> = Vec::new();
    let stdin = stdin();
    let mut keys = stdin.keys();

    loop {
        let mut expression = String::new();
        let mut cursor_pos = 0; // позиция курсора в символах
        let mut recall_index = recall.len();

        loop {
            let tail: String = expression.chars().skip(cursor_pos).collect();
            write!(stdout, "\r{}{}{}", ClearLine, PROMPT, expression)?;
            if tail.width() > 0 {
                write!(stdout, "{}", Left(tail.width() as u16))?;
            }
            stdout.flush()?;

            let Some(key) = keys.next() else {
                print_raw(&mut stdout, "")?;
                return Ok(());
            };

            let key = key?;
            if key_matches(&shell.quit, &key) || matches!(key, Key::Ctrl('c') | Key::Ctrl('d')) {
                print_raw(&mut stdout, "\nGoodbye!")?;
                return Ok(());
            }
            if key_matches(&shell.clear_input, &key) {
                expression.clear();
                cursor_pos = 0;
                continue;
            }

            match key {
                Key::Char('\n') => break,
                Key::Char(c) => {
                    let byte_idx = char_index_to_byte_index(&expression, cursor_pos);
                    expression.insert(byte_idx, c);
                    cursor_pos += 1;
                }
                Key::Backspace if cursor_pos > 0 => {
                    cursor_pos -= 1;
                    let byte_idx = char_index_to_byte_index(&expression, cursor_pos);
                    if let Some(c) = expression[byte_idx..].chars().next() {
                        expression.drain(byte_idx..byte_idx + c.len_utf8());
                    }
                }
                Key::Delete if cursor_pos < expression.chars().count() => {
                    let byte_idx = char_index_to_byte_index(&expression, cursor_pos);
                    if let Some(c) = expression[byte_idx..].chars().next() {
                        expression.drain(byte_idx..byte_idx + c.len_utf8());
                    }
                }
                Key::Left if cursor_pos > 0 => cursor_pos -= 1,
                Key::Right if cursor_pos < expression.chars().count() => cursor_pos += 1,
                Key::Home => cursor_pos = 0,
                Key::End => cursor_pos = expression.chars().count(),
                Key::Up if recall_index > 0 => {
                    recall_index -= 1;
                    expression = recall[recall_index].clone();
                    cursor_pos = expression.chars().count();
                }
                Key::Down => {
                    if recall_index + 1 < recall.len() {
                        recall_index += 1;
                        expression = recall[recall_index].clone();
                    } else {
                        recall_index = recall.len();
                        expression.clear();
                    }
                    cursor_pos = expression.chars().count();
                }
                _ => {}
            }
        }
        print_raw(&mut stdout, "")?;

        let input = expression.trim().to_string();
        let evaluation = match session::parse_command(&input) {
            Command::Empty => continue,
            Command::Quit => {
                print_raw(&mut stdout, "Goodbye!")?;
                return Ok(());
            }
            Command::Clear => {
                recall.clear();
                print_raw(&mut stdout, "Screen history cleared\n")?;
                continue;
            }
            Command::ClearHistory => {
                let message = match history.as_mut() {
                    Some(history) => {
                        history.clear();
                        "History cleared\n"
                    }
                    None => "History is disabled\n",
                };
                print_raw(&mut stdout, message)?;
                continue;
            }
            Command::Help => {
                shell.print_help(&mut stdout)?;
                continue;
            }
            Command::Evaluate { expression, detailed } => session::evaluate(expression, detailed),
        };

        recall.push(input.clone());
        if let Some(history) = history.as_mut() {
            history.record(&evaluation.input, &evaluation.result);
        }

        let formatted_expr = format_with_spaces(&evaluation.input);
        match &evaluation.result {
            Ok(value) => print_raw(&mut stdout, &format!("  {} = {}", formatted_expr, value))?,
            Err(e) => print_raw(&mut stdout, &format!("  {} = Error: {}", formatted_expr, e))?,
        }

        if evaluation.detailed {
            if !evaluation.steps.is_empty() {
                print_raw(&mut stdout, "\n  Step-by-step evaluation:")?;
            }
            for (i, step) in evaluation.steps.iter().enumerate() {
                let value = display_value(step.result);
                let line = format!("  Step {}: {} = {}", i + 1, step.operation, value);
                print_raw(&mut stdout, &line)?;
            }
            let time = format!("  Time: {:.6} ms", evaluation.duration.as_secs_f64() * 1000.0);
            print_raw(&mut stdout, &time)?;
        }
        print_raw(&mut stdout, "")?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastcalc::config::parse_key;

    #[test]
    fn configured_keys_match_termion_keys() {
        let quit = parse_key("ctrl+q").unwrap();
        assert!(key_matches(&quit, &Key::Ctrl('q')));
        assert!(!key_matches(&quit, &Key::Char('q')));
        assert!(!key_matches(&quit, &Key::Alt('q')));

        let clear = parse_key("alt+x").unwrap();
        assert!(key_matches(&clear, &Key::Alt('x')));
        assert!(!key_matches(&clear, &Key::Ctrl('x')));

        assert!(key_matches(&parse_key("esc").unwrap(), &Key::Esc));
        assert!(key_matches(&parse_key("f4").unwrap(), &Key::F(4)));
        assert!(key_matches(&parse_key("tab").unwrap(), &Key::Char('\t')));
        assert!(!key_matches(&parse_key("ctrl+f4").unwrap(), &Key::F(4)));
    }

    #[test]
    fn help_goes_through_the_raw_writer() {
        let texts = Localization::new("/nonexistent/fastcalc/lang");
        let shell = Shell {
            texts: &texts,
            quit: parse_key("ctrl+q").unwrap(),
            clear_input: parse_key("ctrl+u").unwrap(),
        };
        let mut out = Vec::new();
        shell.print_help(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Commands:\r\n"));
        assert!(text.contains("  clear history : Erase the saved history\r\n"));
        assert!(text.contains("  Ctrl+U : Clear input, Ctrl+Q : Quit\r\n"));
        assert!(!text.replace("\r\n", "").contains('\n'));
    }
}
