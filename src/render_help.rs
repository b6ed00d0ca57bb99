use fastcalc::config::KeySpec;
use fastcalc::localization::Localization;

pub struct HelpSection {
    pub id: &'static str,
    pub heading: &'static str,
    pub lines: &'static [&'static str],
}

/// English help, shared by both shells. A locale replaces a section through
/// `help.<id>.heading` and `help.<id>.lines`.
pub const HELP_SECTIONS: &[HelpSection] = &[
    HelpSection {
        id: "operators",
        heading: "Operators (loosest to tightest):",
        lines: &[
            "  + -    : Addition, subtraction     (e.g., 5 - 3 + 1 = 3)",
            "  * /    : Multiplication, division  (e.g., 2 + 3 * 4 = 14)",
            "  ^      : Power, right-assoc.       (e.g., 2 ^ 3 ^ 2 = 512)",
            "  -x +x  : Sign, binds tighter than ^ (e.g., -2 ^ 2 = 4)",
            "  x!     : Factorial, integers 0..170 (e.g., 5! = 120)",
            "  |x|    : Absolute value",
            "  ( )    : Grouping",
        ],
    },
    HelpSection {
        id: "numbers",
        heading: "Numbers:",
        lines: &[
            "  42, 3.14, .5  : Decimal literals",
            "  30'           : Degrees, converted to radians (sin(30') = 0.5)",
        ],
    },
    HelpSection {
        id: "functions",
        heading: "Functions (angles in radians):",
        lines: &[
            "  sin(x)  cos(x)  tan(x)",
            "  asin(x) acos(x) atan(x)",
            "  sqrt(x)   : Square root",
            "  ln(x)     : Natural logarithm",
            "  lg(x)     : Base-10 logarithm",
            "  abs(x)    : Absolute value",
            "  pow(x, y) : x to the power y",
            "  root(x, n): n-th root of x",
            "  log(x, b) : Logarithm of x in base b",
        ],
    },
    HelpSection {
        id: "constants",
        heading: "Constants:",
        lines: &[
            "  pi  : 3.14159...",
            "  e   : 2.71828...",
            "  phi : 1.61803...",
        ],
    },
    HelpSection {
        id: "commands",
        heading: "Commands:",
        lines: &[
            "  details <expression> : Show step-by-step evaluation with time",
            "  clear : Clear the results on screen",
            "  clear history : Erase the saved history",
            "  help  : Show this help",
            "  quit  : Exit the calculator",
        ],
    },
    HelpSection {
        id: "navigation",
        heading: "Navigation:",
        lines: &[
            "  ← → : Move cursor, Ctrl+←/→ by words",
            "  Home/End : Move to start/end of line",
            "  ↑ ↓ : Recall earlier expressions",
            "  PgUp/PgDn, mouse wheel : Scroll",
            "  Tab / F1 : Switch tabs, Esc : back to Calculator",
        ],
    },
];

const OUTPUT_NOTE: &str =
    "Results are shortened to 15 characters, in scientific notation if needed.";

pub fn output_note(texts: &Localization) -> &str {
    texts.text("help.output_note", OUTPUT_NOTE)
}

/// The help sections in the loaded locale. Navigation ends with the
/// configured quit and clear-input keys.
pub fn help_sections(
    texts: &Localization,
    quit: KeySpec,
    clear_input: KeySpec,
) -> Vec<(String, Vec<String>)> {
    HELP_SECTIONS
        .iter()
        .map(|section| {
            let heading = texts.text(&format!("help.{}.heading", section.id), section.heading);
            let mut lines: Vec<String> = texts
                .lines(&format!("help.{}.lines", section.id))
                .unwrap_or_else(|| section.lines.to_vec())
                .into_iter()
                .map(str::to_string)
                .collect();
            if section.id == "navigation" {
                lines.push(format!(
                    "  {} : {}, {} : {}",
                    clear_input,
                    texts.text("help.navigation.clear_input", "Clear input"),
                    quit,
                    texts.text("help.navigation.quit", "Quit"),
                ));
            }
            (heading.to_string(), lines)
        })
        .collect()
}

#[cfg(feature = "tui")]
pub use self::tui::render_help;

#[cfg(feature = "tui")]
mod tui {
    use super::{help_sections, output_note};
    use crate::tui_mode::app::App;
    use ratatui::{
        layout::{Alignment, Rect},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{Block, BorderType, Borders, Paragraph, Wrap},
        Frame,
    };

    pub fn render_help(frame: &mut Frame, app: &mut App, area: Rect) {
        let title_color = app.theme.title.unwrap_or(Color::Yellow);
        let accent = app.theme.accent.unwrap_or(Color::Cyan);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(title_color))
            .title(format!(" {} ", app.texts.text("main.tabs.help", "Help")))
            .title_alignment(Alignment::Center);

        let mut help_text = vec![
            Line::from(Span::styled(
                "fastcalc - single-line expression calculator",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            Line::from(output_note(&app.texts).to_string()),
        ];
        for (heading, lines) in help_sections(&app.texts, app.keys.quit, app.keys.clear_input) {
            help_text.push(Line::from(""));
            help_text.push(Line::from(Span::styled(
                heading,
                Style::default().fg(accent).add_modifier(Modifier::UNDERLINED),
            )));
            help_text.extend(lines.into_iter().map(Line::from));
        }

        let max_scroll = help_text.len().saturating_sub(area.height.saturating_sub(2) as usize);
        app.help_scroll = app.help_scroll.min(max_scroll);

        let paragraph = Paragraph::new(help_text)
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false })
            .scroll((app.help_scroll as u16, 0));

        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastcalc::config::parse_key;
    use std::fs;

    fn keys() -> (KeySpec, KeySpec) {
        (parse_key("ctrl+q").unwrap(), parse_key("ctrl+u").unwrap())
    }

    #[test]
    fn english_help_without_a_locale() {
        let texts = Localization::new("/nonexistent/fastcalc/lang");
        let (quit, clear) = keys();
        let sections = help_sections(&texts, quit, clear);

        assert_eq!(sections.len(), HELP_SECTIONS.len());
        assert_eq!(sections[0].0, "Operators (loosest to tightest):");
        let (_, navigation) = sections.last().unwrap();
        assert_eq!(navigation.last().unwrap(), "  Ctrl+U : Clear input, Ctrl+Q : Quit");
        assert!(output_note(&texts).contains("15 characters"));
    }

    #[test]
    fn locale_replaces_sections_it_defines() {
        let dir = std::env::temp_dir().join(format!("fastcalc-help-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("de.toml"),
            "[help.constants]\nheading = \"Konstanten:\"\nlines = [\"  pi\", \"  e\"]\n\n\
             [help.navigation]\nquit = \"Beenden\"\n",
        )
        .unwrap();

        let mut texts = Localization::new(&dir);
        assert!(texts.load_locale("de"));
        let (_, clear) = keys();
        let sections = help_sections(&texts, parse_key("esc").unwrap(), clear);

        let constants = &sections[3];
        assert_eq!(constants.0, "Konstanten:");
        assert_eq!(constants.1, ["  pi", "  e"]);
        assert_eq!(sections[0].0, "Operators (loosest to tightest):");
        let (_, navigation) = sections.last().unwrap();
        assert_eq!(navigation.last().unwrap(), "  Ctrl+U : Clear input, Esc : Beenden");
        let _ = fs::remove_dir_all(&dir);
    }
}
