//! User configuration stored as TOML in the platform config directory.
//!
//! ```toml
//! locale = "en"
//!
//! [colors]
//! title = "yellow"
//! accent = "#00afff"
//!
//! [history]
//! limit = 1000
//!
//! [keys]
//! quit = "ctrl+q"
//! clear_input = "ctrl+u"
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "fastcalc";
const CONFIG_FILE: &str = "config.toml";

/// `<config dir>/fastcalc`, or `./fastcalc` when the platform has none.
pub fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub colors: Colors,
    pub history: HistoryConfig,
    pub keys: KeyBindings,
    #[serde(skip)]
    malformed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Colors {
    pub title: String,
    pub accent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub limit: usize,
}

/// Shell actions bound to a key, written as `ctrl+q`, `alt+x`, `f2`, `esc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub quit: String,
    pub clear_input: String,
}

impl Default for Colors {
    fn default() -> Self {
        Colors {
            title: "yellow".to_string(),
            accent: "cyan".to_string(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            path: None,
            limit: 1000,
        }
    }
}

const DEFAULT_QUIT_KEY: &str = "ctrl+q";
const DEFAULT_CLEAR_INPUT_KEY: &str = "ctrl+u";

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            quit: DEFAULT_QUIT_KEY.to_string(),
            clear_input: DEFAULT_CLEAR_INPUT_KEY.to_string(),
        }
    }
}

impl KeyBindings {
    pub fn quit(&self) -> KeySpec {
        binding("quit", &self.quit, DEFAULT_QUIT_KEY)
    }

    pub fn clear_input(&self) -> KeySpec {
        binding("clear_input", &self.clear_input, DEFAULT_CLEAR_INPUT_KEY)
    }
}

fn binding(action: &str, value: &str, default: &str) -> KeySpec {
    parse_key(value)
        .or_else(|| {
            warn!("unknown key {:?} for {}, using {}", value, action, default);
            parse_key(default)
        })
        .unwrap_or(KeySpec {
            ctrl: false,
            alt: false,
            key: KeyName::Esc,
        })
}

impl Config {
    pub fn default_path() -> PathBuf {
        app_dir().join(CONFIG_FILE)
    }

    /// Reads `path`. A missing file gives the defaults; so does a file that
    /// fails to parse, after a warning.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        match toml::from_str(&text) {
            Ok(config) => {
                debug!("loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) => {
                warn!("ignoring malformed config {}: {}", path.display(), e);
                Ok(Config {
                    malformed: true,
                    ..Config::default()
                })
            }
        }
    }

    /// True when this config replaced a file that failed to parse.
    pub fn is_malformed(&self) -> bool {
        self.malformed
    }

    /// Writes every setting, defaults included. A config that replaced a
    /// malformed file leaves that file alone.
    pub fn save(&self, path: &Path) -> Result<()> {
        if self.malformed {
            warn!("not overwriting malformed config {}", path.display());
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating directory {}", parent.display()))?;
            }
        }
        let text = toml::to_string_pretty(self).context("serializing config")?;
        fs::write(path, text).with_context(|| format!("writing config {}", path.display()))?;
        debug!("saved config to {}", path.display());
        Ok(())
    }

    pub fn history_path(&self) -> PathBuf {
        self.history
            .path
            .clone()
            .unwrap_or_else(crate::history::History::default_path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyName {
    Char(char),
    F(u8),
    Esc,
    Tab,
    Enter,
    Backspace,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub ctrl: bool,
    pub alt: bool,
    pub key: KeyName,
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.alt {
            write!(f, "Alt+")?;
        }
        match self.key {
            KeyName::Char(' ') => write!(f, "Space"),
            KeyName::Char(c) => write!(f, "{}", c.to_uppercase()),
            KeyName::F(n) => write!(f, "F{}", n),
            KeyName::Esc => write!(f, "Esc"),
            KeyName::Tab => write!(f, "Tab"),
            KeyName::Enter => write!(f, "Enter"),
            KeyName::Backspace => write!(f, "Backspace"),
            KeyName::Delete => write!(f, "Delete"),
        }
    }
}

/// Parses `ctrl+q`, `Alt+Backspace`, `f5`, `esc`. Letters are lowercased.
pub fn parse_key(value: &str) -> Option<KeySpec> {
    let lower = value.trim().to_lowercase();
    let mut parts: Vec<&str> = lower.split('+').map(str::trim).collect();
    // `ctrl++` binds the plus key
    if lower.ends_with("++") {
        parts.truncate(parts.len().saturating_sub(2));
        parts.push("+");
    }
    let (name, modifiers) = parts.split_last()?;

    let mut spec = KeySpec {
        ctrl: false,
        alt: false,
        key: parse_key_name(name)?,
    };
    for modifier in modifiers {
        match *modifier {
            "ctrl" | "control" => spec.ctrl = true,
            "alt" => spec.alt = true,
            _ => return None,
        }
    }
    Some(spec)
}

fn parse_key_name(name: &str) -> Option<KeyName> {
    let key = match name {
        "esc" | "escape" => KeyName::Esc,
        "tab" => KeyName::Tab,
        "enter" | "return" => KeyName::Enter,
        "backspace" => KeyName::Backspace,
        "delete" | "del" => KeyName::Delete,
        "space" => KeyName::Char(' '),
        _ => {
            let mut chars = name.chars();
            match (chars.next()?, chars.next()) {
                (c, None) => KeyName::Char(c),
                ('f', Some(_)) => match name[1..].parse() {
                    Ok(n @ 1..=12) => KeyName::F(n),
                    _ => return None,
                },
                _ => return None,
            }
        }
    };
    Some(key)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpec {
    Named(NamedColor),
    Rgb(u8, u8, u8),
}

/// Parses a color name or `#rrggbb`. `default`, empty and unknown values
/// give `None`, meaning the terminal's own color.
pub fn parse_color(value: &str) -> Option<ColorSpec> {
    let lower = value.trim().to_lowercase();
    let named = match lower.as_str() {
        "black" => NamedColor::Black,
        "red" => NamedColor::Red,
        "green" => NamedColor::Green,
        "yellow" => NamedColor::Yellow,
        "blue" => NamedColor::Blue,
        "magenta" => NamedColor::Magenta,
        "cyan" => NamedColor::Cyan,
        "white" => NamedColor::White,
        "gray" | "grey" => NamedColor::Gray,
        _ => return parse_hex(&lower),
    };
    Some(ColorSpec::Named(named))
}

fn parse_hex(value: &str) -> Option<ColorSpec> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let component = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(ColorSpec::Rgb(component(0)?, component(2)?, component(4)?))
}
