//! Translated interface text.
//!
//! A locale is either `<lang dir>/<code>.toml` or a directory
//! `<lang dir>/<code>/` whose `.toml` files are merged. Tables are flattened
//! into dotted keys, array elements get their index as the last segment:
//!
//! ```toml
//! [main.tabs]
//! calculator = "Rechner"
//!
//! [help.commands]
//! lines = ["  quit : Beenden"]   # help.commands.lines.0
//! ```
//!
//! Every lookup carries its English text, used when no locale is loaded or
//! the key is missing.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

const LANG_DIR: &str = "lang";
const LOCALE_VARS: [&str; 4] = ["LC_ALL", "LC_MESSAGES", "LANG", "LANGUAGE"];

pub struct Localization {
    dir: PathBuf,
    current: Option<String>,
    texts: HashMap<String, String>,
}

impl Localization {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Localization {
            dir: dir.into(),
            current: None,
            texts: HashMap::new(),
        }
    }

    /// `<config dir>/fastcalc/lang`.
    pub fn default_dir() -> PathBuf {
        crate::config::app_dir().join(LANG_DIR)
    }

    pub fn current_locale(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Locale codes found in the language directory, sorted.
    pub fn available_locales(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut locales: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let path = entry.path();
                if path.is_dir() {
                    path.file_name()?.to_str().map(str::to_string)
                } else if is_toml(&path) {
                    path.file_stem()?.to_str().map(str::to_string)
                } else {
                    None
                }
            })
            .collect();
        locales.sort();
        locales.dedup();
        locales
    }

    /// Replaces the loaded texts with locale `code`. Returns `false`, keeping
    /// the previous texts, when the locale is missing or yields no text.
    pub fn load_locale(&mut self, code: &str) -> bool {
        let mut path = self.dir.join(code);
        if !path.exists() {
            path = self.dir.join(format!("{}.toml", code));
            if !path.exists() {
                return false;
            }
        }

        let texts = read_locale_path(&path);
        if texts.is_empty() {
            debug!("locale {} at {} has no texts", code, path.display());
            return false;
        }

        debug!("loaded {} texts for locale {}", texts.len(), code);
        self.current = Some(code.to_string());
        self.texts = texts;
        true
    }

    /// Loads the current locale if one is set, else the one matching the
    /// system locale, else the first available one that loads.
    pub fn load(&mut self) {
        self.load_with(system_locale(|var| std::env::var(var).ok()))
    }

    fn load_with(&mut self, system: Option<String>) {
        let locales = self.available_locales();

        if self.current.is_none() {
            self.current =
                system.and_then(|requested| choose_matching_locale(&locales, &requested));
        }

        if let Some(code) = self.current.clone() {
            if self.load_locale(&code) {
                return;
            }
        }

        for code in &locales {
            if Some(code.as_str()) != self.current.as_deref() && self.load_locale(code) {
                return;
            }
        }

        self.current = None;
        self.texts.clear();
    }

    /// Applies the configured locale, falling back to detection when it is
    /// unset or cannot be loaded.
    pub fn select(&mut self, configured: Option<&str>) {
        if let Some(code) = configured.filter(|c| !c.is_empty()) {
            if self.load_locale(code) {
                return;
            }
            warn!("locale {} not found in {}", code, self.dir.display());
        }
        self.load();
    }

    pub fn text<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.texts.get(key).map(String::as_str).unwrap_or(default)
    }

    /// The flattened array under `key` (`key.0`, `key.1`, ...), or `None`
    /// when the locale does not define it.
    pub fn lines(&self, key: &str) -> Option<Vec<&str>> {
        let lines: Vec<&str> = (0..)
            .map_while(|i| self.texts.get(&format!("{}.{}", key, i)))
            .map(String::as_str)
            .collect();
        (!lines.is_empty()).then_some(lines)
    }
}

fn is_toml(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

fn read_locale_path(path: &Path) -> HashMap<String, String> {
    let mut texts = HashMap::new();
    if path.is_dir() {
        let mut files = Vec::new();
        collect_toml_files(path, &mut files);
        files.sort();
        for file in files {
            read_locale_file(&file, &mut texts);
        }
    } else if path.is_file() {
        read_locale_file(path, &mut texts);
    }
    texts
}

fn collect_toml_files(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for path in entries.filter_map(Result::ok).map(|entry| entry.path()) {
        if path.is_dir() {
            collect_toml_files(&path, files);
        } else if is_toml(&path) {
            files.push(path);
        }
    }
}

fn read_locale_file(path: &Path, texts: &mut HashMap<String, String>) {
    let table = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| text.parse::<toml::Table>().map_err(|e| e.to_string()));
    match table {
        Ok(table) => flatten_table(&table, "", texts),
        Err(e) => warn!("skipping locale file {}: {}", path.display(), e),
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn flatten_table(table: &toml::Table, prefix: &str, out: &mut HashMap<String, String>) {
    for (key, value) in table {
        flatten_value(value, join_key(prefix, key), out);
    }
}

fn flatten_value(value: &toml::Value, key: String, out: &mut HashMap<String, String>) {
    use toml::Value;

    let text = match value {
        Value::Table(table) => return flatten_table(table, &key, out),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_value(item, join_key(&key, &i.to_string()), out);
            }
            return;
        }
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(d) => d.to_string(),
    };
    out.insert(key, text);
}

/// Lowercases a locale code and drops its encoding and modifier:
/// `ru_RU.UTF-8` and `ru-RU` both become `ru_ru`. `C`, `POSIX` and blank
/// codes give `None`.
pub fn normalize_locale_code(code: &str) -> Option<String> {
    let code = code.trim();
    let code = code.split(['.', '@']).next().unwrap_or(code);
    let code = code.replace('-', "_").to_lowercase();
    match code.as_str() {
        "" | "c" | "posix" => None,
        _ => Some(code),
    }
}

/// First usable locale among the standard environment variables.
fn system_locale(var: impl Fn(&str) -> Option<String>) -> Option<String> {
    LOCALE_VARS
        .iter()
        .filter_map(|name| var(name))
        .find_map(|value| normalize_locale_code(&value))
}

/// Picks the available locale equal to `requested`, or failing that the one
/// equal to its language part (`de_at` matches `de`).
fn choose_matching_locale(available: &[String], requested: &str) -> Option<String> {
    let matching = |wanted: &str| {
        available
            .iter()
            .find(|candidate| normalize_locale_code(candidate).as_deref() == Some(wanted))
            .cloned()
    };
    matching(requested).or_else(|| {
        let language = requested.split('_').next().unwrap_or(requested);
        matching(language)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "fastcalc-lang-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn loads_and_flattens_a_locale_file() {
        let dir = scratch_dir("flatten");
        write(
            &dir.join("en.toml"),
            "[general]\ngreeting = \"Hello\"\ncount = 3\n\n[menu]\nitems = [\"File\", \"Edit\"]\n",
        );

        let mut localization = Localization::new(&dir);
        assert!(localization.load_locale("en"));
        assert_eq!(localization.current_locale(), Some("en"));
        assert_eq!(localization.text("general.greeting", ""), "Hello");
        assert_eq!(localization.text("general.count", ""), "3");
        assert_eq!(localization.text("menu.items.0", ""), "File");
        assert_eq!(localization.text("menu.items.1", ""), "Edit");
        assert_eq!(localization.lines("menu.items"), Some(vec!["File", "Edit"]));
        assert_eq!(localization.lines("general"), None);
        assert_eq!(localization.text("missing.key", "Default"), "Default");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn discovers_locales_in_files_and_directories() {
        let dir = scratch_dir("discover");
        write(&dir.join("en.toml"), "[texts]\nwelcome = \"Welcome\"\n");
        write(&dir.join("ru").join("common.toml"), "[texts]\nwelcome = \"Privet\"\n");
        write(&dir.join("ru").join("extra").join("more.toml"), "[texts]\nbye = \"Poka\"\n");
        write(&dir.join("default.txt"), "not a locale");

        let mut localization = Localization::new(&dir);
        assert_eq!(localization.available_locales(), ["en", "ru"]);

        assert!(localization.load_locale("ru"));
        assert_eq!(localization.current_locale(), Some("ru"));
        assert_eq!(localization.text("texts.welcome", ""), "Privet");
        assert_eq!(localization.text("texts.bye", ""), "Poka");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_or_broken_locales_keep_the_fallback() {
        let dir = scratch_dir("fallback");
        write(&dir.join("xx.toml"), "[texts\nwelcome = ");

        let mut localization = Localization::new(&dir);
        assert!(!localization.load_locale("de"));
        assert!(!localization.load_locale("xx"));
        assert_eq!(localization.current_locale(), None);
        assert_eq!(localization.text("texts.welcome", "Welcome"), "Welcome");

        localization.select(Some("de"));
        assert_eq!(localization.current_locale(), None);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn detection_matches_language_then_falls_back_to_first() {
        let dir = scratch_dir("detect");
        write(&dir.join("de.toml"), "title = \"Rechner\"\n");
        write(&dir.join("fr.toml"), "title = \"Calculatrice\"\n");

        let mut localization = Localization::new(&dir);
        localization.load_with(Some("fr_fr".to_string()));
        assert_eq!(localization.current_locale(), Some("fr"));
        assert_eq!(localization.text("title", ""), "Calculatrice");

        let mut localization = Localization::new(&dir);
        localization.load_with(Some("ja_jp".to_string()));
        assert_eq!(localization.current_locale(), Some("de"));

        let mut localization = Localization::new(&dir);
        localization.select(Some("fr"));
        assert_eq!(localization.text("title", ""), "Calculatrice");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn locale_codes() {
        assert_eq!(normalize_locale_code(" ru_RU.UTF-8 "), Some("ru_ru".to_string()));
        assert_eq!(normalize_locale_code("de-AT@euro"), Some("de_at".to_string()));
        assert_eq!(normalize_locale_code("C"), None);
        assert_eq!(normalize_locale_code("POSIX.UTF-8"), None);
        assert_eq!(normalize_locale_code(""), None);

        let env = |name: &str| match name {
            "LC_ALL" => Some(String::new()),
            "LANG" => Some("pt_BR.UTF-8".to_string()),
            _ => None,
        };
        assert_eq!(system_locale(env), Some("pt_br".to_string()));

        let available = ["en".to_string(), "pt".to_string()];
        assert_eq!(choose_matching_locale(&available, "pt_br"), Some("pt".to_string()));
        assert_eq!(choose_matching_locale(&available, "en"), Some("en".to_string()));
        assert_eq!(choose_matching_locale(&available, "ja"), None);
    }
}
