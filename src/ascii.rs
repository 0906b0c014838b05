//! ASCII art lookup, caching and colour-marker substitution

use indexmap::IndexMap;
use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};
use unicode_width::UnicodeWidthStr;

pub const UNKNOWN_ART_FILE: &str = "unknown.txt";
pub const RESET: &str = "\x1b[0m";

/// Last-resort art, used when even the unknown art file is missing
const BUILTIN_UNKNOWN_ART: &[&str] = &[
    "$1   ______  ",
    "$1  /      \\ ",
    "$1 |  $2 ?? $1 |",
    "$1 |  $2 ?? $1 |",
    "$1  \\______/ ",
];

static MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$([1-4])").expect("valid regex"));
static ANSI: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid regex"));

/// Art files in one directory, keyed by lowercase file stem
pub struct ArtRepository {
    dir: PathBuf,
    mappings: IndexMap<String, String>,
    cache: RwLock<HashMap<String, Arc<Vec<String>>>>,
}

impl ArtRepository {
    /// Scan `dir` for `*.txt` files. An unreadable directory gives an empty repository.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let mappings = load_system_mappings(&dir);
        debug!(dir = %dir.display(), systems = mappings.len(), "loaded art mappings");
        ArtRepository {
            dir,
            mappings,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Keys in directory scan order
    pub fn list_available_systems(&self) -> Vec<String> {
        self.mappings.keys().cloned().collect()
    }

    /// Exact key, else the first key contained in `system`, else the unknown art file
    pub fn resolve_filename(&self, system: &str) -> String {
        let system = system.trim().to_lowercase();
        if let Some(filename) = self.mappings.get(&system) {
            return filename.clone();
        }

        self.mappings
            .iter()
            .find(|(key, _)| system.contains(key.as_str()))
            .map(|(_, filename)| filename.clone())
            .unwrap_or_else(|| UNKNOWN_ART_FILE.to_string())
    }

    /// True when `system` resolves to something other than the unknown art
    pub fn has_exact_art(&self, system: &str) -> bool {
        self.mappings.contains_key(&system.trim().to_lowercase())
    }

    pub fn has_art(&self, system: &str) -> bool {
        self.resolve_filename(system) != UNKNOWN_ART_FILE
    }

    /// Art lines for `system`. Always returns something.
    pub fn get_art(&self, system: &str) -> Arc<Vec<String>> {
        let filename = self.resolve_filename(system);
        if let Some(lines) = self.load(&filename) {
            return lines;
        }

        if filename != UNKNOWN_ART_FILE {
            if let Some(lines) = self.load(UNKNOWN_ART_FILE) {
                return lines;
            }
        }

        warn!(dir = %self.dir.display(), "no usable unknown art, using built-in art");
        Arc::new(BUILTIN_UNKNOWN_ART.iter().map(|line| line.to_string()).collect())
    }

    /// Read-through cache keyed by filename; failures are not cached
    fn load(&self, filename: &str) -> Option<Arc<Vec<String>>> {
        if let Some(lines) = self.cache.read().get(filename) {
            return Some(Arc::clone(lines));
        }

        let path = self.dir.join(filename);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot read art file");
                return None;
            }
        };

        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        if lines.is_empty() {
            warn!(path = %path.display(), "art file is empty");
            return None;
        }

        let lines = Arc::new(lines);
        self.cache
            .write()
            .entry(filename.to_string())
            .or_insert_with(|| Arc::clone(&lines));
        Some(lines)
    }
}

fn load_system_mappings(dir: &Path) -> IndexMap<String, String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "cannot read art directory");
            return IndexMap::new();
        }
    };

    let mut mappings = IndexMap::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("txt") {
            continue;
        }
        let (Some(stem), Some(filename)) = (
            path.file_stem().and_then(|s| s.to_str()),
            path.file_name().and_then(|s| s.to_str()),
        ) else {
            continue;
        };
        if stem.is_empty() {
            continue;
        }
        mappings.entry(stem.to_lowercase()).or_insert_with(|| filename.to_string());
    }
    mappings
}

/// Replace `$1`..`$4` with palette codes. Text before the first marker uses `base`.
pub fn process_art_line(line: &str, palette: &[String], base: &str) -> String {
    let mut out = String::with_capacity(line.len() + 16);
    out.push_str(base);

    let mut last = 0;
    for caps in MARKER.captures_iter(line) {
        let (Some(whole), Some(index)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&line[last..whole.start()]);
        let index: usize = index.as_str().parse().unwrap_or(1);
        out.push_str(palette.get(index - 1).map(String::as_str).unwrap_or(base));
        last = whole.end();
    }
    out.push_str(&line[last..]);
    out.push_str(RESET);
    out
}

pub fn process_art(lines: &[String], palette: &[String], base: &str) -> Vec<String> {
    lines.iter().map(|line| process_art_line(line, palette, base)).collect()
}

pub fn strip_ansi(text: &str) -> String {
    ANSI.replace_all(text, "").into_owned()
}

/// Terminal columns taken by a line, ignoring ANSI sequences and colour markers
pub fn visible_width(line: &str) -> usize {
    let plain = strip_ansi(line);
    UnicodeWidthStr::width(MARKER.replace_all(&plain, "").as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn art_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn keys_are_lowercase_stems_of_txt_files() {
        let dir = art_dir(&[("Arch.txt", "A"), ("linux.txt", "L"), ("notes.md", "x"), ("unknown.txt", "?")]);
        let repo = ArtRepository::new(dir.path());

        let mut systems = repo.list_available_systems();
        systems.sort();
        assert_eq!(systems, vec!["arch", "linux", "unknown"]);
        assert_eq!(repo.resolve_filename("ARCH"), "Arch.txt");
    }

    #[test]
    fn resolves_exact_then_substring_then_unknown() {
        let dir = art_dir(&[("ubuntu.txt", "U"), ("unknown.txt", "?")]);
        let repo = ArtRepository::new(dir.path());

        assert_eq!(repo.resolve_filename("ubuntu"), "ubuntu.txt");
        assert_eq!(repo.resolve_filename("Ubuntu 24.04 LTS"), "ubuntu.txt");
        assert_eq!(repo.resolve_filename("haiku"), UNKNOWN_ART_FILE);
        assert!(repo.has_art("ubuntu"));
        assert!(!repo.has_art("haiku"));
        assert!(repo.has_exact_art(" Ubuntu "));
        assert!(!repo.has_exact_art("Ubuntu 24.04 LTS"));
    }

    #[test]
    fn missing_art_falls_back_to_unknown_file() {
        let dir = art_dir(&[("unknown.txt", "QQ\nQQ\n")]);
        let repo = ArtRepository::new(dir.path());
        assert_eq!(*repo.get_art("doesnotexist"), vec!["QQ", "QQ"]);
    }

    #[test]
    fn empty_art_file_falls_back_to_unknown_file() {
        let dir = art_dir(&[("void.txt", ""), ("unknown.txt", "QQ")]);
        let repo = ArtRepository::new(dir.path());
        assert_eq!(*repo.get_art("void"), vec!["QQ"]);
    }

    #[test]
    fn missing_unknown_file_uses_builtin_art() {
        let dir = TempDir::new().unwrap();
        let repo = ArtRepository::new(dir.path());
        assert!(repo.list_available_systems().is_empty());
        assert_eq!(repo.get_art("unknown").len(), BUILTIN_UNKNOWN_ART.len());

        let missing = ArtRepository::new(dir.path().join("nope"));
        assert!(!missing.get_art("linux").is_empty());
    }

    #[test]
    fn art_is_cached_by_filename() {
        let dir = art_dir(&[("linux.txt", "first")]);
        let repo = ArtRepository::new(dir.path());
        assert_eq!(*repo.get_art("linux"), vec!["first"]);

        fs::write(dir.path().join("linux.txt"), "second").unwrap();
        assert_eq!(*repo.get_art("linux"), vec!["first"]);
    }

    #[test]
    fn markers_switch_colour_and_vanish() {
        let palette = vec!["\x1b[31m".to_string(), "\x1b[34m".to_string()];
        let line = process_art_line("$1AA$2BB", &palette, "\x1b[36m");

        assert!(line.contains("\x1b[31mAA\x1b[34mBB"));
        assert!(!line.contains('$'));
        assert_eq!(strip_ansi(&line), "AABB");
    }

    #[test]
    fn unmapped_marker_uses_base_colour() {
        let palette = vec!["\x1b[31m".to_string()];
        let line = process_art_line("x$4y", &palette, "\x1b[36m");
        assert_eq!(line, "\x1b[36mx\x1b[36my\x1b[0m");
    }

    #[test]
    fn visible_width_ignores_markers_and_escapes() {
        assert_eq!(visible_width("$1AA$2BB"), 4);
        assert_eq!(visible_width("\x1b[31m/\\\x1b[0m"), 2);
        assert_eq!(visible_width(""), 0);
        assert_eq!(visible_width("$3日本"), 4);
    }
}
