//! Open-file dialog for the player.
//!
//! The browser recursively scans a start directory for supported audio files
//! and lets the user narrow the list with a fuzzy filter before confirming a
//! selection. Confirming yields the chosen path; cancelling yields nothing and
//! leaves the currently loaded file alone.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};
use tapedeck::source::is_supported_audio_file;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrowserFocus {
    Search,
    Files,
}

pub struct Browser {
    pub root: PathBuf,
    pub items: Vec<PathBuf>,
    pub filtered_indices: Vec<usize>,
    pub selected: usize,
    pub search_query: String,
    pub focus: BrowserFocus,
    pub is_active: bool,
    matcher: SkimMatcherV2,
}

impl Browser {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("."),
            items: Vec::new(),
            filtered_indices: Vec::new(),
            selected: 0,
            search_query: String::new(),
            focus: BrowserFocus::Files,
            is_active: false,
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Shows the dialog, rescanning `root`.
    pub fn open(&mut self, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
        self.scan_directory(root)?;
        self.is_active = true;
        self.focus = BrowserFocus::Files;
        Ok(())
    }

    pub fn close(&mut self) {
        self.is_active = false;
        self.focus = BrowserFocus::Files;
    }

    /// Confirms the highlighted entry and closes the dialog.
    pub fn confirm(&mut self) -> Option<PathBuf> {
        let choice = self.get_selected_path().map(Path::to_path_buf);
        self.close();
        choice
    }

    pub fn scan_directory(&mut self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        self.items.clear();
        self.root = path.to_path_buf();

        self.scan_directory_recursive(path)?;

        self.items.sort();

        log::info!("Found {} audio files under {}", self.items.len(), path.display());

        // Apply current search filter (preserves existing search)
        self.filter_items();

        Ok(())
    }

    fn scan_directory_recursive(&mut self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let path = entry.path();

            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'));
            if hidden {
                continue;
            }

            if path.is_dir() {
                if let Err(e) = self.scan_directory_recursive(&path) {
                    warn!("Could not scan directory {path:?}: {e}");
                }
            } else if path.is_file() && is_supported_audio_file(&path) {
                self.items.push(path);
            }
        }

        Ok(())
    }

    /// Path relative to the scanned root, for display and matching.
    pub fn display_name<'a>(&self, path: &'a Path) -> std::borrow::Cow<'a, str> {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
    }

    pub fn push_char(&mut self, c: char) {
        self.search_query.push(c);
        self.filter_items();
    }

    pub fn pop_char(&mut self) {
        self.search_query.pop();
        self.filter_items();
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            BrowserFocus::Search => BrowserFocus::Files,
            BrowserFocus::Files => BrowserFocus::Search,
        };
    }

    pub fn clear_search(&mut self) {
        self.search_query.clear();
        self.filter_items();
    }

    fn filter_items(&mut self) {
        if self.search_query.is_empty() {
            self.filtered_indices = (0..self.items.len()).collect();
        } else {
            let mut scored: Vec<(usize, i64)> = self
                .items
                .iter()
                .enumerate()
                .filter_map(|(idx, path)| {
                    let name = self.display_name(path);
                    self.matcher
                        .fuzzy_match(&name, &self.search_query)
                        .map(|score| (idx, score))
                })
                .collect();

            // Highest score first
            scored.sort_by(|a, b| b.1.cmp(&a.1));

            self.filtered_indices = scored.into_iter().map(|(idx, _)| idx).collect();
        }

        // Reset selection if out of bounds
        if self.selected >= self.filtered_indices.len() {
            self.selected = 0;
        }
    }

    pub fn select_next(&mut self) {
        if !self.filtered_indices.is_empty() {
            self.selected = (self.selected + 1) % self.filtered_indices.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.filtered_indices.is_empty() {
            if self.selected == 0 {
                self.selected = self.filtered_indices.len() - 1;
            } else {
                self.selected -= 1;
            }
        }
    }

    pub fn get_selected_path(&self) -> Option<&Path> {
        self.filtered_indices
            .get(self.selected)
            .and_then(|idx| self.items.get(*idx))
            .map(|path| path.as_path())
    }

    pub fn get_filtered_items(&self) -> Vec<&Path> {
        self.filtered_indices
            .iter()
            .filter_map(|idx| self.items.get(*idx).map(|p| p.as_path()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn browser_with(paths: &[&str]) -> Browser {
        let mut browser = Browser::new();
        browser.items = paths.iter().map(PathBuf::from).collect();
        browser.filter_items();
        browser
    }

    #[test]
    fn test_new_browser() {
        let browser = Browser::new();
        assert!(browser.items.is_empty());
        assert!(browser.filtered_indices.is_empty());
        assert_eq!(browser.selected, 0);
        assert!(!browser.is_active);
    }

    #[test]
    fn test_scan_directory_finds_audio_recursively() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("drums")).unwrap();
        fs::create_dir(root.join(".cache")).unwrap();
        fs::write(root.join("pad.wav"), b"").unwrap();
        fs::write(root.join("drums").join("kick.FLAC"), b"").unwrap();
        fs::write(root.join(".cache").join("hidden.wav"), b"").unwrap();
        fs::write(root.join("notes.txt"), b"").unwrap();

        let mut browser = Browser::new();
        browser.scan_directory(root).unwrap();

        let names: Vec<String> = browser
            .get_filtered_items()
            .iter()
            .map(|p| browser.display_name(p).to_string())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().any(|n| n.ends_with("kick.FLAC")));
        assert!(names.contains(&"pad.wav".to_string()));
    }

    #[test]
    fn test_scan_missing_directory_fails() {
        let mut browser = Browser::new();
        assert!(
            browser
                .scan_directory(Path::new("/nonexistent/tapedeck/dir"))
                .is_err()
        );
    }

    #[test]
    fn test_fuzzy_filter() {
        let mut browser = browser_with(&["kick.wav", "snare.wav", "pad_long.flac"]);
        assert_eq!(browser.get_filtered_items().len(), 3);

        for c in "pdl".chars() {
            browser.push_char(c);
        }
        assert_eq!(browser.get_filtered_items(), vec![Path::new("pad_long.flac")]);

        browser.clear_search();
        assert_eq!(browser.get_filtered_items().len(), 3);
    }

    #[test]
    fn test_search_input() {
        let mut browser = browser_with(&["test.wav"]);
        for c in "test".chars() {
            browser.push_char(c);
        }
        assert_eq!(browser.search_query, "test");

        browser.pop_char();
        assert_eq!(browser.search_query, "tes");
    }

    #[test]
    fn test_navigation() {
        let mut browser = browser_with(&["1.wav", "2.wav", "3.wav"]);
        assert_eq!(browser.selected, 0);

        browser.select_next();
        assert_eq!(browser.selected, 1);

        browser.select_next();
        assert_eq!(browser.selected, 2);

        // Test wraparound
        browser.select_next();
        assert_eq!(browser.selected, 0);

        browser.select_previous();
        assert_eq!(browser.selected, 2);

        browser.select_previous();
        assert_eq!(browser.selected, 1);
    }

    #[test]
    fn test_confirm_returns_selection_and_closes() {
        let mut browser = browser_with(&["/music/1.wav", "/music/2.wav"]);
        browser.is_active = true;
        browser.select_next();

        assert_eq!(browser.confirm(), Some(PathBuf::from("/music/2.wav")));
        assert!(!browser.is_active);
    }

    #[test]
    fn test_confirm_with_no_match_is_none() {
        let mut browser = browser_with(&["kick.wav"]);
        for c in "zzz".chars() {
            browser.push_char(c);
        }
        assert!(browser.confirm().is_none());
    }

    #[test]
    fn test_toggle_focus() {
        let mut browser = Browser::new();
        assert_eq!(browser.focus, BrowserFocus::Files);
        browser.toggle_focus();
        assert_eq!(browser.focus, BrowserFocus::Search);
    }
}
