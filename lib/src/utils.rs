use crate::import_export::INDEX_FILE_NAME;
use std::path::{Path, PathBuf};

pub fn get_config_dir() -> PathBuf {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(path).join("marktree");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config/marktree");
    }

    #[cfg(target_os = "windows")]
    if let Ok(appdata) = std::env::var("APPDATA") {
        return PathBuf::from(appdata).join("marktree");
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Turn a decoded folder name into a single path component
///
/// Separators, NUL, control characters and the characters Windows rejects in
/// file names (`:*?"<>|`) become `_`, so the same export converts the same way
/// on every platform. Names that resolve to the current or parent directory
/// are replaced entirely, and a name that matches the index file (in any case)
/// gets a trailing `_` so it cannot take the index file's place.
pub fn to_path_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            other => other,
        })
        .collect();

    match cleaned.trim() {
        "" | "." | ".." => "_".to_string(),
        trimmed if trimmed.eq_ignore_ascii_case(INDEX_FILE_NAME) => format!("{}_", cleaned),
        _ => cleaned,
    }
}

/// Name of the output root for a bookmarks file: its file name without extension
pub fn output_name_for(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .map(|s| to_path_component(&s))
        .unwrap_or_else(|| "bookmarks".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Cat&Dog", "Cat&Dog")]
    #[case("Read later", "Read later")]
    #[case("a/b", "a_b")]
    #[case("a\\b", "a_b")]
    #[case("nul\0byte", "nul_byte")]
    #[case("tab\there", "tab_here")]
    #[case("Q: A", "Q_ A")]
    #[case("What? <Why> *now* | \"later\"", "What_ _Why_ _now_ _ _later_")]
    #[case("Readme.md", "Readme.md_")]
    #[case("README.MD", "README.MD_")]
    #[case("readme.md", "readme.md_")]
    #[case("Readme.md notes", "Readme.md notes")]
    #[case("", "_")]
    #[case("   ", "_")]
    #[case(".", "_")]
    #[case("..", "_")]
    #[case("...", "...")]
    #[case("Ünïcødé 書籤", "Ünïcødé 書籤")]
    fn test_to_path_component(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_path_component(input), expected);
    }

    #[rstest]
    #[case("/home/me/bookmarks_2024.html", "bookmarks_2024")]
    #[case("exports/firefox.backup.html", "firefox.backup")]
    #[case("plain", "plain")]
    fn test_output_name_for(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(output_name_for(Path::new(source)), expected);
    }
}
