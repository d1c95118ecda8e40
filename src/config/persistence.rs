//! Option file loading
//!
//! Options are read from a JSON or TOML file, chosen by the file extension
//! (`.toml` is TOML, anything else JSON). Loading degrades to defaults when
//! the file is missing, empty or corrupt.

use crate::config::ParseOptions;
use crate::error::{Error, Result, ResultExt};
use log::{debug, info, warn};
use std::fs;
use std::path::Path;

/// File format of an options file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionsFormat {
    Json,
    Toml,
}

impl OptionsFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => OptionsFormat::Toml,
            _ => OptionsFormat::Json,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Load Options
// ─────────────────────────────────────────────────────────────────────────────

/// Load parse options from `path`, falling back to defaults on any failure.
///
/// # Behavior
///
/// 1. If the file exists and is valid, load and sanitize it
/// 2. If the file doesn't exist or is empty, return default options
/// 3. If the file is unreadable or invalid, log a warning and return defaults
pub fn load_options(path: &Path) -> ParseOptions {
    try_load_options(path).unwrap_or_warn_default(ParseOptions::default(), "Failed to load options")
}

/// Load parse options from `path`.
///
/// A missing or empty file yields the defaults.
///
/// # Errors
///
/// - `Error::ConfigLoad`: the file exists but cannot be read
/// - `Error::ConfigParse`: the contents are not valid JSON/TOML options
pub fn try_load_options(path: &Path) -> Result<ParseOptions> {
    if !path.exists() {
        debug!("Options file not found at {}, using defaults", path.display());
        return Ok(ParseOptions::default());
    }

    debug!("Loading options from: {}", path.display());

    let contents = fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    if contents.trim().is_empty() {
        debug!("Options file is empty, using defaults");
        return Ok(ParseOptions::default());
    }

    let options = match OptionsFormat::from_path(path) {
        OptionsFormat::Json => ParseOptions::from_json_sanitized(&contents).map_err(|e| {
            warn!("Options file at {} contains invalid JSON: {}", path.display(), e);
            Error::from(e)
        })?,
        OptionsFormat::Toml => ParseOptions::from_toml_sanitized(&contents).map_err(|e| {
            warn!("Options file at {} contains invalid TOML: {}", path.display(), e);
            Error::from(e)
        })?,
    };

    info!("Options loaded from {}", path.display());
    Ok(options)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Temporary directory holding one options file.
    struct TestEnv {
        _temp_dir: TempDir,
        options_file: PathBuf,
    }

    impl TestEnv {
        fn new(file_name: &str) -> Self {
            let temp_dir = TempDir::new().expect("Failed to create temp dir");
            let options_file = temp_dir.path().join(file_name);
            Self {
                _temp_dir: temp_dir,
                options_file,
            }
        }

        fn write_options(&self, content: &str) {
            fs::write(&self.options_file, content).expect("Failed to write options");
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OptionsFormat::from_path(Path::new("a.toml")), OptionsFormat::Toml);
        assert_eq!(OptionsFormat::from_path(Path::new("a.TOML")), OptionsFormat::Toml);
        assert_eq!(OptionsFormat::from_path(Path::new("a.json")), OptionsFormat::Json);
        assert_eq!(OptionsFormat::from_path(Path::new("options")), OptionsFormat::Json);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let env = TestEnv::new("options.json");
        let options = try_load_options(&env.options_file).unwrap();
        assert_eq!(options, ParseOptions::default());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let env = TestEnv::new("options.json");
        env.write_options("   \n");
        assert_eq!(load_options(&env.options_file), ParseOptions::default());
    }

    #[test]
    fn test_load_json_options() {
        let env = TestEnv::new("options.json");
        env.write_options(r#"{"extensions": ["table"], "split_loose_lists": false}"#);
        let options = try_load_options(&env.options_file).unwrap();
        assert_eq!(options.extensions, vec!["table"]);
        assert!(!options.split_loose_lists);
    }

    #[test]
    fn test_load_toml_options() {
        let env = TestEnv::new("linemark.toml");
        env.write_options("normalize_indentation = false\n");
        let options = try_load_options(&env.options_file).unwrap();
        assert!(!options.normalize_indentation);
        assert_eq!(options.extensions.len(), 4);
    }

    #[test]
    fn test_corrupted_file_is_parse_error() {
        let env = TestEnv::new("options.json");
        env.write_options("{ invalid json }");
        let result = try_load_options(&env.options_file);
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_corrupted_toml_keeps_source() {
        use std::error::Error as StdError;
        let env = TestEnv::new("options.toml");
        env.write_options("normalize_indentation = maybe");
        let err = try_load_options(&env.options_file).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
        assert!(err.source().is_some());
        assert!(format!("{}", err).starts_with("Invalid options format"));
    }

    #[test]
    fn test_corrupted_file_falls_back_to_defaults() {
        let env = TestEnv::new("options.toml");
        env.write_options("extensions = [");
        assert_eq!(load_options(&env.options_file), ParseOptions::default());
    }

    #[test]
    fn test_directory_is_load_error() {
        let env = TestEnv::new("options.json");
        fs::create_dir_all(&env.options_file).unwrap();
        let result = try_load_options(&env.options_file);
        assert!(matches!(result, Err(Error::ConfigLoad { .. })));
    }
}
