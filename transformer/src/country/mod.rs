//! Country reference lookup.
//!
//! Maps country codes to display names. The table is read from a JSON file
//! on first use and cached inside the [`CountryLookup`] value that loaded it,
//! never in a process-wide cache. Two lookups always hold separate tables.

use once_cell::sync::OnceCell;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CountryError, CountryResult};
use crate::logs::log_success;
use crate::validation::validate_country_table;

/// Reference file used when none is configured (relative to current dir)
pub const DEFAULT_COUNTRIES_PATH: &str = "countries.json";

/// Anything that can turn a country code into a country name.
///
/// `Ok(None)` means "unknown code", which is a row problem. `Err` means the
/// reference data itself is unusable.
pub trait CountryResolver {
    fn country_name(&self, code: &str) -> CountryResult<Option<String>>;
}

impl<T: CountryResolver + ?Sized> CountryResolver for &T {
    fn country_name(&self, code: &str) -> CountryResult<Option<String>> {
        (**self).country_name(code)
    }
}

/// Where the table comes from
#[derive(Debug, Clone)]
enum Source {
    File(PathBuf),
    Memory(HashMap<String, String>),
}

/// Lazily loaded code -> name table.
#[derive(Debug)]
pub struct CountryLookup {
    source: Source,
    table: OnceCell<HashMap<String, String>>,
}

impl CountryLookup {
    /// Lookup backed by [`DEFAULT_COUNTRIES_PATH`]
    pub fn new() -> Self {
        Self::with_path(DEFAULT_COUNTRIES_PATH)
    }

    /// Lookup backed by a custom reference file. Nothing is read yet.
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            source: Source::File(path.as_ref().to_path_buf()),
            table: OnceCell::new(),
        }
    }

    /// Lookup over an in-memory table. Codes are stored uppercase.
    pub fn from_map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table: HashMap<String, String> = entries
            .into_iter()
            .map(|(code, name)| (code.into().trim().to_uppercase(), name.into()))
            .collect();

        Self {
            source: Source::Memory(table),
            table: OnceCell::new(),
        }
    }

    /// Reference file path, if file backed
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            Source::File(path) => Some(path),
            Source::Memory(_) => None,
        }
    }

    /// Load the table if needed and return it.
    pub fn load(&self) -> CountryResult<&HashMap<String, String>> {
        self.table.get_or_try_init(|| self.read_table())
    }

    /// Resolve a code, case-insensitively. Unknown codes give `Ok(None)`.
    pub fn resolve(&self, code: &str) -> CountryResult<Option<&str>> {
        let table = self.load()?;
        Ok(table.get(&code.trim().to_uppercase()).map(String::as_str))
    }

    /// Whether the table is currently cached
    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }

    /// Drop the cached table; the next query reloads it from the source.
    pub fn clear(&mut self) {
        self.table.take();
    }

    fn read_table(&self) -> CountryResult<HashMap<String, String>> {
        let path = match &self.source {
            Source::Memory(table) => return Ok(table.clone()),
            Source::File(path) => path,
        };

        if !path.exists() {
            return Err(CountryError::NotFound(path.clone()));
        }

        let content = fs::read_to_string(path).map_err(|source| CountryError::Io {
            path: path.clone(),
            source,
        })?;

        let value: Value = serde_json::from_str(&content).map_err(|source| CountryError::Json {
            path: path.clone(),
            source,
        })?;

        validate_country_table(&value).map_err(|errors| CountryError::InvalidFormat {
            path: path.clone(),
            errors,
        })?;

        let table: HashMap<String, String> =
            serde_json::from_value(value).map_err(|source| CountryError::Json {
                path: path.clone(),
                source,
            })?;

        log_success(format!(
            "Loaded {} countries from {}",
            table.len(),
            path.display()
        ));
        Ok(table)
    }
}

impl Default for CountryLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl CountryResolver for CountryLookup {
    fn country_name(&self, code: &str) -> CountryResult<Option<String>> {
        Ok(self.resolve(code)?.map(str::to_owned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_table(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("countries.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_lazy_load_and_resolve() {
        let dir = tempdir().unwrap();
        let path = write_table(dir.path(), r#"{"US": "United States", "FR": "France"}"#);

        let lookup = CountryLookup::with_path(&path);
        assert!(!lookup.is_loaded());

        assert_eq!(lookup.resolve("US").unwrap(), Some("United States"));
        assert!(lookup.is_loaded());
        assert_eq!(lookup.path(), Some(path.as_path()));
    }

    #[test]
    fn test_case_insensitive() {
        let lookup = CountryLookup::from_map([("US", "United States")]);
        assert_eq!(lookup.resolve("us").unwrap(), lookup.resolve("US").unwrap());
        assert_eq!(lookup.resolve(" us ").unwrap(), Some("United States"));
    }

    #[test]
    fn test_unknown_code_is_absent() {
        let lookup = CountryLookup::from_map([("US", "United States")]);
        assert_eq!(lookup.resolve("XX").unwrap(), None);
        assert_eq!(lookup.country_name("XX").unwrap(), None);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempdir().unwrap();
        let lookup = CountryLookup::with_path(dir.path().join("nope.json"));
        let err = lookup.resolve("US").unwrap_err();
        assert!(matches!(err, CountryError::NotFound(_)));
        assert!(!lookup.is_loaded());
    }

    #[test]
    fn test_malformed_json_is_fatal() {
        let dir = tempdir().unwrap();
        let path = write_table(dir.path(), "{ not json");
        let err = CountryLookup::with_path(path).resolve("US").unwrap_err();
        assert!(matches!(err, CountryError::Json { .. }));
    }

    #[test]
    fn test_wrong_shape_is_fatal() {
        let dir = tempdir().unwrap();
        let path = write_table(dir.path(), r#"["US", "FR"]"#);
        let err = CountryLookup::with_path(path).resolve("US").unwrap_err();
        assert!(matches!(err, CountryError::InvalidFormat { .. }));
    }

    #[test]
    fn test_clear_reloads_from_disk() {
        let dir = tempdir().unwrap();
        let path = write_table(dir.path(), r#"{"US": "United States"}"#);

        let mut lookup = CountryLookup::with_path(&path);
        assert_eq!(lookup.resolve("DE").unwrap(), None);

        write_table(dir.path(), r#"{"US": "United States", "DE": "Germany"}"#);
        // Still served from the cached table
        assert_eq!(lookup.resolve("DE").unwrap(), None);

        lookup.clear();
        assert!(!lookup.is_loaded());
        assert_eq!(lookup.resolve("DE").unwrap(), Some("Germany"));
    }

    #[test]
    fn test_instances_do_not_share_cache() {
        let dir = tempdir().unwrap();
        let path = write_table(dir.path(), r#"{"US": "United States"}"#);

        let first = CountryLookup::with_path(&path);
        let second = CountryLookup::with_path(&path);

        first.load().unwrap();
        assert!(first.is_loaded());
        assert!(!second.is_loaded());
    }

    #[test]
    fn test_resolver_through_reference() {
        let lookup = CountryLookup::from_map([("gb", "United Kingdom")]);
        let by_ref = &lookup;
        assert_eq!(
            by_ref.country_name("GB").unwrap().as_deref(),
            Some("United Kingdom")
        );
    }
}
