//! Layered configuration sources
// (c) 2024 Ross Younger

use super::{Configuration, BASE_CONFIG_FILENAME, ENV_PREFIX};

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map, Value},
    Figment, Metadata, Profile, Provider,
};
use serde::de::DeserializeOwned;
use std::{
    collections::BTreeSet,
    fmt::Display,
    path::{Path, PathBuf},
};
use struct_field_names_as_array::FieldNamesAsSlice;
use tabled::{settings::style::Style, Table, Tabled};

use tracing::{trace, warn};

// PATHS /////////////////////////////////////////////////////////////////////////////////////////////////////

/// `~/.localca.toml`
fn user_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("no home directory"))?;
    Ok(home.join(format!(".{BASE_CONFIG_FILENAME}")))
}

/// `/etc/localca.toml`
fn system_config_path() -> PathBuf {
    Path::new("/etc").join(BASE_CONFIG_FILENAME)
}

/// Merges an optional TOML file, if it is present
fn merge_if_present(f: Figment, what: &str, path: &Path) -> Figment {
    if path.exists() {
        trace!("reading {what} configuration from {path:?}");
        f.merge(Toml::file(path))
    } else {
        trace!("{what} configuration file {path:?} not present");
        f
    }
}

// BUILT-IN DEFAULTS ////////////////////////////////////////////////////////////////////////////////////////////

/// Figment provider for [`Configuration::default()`], labelled so `--show-config` can say where a value came from
#[derive(Default)]
struct BuiltinDefaults {}

impl Provider for BuiltinDefaults {
    fn metadata(&self) -> Metadata {
        Metadata::named("built-in default")
    }

    fn data(&self) -> std::result::Result<Map<Profile, Dict>, figment::Error> {
        Serialized::defaults(Configuration::default()).data()
    }
}

// MANAGER //////////////////////////////////////////////////////////////////////////////////////////////////////

/// Gathers the configuration sources and merges them.
///
/// In increasing order of priority:
/// 1. Hard-wired defaults
/// 2. The system-wide configuration file (`/etc/localca.toml`)
/// 3. The user's configuration file (`~/.localca.toml`)
/// 4. Environment variables prefixed `LOCALCA_` (e.g. `LOCALCA_KEY_BITS=2048`)
/// 5. Whatever the caller merges in afterwards, typically command-line options
#[derive(Debug, Default)]
pub struct Manager {
    data: Figment,
}

impl Manager {
    /// Reads the standard configuration files and the environment.
    ///
    /// A file that fails to parse is not reported here; the error surfaces from [`Manager::get`].
    #[must_use]
    pub fn new() -> Self {
        let mut data = Figment::new().merge(BuiltinDefaults::default());
        data = merge_if_present(data, "system", &system_config_path());
        match user_config_path() {
            Ok(path) => data = merge_if_present(data, "user", &path),
            Err(e) => warn!("could not determine user configuration file path: {e}"),
        }
        data = data.merge(Env::prefixed(ENV_PREFIX));
        Self { data }
    }

    /// The configuration files [`Manager::new`] looks for, whether or not they exist
    #[must_use]
    pub fn config_files() -> Vec<String> {
        std::iter::once(system_config_path())
            .chain(user_config_path().ok())
            .map(|p| p.to_string_lossy().into_owned())
            .collect()
    }

    /// Built-in defaults only; no files, no environment
    #[must_use]
    pub fn without_files() -> Self {
        Self {
            data: Figment::new().merge(BuiltinDefaults::default()),
        }
    }

    /// Merges in another source at higher priority than everything so far
    pub fn merge_provider<T>(&mut self, provider: T)
    where
        T: Provider,
    {
        let f = std::mem::take(&mut self.data);
        self.data = f.merge(provider);
    }

    /// Merges in a TOML file at higher priority than everything so far.
    ///
    /// Unlike the standard files, this one must exist.
    pub fn merge_toml_file<T>(&mut self, toml: T)
    where
        T: AsRef<Path>,
    {
        self.merge_provider(Toml::file_exact(toml.as_ref()));
    }

    /// Extracts a struct from the merged data
    pub fn get<T>(&self) -> anyhow::Result<T, figment::Error>
    where
        T: DeserializeOwned,
    {
        self.data.extract::<T>()
    }

    /// Extracts the [Configuration] and checks its values are usable
    pub fn configuration(&self) -> anyhow::Result<Configuration> {
        let config: Configuration = self.get()?;
        config.validate()?;
        Ok(config)
    }

    /// A table of the fields of `T`, their merged values and the source each value came from.
    ///
    /// Keys that are not fields of `T` are left out of the table; with `warn_on_unknown` they are reported on stderr.
    #[must_use]
    pub fn sources_table<T>(&self, warn_on_unknown: bool) -> SourcesTable<'_>
    where
        T: FieldNamesAsSlice,
    {
        SourcesTable {
            manager: self,
            warn_on_unknown,
            fields: T::FIELD_NAMES_AS_SLICE.iter().copied().collect(),
        }
    }
}

// --show-config /////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Tabled)]
struct Row {
    field: String,
    value: String,
    source: String,
}

fn describe_source(meta: Option<&Metadata>) -> String {
    meta.map(|m| {
        m.source
            .as_ref()
            .map_or_else(|| m.name.to_string(), figment::Source::to_string)
    })
    .unwrap_or_default()
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::String(_, s) => s.clone(),
        Value::Char(_, c) => c.to_string(),
        Value::Bool(_, b) => b.to_string(),
        Value::Num(_, num) => num
            .to_u128()
            .as_ref()
            .map(ToString::to_string)
            .or_else(|| num.to_i128().as_ref().map(ToString::to_string))
            .or_else(|| num.to_f64().as_ref().map(ToString::to_string))
            .unwrap_or_else(|| "?".into()),
        Value::Empty(..) => "(none)".into(),
        Value::Dict(..) => "(table)".into(),
        Value::Array(_, items) => items
            .iter()
            .map(describe_value)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Renders the merged configuration for `--show-config`
#[derive(Debug)]
pub struct SourcesTable<'a> {
    manager: &'a Manager,
    warn_on_unknown: bool,
    fields: BTreeSet<&'static str>,
}

impl Display for SourcesTable<'_> {
    /// Problems with individual keys go to stderr, styled, and the key is skipped.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use crate::cli::styles::{ERROR, WARNING};
        use anstream::eprintln;

        let figment = &self.manager.data;
        let data = match figment.data() {
            Ok(d) => d,
            Err(e) => {
                eprintln!("{ERROR}ERROR{ERROR:#} {e}");
                return Ok(());
            }
        };
        let Some(dict) = data.get(&Profile::Default) else {
            return Ok(());
        };

        let mut rows = Vec::new();
        for key in dict.keys() {
            let meta = figment.find_metadata(key);
            if !self.fields.contains(key.as_str()) {
                if self.warn_on_unknown {
                    eprintln!(
                        "{WARNING}WARNING{WARNING:#}: unrecognised field `{key}` in {}",
                        describe_source(meta)
                    );
                }
                continue;
            }
            match figment.find_value(key) {
                Ok(value) => rows.push(Row {
                    field: key.clone(),
                    value: describe_value(&value),
                    source: describe_source(meta),
                }),
                Err(e) => eprintln!("{WARNING}WARNING{WARNING:#}: {key}: {e}"),
            }
        }
        write!(f, "{}", Table::new(rows).with(Style::sharp()))
    }
}

#[cfg(test)]
mod test {
    use crate::config::{Configuration, Manager};
    use crate::identity::TlsVersion;
    use crate::util::make_test_tempfile;
    use crate::Error;
    use figment::providers::Serialized;
    use serde::Serialize;

    #[test]
    fn defaults() {
        let mgr = Manager::without_files();
        let result = mgr.get().unwrap();
        let expected = Configuration::default();
        assert_eq!(expected, result);
    }

    #[test]
    fn command_line_overrides_win() {
        #[derive(Serialize)]
        struct Overrides {
            key_bits: usize,
        }
        let (path, _tempdir) = make_test_tempfile("key_bits = 3072\n", "test.toml");
        let mut mgr = Manager::without_files();
        mgr.merge_toml_file(path);
        assert_eq!(mgr.configuration().unwrap().key_bits, 3072);

        mgr.merge_provider(Serialized::defaults(Overrides { key_bits: 2048 }));
        let expected = Configuration {
            key_bits: 2048,
            ..Default::default()
        };
        assert_eq!(expected, mgr.configuration().unwrap());
    }

    #[test]
    fn toml_file() {
        let (path, _tempdir) = make_test_tempfile(
            r#"
            common_name = "build-server.internal"
            validity_days = 7
            subject_alt_names = ["127.0.0.1", "10.1.2.3"]
            min_tls_version = "1.3"
        "#,
            "test.toml",
        );
        let mut mgr = Manager::without_files();
        mgr.merge_toml_file(path);
        let result = mgr.configuration().unwrap();
        assert_eq!(result.common_name, "build-server.internal");
        assert_eq!(result.validity_days, 7);
        assert_eq!(result.subject_alt_names.len(), 2);
        assert_eq!(result.subject_alt_names[1].to_string(), "10.1.2.3");
        assert_eq!(result.min_tls_version, TlsVersion::Tls13);
        assert_eq!(result.organization, Configuration::default().organization);
    }

    #[test]
    fn tls_version_alias() {
        let (path, _tempdir) = make_test_tempfile("min_tls_version = \"tls1.3\"\n", "test.toml");
        let mut mgr = Manager::without_files();
        mgr.merge_toml_file(path);
        assert_eq!(mgr.configuration().unwrap().min_tls_version, TlsVersion::Tls13);
    }

    #[test]
    fn out_of_range_key_size() {
        let (path, _tempdir) = make_test_tempfile("key_bits = 8192\n", "test.toml");
        let mut mgr = Manager::without_files();
        mgr.merge_toml_file(path);
        // well-typed, so it extracts
        let _: Configuration = mgr.get().unwrap();
        let err = mgr.configuration().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::KeySize { bits: 8192, .. })
        ));
    }

    #[test]
    fn bad_address() {
        let (path, _tempdir) =
            make_test_tempfile("subject_alt_names = [\"localhost\"]\n", "test.toml");
        let mut mgr = Manager::without_files();
        mgr.merge_toml_file(path);
        assert!(mgr.get::<Configuration>().is_err());
    }

    #[test]
    fn sources_table() {
        let (path, _tempdir) = make_test_tempfile(
            r#"
            locality = "Dunedin"
            subject_alt_names = ["127.0.0.1", "::1", "10.0.0.7"]
            not_a_field = 42
        "#,
            "test.toml",
        );
        let mut mgr = Manager::without_files();
        mgr.merge_toml_file(&path);
        let output = mgr.sources_table::<Configuration>(true).to_string();
        assert!(output.contains("Dunedin"));
        assert!(output.contains("127.0.0.1, ::1, 10.0.0.7"));
        assert!(output.contains("test.toml"));
        assert!(output.contains("built-in default"));
        assert!(!output.contains("not_a_field"));
    }

    #[test]
    fn unparseable_toml() {
        let (path, _tempdir) = make_test_tempfile("key_bits 123\n", "test.toml");
        let mut mgr = Manager::without_files();
        mgr.merge_toml_file(path);
        assert!(mgr.get::<Configuration>().is_err());
        // the table degrades to nothing rather than failing
        assert!(mgr
            .sources_table::<Configuration>(false)
            .to_string()
            .is_empty());
    }

    #[test]
    fn missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut mgr = Manager::without_files();
        mgr.merge_toml_file(dir.path().join("absent.toml"));
        assert!(mgr.get::<Configuration>().is_err());
    }

    #[test]
    fn config_files_lists_system_file() {
        let files = Manager::config_files();
        assert_eq!(files[0], "/etc/localca.toml");
    }
}
