//! Simple, hierarchical configuration for the service and its tools.
//!
//! Configuration *value*s are referred to using a *path* of *name*s (slice of
//! strings), each of which walks a level down the hierarchy of *section*s.
//! For example, `&["db", "sqlite", "data-dir"]`.
//!
//! Configuration paths are case-insensitive, and all configuration values are
//! strings until read through a [`ValueRef`].

pub mod parse;
pub mod validate;

pub trait ValueParser<T>: std::fmt::Debug + Sync {
    fn parse(&self, value: &str) -> Result<T, String>;
}

pub trait ValueValidator<T>: std::fmt::Debug + Sync {
    fn validate(&self, value: &T) -> Result<(), String>;
}

/// Everything needed to read a configuration value.
#[derive(Clone, Debug)]
pub struct ValueRef<'a, T> {
    /// Path to read the value from.
    pub names: &'a [&'a str],
    /// Default to use when there is no value at the path.
    pub def: &'a str,
    pub type_: &'a dyn ValueParser<T>,
    pub validators: &'a [&'a dyn ValueValidator<T>],
}

/// Read configuration values.
pub trait Config {
    /// Get the value at the path given by `names`, or the default `def`.
    fn get<'s>(&'s self, names: &[&str], def: &'s str) -> &'s str;
}

/// Get a value using a [reference](ValueRef).
pub fn get_ref<C, T>(config: &C, vref: &ValueRef<T>) -> Result<T, String>
where
    C: Config + ?Sized,
{
    let raw = config.get(vref.names, vref.def);
    let parsed = vref.type_.parse(raw)
        .map_err(|e| format!("{} ({}): {e}", vref.names.join("."), raw))?;
    for val in vref.validators {
        val.validate(&parsed)
            .map_err(|e| format!("{}: {e}", vref.names.join(".")))?;
    }
    Ok(parsed)
}

/// Implementation of [`Config`] using an in-memory map.
///
/// A value and a section may not exist at the same path.
pub mod map {
    use std::collections::HashMap;

    /// A value or a section.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub enum Entry {
        Value(String),
        Section(HashMap<String, Entry>),
    }

    impl Entry {
        fn get<'s>(&'s self, names: &[&str], def: &'s str) -> &'s str {
            match names.split_first() {
                Some((first_name, other_names)) => match self {
                    Entry::Value(_) => def,
                    Entry::Section(section) => section
                        .get(&first_name.to_ascii_lowercase())
                        .map_or(def, |entry| entry.get(other_names, def))
                },
                None => match self {
                    Entry::Value(value) => value,
                    Entry::Section(_) => def,
                },
            }
        }

        /// Set a value, creating sections along the path as needed.  A value
        /// in the way of the path is replaced by a section.
        fn set(&mut self, names: &[&str], value: String) {
            match names.split_first() {
                None => *self = Entry::Value(value),
                Some((first_name, other_names)) => {
                    if let Entry::Value(_) = self {
                        *self = Entry::Section(HashMap::new());
                    }
                    if let Entry::Section(section) = self {
                        section.entry(first_name.to_ascii_lowercase())
                            .or_insert_with(|| Entry::Section(HashMap::new()))
                            .set(other_names, value);
                    }
                }
            }
        }
    }

    /// Implementation of [`Config`](super::Config) using an in-memory map.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Config {
        cfg: Entry,
    }

    impl super::Config for Config {
        fn get<'s>(&'s self, names: &[&str], def: &'s str) -> &'s str {
            self.cfg.get(names, def)
        }
    }

    /// Copy an entry and lowercase its keys.
    fn normalise(entry: &Entry) -> Entry {
        match entry {
            Entry::Value(v) => Entry::Value(v.to_owned()),
            Entry::Section(m) => {
                let m: HashMap<String, Entry> = m.iter()
                    .map(|(k, v)| (k.to_lowercase(), normalise(v)))
                    .collect();
                Entry::Section(m)
            }
        }
    }

    /// Construct a config from a hierarchical map.
    pub fn new(cfg: HashMap<String, Entry>) -> Config {
        Config { cfg: normalise(&Entry::Section(cfg)) }
    }

    /// Construct a config from `(path, value)` pairs, with paths given as
    /// dot-separated names, eg. `"db.sqlite.data-dir"`.
    pub fn from_pairs<'a, I>(pairs: I) -> Config
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut cfg = Entry::Section(HashMap::new());
        for (path, value) in pairs {
            let names: Vec<&str> = path.split('.').collect();
            cfg.set(&names, value.to_owned());
        }
        Config { cfg }
    }
}

/// Implementation of [`Config`] using the process's environment variables.
///
/// - The configuration values become fixed at the time of construction.
/// - If reading an environment variable fails, it is ignored.
/// - Path names are separated using `_` characters, and `-` characters in path
///   names match `_` characters in environment variable names.
/// - Only uppercase environment variables are matched.
pub mod env {
    use std::collections::HashMap;

    /// Implementation of [`Config`](super::Config) using the process's
    /// environment variables.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Config {
        prefix: String,
        env: HashMap<String, String>,
    }

    impl Config {
        fn env_name(&self, names: &[&str]) -> String {
            let mapped_names: Vec<String> = names.iter().map(|name| {
                name.to_ascii_uppercase().replace('-', "_")
            }).collect();
            self.prefix.to_owned() + &mapped_names.join("_")
        }
    }

    impl super::Config for Config {
        fn get<'s>(&'s self, names: &[&str], def: &'s str) -> &'s str {
            match self.env.get(&self.env_name(names)) {
                Some(v) => v,
                None => def,
            }
        }
    }

    /// Construct a config from the current process environment.
    ///
    /// Only environment variables starting with `prefix` are read, and
    /// `prefix` is removed when reading values.
    pub fn new(prefix: &str) -> Config {
        let env = std::env::vars_os()
            .filter_map(|(name_os, val_os)| {
                Some((name_os.into_string().ok()?, val_os.into_string().ok()?))
            })
            .filter(|(name, _)| name.starts_with(prefix))
            .collect();
        Config { prefix: prefix.to_owned(), env }
    }
}

/// Implementation of [`Config`] using a YAML file.
///
/// A value and a section may not exist at the same path.
///
/// When multiple values have equivalent paths (because paths are
/// case-insensitive), there is no defined scheme for which one is returned.
pub mod file {
    use std::{fs::File, path::Path};
    use super::map::{self, Entry};
    use serde_yaml::Value;

    fn parse(value: &Value) -> Entry {
        match value {
            Value::Null => Entry::Value("".to_owned()),
            Value::Bool(b) => Entry::Value(b.to_string()),
            Value::Number(n) => Entry::Value(n.to_string()),
            Value::String(s) => Entry::Value(s.to_owned()),
            Value::Sequence(s) => {
                Entry::Section(s.iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), parse(v)))
                    .collect())
            }
            Value::Mapping(m) => {
                Entry::Section(m.iter()
                    .flat_map(|(k, v)| {
                        k.as_str()
                            .map(|k_str| (k_str.to_owned(), parse(v)))
                    })
                    .collect())
            }
            Value::Tagged(_) => Entry::Value("".to_owned())
        }
    }

    /// Construct a config from a YAML file.
    pub fn new<P>(path: P) -> Result<map::Config, String>
    where
        P: AsRef<Path> + core::fmt::Debug
    {
        let file = File::open(path.as_ref())
            .map_err(|e| format!("error opening file ({path:?}): {e}"))?;
        let value: Value = serde_yaml::from_reader(file)
            .map_err(|e| format!(
                "error loading config from file ({path:?}): {e}"))?;
        if let Entry::Section(e) = parse(&value) {
            Ok(map::new(e))
        } else {
            Err("invalid config file: top-level must be a map".to_owned())
        }
    }
}

/// Implementation of [`Config`] reading from a list of configs in order,
/// falling back to the next one whenever a value is missing.
pub mod layered {
    /// Implementation of [`Config`](super::Config) over a list of layers.
    pub struct Config {
        layers: Vec<Box<dyn super::Config + Send + Sync>>,
    }

    impl super::Config for Config {
        fn get<'s>(&'s self, names: &[&str], def: &'s str) -> &'s str {
            // a layer only "has" a value if it ignores the default
            const MISSING: &str = "\0";
            self.layers.iter()
                .map(|layer| layer.get(names, MISSING))
                .find(|value| *value != MISSING)
                .unwrap_or(def)
        }
    }

    /// Construct a config where earlier layers take precedence.
    pub fn new(layers: Vec<Box<dyn super::Config + Send + Sync>>) -> Config {
        Config { layers }
    }
}

/// Load the configuration used by the binaries: environment variables
/// starting with `env_prefix`, over the YAML file at `path` if given.
pub fn load<P>(path: Option<P>, env_prefix: &str)
-> Result<Box<dyn Config + Send + Sync>, String>
where
    P: AsRef<std::path::Path> + core::fmt::Debug,
{
    let env = env::new(env_prefix);
    match path {
        Some(path) => {
            let layers: Vec<Box<dyn Config + Send + Sync>> = vec![
                Box::new(env),
                Box::new(file::new(path)?),
            ];
            Ok(Box::new(layered::new(layers)))
        }
        None => Ok(Box::new(env)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_paths_are_case_insensitive() {
        let cfg = map::from_pairs([("DB.Sqlite.Data-Dir", "/srv/db")]);
        assert_eq!(cfg.get(&["db", "SQLITE", "data-dir"], "def"), "/srv/db");
        assert_eq!(cfg.get(&["db", "sqlite"], "def"), "def");
        assert_eq!(cfg.get(&["db", "sqlite", "data-dir", "x"], "def"), "def");
    }

    #[test]
    fn layered_prefers_earlier_layers() {
        let top = map::from_pairs([("webserver.server.port", "9100")]);
        let bottom = map::from_pairs([
            ("webserver.server.port", "9000"),
            ("db.default.host", "10.0.0.2"),
        ]);
        let layers: Vec<Box<dyn Config + Send + Sync>> =
            vec![Box::new(top), Box::new(bottom)];
        let cfg = layered::new(layers);
        assert_eq!(cfg.get(&["webserver", "server", "port"], "1"), "9100");
        assert_eq!(cfg.get(&["db", "default", "host"], "x"), "10.0.0.2");
        assert_eq!(cfg.get(&["db", "default", "port"], "3306"), "3306");
    }

    #[test]
    fn get_ref_reports_path_on_parse_error() {
        let cfg = map::from_pairs([("webserver.server.port", "nope")]);
        let vref = ValueRef {
            names: &["webserver", "server", "port"],
            def: "9000",
            type_: &parse::WEB_PORT,
            validators: &[],
        };
        let err = get_ref(&cfg, &vref).unwrap_err();
        assert!(err.contains("webserver.server.port"), "{err}");
    }

    #[test]
    fn yaml_file_is_read_as_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "db:\n  sqlite:\n    busy-timeout-ms: 250\n")
            .unwrap();
        let cfg = file::new(&path).unwrap();
        assert_eq!(cfg.get(&["db", "sqlite", "busy-timeout-ms"], ""), "250");
    }
}
