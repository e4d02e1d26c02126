pub type Result<T> = core::result::Result<T, VectorError>;

#[derive(thiserror::Error, Debug)]
pub enum VectorError {
    /// Words were neither a single string nor a non-empty list of strings.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl VectorError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            VectorError::InvalidInput(_) => "invalid_input",
            VectorError::InvalidConfig(_) => "invalid_config",
            VectorError::Transport(_) => "transport",
            VectorError::Status { .. } => "status",
            VectorError::Decode(_) => "decode",
        }
    }
}

pub mod config {
    use serde::Deserialize;
    use std::env;
    use std::fmt;
    use std::str::FromStr;

    use crate::{Result, VectorError};

    pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3030/convert/";
    pub const DEFAULT_WORD: &str = "hello";
    pub const DEFAULT_LOOPS: usize = 10_000;
    pub const DEFAULT_ENTRIES: usize = 10_000;

    /// HTTP method used to carry the words payload.
    ///
    /// The `/convert/` service reads a JSON body on GET, so GET is the default.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Method {
        #[default]
        Get,
        Post,
    }

    impl FromStr for Method {
        type Err = String;

        fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
            match s.to_ascii_lowercase().as_str() {
                "get" => Ok(Method::Get),
                "post" => Ok(Method::Post),
                other => Err(format!("unknown method `{}` (expected get or post)", other)),
            }
        }
    }

    impl fmt::Display for Method {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Method::Get => f.write_str("GET"),
                Method::Post => f.write_str("POST"),
            }
        }
    }

    /// Which benchmark phases to run.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Phases {
        Multi,
        Single,
        #[default]
        Both,
    }

    impl Phases {
        pub fn runs_multi(self) -> bool { matches!(self, Phases::Multi | Phases::Both) }
        pub fn runs_single(self) -> bool { matches!(self, Phases::Single | Phases::Both) }
    }

    impl FromStr for Phases {
        type Err = String;

        fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
            match s.to_ascii_lowercase().as_str() {
                "multi" => Ok(Phases::Multi),
                "single" => Ok(Phases::Single),
                "both" => Ok(Phases::Both),
                other => Err(format!("unknown phase `{}` (expected multi, single or both)", other)),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    #[serde(default)]
    pub struct ClientConfig {
        pub endpoint: String,
        /// No timeout when unset.
        pub timeout_ms: Option<u64>,
        pub method: Method,
    }

    impl Default for ClientConfig {
        fn default() -> Self {
            Self {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                timeout_ms: None,
                method: Method::Get,
            }
        }
    }

    impl ClientConfig {
        pub fn validate(&self) -> Result<()> {
            if self.endpoint.trim().is_empty() {
                return Err(VectorError::InvalidConfig("endpoint must not be empty".into()));
            }
            if self.timeout_ms == Some(0) {
                return Err(VectorError::InvalidConfig("timeout_ms must be greater than zero".into()));
            }
            Ok(())
        }
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    #[serde(default)]
    pub struct BenchConfig {
        pub word: String,
        pub loops: usize,
        pub entries: usize,
        pub phases: Phases,
    }

    impl Default for BenchConfig {
        fn default() -> Self {
            Self {
                word: DEFAULT_WORD.to_string(),
                loops: DEFAULT_LOOPS,
                entries: DEFAULT_ENTRIES,
                phases: Phases::Both,
            }
        }
    }

    impl BenchConfig {
        pub fn validate(&self) -> Result<()> {
            if self.loops == 0 {
                return Err(VectorError::InvalidConfig("loops must be at least 1".into()));
            }
            if self.entries == 0 {
                return Err(VectorError::InvalidConfig("entries must be at least 1".into()));
            }
            Ok(())
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
    #[serde(default)]
    pub struct W2vConfig {
        pub client: ClientConfig,
        pub bench: BenchConfig,
    }

    impl W2vConfig {
        /// Reads `W2V_CONFIG` as YAML when set, otherwise defaults with
        /// `W2V_*` overrides applied.
        pub fn load() -> Result<Self> {
            Self::load_with(|key| env::var(key).ok())
        }

        /// `load` with variables resolved through `lookup`.
        pub fn load_with<F>(lookup: F) -> Result<Self>
        where
            F: Fn(&str) -> Option<String>,
        {
            if let Some(path) = lookup("W2V_CONFIG") {
                let text = std::fs::read_to_string(&path)
                    .map_err(|e| VectorError::InvalidConfig(format!("{}: {}", path, e)))?;
                return Self::from_yaml_str(&text);
            }
            let mut cfg = Self::default();
            cfg.apply_overrides(lookup)?;
            Ok(cfg)
        }

        pub fn from_yaml_str(text: &str) -> Result<Self> {
            serde_yaml::from_str(text).map_err(|e| VectorError::InvalidConfig(e.to_string()))
        }

        pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
        where
            F: Fn(&str) -> Option<String>,
        {
            if let Some(v) = lookup("W2V_ENDPOINT") { self.client.endpoint = v; }
            if let Some(v) = lookup("W2V_TIMEOUT_MS") { self.client.timeout_ms = Some(parse_var("W2V_TIMEOUT_MS", &v)?); }
            if let Some(v) = lookup("W2V_METHOD") { self.client.method = v.parse().map_err(VectorError::InvalidConfig)?; }
            if let Some(v) = lookup("W2V_WORD") { self.bench.word = v; }
            if let Some(v) = lookup("W2V_LOOPS") { self.bench.loops = parse_var("W2V_LOOPS", &v)?; }
            if let Some(v) = lookup("W2V_ENTRIES") { self.bench.entries = parse_var("W2V_ENTRIES", &v)?; }
            Ok(())
        }

        /// Command-line flags win over the file and the environment.
        pub fn apply_flags(&mut self, flags: &Flags) {
            if let Some(v) = &flags.endpoint { self.client.endpoint = v.clone(); }
            if let Some(v) = flags.method { self.client.method = v; }
            if let Some(v) = flags.timeout_ms { self.client.timeout_ms = Some(v); }
            if let Some(v) = &flags.word { self.bench.word = v.clone(); }
            if let Some(v) = flags.loops { self.bench.loops = v; }
            if let Some(v) = flags.entries { self.bench.entries = v; }
            if let Some(v) = flags.phases { self.bench.phases = v; }
        }

        pub fn validate(&self) -> Result<()> {
            self.client.validate()?;
            self.bench.validate()
        }
    }

    /// Settings given on the command line; `None` keeps the loaded value.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Flags {
        pub endpoint: Option<String>,
        pub method: Option<Method>,
        pub timeout_ms: Option<u64>,
        pub word: Option<String>,
        pub loops: Option<usize>,
        pub entries: Option<usize>,
        pub phases: Option<Phases>,
    }

    fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T> {
        value
            .trim()
            .parse()
            .map_err(|_| VectorError::InvalidConfig(format!("{} has invalid value `{}`", key, value)))
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::collections::HashMap;

        #[test]
        fn defaults_match_convert_service() {
            let cfg = W2vConfig::default();
            assert_eq!(cfg.client.endpoint, "http://127.0.0.1:3030/convert/");
            assert_eq!(cfg.client.method, Method::Get);
            assert_eq!(cfg.client.timeout_ms, None);
            assert_eq!(cfg.bench.loops, 10_000);
            assert_eq!(cfg.bench.entries, 10_000);
            assert!(cfg.validate().is_ok());
        }

        #[test]
        fn overrides_replace_fields() {
            let vars: HashMap<&str, &str> = [
                ("W2V_ENDPOINT", "http://localhost:3030/convert/"),
                ("W2V_METHOD", "POST"),
                ("W2V_LOOPS", "3"),
            ]
            .into_iter()
            .collect();
            let mut cfg = W2vConfig::default();
            cfg.apply_overrides(|k| vars.get(k).map(|v| v.to_string())).unwrap();
            assert_eq!(cfg.client.endpoint, "http://localhost:3030/convert/");
            assert_eq!(cfg.client.method, Method::Post);
            assert_eq!(cfg.bench.loops, 3);
            assert_eq!(cfg.bench.entries, DEFAULT_ENTRIES);
        }

        #[test]
        fn bad_override_is_an_error() {
            let mut cfg = W2vConfig::default();
            let err = cfg
                .apply_overrides(|k| (k == "W2V_LOOPS").then(|| "many".to_string()))
                .unwrap_err();
            assert!(matches!(err, VectorError::InvalidConfig(_)));
        }

        #[test]
        fn flags_beat_env_and_env_beats_defaults() {
            let vars: HashMap<&str, &str> = [("W2V_LOOPS", "7"), ("W2V_ENTRIES", "9"), ("W2V_METHOD", "post")]
                .into_iter()
                .collect();
            let mut cfg = W2vConfig::load_with(|k| vars.get(k).map(|v| v.to_string())).unwrap();
            cfg.apply_flags(&Flags { loops: Some(2), method: Some(Method::Get), ..Flags::default() });
            assert_eq!(cfg.bench.loops, 2);
            assert_eq!(cfg.client.method, Method::Get);
            assert_eq!(cfg.bench.entries, 9);
            assert_eq!(cfg.bench.word, DEFAULT_WORD);
            assert_eq!(cfg.client.endpoint, DEFAULT_ENDPOINT);
        }

        #[test]
        fn empty_flags_change_nothing() {
            let mut cfg = W2vConfig::default();
            cfg.apply_flags(&Flags::default());
            assert_eq!(cfg, W2vConfig::default());
        }

        #[test]
        fn zero_loops_rejected() {
            let mut cfg = W2vConfig::default();
            cfg.bench.loops = 0;
            assert!(cfg.validate().is_err());
        }
    }
}
