//! Runtime environment flags for the serving engine.
//!
//! The `envs` section is a small, fixed schema of named, typed, defaulted
//! flags. [`ENV_FLAGS`] is that schema; the validator walks it to check a
//! manifest and [`EnvConfig`] resolves it into concrete values.

use serde_yaml::{Mapping, Value};

use super::accessor::{as_integer, render};

/// Value type of an environment flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// YAML boolean.
    Bool,
    /// YAML integer.
    Integer,
    /// YAML string.
    String,
}

impl FlagKind {
    /// Returns the type name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Integer => "int",
            Self::String => "str",
        }
    }

    /// Converts a YAML value of exactly this kind. No coercion is applied.
    #[must_use]
    pub fn extract(self, value: &Value) -> Option<FlagValue> {
        match (self, value) {
            (Self::Bool, Value::Bool(b)) => Some(FlagValue::Bool(*b)),
            (Self::Integer, v @ Value::Number(_)) => as_integer(v)
                .and_then(|n| i64::try_from(n).ok())
                .map(FlagValue::Integer),
            (Self::String, Value::String(s)) => Some(FlagValue::Text(s.clone())),
            _ => None,
        }
    }
}

/// Built-in default of an optional flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagDefault {
    /// Boolean default.
    Bool(bool),
    /// Integer default.
    Integer(i64),
    /// String default.
    Text(&'static str),
}

/// A resolved flag value.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Integer(i64),
    /// String value.
    Text(String),
}

impl FlagValue {
    /// Keeps a YAML value with whatever scalar type it has. Null yields
    /// `None`; sequences, mappings and floats are kept as their YAML text.
    #[must_use]
    pub fn as_given(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::String(s) => Some(Self::Text(s.clone())),
            other => Some(
                as_integer(other)
                    .and_then(|n| i64::try_from(n).ok())
                    .map_or_else(|| Self::Text(render(other)), Self::Integer),
            ),
        }
    }
}

impl From<FlagDefault> for FlagValue {
    fn from(default: FlagDefault) -> Self {
        match default {
            FlagDefault::Bool(b) => Self::Bool(b),
            FlagDefault::Integer(n) => Self::Integer(n),
            FlagDefault::Text(s) => Self::Text(s.to_string()),
        }
    }
}

impl std::fmt::Display for FlagValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Schema entry for one flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvFlag {
    /// Flag name as written in the manifest.
    pub name: &'static str,
    /// Expected value type.
    pub kind: FlagKind,
    /// Default value; `None` marks a mandatory flag.
    pub default: Option<FlagDefault>,
}

impl EnvFlag {
    /// Returns true if the flag has no default.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Flags understood in the `envs` section, in display order.
pub const ENV_FLAGS: &[EnvFlag] = &[
    EnvFlag {
        name: "VLLM_USE_TRITON_FLASH_ATTN",
        kind: FlagKind::Bool,
        default: None,
    },
    EnvFlag {
        name: "VLLM_ROCM_USE_AITER",
        kind: FlagKind::Bool,
        default: None,
    },
    EnvFlag {
        name: "VLLM_ROCM_USE_AITER_LINEAR",
        kind: FlagKind::Bool,
        default: Some(FlagDefault::Bool(true)),
    },
    EnvFlag {
        name: "VLLM_ROCM_USE_AITER_MOE",
        kind: FlagKind::Bool,
        default: Some(FlagDefault::Bool(true)),
    },
    EnvFlag {
        name: "VLLM_ROCM_USE_AITER_FP8_BLOCK_SCALED_MOE",
        kind: FlagKind::Bool,
        default: Some(FlagDefault::Bool(false)),
    },
    EnvFlag {
        name: "VLLM_ROCM_USE_AITER_RMSNORM",
        kind: FlagKind::Bool,
        default: Some(FlagDefault::Bool(true)),
    },
    EnvFlag {
        name: "VLLM_WORKER_MULTIPROC_METHOD",
        kind: FlagKind::String,
        default: Some(FlagDefault::Text("spawn")),
    },
    EnvFlag {
        name: "VLLM_IMAGE_FETCH_TIMEOUT",
        kind: FlagKind::Integer,
        default: Some(FlagDefault::Integer(5)),
    },
    EnvFlag {
        name: "VLLM_VIDEO_FETCH_TIMEOUT",
        kind: FlagKind::Integer,
        default: Some(FlagDefault::Integer(30)),
    },
    EnvFlag {
        name: "VLLM_AUDIO_FETCH_TIMEOUT",
        kind: FlagKind::Integer,
        default: Some(FlagDefault::Integer(10)),
    },
    EnvFlag {
        name: "VLLM_RPC_TIMEOUT",
        kind: FlagKind::Integer,
        default: Some(FlagDefault::Integer(10000)),
    },
];

/// Looks up a flag in the schema.
#[must_use]
pub fn find_flag(name: &str) -> Option<&'static EnvFlag> {
    ENV_FLAGS.iter().find(|flag| flag.name == name)
}

/// Resolved environment flags, one entry per schema flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    values: Vec<(&'static str, FlagValue)>,
}

impl EnvConfig {
    /// Resolves every schema flag against an `envs` mapping.
    ///
    /// Present flags keep their value, including falsy ones such as `0` or
    /// `false`; absent flags take their default.
    ///
    /// # Errors
    ///
    /// Returns the offending flag name if a mandatory flag is absent or null,
    /// or an optional flag has the wrong type. Mandatory flags keep their
    /// value as written.
    pub fn resolve(section: &Mapping) -> Result<Self, &'static str> {
        let values = ENV_FLAGS
            .iter()
            .map(|flag| {
                let value = match section.get(flag.name) {
                    Some(raw) if flag.is_required() => FlagValue::as_given(raw),
                    Some(raw) => flag.kind.extract(raw),
                    None => flag.default.map(FlagValue::from),
                };
                value.map(|v| (flag.name, v)).ok_or(flag.name)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { values })
    }

    /// Returns the value of a flag.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.values
            .iter()
            .find(|(flag, _)| *flag == name)
            .map(|(_, value)| value)
    }

    /// Returns a boolean flag.
    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(FlagValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Returns an integer flag.
    #[must_use]
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(FlagValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    /// Returns a string flag.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(FlagValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Iterates over the resolved flags in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FlagValue)> {
        self.values.iter().map(|(name, value)| (*name, value))
    }

    /// Renders the flags as `NAME=value` pairs for a container environment.
    /// Booleans use the `1`/`0` spelling the engine reads.
    #[must_use]
    pub fn to_env_pairs(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(name, value)| {
                let rendered = match value {
                    FlagValue::Bool(b) => String::from(if *b { "1" } else { "0" }),
                    other => other.to_string(),
                };
                (name.to_string(), rendered)
            })
            .collect()
    }
}
