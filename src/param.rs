//! Typed, self-describing strategy parameters.
//!
//! Each strategy declares its tunables as [`ParamSpec`]s — name, type,
//! default, bounds, required flag — and receives a merged [`ParamSet`] at
//! initialization. The set is backed by a `BTreeMap`, so iteration order
//! is lexicographic by key and the key built by [`ParamSet::cache_key`]
//! is order-independent by construction.
//!
//! Parameter names are the documented contract surface and keep their
//! camelCase spelling (`maxIterations`, `timeLimitMs`, ...).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A parameter value.
///
/// Integers are accepted wherever a float is declared; no other implicit
/// conversions are performed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Text value (also used for enumerated choices like `FAIRNESS`).
    Text(String),
}

impl ParamValue {
    /// Numeric view, if this value is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view, if this value is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Text view, if this value is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Short name of the value's type, for diagnostics.
    fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
        }
    }

    /// Whether `self` is acceptable where `declared` is the declared kind.
    fn matches_kind(&self, declared: &ParamValue) -> bool {
        matches!(
            (self, declared),
            (Self::Int(_), Self::Int(_))
                | (Self::Float(_), Self::Float(_))
                | (Self::Int(_), Self::Float(_))
                | (Self::Bool(_), Self::Bool(_))
                | (Self::Text(_), Self::Text(_))
        )
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Declared metadata for one strategy parameter.
///
/// Owned by a strategy's descriptor; immutable.
#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    /// Contract-surface parameter name (camelCase).
    pub name: &'static str,
    /// Human-readable display name.
    pub display_name: &'static str,
    /// What the parameter controls.
    pub description: &'static str,
    /// Default value; also fixes the declared type.
    pub default: ParamValue,
    /// Lower bound (inclusive), for ordinal parameters.
    pub min: Option<ParamValue>,
    /// Upper bound (inclusive), for ordinal parameters.
    pub max: Option<ParamValue>,
    /// Whether the caller must supply this parameter explicitly.
    pub required: bool,
}

impl ParamSpec {
    /// Creates an optional, unbounded spec.
    pub fn new(
        name: &'static str,
        display_name: &'static str,
        description: &'static str,
        default: ParamValue,
    ) -> Self {
        Self {
            name,
            display_name,
            description,
            default,
            min: None,
            max: None,
            required: false,
        }
    }

    /// Sets inclusive bounds.
    pub fn with_bounds(mut self, min: impl Into<ParamValue>, max: impl Into<ParamValue>) -> Self {
        self.min = Some(min.into());
        self.max = Some(max.into());
        self
    }

    /// Marks the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// An ordered name → value parameter map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSet {
    values: BTreeMap<String, ParamValue>,
}

impl ParamSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the default set declared by a list of specs.
    pub fn defaults_of(specs: &[ParamSpec]) -> Self {
        let mut set = Self::new();
        for spec in specs {
            set.values.insert(spec.name.to_string(), spec.default.clone());
        }
        set
    }

    /// Inserts a value, replacing any existing one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Looks up a value.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Integer accessor with fallback.
    pub fn get_i64(&self, name: &str, default: i64) -> i64 {
        self.get(name).and_then(ParamValue::as_i64).unwrap_or(default)
    }

    /// Numeric accessor with fallback.
    pub fn get_f64(&self, name: &str, default: f64) -> f64 {
        self.get(name).and_then(ParamValue::as_f64).unwrap_or(default)
    }

    /// Text accessor with fallback.
    pub fn get_str<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).and_then(ParamValue::as_str).unwrap_or(default)
    }

    /// Whether the set holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterates entries in lexicographic key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overlays `self` on top of `defaults`: declared defaults with the
    /// caller-supplied keys overriding, unspecified keys falling back.
    pub fn merge_over(&self, defaults: &ParamSet) -> ParamSet {
        let mut merged = defaults.clone();
        for (k, v) in &self.values {
            merged.values.insert(k.clone(), v.clone());
        }
        merged
    }

    /// Deterministic cache key: the type tag followed by `key=value;` for
    /// each entry in lexicographic key order.
    ///
    /// Two sets differing only in insertion order produce the same key.
    pub fn cache_key(&self, kind: &str) -> String {
        let mut key = String::from(kind);
        key.push(':');
        for (k, v) in &self.values {
            key.push_str(k);
            key.push('=');
            key.push_str(&v.to_string());
            key.push(';');
        }
        key
    }
}

impl FromIterator<(String, ParamValue)> for ParamSet {
    fn from_iter<T: IntoIterator<Item = (String, ParamValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Outcome of checking a parameter set against declared specs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether the set is acceptable (no fatal error).
    pub valid: bool,
    /// The fatal error, if any. Validation stops at the first one.
    pub error: Option<String>,
    /// Non-fatal findings, in discovery order.
    pub warnings: Vec<String>,
    /// Diagnostic key → value detail map.
    pub details: BTreeMap<String, String>,
}

impl ValidationReport {
    /// A passing report.
    pub fn ok() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    /// A failing report with a fatal message.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Appends a non-fatal warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Validates caller-supplied parameters against declared specs.
///
/// Fatal (run never starts): missing required parameter, type mismatch,
/// value outside declared bounds. Boundary values are accepted.
/// Non-fatal warning: a key no spec declares.
pub fn validate_against(specs: &[ParamSpec], params: &ParamSet) -> ValidationReport {
    let mut report = ValidationReport::ok();

    for spec in specs {
        if spec.required && params.get(spec.name).is_none() {
            return ValidationReport::fatal(format!("missing required parameter `{}`", spec.name));
        }
    }

    for (name, value) in params.iter() {
        let Some(spec) = specs.iter().find(|s| s.name == name) else {
            report.warn(format!("unknown parameter `{name}` ignored"));
            continue;
        };

        if !value.matches_kind(&spec.default) {
            return ValidationReport::fatal(format!(
                "parameter `{name}` expects {}, got {}",
                spec.default.type_name(),
                value.type_name()
            ));
        }

        if let Some(v) = value.as_f64() {
            if let Some(min) = spec.min.as_ref().and_then(ParamValue::as_f64) {
                if v < min {
                    return ValidationReport::fatal(format!(
                        "parameter `{name}` = {v} is below the minimum {min}"
                    ));
                }
            }
            if let Some(max) = spec.max.as_ref().and_then(ParamValue::as_f64) {
                if v > max {
                    return ValidationReport::fatal(format!(
                        "parameter `{name}` = {v} is above the maximum {max}"
                    ));
                }
            }
        }
    }

    report
        .details
        .insert("parametersChecked".into(), params.len().to_string());
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::new("maxIterations", "Max iterations", "Iteration cap", 1000i64.into())
                .with_bounds(1i64, 100_000i64),
            ParamSpec::new("crossoverRate", "Crossover rate", "Pair recombination probability", 0.8.into())
                .with_bounds(0.0, 1.0),
            ParamSpec::new("priorityStrategy", "Priority strategy", "Slot ordering rule", "FAIRNESS".into()),
        ]
    }

    #[test]
    fn test_defaults_of() {
        let d = ParamSet::defaults_of(&specs());
        assert_eq!(d.get_i64("maxIterations", 0), 1000);
        assert!((d.get_f64("crossoverRate", 0.0) - 0.8).abs() < 1e-12);
        assert_eq!(d.get_str("priorityStrategy", ""), "FAIRNESS");
    }

    #[test]
    fn test_merge_over_defaults() {
        let d = ParamSet::defaults_of(&specs());
        let overrides = ParamSet::new().with("maxIterations", 50i64);
        let merged = overrides.merge_over(&d);

        assert_eq!(merged.get_i64("maxIterations", 0), 50);
        // Unspecified keys fall back to declared defaults.
        assert!((merged.get_f64("crossoverRate", 0.0) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_cache_key_is_sorted() {
        let a = ParamSet::new()
            .with("timeLimitMs", 30_000i64)
            .with("maxIterations", 1000i64);
        let b = ParamSet::new()
            .with("maxIterations", 1000i64)
            .with("timeLimitMs", 30_000i64);

        assert_eq!(a.cache_key("GREEDY"), b.cache_key("GREEDY"));
        assert_eq!(
            a.cache_key("GREEDY"),
            "GREEDY:maxIterations=1000;timeLimitMs=30000;"
        );
    }

    #[test]
    fn test_validate_in_bounds() {
        let p = ParamSet::new().with("crossoverRate", 0.5);
        let report = validate_against(&specs(), &p);
        assert!(report.valid);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_validate_boundary_accepted() {
        for v in [0.0, 1.0] {
            let p = ParamSet::new().with("crossoverRate", v);
            assert!(validate_against(&specs(), &p).valid, "boundary {v} rejected");
        }
    }

    #[test]
    fn test_validate_out_of_bounds_fatal() {
        let p = ParamSet::new().with("crossoverRate", 1.5);
        let report = validate_against(&specs(), &p);
        assert!(!report.valid);
        assert!(report.error.unwrap().contains("crossoverRate"));
    }

    #[test]
    fn test_validate_type_mismatch_fatal() {
        let p = ParamSet::new().with("maxIterations", "lots");
        let report = validate_against(&specs(), &p);
        assert!(!report.valid);
    }

    #[test]
    fn test_int_accepted_for_float() {
        let p = ParamSet::new().with("crossoverRate", 1i64);
        assert!(validate_against(&specs(), &p).valid);
    }

    #[test]
    fn test_unknown_key_warns() {
        let p = ParamSet::new().with("turboMode", true);
        let report = validate_against(&specs(), &p);
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("turboMode"));
    }

    #[test]
    fn test_required_missing_fatal() {
        let specs = vec![ParamSpec::new("seed", "Seed", "RNG seed", 0i64.into()).required()];
        let report = validate_against(&specs, &ParamSet::new());
        assert!(!report.valid);
    }

    proptest! {
        // Cache keys ignore insertion order: any permutation of the same
        // entries yields the same key.
        #[test]
        fn prop_cache_key_order_independent(perm in proptest::sample::subsequence(
            vec![
                ("alpha", 1i64), ("beta", 2), ("gamma", 3), ("delta", 4), ("epsilon", 5),
            ],
            0..=5,
        )) {
            let forward: ParamSet = perm
                .iter()
                .map(|(k, v)| (k.to_string(), ParamValue::Int(*v)))
                .collect();
            let reverse: ParamSet = perm
                .iter()
                .rev()
                .map(|(k, v)| (k.to_string(), ParamValue::Int(*v)))
                .collect();
            prop_assert_eq!(forward.cache_key("T"), reverse.cache_key("T"));
        }
    }
}
