// photo-gate-core/src/core/params.rs
// ============================================================================
// Module: Parameter Schemas
// Description: Typed parameter descriptors and values for check configuration.
// Purpose: Replace duck-typed parameter dictionaries with validated tagged unions.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Every configurable value a check exposes is described by a
//! [`ParameterSpec`]: a kind tag, a default, optional numeric bounds, and an
//! optional enumerated choice set. Values are a closed [`ParameterValue`]
//! union validated exhaustively at configuration-load time; nothing in the
//! runtime probes value shapes dynamically.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Parameter Kinds and Values
// ============================================================================

/// Kind tag for a configurable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// Boolean flag.
    Bool,
    /// Signed integer.
    Int,
    /// Floating point value.
    Float,
    /// String value.
    Str,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
        };
        f.write_str(label)
    }
}

/// A concrete parameter value.
///
/// Serialized untagged so configuration documents carry plain scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    Str(String),
}

impl ParameterValue {
    /// Returns the kind tag of this value.
    #[must_use]
    pub const fn kind(&self) -> ParameterKind {
        match self {
            Self::Bool(_) => ParameterKind::Bool,
            Self::Int(_) => ParameterKind::Int,
            Self::Float(_) => ParameterKind::Float,
            Self::Str(_) => ParameterKind::Str,
        }
    }

    /// Returns true when the value is admissible for the declared kind.
    ///
    /// Integers are admissible where a float kind is declared; no other
    /// cross-kind coercion exists.
    #[must_use]
    pub const fn matches_kind(&self, kind: ParameterKind) -> bool {
        match (self, kind) {
            (Self::Bool(_), ParameterKind::Bool)
            | (Self::Int(_), ParameterKind::Int | ParameterKind::Float)
            | (Self::Float(_), ParameterKind::Float)
            | (Self::Str(_), ParameterKind::Str) => true,
            _ => false,
        }
    }

    /// Returns the value as a float when numeric.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Bool(_) | Self::Str(_) => None,
        }
    }

    /// Returns the value as an integer when it is one.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value as a boolean when it is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value as a string slice when it is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => value.fmt(f),
            Self::Int(value) => value.fmt(f),
            Self::Float(value) => value.fmt(f),
            Self::Str(value) => f.write_str(value),
        }
    }
}

// ============================================================================
// SECTION: Parameter Specification
// ============================================================================

/// Declarative specification for a single configurable parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name, unique within a check.
    pub name: String,
    /// Kind tag values must satisfy.
    pub kind: ParameterKind,
    /// Default value applied when configuration omits the parameter.
    ///
    /// A required parameter may omit its default, in which case every
    /// configuration must supply a value explicitly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParameterValue>,
    /// Inclusive lower bound for numeric kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound for numeric kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Enumerated allowed values, when constrained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<ParameterValue>>,
    /// Whether configuration must carry the parameter explicitly.
    pub required: bool,
    /// Human-readable description for configuration surfaces.
    pub description: String,
}

impl ParameterSpec {
    /// Validates internal consistency of the specification.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterSpecError`] when the default violates its own
    /// bounds or choices, or when bounds are declared for a non-numeric kind.
    pub fn validate(&self) -> Result<(), ParameterSpecError> {
        if self.name.trim().is_empty() {
            return Err(ParameterSpecError::EmptyName);
        }
        let numeric = matches!(self.kind, ParameterKind::Int | ParameterKind::Float);
        if !numeric && (self.min.is_some() || self.max.is_some()) {
            return Err(ParameterSpecError::BoundsOnNonNumeric {
                name: self.name.clone(),
            });
        }
        if let (Some(min), Some(max)) = (self.min, self.max)
            && min > max
        {
            return Err(ParameterSpecError::InvertedBounds {
                name: self.name.clone(),
                min,
                max,
            });
        }
        if let Some(choices) = &self.choices {
            if choices.is_empty() {
                return Err(ParameterSpecError::EmptyChoices {
                    name: self.name.clone(),
                });
            }
            for choice in choices {
                if !choice.matches_kind(self.kind) {
                    return Err(ParameterSpecError::ChoiceKindMismatch {
                        name: self.name.clone(),
                        kind: self.kind,
                    });
                }
            }
        }
        match &self.default {
            Some(default) => {
                self.admit(default).map_err(|violation| ParameterSpecError::InvalidDefault {
                    name: self.name.clone(),
                    violation,
                })
            }
            None if !self.required => Err(ParameterSpecError::OptionalWithoutDefault {
                name: self.name.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Checks a candidate value against kind, bounds, and choices.
    ///
    /// # Errors
    ///
    /// Returns [`ValueViolation`] naming the first constraint the value breaks.
    pub fn admit(&self, value: &ParameterValue) -> Result<(), ValueViolation> {
        if !value.matches_kind(self.kind) {
            return Err(ValueViolation::KindMismatch {
                expected: self.kind,
                found: value.kind(),
            });
        }
        if let Some(numeric) = value.as_f64() {
            if let Some(min) = self.min
                && numeric < min
            {
                return Err(ValueViolation::BelowMin {
                    min,
                });
            }
            if let Some(max) = self.max
                && numeric > max
            {
                return Err(ValueViolation::AboveMax {
                    max,
                });
            }
        }
        if let Some(choices) = &self.choices
            && !choices.contains(value)
        {
            return Err(ValueViolation::NotInChoices);
        }
        Ok(())
    }
}

/// Constraint violation for a single candidate value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueViolation {
    /// Value kind does not match the declared kind.
    #[error("expected {expected}, got {found}")]
    KindMismatch {
        /// Declared kind.
        expected: ParameterKind,
        /// Kind of the offered value.
        found: ParameterKind,
    },
    /// Numeric value is below the inclusive minimum.
    #[error("value below minimum {min}")]
    BelowMin {
        /// Inclusive lower bound.
        min: f64,
    },
    /// Numeric value is above the inclusive maximum.
    #[error("value above maximum {max}")]
    AboveMax {
        /// Inclusive upper bound.
        max: f64,
    },
    /// Value is not a member of the enumerated choices.
    #[error("value is not an allowed choice")]
    NotInChoices,
}

/// Parameter specification errors surfaced at discovery time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterSpecError {
    /// Parameter name is empty.
    #[error("parameter name must not be empty")]
    EmptyName,
    /// Bounds declared on a non-numeric kind.
    #[error("parameter {name} declares bounds on a non-numeric kind")]
    BoundsOnNonNumeric {
        /// Offending parameter name.
        name: String,
    },
    /// Minimum exceeds maximum.
    #[error("parameter {name} bounds inverted: min {min} > max {max}")]
    InvertedBounds {
        /// Offending parameter name.
        name: String,
        /// Declared minimum.
        min: f64,
        /// Declared maximum.
        max: f64,
    },
    /// Choice set is empty.
    #[error("parameter {name} declares an empty choice set")]
    EmptyChoices {
        /// Offending parameter name.
        name: String,
    },
    /// A choice does not match the declared kind.
    #[error("parameter {name} has a choice that does not match kind {kind}")]
    ChoiceKindMismatch {
        /// Offending parameter name.
        name: String,
        /// Declared kind.
        kind: ParameterKind,
    },
    /// Default violates the parameter's own constraints.
    #[error("parameter {name} default is invalid: {violation}")]
    InvalidDefault {
        /// Offending parameter name.
        name: String,
        /// Constraint the default breaks.
        violation: ValueViolation,
    },
    /// Optional parameter omits a default, leaving it unresolvable.
    #[error("optional parameter {name} must declare a default")]
    OptionalWithoutDefault {
        /// Offending parameter name.
        name: String,
    },
}

// ============================================================================
// SECTION: Resolved Parameters
// ============================================================================

/// Effective parameter set handed to a check at evaluation time.
///
/// Built by overlaying validated configuration values onto the descriptor
/// defaults, so every declared parameter is present exactly once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedParams {
    /// Effective values keyed by parameter name.
    values: BTreeMap<String, ParameterValue>,
}

impl ResolvedParams {
    /// Overlays configured values onto the declared defaults.
    ///
    /// A required parameter without a default that is also absent from
    /// `overrides` is left unresolved; configuration validation rejects that
    /// combination before evaluation can observe it.
    #[must_use]
    pub fn resolve(
        specs: &[ParameterSpec],
        overrides: &BTreeMap<String, ParameterValue>,
    ) -> Self {
        let mut values = BTreeMap::new();
        for spec in specs {
            let value = overrides.get(&spec.name).or(spec.default.as_ref());
            if let Some(value) = value {
                values.insert(spec.name.clone(), value.clone());
            }
        }
        Self {
            values,
        }
    }

    /// Returns the raw value for a parameter, when declared.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    /// Returns a boolean parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ParamAccessError`] when the parameter is undeclared or of
    /// another kind.
    pub fn bool(&self, name: &str) -> Result<bool, ParamAccessError> {
        self.get(name)
            .ok_or_else(|| ParamAccessError::Undeclared(name.to_string()))?
            .as_bool()
            .ok_or_else(|| ParamAccessError::WrongKind(name.to_string()))
    }

    /// Returns an integer parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ParamAccessError`] when the parameter is undeclared or of
    /// another kind.
    pub fn int(&self, name: &str) -> Result<i64, ParamAccessError> {
        self.get(name)
            .ok_or_else(|| ParamAccessError::Undeclared(name.to_string()))?
            .as_i64()
            .ok_or_else(|| ParamAccessError::WrongKind(name.to_string()))
    }

    /// Returns a float parameter, accepting declared integers.
    ///
    /// # Errors
    ///
    /// Returns [`ParamAccessError`] when the parameter is undeclared or
    /// non-numeric.
    pub fn float(&self, name: &str) -> Result<f64, ParamAccessError> {
        self.get(name)
            .ok_or_else(|| ParamAccessError::Undeclared(name.to_string()))?
            .as_f64()
            .ok_or_else(|| ParamAccessError::WrongKind(name.to_string()))
    }

    /// Returns a string parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ParamAccessError`] when the parameter is undeclared or of
    /// another kind.
    pub fn str(&self, name: &str) -> Result<&str, ParamAccessError> {
        self.get(name)
            .ok_or_else(|| ParamAccessError::Undeclared(name.to_string()))?
            .as_str()
            .ok_or_else(|| ParamAccessError::WrongKind(name.to_string()))
    }

    /// Serializes the effective values for diagnostic payloads.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.values).unwrap_or(serde_json::Value::Null)
    }
}

/// Access error for a resolved parameter lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamAccessError {
    /// Parameter is not declared by the check descriptor.
    #[error("parameter not declared: {0}")]
    Undeclared(String),
    /// Parameter exists but carries a different kind.
    #[error("parameter has unexpected kind: {0}")]
    WrongKind(String),
}
