//! Kernel signatures and run-time arguments.
//!
//! Kernels themselves are built elsewhere. The aggregator only needs each
//! kernel's declared parameter list to reject bad invocations before a run is
//! dispatched: a wrong argument count is reported before any argument type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MeasureError, MeasureResult};

/// Declared type of a kernel parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamType {
    Float,
    Int,
    List,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Float => write!(f, "float"),
            ParamType::Int => write!(f, "int"),
            ParamType::List => write!(f, "list"),
        }
    }
}

/// A run-time argument value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArgValue {
    Float(f64),
    Int(i64),
    List(Vec<f64>),
}

impl ArgValue {
    /// Declared type this value carries.
    pub fn param_type(&self) -> ParamType {
        match self {
            ArgValue::Float(_) => ParamType::Float,
            ArgValue::Int(_) => ParamType::Int,
            ArgValue::List(_) => ParamType::List,
        }
    }

    /// Check whether this value may bind to a parameter of type `declared`.
    ///
    /// Integers widen to floats; nothing else converts.
    pub fn fits(&self, declared: ParamType) -> bool {
        matches!(
            (self, declared),
            (ArgValue::Float(_), ParamType::Float)
                | (ArgValue::Int(_), ParamType::Float | ParamType::Int)
                | (ArgValue::List(_), ParamType::List)
        )
    }

    /// Numeric value of a scalar argument.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Float(v) => Some(*v),
            ArgValue::Int(v) => Some(*v as f64),
            ArgValue::List(_) => None,
        }
    }

    /// Elements of a list argument.
    pub fn as_list(&self) -> Option<&[f64]> {
        match self {
            ArgValue::List(values) => Some(values),
            _ => None,
        }
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::Float(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<Vec<f64>> for ArgValue {
    fn from(values: Vec<f64>) -> Self {
        ArgValue::List(values)
    }
}

/// Name and ordered parameter types of a kernel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelSignature {
    name: String,
    params: Vec<ParamType>,
}

impl KernelSignature {
    /// Create a signature from the kernel name and its parameter types.
    pub fn new(name: impl Into<String>, params: impl IntoIterator<Item = ParamType>) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().collect(),
        }
    }

    /// Kernel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter types, in order.
    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    /// Check `args` against the declared parameters.
    pub fn validate(&self, args: &[ArgValue]) -> MeasureResult<()> {
        if args.len() != self.params.len() {
            return Err(MeasureError::ArgumentCountMismatch {
                kernel: self.name.clone(),
                expected: self.params.len(),
                found: args.len(),
            });
        }
        for (position, (arg, &declared)) in args.iter().zip(&self.params).enumerate() {
            if !arg.fits(declared) {
                return Err(MeasureError::ArgumentTypeMismatch {
                    kernel: self.name.clone(),
                    position,
                    expected: declared,
                    found: arg.param_type(),
                });
            }
        }
        Ok(())
    }
}

/// A compiled kernel the platform can dispatch.
pub trait Kernel: Send + Sync {
    /// Declared signature, checked before every run.
    fn signature(&self) -> &KernelSignature;

    fn name(&self) -> &str {
        self.signature().name()
    }
}

/// Shot setting of a run.
///
/// At the call boundary `-1` selects analytic mode; positive values are shot
/// counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shots {
    /// Sample this many times.
    Finite(u32),
    /// Compute expectation values exactly, without sampling.
    Analytic,
}

impl Shots {
    /// Call-boundary value selecting analytic mode.
    pub const ANALYTIC_MARKER: i64 = -1;

    /// Interpret a call-boundary shot count.
    pub fn from_count(count: i64) -> MeasureResult<Self> {
        if count == Self::ANALYTIC_MARKER {
            return Ok(Shots::Analytic);
        }
        match u32::try_from(count) {
            Ok(n) if n > 0 => Ok(Shots::Finite(n)),
            _ => Err(MeasureError::InvalidShots(format!(
                "expected a positive shot count or {}, got {count}",
                Self::ANALYTIC_MARKER
            ))),
        }
    }

    /// Shot count, `None` in analytic mode.
    pub fn count(&self) -> Option<u32> {
        match self {
            Shots::Finite(n) => Some(*n),
            Shots::Analytic => None,
        }
    }

    /// Check whether this is analytic mode.
    pub fn is_analytic(&self) -> bool {
        matches!(self, Shots::Analytic)
    }
}
