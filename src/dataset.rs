//! Datasets and variable selection.
//!
//! A dataset is an ordered collection of labeled variables read from one file.
//! Plotting works on a single 3D or 4D variable picked out of it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::array::{AttributeValue, LabeledArray};
use crate::coords::{normalize, CoordKind, CoordinateVocabulary};
use crate::error::{EcubevisError, Result};

/// An ordered collection of variables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// File-level attributes
    pub global_attributes: HashMap<String, AttributeValue>,
    /// Variables in file order
    pub variables: Vec<LabeledArray>,
}

/// Which variable of a dataset to plot.
///
/// In a config file: `"first"`, `{"index": 2}` or `{"name": "t2m"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableSelector {
    /// The first variable with at least three dimensions
    #[default]
    First,
    /// Position in file order
    Index(usize),
    /// Variable name
    Name(String),
}

impl FromStr for VariableSelector {
    type Err = std::convert::Infallible;

    /// A bare integer selects by position, anything else by name
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().parse::<usize>() {
            Ok(index) => VariableSelector::Index(index),
            Err(_) => VariableSelector::Name(s.trim().to_string()),
        })
    }
}

impl fmt::Display for VariableSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableSelector::First => f.write_str("first 3D/4D variable"),
            VariableSelector::Index(index) => write!(f, "variable #{}", index),
            VariableSelector::Name(name) => f.write_str(name),
        }
    }
}

impl Dataset {
    pub fn new(variables: Vec<LabeledArray>) -> Self {
        Self {
            global_attributes: HashMap::new(),
            variables,
        }
    }

    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }

    /// Get a variable by name
    pub fn get_variable(&self, name: &str) -> Option<&LabeledArray> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Resolve a selector to a variable
    pub fn select_variable(&self, selector: &VariableSelector) -> Result<&LabeledArray> {
        match selector {
            VariableSelector::First => self
                .variables
                .iter()
                .find(|v| v.ndim() >= 3)
                .ok_or_else(|| EcubevisError::DataNotFound {
                    message: format!(
                        "No variable with three or more dimensions among: {}",
                        self.variable_names().join(", ")
                    ),
                }),
            VariableSelector::Index(index) => {
                self.variables
                    .get(*index)
                    .ok_or_else(|| EcubevisError::DataNotFound {
                        message: format!(
                            "Variable index {} out of range, dataset has {} variables",
                            index,
                            self.variables.len()
                        ),
                    })
            }
            VariableSelector::Name(name) => {
                self.get_variable(name)
                    .ok_or_else(|| EcubevisError::DataNotFound {
                        message: format!("Variable not found: {}", name),
                    })
            }
        }
    }

    /// Normalize the coordinate names of every variable
    pub fn normalize(self, vocabulary: &CoordinateVocabulary) -> Result<Self> {
        let variables = self
            .variables
            .into_iter()
            .map(|v| normalize(v, vocabulary))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            global_attributes: self.global_attributes,
            variables,
        })
    }
}

/// Check that a normalized variable can be drawn as map panels: 3D or 4D with
/// `lat` and `lon` axes.
pub fn ensure_plottable(array: &LabeledArray) -> Result<()> {
    if !matches!(array.ndim(), 3 | 4) {
        return Err(EcubevisError::Dimensionality {
            variable: array.name.clone(),
            ndim: array.ndim(),
        });
    }
    for kind in [CoordKind::Lat, CoordKind::Lon] {
        if array.axis_of(kind.as_str()).is_none() {
            return Err(EcubevisError::DataNotFound {
                message: format!("Variable {} has no {} dimension", array.name, kind),
            });
        }
    }
    Ok(())
}
