//! Calculation parameters: typed, optional inputs to calculation functions.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// A parameter passed to calculation functions.
///
/// Parameters are keyed by their concrete type, so a set holds at most one
/// parameter of each type.
pub trait CalculationParameter: Any + fmt::Debug + Send + Sync {
    /// Returns the parameter as `Any`, for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// A set of calculation parameters, at most one per type.
#[derive(Debug, Clone, Default)]
pub struct CalculationParameters {
    parameters: HashMap<TypeId, Arc<dyn CalculationParameter>>,
}

impl CalculationParameters {
    /// Creates an empty set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a copy with a parameter added, replacing one of the same type.
    #[must_use]
    pub fn with<P: CalculationParameter>(&self, parameter: P) -> Self {
        let mut parameters = self.parameters.clone();
        parameters.insert(TypeId::of::<P>(), Arc::new(parameter));
        Self { parameters }
    }

    /// Finds the parameter of type `P`.
    #[must_use]
    pub fn find<P: CalculationParameter>(&self) -> Option<&P> {
        self.parameters
            .get(&TypeId::of::<P>())
            .and_then(|p| p.as_any().downcast_ref::<P>())
    }

    /// Checks if a parameter of type `P` is present.
    #[must_use]
    pub fn contains<P: CalculationParameter>(&self) -> bool {
        self.parameters.contains_key(&TypeId::of::<P>())
    }

    /// Combines two sets; where both hold a type, this set's parameter wins.
    #[must_use]
    pub fn combined_with(&self, other: &CalculationParameters) -> Self {
        let mut parameters = other.parameters.clone();
        parameters.extend(self.parameters.iter().map(|(k, v)| (*k, v.clone())));
        Self { parameters }
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Checks if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

/// String arguments configured on a function group, such as a bump size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionArguments {
    arguments: BTreeMap<String, String>,
}

impl CalculationParameter for FunctionArguments {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl FunctionArguments {
    /// Creates an empty set of arguments.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates arguments from pairs.
    #[must_use]
    pub fn of<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            arguments: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Returns a copy with an argument set.
    #[must_use]
    pub fn with(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut arguments = self.arguments.clone();
        arguments.insert(key.into(), value.into());
        Self { arguments }
    }

    /// Returns an argument.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).map(String::as_str)
    }

    /// Returns an argument parsed as a number, or `default` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument is present but not a number.
    pub fn get_f64(&self, key: &str, default: f64) -> anyhow::Result<f64> {
        match self.get(key) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("Argument '{key}' is not a number: '{value}'")),
            None => Ok(default),
        }
    }

    /// Returns the arguments.
    #[must_use]
    pub fn arguments(&self) -> &BTreeMap<String, String> {
        &self.arguments
    }

    /// Checks if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }
}
