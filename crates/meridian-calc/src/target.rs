//! Calculation targets and their runtime types.

use std::any::{type_name, Any, TypeId};
use std::fmt;

/// Something a calculation runs against, typically a trade.
///
/// Implemented for every `Debug + Send + Sync` type. Functions are selected
/// by the concrete type of the target, see [`TargetType`].
pub trait CalculationTarget: Any + fmt::Debug + Send + Sync {
    /// Returns the target as `Any`, for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns the runtime type of the target.
    fn target_type(&self) -> TargetType;
}

impl<T: Any + fmt::Debug + Send + Sync> CalculationTarget for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn target_type(&self) -> TargetType {
        TargetType::of::<T>()
    }
}

/// The concrete type of a calculation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetType {
    id: TypeId,
    name: &'static str,
}

impl TargetType {
    /// Returns the target type of `T`.
    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Returns the full type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the type name without its module path.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Downcasts a target to its concrete type.
///
/// # Errors
///
/// Returns an error naming both types if the target is not a `T`.
pub fn downcast_target<T: Any>(target: &dyn CalculationTarget) -> anyhow::Result<&T> {
    target.as_any().downcast_ref::<T>().ok_or_else(|| {
        anyhow::anyhow!(
            "Expected target of type {} but got {}",
            TargetType::of::<T>(),
            target.target_type()
        )
    })
}
