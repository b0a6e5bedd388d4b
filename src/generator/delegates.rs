//! Delegate-type selection for callback slots.
//!
//! The platform provides two fixed-arity delegate families: `Action` (no result, 0 to 16
//! parameters) and `Func` (a result plus 0 to 16 parameters, arity 1 to 17). Selection is a pure
//! function of the parameter count and whether a result is produced; the concrete parameter types
//! never influence it.

use crate::Error;

/// Largest number of parameters either delegate family accepts
pub const MAX_DELEGATE_PARAMETERS: usize = 16;

/// The `Action` family, indexed by arity
const ACTION_FAMILY: [&str; MAX_DELEGATE_PARAMETERS + 1] = [
    "System.Action",
    "System.Action`1",
    "System.Action`2",
    "System.Action`3",
    "System.Action`4",
    "System.Action`5",
    "System.Action`6",
    "System.Action`7",
    "System.Action`8",
    "System.Action`9",
    "System.Action`10",
    "System.Action`11",
    "System.Action`12",
    "System.Action`13",
    "System.Action`14",
    "System.Action`15",
    "System.Action`16",
];

/// The `Func` family, indexed by arity minus one
const FUNC_FAMILY: [&str; MAX_DELEGATE_PARAMETERS + 1] = [
    "System.Func`1",
    "System.Func`2",
    "System.Func`3",
    "System.Func`4",
    "System.Func`5",
    "System.Func`6",
    "System.Func`7",
    "System.Func`8",
    "System.Func`9",
    "System.Func`10",
    "System.Func`11",
    "System.Func`12",
    "System.Func`13",
    "System.Func`14",
    "System.Func`15",
    "System.Func`16",
    "System.Func`17",
];

/// A member of one of the delegate families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelegateShape {
    /// The parameterless `System.Action`
    Action,
    /// ``System.Action`N`` for `N` parameters
    ActionOf(usize),
    /// ``System.Func`N``: `N - 1` parameters followed by the result type
    FuncOf(usize),
}

/// A signature needs more delegate parameters than the platform provides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArityExceeded {
    /// The generic arity that would be required
    pub arity: usize,
    /// The largest arity of the family that was asked for
    pub max: usize,
}

impl ArityExceeded {
    /// Attach the hub and method this selection was made for
    #[must_use]
    pub fn into_error(self, hub: &str, method: &str) -> Error {
        Error::Arity {
            hub: hub.to_string(),
            method: method.to_string(),
            arity: self.arity,
            max: self.max,
        }
    }
}

impl DelegateShape {
    /// Select the family member for a signature.
    ///
    /// | parameters | result | selection |
    /// |------------|--------|-----------|
    /// | 0          | no     | `Action` |
    /// | N          | no     | ``Action`N`` |
    /// | N          | yes    | ``Func`N+1`` |
    ///
    /// # Errors
    /// Returns [`ArityExceeded`] if `param_count` is above [`MAX_DELEGATE_PARAMETERS`].
    pub fn select(param_count: usize, has_return: bool) -> Result<Self, ArityExceeded> {
        if param_count > MAX_DELEGATE_PARAMETERS {
            return Err(if has_return {
                ArityExceeded {
                    arity: param_count + 1,
                    max: MAX_DELEGATE_PARAMETERS + 1,
                }
            } else {
                ArityExceeded {
                    arity: param_count,
                    max: MAX_DELEGATE_PARAMETERS,
                }
            });
        }

        Ok(match (param_count, has_return) {
            (0, false) => DelegateShape::Action,
            (count, false) => DelegateShape::ActionOf(count),
            (count, true) => DelegateShape::FuncOf(count + 1),
        })
    }

    /// Generic arity of the selected delegate type
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            DelegateShape::Action => 0,
            DelegateShape::ActionOf(arity) | DelegateShape::FuncOf(arity) => *arity,
        }
    }

    /// Canonical metadata name of the delegate type, `None` for arities the platform lacks
    #[must_use]
    pub fn metadata_name(&self) -> Option<&'static str> {
        match self {
            DelegateShape::Action => Some(ACTION_FAMILY[0]),
            DelegateShape::ActionOf(arity) if *arity > 0 => ACTION_FAMILY.get(*arity).copied(),
            DelegateShape::FuncOf(arity) if *arity > 0 => FUNC_FAMILY.get(*arity - 1).copied(),
            _ => None,
        }
    }

    /// Every member of both families
    pub fn all() -> impl Iterator<Item = DelegateShape> {
        std::iter::once(DelegateShape::Action)
            .chain((1..=MAX_DELEGATE_PARAMETERS).map(DelegateShape::ActionOf))
            .chain((1..=MAX_DELEGATE_PARAMETERS + 1).map(DelegateShape::FuncOf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_table() {
        assert_eq!(DelegateShape::select(0, false), Ok(DelegateShape::Action));
        assert_eq!(DelegateShape::select(3, false), Ok(DelegateShape::ActionOf(3)));
        assert_eq!(DelegateShape::select(0, true), Ok(DelegateShape::FuncOf(1)));
        assert_eq!(DelegateShape::select(1, true), Ok(DelegateShape::FuncOf(2)));
        assert_eq!(DelegateShape::select(16, true), Ok(DelegateShape::FuncOf(17)));
        assert_eq!(DelegateShape::select(16, false), Ok(DelegateShape::ActionOf(16)));
    }

    #[test]
    fn test_selection_ceiling() {
        assert_eq!(
            DelegateShape::select(17, true),
            Err(ArityExceeded { arity: 18, max: 17 })
        );
        assert_eq!(
            DelegateShape::select(17, false),
            Err(ArityExceeded { arity: 17, max: 16 })
        );
    }

    #[test]
    fn test_metadata_names() {
        assert_eq!(DelegateShape::Action.metadata_name(), Some("System.Action"));
        assert_eq!(
            DelegateShape::ActionOf(2).metadata_name(),
            Some("System.Action`2")
        );
        assert_eq!(
            DelegateShape::FuncOf(17).metadata_name(),
            Some("System.Func`17")
        );
        assert_eq!(DelegateShape::FuncOf(18).metadata_name(), None);
        assert_eq!(DelegateShape::ActionOf(0).metadata_name(), None);
        assert_eq!(DelegateShape::FuncOf(0).metadata_name(), None);
    }

    #[test]
    fn test_all_members_named() {
        let all: Vec<DelegateShape> = DelegateShape::all().collect();
        assert_eq!(all.len(), 34);
        assert!(all.iter().all(|shape| shape.metadata_name().is_some()));
        assert!(all.iter().all(|shape| {
            let name = shape.metadata_name().unwrap_or_default();
            shape.arity() == 0 || name.ends_with(&format!("`{}", shape.arity()))
        }));
    }

    #[test]
    fn test_error_names_method() {
        let error = ArityExceeded { arity: 18, max: 17 }.into_error("Chat.WideHub", "Broadcast");
        assert!(matches!(
            error,
            Error::Arity { ref hub, ref method, arity: 18, max: 17 }
                if hub == "Chat.WideHub" && method == "Broadcast"
        ));
    }
}
