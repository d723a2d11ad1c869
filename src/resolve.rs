//! Type-directed binding resolution over a tuple ancestry.

use std::fmt;

use crate::types::{BindingNotFound, TupleRef, TypeMismatch};

/// Find the tuple a condition with the given required binding types must be
/// evaluated against.
///
/// With no required types the tuple is returned unchanged. Otherwise leading
/// empty-handle placeholders are skipped and the ancestry is walked toward
/// the root; the closest tuple whose fact type is required wins.
///
/// # Errors
///
/// Returns [`BindingNotFound`] when the walk reaches the root without a
/// match. `condition` only labels the error.
pub fn resolve_binding<'a>(
    tuple: TupleRef<'a>,
    required: &[String],
    condition: &dyn fmt::Display,
) -> Result<TupleRef<'a>, BindingNotFound> {
    resolve(tuple, required, condition).map(|(resolved, _)| resolved)
}

/// Resolution plus the diagnostic raised when the first examined tuple does
/// not carry a required type.
pub(crate) fn resolve<'a>(
    tuple: TupleRef<'a>,
    required: &[String],
    condition: &dyn fmt::Display,
) -> Result<(TupleRef<'a>, Option<TypeMismatch>), BindingNotFound> {
    if required.is_empty() {
        return Ok((tuple, None));
    }

    let not_found = || BindingNotFound {
        tuple: tuple.id(),
        required: required.to_vec(),
        condition: condition.to_string(),
    };
    let is_required = |t: &TupleRef<'_>| {
        t.fact_type()
            .is_some_and(|ty| required.iter().any(|r| r == ty))
    };

    let start = tuple.skip_empty_handles().ok_or_else(not_found)?;

    // Only the first examined tuple is reported; deeper misses are expected.
    let mismatch = if is_required(&start) {
        None
    } else {
        let found = start.fact_type().unwrap_or_default().to_owned();
        tracing::warn!(
            tuple = %start.id(),
            found = %found,
            required = ?required,
            "tuple type mismatch for required declarations"
        );
        Some(TypeMismatch {
            tuple: start.id(),
            found,
            required: required.to_vec(),
        })
    };

    for candidate in start.ancestors() {
        if is_required(&candidate) {
            return Ok((candidate, mismatch));
        }
        tracing::debug!(
            tuple = %candidate.id(),
            fact_type = candidate.fact_type().unwrap_or("<empty>"),
            required = ?required,
            "walking to parent tuple"
        );
    }

    Err(not_found())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Fact, FactHandle, FactId, TupleArena, TupleId};

    fn handle(id: u64, type_name: &str) -> FactHandle {
        FactHandle::new(FactId::new(id), Fact::new(type_name))
    }

    fn required(types: &[&str]) -> Vec<String> {
        types.iter().map(|&t| t.to_owned()).collect()
    }

    /// Order -> LineItem, returning (arena, order, item).
    fn order_item() -> (TupleArena, TupleId, TupleId) {
        let mut arena = TupleArena::new();
        let order = arena.root(handle(1, "Order"));
        let item = arena.extend(order, handle(2, "LineItem")).unwrap();
        (arena, order, item)
    }

    #[test]
    fn empty_requirement_uses_tuple_as_given() {
        let mut arena = TupleArena::new();
        let root = arena.root(handle(1, "Order"));
        let empty = arena.placeholder(Some(root)).unwrap();

        let (resolved, mismatch) = resolve(arena.get(empty).unwrap(), &[], &"c").unwrap();
        assert_eq!(resolved.id(), empty);
        assert!(mismatch.is_none());
    }

    #[test]
    fn direct_match_has_no_diagnostic() {
        let (arena, _, item) = order_item();
        let (resolved, mismatch) =
            resolve(arena.get(item).unwrap(), &required(&["LineItem"]), &"c").unwrap();
        assert_eq!(resolved.id(), item);
        assert!(mismatch.is_none());
    }

    #[test]
    fn walks_to_ancestor_and_reports_first_mismatch() {
        let (arena, order, item) = order_item();
        let (resolved, mismatch) =
            resolve(arena.get(item).unwrap(), &required(&["Order"]), &"c").unwrap();
        assert_eq!(resolved.id(), order);
        assert_eq!(
            mismatch,
            Some(TypeMismatch {
                tuple: item,
                found: "LineItem".into(),
                required: required(&["Order"]),
            })
        );
    }

    #[test]
    fn any_required_type_matches() {
        let (arena, _, item) = order_item();
        let resolved = resolve_binding(
            arena.get(item).unwrap(),
            &required(&["Invoice", "LineItem"]),
            &"c",
        )
        .unwrap();
        assert_eq!(resolved.id(), item);
    }

    #[test]
    fn placeholders_are_skipped_before_type_check() {
        let (mut arena, _, item) = order_item();
        let p1 = arena.placeholder(Some(item)).unwrap();
        let p2 = arena.placeholder(Some(p1)).unwrap();

        let (resolved, mismatch) =
            resolve(arena.get(p2).unwrap(), &required(&["LineItem"]), &"c").unwrap();
        assert_eq!(resolved.id(), item);
        assert!(mismatch.is_none());
    }

    #[test]
    fn exhausted_chain_is_binding_not_found() {
        let (arena, _, item) = order_item();
        let err = resolve_binding(
            arena.get(item).unwrap(),
            &required(&["Invoice"]),
            &"(Invoice.paid == true)",
        )
        .unwrap_err();
        assert_eq!(
            err,
            BindingNotFound {
                tuple: item,
                required: required(&["Invoice"]),
                condition: "(Invoice.paid == true)".into(),
            }
        );
    }

    #[test]
    fn all_placeholder_chain_is_binding_not_found() {
        let mut arena = TupleArena::new();
        let p = arena.placeholder(None).unwrap();
        let err = resolve_binding(arena.get(p).unwrap(), &required(&["Order"]), &"c");
        assert!(err.is_err());
    }
}
