//! The allow-list rule family.
//!
//! Reusable constraint objects validating that input only references names
//! drawn from an allowed set, with translated singular/plural messages
//! recomputed from the rejected subset after a failing `passes` call.

mod allow_list;
mod field_sets;

pub use allow_list::{
    AllowList, AllowedCountableFields, AllowedFilterParameters, AllowedIncludePaths,
    AllowedPageParameters, AllowedSortParameters,
};
pub use field_sets::AllowedFieldSets;

/// Message member for an invalid-name list: `default` when empty,
/// `singular` for exactly one, `plural` otherwise.
pub(crate) fn plurality(invalid: &[String]) -> &'static str {
    match invalid.len() {
        0 => "default",
        1 => "singular",
        _ => "plural",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plurality_boundaries() {
        assert_eq!(plurality(&[]), "default");
        assert_eq!(plurality(&["a".to_string()]), "singular");
        assert_eq!(plurality(&["a".to_string(), "b".to_string()]), "plural");
    }
}
