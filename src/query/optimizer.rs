//! Static BGP reordering

use super::pattern::Pattern;
use tracing::trace;

/// Reorders patterns so the most selective run first.
///
/// Cost is the number of unbound positions in a pattern. Sorting is stable
/// and never moves a pattern across the required/optional boundary.
pub struct QueryOptimizer;

impl QueryOptimizer {
    /// Create a new optimizer
    pub fn new() -> Self {
        Self
    }

    /// Sort patterns in place, cheapest first
    pub fn optimize(&self, patterns: &mut [Pattern]) {
        for run in patterns.chunk_by_mut(|a, b| a.optional == b.optional) {
            run.sort_by_key(Pattern::cost);
        }
        trace!(
            "Optimized pattern order: {:?}",
            patterns.iter().map(Pattern::cost).collect::<Vec<_>>()
        );
    }
}

impl Default for QueryOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Variable;
    use crate::rdf::NamedNode;

    fn iri(s: &str) -> NamedNode {
        NamedNode::new(&format!("http://example.org/{}", s)).unwrap()
    }

    #[test]
    fn test_cheapest_first() {
        let wide = Pattern::new(Variable::new("s"), Variable::new("p"), Variable::new("o"));
        let narrow = Pattern::new(iri("a"), iri("p"), Variable::new("o"));
        let mut patterns = vec![wide.clone(), narrow.clone()];
        QueryOptimizer::new().optimize(&mut patterns);
        assert_eq!(patterns, vec![narrow, wide]);
    }

    #[test]
    fn test_stable_for_equal_cost() {
        let first = Pattern::new(Variable::new("x"), iri("p"), iri("a"));
        let second = Pattern::new(Variable::new("y"), iri("q"), iri("b"));
        let mut patterns = vec![first.clone(), second.clone()];
        QueryOptimizer::new().optimize(&mut patterns);
        assert_eq!(patterns, vec![first, second]);
    }

    #[test]
    fn test_optional_stays_trailing() {
        let required = Pattern::new(Variable::new("s"), Variable::new("p"), Variable::new("o"));
        let optional = Pattern::new(iri("a"), iri("p"), iri("b")).optional();
        let mut patterns = vec![required.clone(), optional.clone()];
        QueryOptimizer::new().optimize(&mut patterns);
        assert_eq!(patterns, vec![required, optional]);
    }
}
