//! Solution mappings produced by query execution

use super::pattern::Variable;
use crate::rdf::{xsd, RdfTerm};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet;
use serde_json::{json, Value};

/// One row of variable bindings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    bindings: IndexMap<Variable, RdfTerm>,
}

impl Solution {
    /// Create an empty solution
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a variable, replacing any previous value
    pub fn bind(&mut self, variable: Variable, value: RdfTerm) {
        self.bindings.insert(variable, value);
    }

    /// Get a bound value by variable name
    pub fn get(&self, name: &str) -> Option<&RdfTerm> {
        self.bindings.get(name)
    }

    /// Check if a variable is bound
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &RdfTerm)> {
        self.bindings.iter()
    }

    /// Bound variables in insertion order
    pub fn variable_names(&self) -> impl Iterator<Item = &Variable> {
        self.bindings.keys()
    }

    /// New solution holding both sets of bindings; `other` wins on overlap
    pub fn merge(&self, other: &Solution) -> Solution {
        let mut merged = self.clone();
        for (variable, value) in other.iter() {
            merged.bind(variable.clone(), value.clone());
        }
        merged
    }

    /// Clone with only the named variables
    pub fn project(&self, names: &[&str]) -> Solution {
        let mut projected = Solution::new();
        for name in names {
            if let Some((variable, value)) = self.bindings.get_key_value(*name) {
                projected.bind(variable.clone(), value.clone());
            }
        }
        projected
    }

    fn key(&self) -> Vec<(Variable, RdfTerm)> {
        let mut key: Vec<_> = self
            .bindings
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        key.sort_by(|a, b| a.0.cmp(&b.0));
        key
    }
}

impl FromIterator<(Variable, RdfTerm)> for Solution {
    fn from_iter<I: IntoIterator<Item = (Variable, RdfTerm)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

/// Ordered sequence of solutions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solutions(Vec<Solution>);

impl Solutions {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// The starting point of a BGP: one solution with no bindings
    pub fn single_empty() -> Self {
        Self(vec![Solution::new()])
    }

    pub fn push(&mut self, solution: Solution) {
        self.0.push(solution);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Solution> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<&Solution> {
        self.0.first()
    }

    /// Variables bound in any solution, in first-seen order
    pub fn variable_names(&self) -> IndexSet<Variable> {
        self.0
            .iter()
            .flat_map(|s| s.variable_names().cloned())
            .collect()
    }

    /// Keep only the named variables in each solution
    pub fn project(&self, names: &[&str]) -> Solutions {
        self.0.iter().map(|s| s.project(names)).collect()
    }

    /// Drop duplicate solutions, keeping the first occurrence
    pub fn distinct(&self) -> Solutions {
        let mut seen = FxHashSet::default();
        self.0
            .iter()
            .filter(|s| seen.insert(s.key()))
            .cloned()
            .collect()
    }

    pub fn limit(&self, n: usize) -> Solutions {
        self.0.iter().take(n).cloned().collect()
    }

    pub fn offset(&self, n: usize) -> Solutions {
        self.0.iter().skip(n).cloned().collect()
    }

    /// SPARQL 1.1 JSON results document
    pub fn to_json(&self) -> Value {
        let names = self.variable_names();
        let vars: Vec<&str> = names.iter().map(Variable::name).collect();
        let bindings: Vec<Value> = self
            .0
            .iter()
            .map(|solution| {
                let row: serde_json::Map<String, Value> = solution
                    .iter()
                    .map(|(variable, term)| (variable.name().to_string(), term_json(term)))
                    .collect();
                Value::Object(row)
            })
            .collect();
        json!({
            "head": { "vars": vars },
            "results": { "bindings": bindings },
        })
    }
}

fn term_json(term: &RdfTerm) -> Value {
    match term {
        RdfTerm::NamedNode(node) => json!({ "type": "uri", "value": node.as_str() }),
        RdfTerm::BlankNode(node) => json!({ "type": "bnode", "value": node.as_str() }),
        RdfTerm::Literal(lit) => {
            let mut value = json!({ "type": "literal", "value": lit.value() });
            if let Some(lang) = lit.language() {
                value["xml:lang"] = json!(lang);
            } else if lit.datatype().as_str() != xsd::STRING {
                value["datatype"] = json!(lit.datatype().as_str());
            }
            value
        }
    }
}

impl FromIterator<Solution> for Solutions {
    fn from_iter<I: IntoIterator<Item = Solution>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Solutions {
    type Item = Solution;
    type IntoIter = std::vec::IntoIter<Solution>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Solutions {
    type Item = &'a Solution;
    type IntoIter = std::slice::Iter<'a, Solution>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Extend<Solution> for Solutions {
    fn extend<I: IntoIterator<Item = Solution>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}
