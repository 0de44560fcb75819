//! Integration tests for basic graph pattern queries

use quadstore::rdf::{foaf, rdf, GraphName, Literal, NamedNode, RdfTerm, Statement};
use quadstore::{Pattern, Query, QueryError, Queryable, Solutions, Store, Variable};

fn iri(s: &str) -> NamedNode {
    NamedNode::new(&format!("http://example.org/{}", s)).unwrap()
}

fn type_() -> NamedNode {
    NamedNode::new(rdf::TYPE).unwrap()
}

fn person() -> NamedNode {
    NamedNode::new(foaf::PERSON).unwrap()
}

fn name() -> NamedNode {
    NamedNode::new(foaf::NAME).unwrap()
}

fn knows() -> NamedNode {
    NamedNode::new(foaf::KNOWS).unwrap()
}

fn alice_store() -> Store {
    let store = Store::new();
    store
        .insert_all(vec![
            Statement::new(iri("A"), type_(), person()),
            Statement::new(iri("A"), name(), Literal::new_simple_literal("Alice")),
        ])
        .unwrap();
    store
}

fn var(name: &str) -> Variable {
    Variable::new(name)
}

#[test]
fn test_join_on_shared_variable() {
    let store = alice_store();
    let mut query = Query::default()
        .pattern(Pattern::new(var("x"), type_(), person()))
        .pattern(Pattern::new(var("x"), name(), var("n")));

    let solutions = query.execute(&store).unwrap();
    assert_eq!(solutions.len(), 1);
    let solution = solutions.first().unwrap();
    assert_eq!(solution.len(), 2);
    assert_eq!(solution.get("x"), Some(&RdfTerm::from(iri("A"))));
    assert_eq!(
        solution.get("n"),
        Some(&RdfTerm::from(Literal::new_simple_literal("Alice")))
    );
    assert!(query.matched());
}

#[test]
fn test_optional_keeps_unmatched_row() {
    let store = alice_store();
    let mbox = NamedNode::new(foaf::MBOX).unwrap();
    let mut query = Query::default()
        .pattern(Pattern::new(var("x"), type_(), person()))
        .pattern(Pattern::new(var("x"), mbox, var("m")).optional());

    let solutions = query.execute(&store).unwrap();
    assert_eq!(solutions.len(), 1);
    let solution = solutions.first().unwrap();
    assert_eq!(solution.get("x"), Some(&RdfTerm::from(iri("A"))));
    assert!(!solution.contains("m"));
}

#[test]
fn test_optional_extends_matched_row() {
    let store = alice_store();
    let mut query = Query::default()
        .pattern(Pattern::new(var("x"), type_(), person()))
        .pattern(Pattern::new(var("x"), name(), var("n")).optional());
    let solutions = query.execute(&store).unwrap();
    assert_eq!(solutions.len(), 1);
    assert!(solutions.first().unwrap().contains("n"));
}

#[test]
fn test_graph_scope() {
    let store = Store::new();
    store
        .insert(Statement::new(iri("bob"), knows(), iri("alice")).in_graph(iri("g1")))
        .unwrap();
    let pattern = Pattern::new(var("s"), knows(), var("o"));

    let mut named = Query::default().pattern(pattern.clone()).with_graph_name(iri("g1"));
    assert_eq!(named.execute(&store).unwrap().len(), 1);

    let mut default = Query::default()
        .pattern(pattern.clone())
        .with_graph_name(GraphName::DefaultGraph);
    assert_eq!(default.execute(&store).unwrap().len(), 0);
    assert!(default.failed());

    let mut unscoped = Query::default().pattern(pattern);
    assert_eq!(unscoped.execute(&store).unwrap().len(), 1);
}

#[test]
fn test_graph_variable_binds_named_graphs_only() {
    let store = Store::new();
    store
        .insert_all(vec![
            Statement::new(iri("a"), knows(), iri("b")),
            Statement::new(iri("a"), knows(), iri("c")).in_graph(iri("g1")),
            Statement::new(iri("a"), knows(), iri("d")).in_graph(iri("g2")),
        ])
        .unwrap();

    let mut query = Query::default()
        .pattern(Pattern::new(iri("a"), knows(), var("o")))
        .with_graph_name(var("g"));
    let solutions = query.execute(&store).unwrap();
    assert_eq!(solutions.len(), 2);
    assert!(solutions.iter().all(|s| s.contains("g") && s.contains("o")));
}

#[test]
fn test_pattern_own_graph_wins_over_scope() {
    let store = Store::new();
    store
        .insert_all(vec![
            Statement::new(iri("a"), knows(), iri("b")).in_graph(iri("g1")),
            Statement::new(iri("b"), knows(), iri("c")).in_graph(iri("g2")),
        ])
        .unwrap();

    let mut query = Query::default()
        .pattern(Pattern::new(var("x"), knows(), var("y")))
        .pattern(Pattern::new(var("y"), knows(), var("z")).in_graph(iri("g2")))
        .with_graph_name(iri("g1"));
    let solutions = query.execute(&store).unwrap();
    assert_eq!(solutions.len(), 1);
    assert_eq!(solutions.first().unwrap().get("z"), Some(&RdfTerm::from(iri("c"))));
}

#[test]
fn test_empty_query_yields_one_empty_solution() {
    let store = alice_store();
    let mut query = Query::default();
    let solutions = query.execute(&store).unwrap();
    assert_eq!(solutions.len(), 1);
    assert!(solutions.first().unwrap().is_empty());
    assert!(query.matched());
}

#[test]
fn test_invalid_query_is_not_executed() {
    let store = alice_store();
    let mut query = Query::default()
        .pattern(Pattern::new(var("x"), name(), var("n")).optional())
        .pattern(Pattern::new(var("x"), type_(), person()));
    assert_eq!(
        query.execute(&store),
        Err(QueryError::OptionalNotTrailing { index: 1 })
    );
    assert!(!query.is_valid());
}

#[test]
fn test_early_abort_on_empty() {
    let store = alice_store();
    let mut query = Query::default()
        .pattern(Pattern::new(var("x"), knows(), var("y")))
        .pattern(Pattern::new(var("x"), type_(), person()));
    assert!(query.execute(&store).unwrap().is_empty());
    assert!(query.failed());
}

#[test]
fn test_bag_semantics_keep_duplicates() {
    let store = Store::new();
    store
        .insert_all(vec![
            Statement::new(iri("a"), knows(), iri("b")),
            Statement::new(iri("a"), knows(), iri("b")).in_graph(iri("g")),
        ])
        .unwrap();
    let mut query = Query::default().pattern(Pattern::new(var("s"), knows(), var("o")));
    let solutions = query.execute(&store).unwrap();
    assert_eq!(solutions.len(), 2);
    assert_eq!(solutions.distinct().len(), 1);
}

#[test]
fn test_repeated_variable_in_pattern() {
    let store = Store::new();
    store
        .insert_all(vec![
            Statement::new(iri("a"), knows(), iri("a")),
            Statement::new(iri("a"), knows(), iri("b")),
        ])
        .unwrap();
    let mut query = Query::default().pattern(Pattern::new(var("x"), knows(), var("x")));
    let solutions = query.execute(&store).unwrap();
    assert_eq!(solutions.len(), 1);
    assert_eq!(solutions.first().unwrap().get("x"), Some(&RdfTerm::from(iri("a"))));
}

#[test]
fn test_bindings_seed_solutions() {
    let store = Store::new();
    store
        .insert_all(vec![
            Statement::new(iri("a"), knows(), iri("b")),
            Statement::new(iri("c"), knows(), iri("d")),
            Statement::new(iri("e"), knows(), iri("f")),
        ])
        .unwrap();

    let mut query = Query::default()
        .pattern(Pattern::new(var("s"), knows(), var("o")))
        .with_bindings(var("s"), vec![iri("a").into(), iri("e").into(), iri("zzz").into()]);
    let solutions = query.execute(&store).unwrap();
    let objects: Vec<String> = solutions
        .iter()
        .map(|s| s.get("o").unwrap().to_string())
        .collect();
    assert_eq!(
        objects,
        vec!["<http://example.org/b>", "<http://example.org/f>"]
    );
}

#[test]
fn test_initial_solutions_are_extended() {
    let store = alice_store();
    let mut seed = quadstore::Solution::new();
    seed.bind(var("x"), iri("A").into());
    let initial: Solutions = vec![seed].into_iter().collect();

    let mut query = Query::default().pattern(Pattern::new(var("x"), name(), var("n")));
    let solutions = query.execute_with(&store, initial).unwrap();
    assert_eq!(solutions.len(), 1);
    assert_eq!(solutions.first().unwrap().len(), 2);
}

#[test]
fn test_optimized_query_returns_same_rows() {
    let store = alice_store();
    let query = Query::default()
        .pattern(Pattern::new(var("x"), var("p"), var("o")))
        .pattern(Pattern::new(var("x"), type_(), person()));

    let mut plain = query.clone();
    let mut optimized = query.optimize();
    assert_eq!(optimized.patterns()[0].cost(), 2);

    let mut left = plain.execute(&store).unwrap().project(&["x", "p", "o"]);
    let mut right = optimized.execute(&store).unwrap().project(&["x", "p", "o"]);
    assert_eq!(left.len(), 2);
    left = left.distinct();
    right = right.distinct();
    assert_eq!(left.len(), right.len());
}

#[test]
fn test_add_composes_patterns() {
    let store = alice_store();
    let first = Query::default().pattern(Pattern::new(var("x"), type_(), person()));
    let second = Query::default().pattern(Pattern::new(var("x"), name(), var("n")));
    let mut combined = first + second;
    assert_eq!(combined.patterns().len(), 2);
    assert_eq!(combined.execute(&store).unwrap().len(), 1);
}

#[test]
fn test_execute_through_queryable() {
    let store = alice_store();
    let mut query = Query::default().pattern(Pattern::new(var("x"), type_(), person()));
    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot.run_query(&mut query).unwrap().len(), 1);
    assert_eq!(store.run_query(&mut query).unwrap().len(), 1);
}

#[test]
fn test_solutions_json() {
    let store = alice_store();
    let mut query = Query::default().pattern(Pattern::new(var("x"), name(), var("n")));
    let json = query.execute(&store).unwrap().to_json();
    assert_eq!(json["head"]["vars"], serde_json::json!(["x", "n"]));
    assert_eq!(json["results"]["bindings"][0]["n"]["value"], "Alice");
    assert_eq!(json["results"]["bindings"][0]["x"]["type"], "uri");
}
