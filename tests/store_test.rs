//! Integration tests for the quad store
//!
//! Covers idempotent writes, branch pruning, changeset ordering and
//! structural sharing between snapshots.

use quadstore::rdf::{foaf, BlankNode, GraphName, Literal, NamedNode, Statement};
use quadstore::{
    Changeset, Enumerable, Mutable, Pattern, Queryable, Store, StoreConfig, StoreError, Variable,
};

fn iri(s: &str) -> NamedNode {
    NamedNode::new(&format!("http://example.org/{}", s)).unwrap()
}

fn knows() -> NamedNode {
    NamedNode::new(foaf::KNOWS).unwrap()
}

#[test]
fn test_insert_twice_same_as_once() {
    let statements = vec![
        Statement::new(iri("alice"), knows(), iri("bob")),
        Statement::new(BlankNode::new(), knows(), Literal::new_simple_literal("x")),
        Statement::new(iri("alice"), knows(), iri("bob")).in_graph(iri("g")),
    ];
    for statement in statements {
        let once = Store::new();
        once.insert(statement.clone()).unwrap();

        let twice = Store::new();
        twice.insert(statement.clone()).unwrap();
        twice.insert(statement.clone()).unwrap();

        assert_eq!(once.count(), twice.count());
        assert_eq!(once.has_statement(&statement), twice.has_statement(&statement));
        assert!(twice.has_statement(&statement));
    }
}

#[test]
fn test_delete_leaves_no_empty_graph() {
    let store = Store::new();
    let quad = Statement::new(iri("bob"), knows(), iri("alice")).in_graph(iri("g1"));
    store.insert(quad.clone()).unwrap();
    store.delete(&quad).unwrap();

    assert!(store.is_empty());
    assert!(!store.has_graph(&iri("g1").into()));
    assert!(store.graph_names().is_empty());
    assert_eq!(store.each_graph().count(), 0);

    let triple = Statement::new(iri("bob"), knows(), iri("alice"));
    store.insert(triple.clone()).unwrap();
    store.delete(&triple).unwrap();
    assert!(!store.has_graph(&GraphName::DefaultGraph));
}

#[test]
fn test_delete_keeps_siblings() {
    let store = Store::new();
    let first = Statement::new(iri("a"), knows(), iri("b"));
    let second = Statement::new(iri("a"), knows(), iri("c"));
    store.insert_all(vec![first.clone(), second.clone()]).unwrap();

    store.delete(&first).unwrap();
    assert!(store.contains(&second));
    assert!(store.has_graph(&GraphName::DefaultGraph));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_changeset_delete_then_insert() {
    let statement = Statement::new(iri("a"), knows(), iri("b"));
    let mut changes = Changeset::new();
    changes.delete(statement.clone());
    changes.insert(statement.clone());

    let containing = Store::new();
    containing.insert(statement.clone()).unwrap();
    changes.apply(&containing).unwrap();
    assert!(containing.contains(&statement));

    let empty = Store::new();
    changes.apply(&empty).unwrap();
    assert!(empty.contains(&statement));
    assert_eq!(empty.len(), 1);
}

#[test]
fn test_changeset_is_mutable_target() {
    let mut changes = Changeset::new();
    changes
        .insert_statements(vec![
            Statement::new(iri("a"), knows(), iri("b")),
            Statement::new(iri("b"), knows(), iri("c")),
        ])
        .unwrap();
    let store = Store::new();
    store.apply_changeset(&changes).unwrap();
    assert_eq!(store.len(), 2);
}

#[test]
fn test_each_statement_nesting_order() {
    let store = Store::new();
    store
        .insert_all(vec![
            Statement::new(iri("a"), knows(), iri("1")),
            Statement::new(iri("b"), knows(), iri("2")),
            Statement::new(iri("a"), knows(), iri("3")),
            Statement::new(iri("a"), NamedNode::new(foaf::NAME).unwrap(), iri("4")),
        ])
        .unwrap();

    // statements of one subject come out contiguously
    let subjects: Vec<String> = store.statements().map(|s| s.subject.to_string()).collect();
    let mut runs = subjects.clone();
    runs.dedup();
    assert_eq!(runs.len(), 2);
    assert_eq!(subjects.len(), 4);
}

#[test]
fn test_query_pattern_narrowing() {
    let store = Store::new();
    store
        .insert_all(vec![
            Statement::new(iri("a"), knows(), iri("b")),
            Statement::new(iri("a"), knows(), iri("c")),
            Statement::new(iri("d"), knows(), iri("b")).in_graph(iri("g")),
        ])
        .unwrap();

    let by_object = Pattern::new(Variable::new("s"), knows(), iri("b"));
    assert_eq!(store.query_pattern(&by_object).count(), 2);

    let default_only = by_object.clone().in_graph(GraphName::DefaultGraph);
    assert_eq!(store.query_pattern(&default_only).count(), 1);

    let named_only = by_object.in_graph(Variable::new("g"));
    let matched: Vec<_> = store.query_pattern(&named_only).collect();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].graph_name, GraphName::from(iri("g")));

    assert_eq!(store.query_pattern(&Pattern::any()).count(), 3);
    assert!(store.first(&Pattern::new(iri("zzz"), knows(), Variable::new("o"))).is_none());
}

#[test]
fn test_literals_compare_exactly() {
    let store = Store::new();
    let age = NamedNode::new(foaf::AGE).unwrap();
    let typed = Literal::new_typed_literal(
        "42",
        NamedNode::new("http://www.w3.org/2001/XMLSchema#integer").unwrap(),
    );
    store.insert(Statement::new(iri("a"), age.clone(), typed.clone())).unwrap();

    assert!(store.contains(&Statement::new(iri("a"), age.clone(), typed)));
    assert!(!store.contains(&Statement::new(iri("a"), age.clone(), Literal::new_simple_literal("42"))));
    let tagged = Literal::new_language_tagged_literal("42", "en").unwrap();
    assert!(!store.contains(&Statement::new(iri("a"), age, tagged)));
}

#[test]
fn test_snapshot_shares_structure() {
    let store = Store::new();
    for i in 0..100 {
        store
            .insert(Statement::new(iri(&format!("s{}", i)), knows(), iri("o")))
            .unwrap();
    }
    let before = store.snapshot().unwrap();
    store.insert(Statement::new(iri("new"), knows(), iri("o"))).unwrap();
    let after = store.snapshot().unwrap();

    assert_eq!(before.len(), 100);
    assert_eq!(after.len(), 101);
    assert!(!before.data().ptr_eq(after.data()));

    let same = store.snapshot().unwrap();
    assert!(same.data().ptr_eq(after.data()));
}

#[test]
fn test_try_each_statement_stops_early() {
    let store = Store::new();
    for i in 0..10 {
        store
            .insert(Statement::new(iri(&format!("s{}", i)), knows(), iri("o")))
            .unwrap();
    }
    let mut seen = 0;
    let result: Result<(), String> = store.try_each_statement(|_| {
        seen += 1;
        if seen == 3 {
            Err("stop".to_string())
        } else {
            Ok(())
        }
    });
    assert_eq!(result, Err("stop".to_string()));
    assert_eq!(seen, 3);
}

#[test]
fn test_load_immutable() {
    let statements = vec![
        Statement::new(iri("a"), knows(), iri("b")),
        Statement::new(iri("b"), knows(), iri("c")).in_graph(iri("g")),
    ];
    let store = Store::load(StoreConfig::immutable(), statements).unwrap();
    assert_eq!(store.len(), 2);
    assert!(!store.is_mutable());
    assert_eq!(
        store.delete(&Statement::new(iri("a"), knows(), iri("b"))),
        Err(StoreError::Immutable)
    );
    assert_eq!(store.len(), 2);
}

#[test]
fn test_load_rejects_named_graph_without_support() {
    let config = StoreConfig {
        with_graph_name: false,
        ..StoreConfig::default()
    };
    let statements = vec![Statement::new(iri("a"), knows(), iri("b")).in_graph(iri("g"))];
    assert!(matches!(
        Store::load(config, statements),
        Err(StoreError::GraphNamesUnsupported(_))
    ));
}

#[test]
fn test_incomplete_pattern_cannot_be_inserted() {
    let pattern = Pattern::new(iri("a"), knows(), Variable::new("o"));
    assert!(matches!(
        Statement::try_from(&pattern),
        Err(StoreError::IncompleteStatement(_))
    ));
}

#[test]
fn test_project_graph() {
    let store = Store::new();
    store
        .insert_all(vec![
            Statement::new(iri("a"), knows(), iri("b")),
            Statement::new(iri("c"), knows(), iri("d")).in_graph(iri("g")),
        ])
        .unwrap();

    let graphs: Vec<(GraphName, usize)> = store
        .each_graph()
        .map(|view| (view.graph_name().clone(), view.count()))
        .collect();
    assert_eq!(graphs.len(), 2);
    assert!(graphs.iter().all(|(_, count)| *count == 1));

    let named = store.project_graph(iri("g").into());
    assert!(named.has_statement(&Statement::new(iri("c"), knows(), iri("d")).in_graph(iri("g"))));
    assert!(!named.has_statement(&Statement::new(iri("a"), knows(), iri("b"))));
}
