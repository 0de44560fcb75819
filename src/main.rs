use anyhow::Result;
use quadstore::query::{Pattern, Query, Variable};
use quadstore::rdf::{foaf, rdf, Literal, NamedNode, Statement};
use quadstore::{Enumerable, Store, StoreConfig, TransactionError};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Quadstore v{}", quadstore::version());
    println!("==========================================");
    println!();

    let config = match std::env::args().nth(1) {
        Some(path) => StoreConfig::from_file(path)?,
        None => StoreConfig::default(),
    };
    let store = Store::with_config(config);

    demo_transactions(&store)?;
    demo_queries(&store)?;
    demo_conflict(&store)?;

    Ok(())
}

fn iri(local: &str) -> Result<NamedNode> {
    Ok(NamedNode::new(&format!("http://example.org/{}", local))?)
}

fn demo_transactions(store: &Store) -> Result<()> {
    println!("=== Demo 1: Transactions ===");
    let type_ = NamedNode::new(rdf::TYPE)?;
    let person = NamedNode::new(foaf::PERSON)?;
    let name = NamedNode::new(foaf::NAME)?;
    let knows = NamedNode::new(foaf::KNOWS)?;

    let people = [("alice", "Alice"), ("bob", "Bob"), ("charlie", "Charlie")];
    let mut tx = store.transaction(true)?;
    for (local, label) in people {
        let subject = iri(local)?;
        tx.insert(Statement::new(subject.clone(), type_.clone(), person.clone()))?;
        tx.insert(Statement::new(subject, name.clone(), Literal::new_simple_literal(label)))?;
        println!("✓ Queued Person: {}", label);
    }
    tx.insert(Statement::new(iri("alice")?, knows.clone(), iri("bob")?).in_graph(iri("social")?))?;
    tx.insert(Statement::new(iri("bob")?, knows, iri("charlie")?).in_graph(iri("social")?))?;
    tx.execute()?;

    println!("\nStore Statistics:");
    println!("  Total statements: {}", store.len());
    println!("  Named graphs: {}", store.graph_names().len());
    println!("  Version: {}", store.version());
    Ok(())
}

fn demo_queries(store: &Store) -> Result<()> {
    println!("\n=== Demo 2: Basic Graph Patterns ===");
    let type_ = NamedNode::new(rdf::TYPE)?;
    let person = NamedNode::new(foaf::PERSON)?;
    let name = NamedNode::new(foaf::NAME)?;
    let knows = NamedNode::new(foaf::KNOWS)?;

    let mut query = Query::default()
        .pattern(Pattern::new(Variable::new("x"), type_, person))
        .pattern(Pattern::new(Variable::new("x"), name, Variable::new("name")))
        .pattern(Pattern::new(Variable::new("x"), knows, Variable::new("friend")).optional());
    query.optimize_mut();

    let solutions = query.execute(store)?;
    for solution in &solutions {
        let friend = solution
            .get("friend")
            .map(|f| f.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {} knows {}",
            solution.get("name").map(|n| n.to_string()).unwrap_or_default(),
            friend
        );
    }
    println!("\nSPARQL JSON:");
    println!("{}", serde_json::to_string_pretty(&solutions.to_json())?);
    Ok(())
}

fn demo_conflict(store: &Store) -> Result<()> {
    println!("\n=== Demo 3: Optimistic Concurrency ===");
    let mbox = NamedNode::new(foaf::MBOX)?;

    let mut first = store.transaction(true)?;
    let mut second = store.transaction(true)?;
    first.insert(Statement::new(iri("alice")?, mbox.clone(), iri("alice-mail")?))?;
    second.insert(Statement::new(iri("bob")?, mbox, iri("bob-mail")?))?;

    first.execute()?;
    println!("✓ First transaction committed (version {})", store.version());
    match second.execute() {
        Err(TransactionError::Conflict { base, live }) => {
            println!("✗ Second transaction aborted: based on version {}, store at {}", base, live);
            second.rollback()?;
        }
        other => other?,
    }
    Ok(())
}
