use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use replisearch::query::parser::parse;
use replisearch::{DocumentStore, Engine, Hash, IndexDefinition, Limit, MutationEvent};

/// Wires a document store and a search engine together the way the
/// replica does, minus the replication client: a few mutation events
/// stand in for the command stream.
fn main() -> replisearch::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let store = Arc::new(DocumentStore::new());
    let engine = Engine::new(Arc::clone(&store));

    for (key, title, body) in [
        ("article:1", "spider man returns", "peter parker is back in the city"),
        ("article:2", "web of intrigue", "the spider bites again"),
        ("article:3", "daily bugle roundup", "cat stuck in a tree, dog saves the day"),
        ("user:1", "not an article", "spider spider spider"),
    ] {
        store.apply(MutationEvent::Put {
            key: key.to_string(),
            hash: hash(&[("title", title), ("body", body)]),
        });
    }

    engine.create_index(
        IndexDefinition::new("articles", vec!["article:".to_string()])
            .with_text_field("title")
            .with_text_field("body"),
    );

    let index = engine
        .get_index("articles")
        .ok_or_else(|| replisearch::Error::NoSuchIndex("articles".to_string()))?;
    while index.is_creating() {
        thread::sleep(Duration::from_millis(5));
    }

    for query_text in ["spider", "spider man", "cat | dog", "the spider"] {
        let query = parse(query_text)?;
        info!(query = query_text, "searching");
        for hit in engine.search("articles", &query, Some(Limit { offset: 0, num: 10 }))? {
            info!(key = %hit.doc.key, score = hit.score, "hit");
        }
    }

    // Live updates flow through the same observer path as the bulk load.
    store.apply(MutationEvent::Put {
        key: "article:4".to_string(),
        hash: hash(&[("title", "spider sequel"), ("body", "more webs")]),
    });
    store.apply(MutationEvent::Delete {
        keys: vec!["article:2".to_string()],
    });

    let query = parse("spider")?;
    info!("searching after live updates");
    for hit in engine.search("articles", &query, None)? {
        info!(key = %hit.doc.key, score = hit.score, "hit");
    }

    Ok(())
}

fn hash(pairs: &[(&str, &str)]) -> Hash {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
        .collect()
}
