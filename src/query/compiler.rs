use crate::core::error::{Error, Result};
use crate::index::fts::FtsIndex;
use crate::query::ast::QueryAst;
use crate::search::intersect::intersect;
use crate::search::iter::TermIterator;
use crate::search::union::union;

/// Compile a query tree into an iterator tree over `index`.
///
/// The walk is postorder over an operand stack: a word pushes its
/// posting iterator, a conjunction or disjunction pops its two most
/// recent operands and pushes the combined iterator. The stack top at
/// the end is the root.
pub fn compile(index: &FtsIndex, query: &QueryAst) -> Result<Box<dyn TermIterator>> {
    let mut stack: Vec<Box<dyn TermIterator>> = Vec::new();
    visit(index, query, &mut stack)?;
    stack
        .pop()
        .ok_or_else(|| Error::query_parse("query produced no operands"))
}

fn visit(index: &FtsIndex, node: &QueryAst, stack: &mut Vec<Box<dyn TermIterator>>) -> Result<()> {
    match node {
        QueryAst::Word(word) => stack.push(index.read(word)),
        QueryAst::And(lhs, rhs) => {
            visit(index, lhs, stack)?;
            visit(index, rhs, stack)?;
            let rhs = pop(stack)?;
            let lhs = pop(stack)?;
            stack.push(intersect(lhs, rhs));
        }
        QueryAst::Or(lhs, rhs) => {
            visit(index, lhs, stack)?;
            visit(index, rhs, stack)?;
            let rhs = pop(stack)?;
            let lhs = pop(stack)?;
            stack.push(union(lhs, rhs));
        }
        QueryAst::Exact(_) => {
            return Err(Error::query_parse("exact match queries are not implemented"));
        }
        QueryAst::Field { field, .. } => {
            return Err(Error::query_parse(format!(
                "field-scoped queries are not implemented (@{field})"
            )));
        }
    }
    Ok(())
}

fn pop(stack: &mut Vec<Box<dyn TermIterator>>) -> Result<Box<dyn TermIterator>> {
    stack
        .pop()
        .ok_or_else(|| Error::query_parse("operator is missing an operand"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Document, Hash};
    use std::sync::Arc;

    fn index_with(docs: &[(&str, &str)]) -> FtsIndex {
        let index = FtsIndex::new("idx", vec!["*".to_string()], vec!["body".to_string()]);
        index.load(Vec::new()).unwrap();
        for (key, body) in docs {
            let mut hash = Hash::new();
            hash.insert("body".to_string(), body.as_bytes().to_vec());
            index.add(&Arc::new(Document::new(*key, hash)));
        }
        index
    }

    fn keys(mut iter: Box<dyn TermIterator>) -> Vec<String> {
        let mut keys = Vec::new();
        while let Some(scored) = iter.next() {
            keys.push(scored.occurrence.key().to_string());
        }
        keys
    }

    #[test]
    fn test_word_compiles_to_read() {
        let index = index_with(&[("a", "cat"), ("b", "dog")]);
        let iter = compile(&index, &QueryAst::word("cat")).unwrap();
        assert_eq!(keys(iter), vec!["a"]);
    }

    #[test]
    fn test_and_compiles_to_intersection() {
        let index = index_with(&[("a", "cat"), ("b", "cat dog"), ("c", "dog")]);
        let query = QueryAst::and(QueryAst::word("cat"), QueryAst::word("dog"));
        assert_eq!(keys(compile(&index, &query).unwrap()), vec!["b"]);
    }

    #[test]
    fn test_or_compiles_to_union() {
        let index = index_with(&[("a", "cat"), ("b", "dog"), ("c", "fish")]);
        let query = QueryAst::or(QueryAst::word("cat"), QueryAst::word("dog"));
        assert_eq!(keys(compile(&index, &query).unwrap()), vec!["a", "b"]);
    }

    #[test]
    fn test_unsupported_constructs_error() {
        let index = index_with(&[]);

        let exact = QueryAst::Exact(vec!["spider".to_string()]);
        assert!(matches!(
            compile(&index, &exact),
            Err(Error::QueryParse(_))
        ));

        let scoped = QueryAst::Field {
            field: "title".to_string(),
            query: Box::new(QueryAst::word("web")),
        };
        assert!(matches!(
            compile(&index, &scoped),
            Err(Error::QueryParse(_))
        ));

        // Unsupported nodes fail even when nested under supported ones.
        let nested = QueryAst::and(QueryAst::word("web"), exact);
        assert!(compile(&index, &nested).is_err());
    }
}
