/// Algebraic query tree consumed by the compiler.
///
/// `Exact` and `Field` exist so that queries using them fail loudly at
/// compile time instead of silently matching nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryAst {
    /// A single word, analyzed into a term at compile time.
    Word(String),
    /// Implicit conjunction of two query parts.
    And(Box<QueryAst>, Box<QueryAst>),
    /// Explicit `|` disjunction of two query parts.
    Or(Box<QueryAst>, Box<QueryAst>),
    /// Quoted exact-match phrase. Not implemented.
    Exact(Vec<String>),
    /// `@field:` scoped query part. Not implemented.
    Field { field: String, query: Box<QueryAst> },
}

impl QueryAst {
    pub fn word(text: impl Into<String>) -> Self {
        QueryAst::Word(text.into())
    }

    pub fn and(lhs: QueryAst, rhs: QueryAst) -> Self {
        QueryAst::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: QueryAst, rhs: QueryAst) -> Self {
        QueryAst::Or(Box::new(lhs), Box::new(rhs))
    }
}
