use crate::core::error::{Error, Result};
use crate::query::ast::QueryAst;

/// Parse query text into the algebraic AST.
///
/// Grammar, loosest binding first:
///
/// ```text
/// query  := branch ('|' branch)*
/// branch := atom atom*                 adjacency is conjunction
/// atom   := '(' query ')'
///         | '"' word* '"'             exact match (rejected later)
///         | '@' name ':' atom         field scope (rejected later)
///         | word
/// ```
pub fn parse(input: &str) -> Result<QueryAst> {
    let tokens = lex(input)?;
    let mut parser = Parser { tokens, cursor: 0 };
    let query = parser.query()?;
    if let Some(token) = parser.peek() {
        return Err(Error::query_parse(format!("unexpected {token}")));
    }
    Ok(query)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Or,
    LParen,
    RParen,
    Quoted(String),
    FieldScope(String),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Word(word) => write!(f, "word {word:?}"),
            Token::Or => write!(f, "'|'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Quoted(text) => write!(f, "quoted {text:?}"),
            Token::FieldScope(field) => write!(f, "field scope @{field}:"),
        }
    }
}

fn lex(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            _ if c.is_whitespace() => {
                chars.next();
            }
            '|' => {
                chars.next();
                tokens.push(Token::Or);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '"' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some((_, '"')) => break,
                        Some((_, c)) => text.push(c),
                        None => return Err(Error::query_parse("unterminated quote")),
                    }
                }
                tokens.push(Token::Quoted(text));
            }
            '@' => {
                chars.next();
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some((_, ':')) => break,
                        Some((_, c)) if !c.is_whitespace() && !is_special(c) => field.push(c),
                        _ => {
                            return Err(Error::query_parse(format!(
                                "field scope at offset {start} is missing ':'"
                            )))
                        }
                    }
                }
                if field.is_empty() {
                    return Err(Error::query_parse("empty field name"));
                }
                tokens.push(Token::FieldScope(field));
            }
            _ => {
                let mut word = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_whitespace() || is_special(c) {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                if word.is_empty() {
                    // A stray ':' is the only way to get here.
                    return Err(Error::query_parse(format!("unexpected character {c:?}")));
                }
                tokens.push(Token::Word(word));
            }
        }
    }
    Ok(tokens)
}

fn is_special(c: char) -> bool {
    matches!(c, '|' | '(' | ')' | '"' | '@' | ':')
}

struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn query(&mut self) -> Result<QueryAst> {
        let mut query = self.branch()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            query = QueryAst::or(query, self.branch()?);
        }
        Ok(query)
    }

    fn branch(&mut self) -> Result<QueryAst> {
        let mut branch = self.atom()?;
        while matches!(
            self.peek(),
            Some(Token::Word(_) | Token::LParen | Token::Quoted(_) | Token::FieldScope(_))
        ) {
            branch = QueryAst::and(branch, self.atom()?);
        }
        Ok(branch)
    }

    fn atom(&mut self) -> Result<QueryAst> {
        match self.advance() {
            Some(Token::Word(word)) => Ok(QueryAst::Word(word)),
            Some(Token::Quoted(text)) => Ok(QueryAst::Exact(
                text.split_whitespace().map(String::from).collect(),
            )),
            Some(Token::FieldScope(field)) => Ok(QueryAst::Field {
                field,
                query: Box::new(self.atom()?),
            }),
            Some(Token::LParen) => {
                let query = self.query()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(query),
                    _ => Err(Error::query_parse("missing ')'")),
                }
            }
            Some(token) => Err(Error::query_parse(format!("unexpected {token}"))),
            None => Err(Error::query_parse("query ended before an operand")),
        }
    }
}
