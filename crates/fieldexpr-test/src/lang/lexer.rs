use std::iter::Peekable;
use std::str::CharIndices;

use super::LangError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Text(String),
    Ident(String),
    Dollar,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Not,
    Plus,
    Minus,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, LangError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();
    while let Some((position, c)) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '$' => Token::Dollar,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '!' => pair(&mut chars, '=', Token::Ne, Token::Not),
            '<' => pair(&mut chars, '=', Token::Le, Token::Lt),
            '>' => pair(&mut chars, '=', Token::Ge, Token::Gt),
            '=' | '&' | '|' => {
                if chars.next_if(|&(_, next)| next == c).is_none() {
                    return Err(LangError::UnexpectedChar { found: c, position });
                }
                match c {
                    '=' => Token::Eq,
                    '&' => Token::And,
                    _ => Token::Or,
                }
            }
            '\'' => Token::Text(text(&mut chars)?),
            c if c.is_ascii_digit() => {
                let mut literal = String::from(c);
                while let Some((_, d)) = chars.next_if(|&(_, d)| d.is_ascii_digit() || d == '.') {
                    literal.push(d);
                }
                let n = literal
                    .parse()
                    .map_err(|_| LangError::InvalidNumber(literal.clone()))?;
                Token::Number(n)
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::from(c);
                while let Some((_, d)) =
                    chars.next_if(|&(_, d)| d.is_alphanumeric() || d == '_' || d == '.')
                {
                    ident.push(d);
                }
                Token::Ident(ident)
            }
            found => return Err(LangError::UnexpectedChar { found, position }),
        };
        tokens.push(token);
    }
    Ok(tokens)
}

fn pair(chars: &mut Peekable<CharIndices<'_>>, second: char, long: Token, short: Token) -> Token {
    match chars.next_if(|&(_, c)| c == second) {
        Some(_) => long,
        None => short,
    }
}

// Body of a single-quoted literal; `\'` and `\\` escape.
fn text(chars: &mut Peekable<CharIndices<'_>>) -> Result<String, LangError> {
    let mut out = String::new();
    loop {
        match chars.next() {
            Some((_, '\'')) => return Ok(out),
            Some((_, '\\')) => match chars.next() {
                Some((_, c)) => out.push(c),
                None => return Err(LangError::UnterminatedText),
            },
            Some((_, c)) => out.push(c),
            None => return Err(LangError::UnterminatedText),
        }
    }
}
