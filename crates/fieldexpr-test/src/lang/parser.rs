use super::lexer::Token;
use super::LangError;

const KEYWORDS: &[&str] = &["true", "false", "null"];

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Literal {
    Null,
    Number(f64),
    Text(String),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Ast {
    Literal(Literal),
    /// `$` when `path` is `None`, `(path)` otherwise.
    Field {
        path: Option<String>,
        subscripts: Vec<Ast>,
    },
    Not(Box<Ast>),
    Neg(Box<Ast>),
    Binary(BinaryOp, Box<Ast>, Box<Ast>),
}

impl Ast {
    fn binary(op: BinaryOp, lhs: Ast, rhs: Ast) -> Self {
        Ast::Binary(op, Box::new(lhs), Box::new(rhs))
    }
}

pub(crate) fn parse(tokens: Vec<Token>) -> Result<Ast, LangError> {
    let mut parser = Parser { tokens, pos: 0 };
    let ast = parser.or()?;
    match parser.peek() {
        None => Ok(ast),
        Some(token) => Err(LangError::UnexpectedToken(format!("{token:?}"))),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), LangError> {
        match self.advance() {
            Some(found) if found == *token => Ok(()),
            Some(found) => Err(LangError::UnexpectedToken(format!("{found:?}"))),
            None => Err(LangError::UnexpectedEnd),
        }
    }

    fn or(&mut self) -> Result<Ast, LangError> {
        let mut lhs = self.and()?;
        while self.eat(&Token::Or) {
            lhs = Ast::binary(BinaryOp::Or, lhs, self.and()?);
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Ast, LangError> {
        let mut lhs = self.comparison()?;
        while self.eat(&Token::And) {
            lhs = Ast::binary(BinaryOp::And, lhs, self.comparison()?);
        }
        Ok(lhs)
    }

    fn comparison(&mut self) -> Result<Ast, LangError> {
        let lhs = self.additive()?;
        let op = match self.peek() {
            Some(Token::Eq) => BinaryOp::Eq,
            Some(Token::Ne) => BinaryOp::Ne,
            Some(Token::Lt) => BinaryOp::Lt,
            Some(Token::Le) => BinaryOp::Le,
            Some(Token::Gt) => BinaryOp::Gt,
            Some(Token::Ge) => BinaryOp::Ge,
            _ => return Ok(lhs),
        };
        self.pos += 1;
        Ok(Ast::binary(op, lhs, self.additive()?))
    }

    fn additive(&mut self) -> Result<Ast, LangError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            lhs = Ast::binary(op, lhs, self.unary()?);
        }
    }

    fn unary(&mut self) -> Result<Ast, LangError> {
        if self.eat(&Token::Not) {
            return Ok(Ast::Not(Box::new(self.unary()?)));
        }
        if self.eat(&Token::Minus) {
            return Ok(Ast::Neg(Box::new(self.unary()?)));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Ast, LangError> {
        let mut ast = self.primary()?;
        while self.eat(&Token::LBracket) {
            let Ast::Field { subscripts, .. } = &mut ast else {
                return Err(LangError::SubscriptTarget);
            };
            subscripts.push(self.or()?);
            self.expect(&Token::RBracket)?;
        }
        Ok(ast)
    }

    fn primary(&mut self) -> Result<Ast, LangError> {
        let literal = match self.advance() {
            None => return Err(LangError::UnexpectedEnd),
            Some(Token::Dollar) => return Ok(field(None)),
            Some(Token::LParen) => return self.parenthesized(),
            Some(Token::Number(n)) => Literal::Number(n),
            Some(Token::Text(text)) => Literal::Text(text),
            Some(Token::Ident(ident)) => match ident.as_str() {
                "true" => Literal::Bool(true),
                "false" => Literal::Bool(false),
                "null" => Literal::Null,
                _ => return Err(LangError::UnexpectedToken(ident)),
            },
            Some(token) => return Err(LangError::UnexpectedToken(format!("{token:?}"))),
        };
        Ok(Ast::Literal(literal))
    }

    // `(path)` is a field reference; anything else in parentheses groups.
    fn parenthesized(&mut self) -> Result<Ast, LangError> {
        if let (Some(Token::Ident(path)), Some(Token::RParen)) =
            (self.tokens.get(self.pos), self.tokens.get(self.pos + 1))
        {
            if !KEYWORDS.contains(&path.as_str()) {
                let path = path.clone();
                self.pos += 2;
                return Ok(field(Some(path)));
            }
        }
        let inner = self.or()?;
        self.expect(&Token::RParen)?;
        Ok(inner)
    }
}

fn field(path: Option<String>) -> Ast {
    Ast::Field {
        path,
        subscripts: Vec::new(),
    }
}
