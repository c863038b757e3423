use super::lexer::{tokenize, Token};
use super::parser::{Ast, BinaryOp, Literal};
use super::*;
use crate::records::{Address, User};

fn parse(source: &str) -> Result<Ast, LangError> {
    LangCompiler::new().parse(source).map(|program| program.root)
}

fn literal(literal: Literal) -> Ast {
    Ast::Literal(literal)
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        tokenize("!= <= >= == && || < > ! + -").unwrap(),
        vec![
            Token::Ne,
            Token::Le,
            Token::Ge,
            Token::Eq,
            Token::And,
            Token::Or,
            Token::Lt,
            Token::Gt,
            Token::Not,
            Token::Plus,
            Token::Minus,
        ]
    );
}

#[test]
fn test_tokenize_literals() {
    assert_eq!(
        tokenize("12.5 'it\\'s' a.b_c $").unwrap(),
        vec![
            Token::Number(12.5),
            Token::Text("it's".to_string()),
            Token::Ident("a.b_c".to_string()),
            Token::Dollar,
        ]
    );
}

#[test]
fn test_tokenize_errors() {
    assert_eq!(
        tokenize("$ = 1"),
        Err(LangError::UnexpectedChar {
            found: '=',
            position: 2
        })
    );
    assert_eq!(tokenize("'open"), Err(LangError::UnterminatedText));
    assert_eq!(
        tokenize("1.2.3"),
        Err(LangError::InvalidNumber("1.2.3".to_string()))
    );
    assert!(matches!(
        tokenize("$ # 1"),
        Err(LangError::UnexpectedChar { found: '#', .. })
    ));
}

#[test]
fn test_precedence() {
    let ast = parse("1 + 2 < 4 && !false").unwrap();
    let sum = Ast::Binary(
        BinaryOp::Add,
        Box::new(literal(Literal::Number(1.0))),
        Box::new(literal(Literal::Number(2.0))),
    );
    let less = Ast::Binary(
        BinaryOp::Lt,
        Box::new(sum),
        Box::new(literal(Literal::Number(4.0))),
    );
    let not = Ast::Not(Box::new(literal(Literal::Bool(false))));
    assert_eq!(ast, Ast::Binary(BinaryOp::And, Box::new(less), Box::new(not)));
}

#[test]
fn test_field_references_and_grouping() {
    assert_eq!(
        parse("(home.city)").unwrap(),
        Ast::Field {
            path: Some("home.city".to_string()),
            subscripts: Vec::new(),
        }
    );
    assert_eq!(parse("(true)").unwrap(), literal(Literal::Bool(true)));
    assert_eq!(parse("(1)").unwrap(), literal(Literal::Number(1.0)));

    let Ast::Field { path, subscripts } = parse("$[0]['k']").unwrap() else {
        panic!("expected a field");
    };
    assert_eq!(path, None);
    assert_eq!(
        subscripts,
        vec![
            literal(Literal::Number(0.0)),
            literal(Literal::Text("k".to_string()))
        ]
    );
}

#[test]
fn test_parse_errors() {
    assert_eq!(parse("$ >"), Err(LangError::UnexpectedEnd));
    assert_eq!(parse("1[0]"), Err(LangError::SubscriptTarget));
    assert_eq!(
        parse("name"),
        Err(LangError::UnexpectedToken("name".to_string()))
    );
    assert!(matches!(parse("$ $"), Err(LangError::UnexpectedToken(_))));
    assert!(matches!(parse("(1"), Err(LangError::UnexpectedEnd)));
}

#[test]
fn test_compile_error_is_boxed() {
    let Err(err) = LangCompiler::new().compile("$ &") else {
        panic!("expected a compile error");
    };
    assert_eq!(err.to_string(), "unexpected character '&' at 2");
}

#[test]
fn test_evaluate_user_expressions() {
    let registry = crate::registry();
    let user = User::sample();
    let ctx = registry.bind(&user).unwrap();

    assert!(ctx.eval_bool("name@"));
    assert_eq!(ctx.eval_text("name@greeting"), "hi Ada");
    assert!(ctx.eval_bool("age@"));
    assert!(ctx.eval_bool("age@adult"));
    assert!(ctx.eval_bool("scores@"));
    assert_eq!(ctx.eval_number("scores@last"), 8.0);
    assert!(ctx.eval_bool("roles@"));
    assert!(ctx.eval_bool("nick@"));
    assert!(ctx.eval_bool("address@"));
    assert!(ctx.eval_bool("handle@"));
    assert!(ctx.eval_bool("address.city@"));
    assert!(ctx.eval_bool("address.zip@format"));
}

#[test]
fn test_evaluate_with_missing_values() {
    let registry = crate::registry();
    let user = User {
        name: String::new(),
        age: 12,
        scores: Vec::new(),
        roles: Default::default(),
        nickname: Some(String::new()),
        address: Address::new("", 0),
        ..User::sample()
    };
    let ctx = registry.bind(&user).unwrap();

    assert!(!ctx.eval_bool("name@"));
    assert!(!ctx.eval_bool("age@adult"));
    assert!(!ctx.eval_bool("scores@"));
    assert!(ctx.eval("scores@last").is_nil());
    assert!(!ctx.eval_bool("roles@"));
    assert!(!ctx.eval_bool("nick@"));
    assert!(!ctx.eval_bool("address@"));
    assert!(!ctx.eval_bool("address.zip@"));
}

#[test]
fn test_arithmetic_on_mismatched_values_is_nil() {
    let registry = fieldexpr::Registry::new(LangCompiler::new());
    let address = Address::new("Rome", 100);
    let ctx = registry.bind(&address).unwrap();
    let program = LangCompiler::new().parse("$ + 1").unwrap();

    assert!(program.evaluate("city", &ctx).is_nil());
    assert_eq!(program.evaluate("zip", &ctx), Value::Number(101.0));
    let program = LangCompiler::new().parse("-(city) == null").unwrap();
    assert_eq!(program.evaluate("zip", &ctx), Value::Bool(true));
}
