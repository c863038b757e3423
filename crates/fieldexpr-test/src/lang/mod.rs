//! Reference expression language.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! or         := and ("||" and)*
//! and        := comparison ("&&" comparison)*
//! comparison := additive (("==" | "!=" | "<" | "<=" | ">" | ">=") additive)?
//! additive   := unary (("+" | "-") unary)*
//! unary      := ("!" | "-") unary | postfix
//! postfix    := field ("[" or "]")* | primary
//! field      := "$" | "(" path ")"
//! primary    := number | 'text' | true | false | null | "(" or ")"
//! ```
//!
//! `$` is the annotated field; `(path)` names another field of the record
//! that declares it, dotted for nested records.
//!
//! # Example
//!
//! ```
//! use fieldexpr::ExpressionCompiler;
//! use fieldexpr_test::LangCompiler;
//!
//! let compiler = LangCompiler::new();
//! assert!(compiler.compile("$ > 0 && (name) != ''").is_ok());
//! assert!(compiler.compile("$ >").is_err());
//! ```

mod eval;
mod lexer;
mod parser;

use std::sync::Arc;

use fieldexpr::{CompileError, CompiledExpression, EvalContext, ExpressionCompiler, Value};
use thiserror::Error;

use parser::Ast;

/// Errors raised while compiling expression source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LangError {
    #[error("unexpected character {found:?} at {position}")]
    UnexpectedChar { found: char, position: usize },

    #[error("unterminated text literal")]
    UnterminatedText,

    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("unexpected token {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("only field references can be subscripted")]
    SubscriptTarget,
}

/// Compiles sources of the reference language.
#[derive(Debug, Default, Clone, Copy)]
pub struct LangCompiler;

impl LangCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Parses `source` without wrapping it for the registry.
    pub fn parse(&self, source: &str) -> Result<Program, LangError> {
        let tokens = lexer::tokenize(source)?;
        Ok(Program {
            root: parser::parse(tokens)?,
        })
    }
}

impl ExpressionCompiler for LangCompiler {
    fn compile(&self, source: &str) -> Result<Arc<dyn CompiledExpression>, CompileError> {
        Ok(Arc::new(self.parse(source)?))
    }
}

/// A parsed expression.
#[derive(Debug)]
pub struct Program {
    root: Ast,
}

impl CompiledExpression for Program {
    fn evaluate<'a>(&self, field_path: &str, ctx: &EvalContext<'a>) -> Value<'a> {
        self.root.eval(field_path, ctx)
    }
}

#[cfg(test)]
mod tests;
