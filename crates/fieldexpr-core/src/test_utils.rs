//! Test utilities for fieldexpr-core
//!
//! Provides hand-written record fixtures and a tiny path-only expression
//! compiler used across the crate's test modules.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::context::{sibling_path, EvalContext};
use crate::expression::{CompileError, CompiledExpression, ExpressionCompiler};
use crate::reflect::{FieldSchema, FieldShape, Record, RecordSchema, Reflect, Reflected};
use crate::value::Value;

macro_rules! impl_reflect_record {
    ($($ty:ty),* $(,)?) => {$(
        impl Reflect for $ty {
            fn shape() -> FieldShape {
                FieldShape::record::<Self>()
            }

            fn reflect(&self) -> Reflected<'_> {
                Reflected::Record(self)
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    )*};
}

impl_reflect_record!(Address, Person, Node, Team, Member, Pair);

/// A nested record with one anonymous and one named expression.
#[derive(Clone, Debug, Default)]
pub struct Address {
    pub city: String,
    pub zip: u32,
}

impl Address {
    pub fn new(city: &str, zip: u32) -> Self {
        Self {
            city: city.to_string(),
            zip,
        }
    }
}

impl Record for Address {
    fn schema() -> RecordSchema {
        RecordSchema::new::<Self>()
            .with_field(
                FieldSchema::new("city", |a: &Address| &a.city).with_annotation("expr", "$"),
            )
            .with_field(
                FieldSchema::new("zip", |a: &Address| &a.zip)
                    .with_annotation("expr", "{@:$}{code:(zip)}"),
            )
    }
}

/// A record covering every field kind.
#[derive(Clone, Debug, Default)]
pub struct Person {
    pub name: String,
    pub age: i8,
    pub score: f32,
    pub active: bool,
    pub nickname: Option<String>,
    pub boss_age: Option<Box<u16>>,
    pub scores: Vec<i64>,
    pub grid: [u8; 3],
    pub labels: HashMap<String, i32>,
    pub ids: BTreeMap<u32, String>,
    pub home: Address,
    pub work: Option<Box<Address>>,
    pub extra: (),
}

impl Person {
    pub fn sample() -> Self {
        Self {
            name: "Ada".to_string(),
            age: -5,
            score: 2.5,
            active: true,
            nickname: None,
            boss_age: Some(Box::new(61)),
            scores: vec![10, 20, 30],
            grid: [7, 8, 9],
            labels: HashMap::from([("a".to_string(), 1), ("b".to_string(), 2)]),
            ids: BTreeMap::from([(7, "seven".to_string())]),
            home: Address::new("Paris", 75001),
            work: None,
            extra: (),
        }
    }
}

impl Record for Person {
    fn schema() -> RecordSchema {
        RecordSchema::new::<Self>()
            .with_field(
                FieldSchema::new("name", |p: &Person| &p.name).with_annotation("expr", "$"),
            )
            .with_field(
                FieldSchema::new("age", |p: &Person| &p.age)
                    .with_annotation("expr", "{@:$}{limit:120}")
                    .with_annotation("check", "(score)"),
            )
            .with_field(FieldSchema::new("score", |p: &Person| &p.score))
            .with_field(
                FieldSchema::new("active", |p: &Person| &p.active).with_annotation("expr", "$"),
            )
            .with_field(FieldSchema::new("nickname", |p: &Person| &p.nickname))
            .with_field(FieldSchema::new("boss_age", |p: &Person| &p.boss_age))
            .with_field(
                FieldSchema::new("scores", |p: &Person| &p.scores)
                    .with_annotation("expr", "{first:$[0]}{missing:$[5]}"),
            )
            .with_field(FieldSchema::new("grid", |p: &Person| &p.grid))
            .with_field(FieldSchema::new("labels", |p: &Person| &p.labels))
            .with_field(FieldSchema::new("ids", |p: &Person| &p.ids))
            .with_field(FieldSchema::new("home", |p: &Person| &p.home))
            .with_field(FieldSchema::new("work", |p: &Person| &p.work))
            .with_field(FieldSchema::new("extra", |p: &Person| &p.extra))
    }
}

/// A self-referential record.
#[derive(Clone, Debug, Default)]
pub struct Node {
    pub value: i32,
    pub next: Option<Box<Node>>,
}

impl Record for Node {
    fn schema() -> RecordSchema {
        RecordSchema::new::<Self>()
            .with_field(
                FieldSchema::new("value", |n: &Node| &n.value).with_annotation("expr", "$"),
            )
            .with_field(FieldSchema::new("next", |n: &Node| &n.next))
    }
}

/// Half of a mutually recursive pair with [`Member`].
#[derive(Clone, Debug, Default)]
pub struct Team {
    pub size: u32,
    pub lead: Option<Box<Member>>,
}

impl Record for Team {
    fn schema() -> RecordSchema {
        RecordSchema::new::<Self>()
            .with_field(FieldSchema::new("size", |t: &Team| &t.size).with_annotation("expr", "$"))
            .with_field(FieldSchema::new("lead", |t: &Team| &t.lead))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Member {
    pub age: u8,
    pub team: Option<Box<Team>>,
}

impl Record for Member {
    fn schema() -> RecordSchema {
        RecordSchema::new::<Self>()
            .with_field(FieldSchema::new("age", |m: &Member| &m.age).with_annotation("expr", "$"))
            .with_field(FieldSchema::new("team", |m: &Member| &m.team))
    }
}

/// A record whose annotation repeats an expression name.
#[derive(Clone, Debug, Default)]
pub struct Pair {
    pub left: i32,
}

impl Record for Pair {
    fn schema() -> RecordSchema {
        RecordSchema::new::<Self>().with_field(
            FieldSchema::new("left", |p: &Pair| &p.left).with_annotation("expr", "{@:1}{@:2}"),
        )
    }
}

#[derive(Debug)]
struct Unsupported(String);

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported expression: {}", self.0)
    }
}

impl std::error::Error for Unsupported {}

#[derive(Clone)]
enum Literal {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Literal {
    fn value<'a>(&self) -> Value<'a> {
        match self {
            Literal::Number(n) => Value::Number(*n),
            Literal::Text(t) => Value::from(t.clone()),
            Literal::Bool(b) => Value::Bool(*b),
        }
    }
}

enum Operand {
    Field(Option<String>, Vec<Literal>),
    Literal(Literal),
}

struct PathExpr {
    operand: Operand,
    evaluations: Arc<AtomicUsize>,
}

impl CompiledExpression for PathExpr {
    fn evaluate<'a>(&self, field_path: &str, ctx: &EvalContext<'a>) -> Value<'a> {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        match &self.operand {
            Operand::Field(path, subscripts) => {
                let keys: Vec<Value<'_>> = subscripts.iter().map(Literal::value).collect();
                match path {
                    None => ctx.resolve_field(field_path, &keys),
                    Some(path) => ctx.resolve_field(&sibling_path(field_path, path), &keys),
                }
            }
            Operand::Literal(literal) => literal.value(),
        }
    }
}

/// Compiles `$`, `(path)`, optional `[n]` / `['key']` subscripts, and
/// number, `'text'`, `true`/`false` literals. Everything else is rejected.
#[derive(Default)]
pub struct PathCompiler {
    compiled: AtomicUsize,
    evaluations: Arc<AtomicUsize>,
}

impl PathCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sources compiled so far.
    pub fn compiled(&self) -> usize {
        self.compiled.load(Ordering::SeqCst)
    }

    /// Shared counter of expression evaluations.
    pub fn evaluations(&self) -> Arc<AtomicUsize> {
        self.evaluations.clone()
    }

    fn parse(source: &str) -> Option<Operand> {
        let source = source.trim();
        if let Some(rest) = source.strip_prefix('$') {
            return Some(Operand::Field(None, Self::subscripts(rest)?));
        }
        if let Some(rest) = source.strip_prefix('(') {
            let end = rest.find(')')?;
            let path = rest[..end].trim().to_string();
            return Some(Operand::Field(Some(path), Self::subscripts(&rest[end + 1..])?));
        }
        Self::literal(source).map(Operand::Literal)
    }

    fn subscripts(mut rest: &str) -> Option<Vec<Literal>> {
        let mut out = Vec::new();
        while let Some(inner) = rest.strip_prefix('[') {
            let end = inner.find(']')?;
            out.push(Self::literal(inner[..end].trim())?);
            rest = &inner[end + 1..];
        }
        rest.trim().is_empty().then_some(out)
    }

    fn literal(source: &str) -> Option<Literal> {
        match source {
            "true" => Some(Literal::Bool(true)),
            "false" => Some(Literal::Bool(false)),
            _ => {
                if let Some(text) = source.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
                    return Some(Literal::Text(text.to_string()));
                }
                source.parse::<f64>().ok().map(Literal::Number)
            }
        }
    }
}

impl ExpressionCompiler for PathCompiler {
    fn compile(&self, source: &str) -> Result<Arc<dyn CompiledExpression>, CompileError> {
        self.compiled.fetch_add(1, Ordering::SeqCst);
        let operand = Self::parse(source).ok_or_else(|| Unsupported(source.to_string()))?;
        Ok(Arc::new(PathExpr {
            operand,
            evaluations: self.evaluations.clone(),
        }))
    }
}
