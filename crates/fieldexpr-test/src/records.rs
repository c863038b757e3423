//! Record fixtures.
//!
//! Every type derives `Record` and carries annotations in the reference
//! language (see [`crate::lang`]).
//!
//! # Example
//!
//! ```
//! use fieldexpr_test::records::User;
//!
//! let registry = fieldexpr_test::registry();
//! let user = User::sample();
//! let ctx = registry.bind(&user).unwrap();
//! assert!(ctx.eval_bool("age@adult"));
//! ```

use std::collections::HashMap;

use fieldexpr::Record;

/// A value the registry cannot read.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Handle(pub u64);

/// A postal address, nested inside [`User`].
#[derive(Clone, Debug, Default, PartialEq, Record)]
pub struct Address {
    #[expr("$ != ''")]
    pub city: String,

    #[expr("{@:$ > 0}{format:$ < 100000}")]
    pub zip: u32,
}

impl Address {
    /// Creates an address.
    pub fn new(city: &str, zip: u32) -> Self {
        Self {
            city: city.to_string(),
            zip,
        }
    }
}

/// A user covering every field kind and derive attribute.
#[derive(Clone, Debug, Default, PartialEq, Record)]
pub struct User {
    #[expr("{@:$ != ''}{greeting:'hi ' + $}")]
    pub name: String,

    #[expr("{@:$ >= 0 && $ < 150}{adult:$ >= 18}")]
    #[expr(check = "$ > (limit)")]
    pub age: i32,

    pub limit: u8,

    #[expr("{@:$[0] > 0}{last:$[2]}")]
    pub scores: Vec<i64>,

    #[expr("$['admin'] == true")]
    pub roles: HashMap<String, bool>,

    #[record(rename = "nick")]
    #[expr("$ == null || $ != ''")]
    pub nickname: Option<String>,

    #[expr("(address.city) != ''")]
    pub address: Address,

    pub backup: Option<Box<Address>>,

    #[record(opaque)]
    #[expr("true")]
    pub handle: Handle,

    #[record(skip)]
    pub cache: Vec<u8>,
}

impl User {
    /// Creates a user with every field populated except `nickname` and
    /// `backup`.
    pub fn sample() -> Self {
        Self {
            name: "Ada".to_string(),
            age: 36,
            limit: 21,
            scores: vec![3, 5, 8],
            roles: HashMap::from([("admin".to_string(), true)]),
            nickname: None,
            address: Address::new("London", 10001),
            backup: None,
            handle: Handle(7),
            cache: vec![1, 2, 3],
        }
    }
}

/// A self-referential record.
#[derive(Clone, Debug, Default, PartialEq, Record)]
pub struct Tree {
    #[expr("$ > 0")]
    pub value: i32,

    pub children: Vec<Tree>,

    pub parent: Option<Box<Tree>>,
}

impl Tree {
    /// Creates a leaf.
    pub fn leaf(value: i32) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }
}
