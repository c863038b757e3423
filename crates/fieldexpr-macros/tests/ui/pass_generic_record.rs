use fieldexpr::prelude::*;

#[derive(Record)]
struct Wrapper<T: Reflect> {
    #[expr("$")]
    inner: T,
    #[expr(check = "$ > 0")]
    count: usize,
}

fn main() {
    let schema = Wrapper::<String>::schema();
    assert_eq!(schema.fields().len(), 2);
    assert_eq!(
        schema.fields()[1].annotation("check"),
        Some("$ > 0")
    );
}
