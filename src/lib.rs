pub mod corpus;
pub mod features;
pub mod serializer;
pub mod tokenizer;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn get_version() -> &'static str {
    VERSION
}
