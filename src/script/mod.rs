pub mod compiler;
pub(crate) mod lexer;
pub mod prelude;
pub mod program;
pub mod validate;
pub mod value;
