pub mod banner;
pub mod codegen;
pub mod config;
pub mod consent;
pub mod server;
pub mod studio;
#[doc(hidden)]
pub mod test_support;
