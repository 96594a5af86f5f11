pub mod codec;
pub mod core_api;
pub mod derived;
pub mod document;
pub mod fields;
pub mod layout;
pub mod persist;
pub mod policy;
pub mod rewrite;
pub mod studio;
