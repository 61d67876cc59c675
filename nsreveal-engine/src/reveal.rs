//! Main module for the token detection and rewriting engine

pub mod dom;
pub mod engine;
pub mod error;
pub mod html;
pub mod ids;
pub mod mapping;
pub mod policy;
pub mod rewriter;
pub mod scanner;
pub mod settings;
pub mod testing;
pub mod walker;
pub mod watcher;
