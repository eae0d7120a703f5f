//! stevedore: selective export/import of a self-hosted deployment.
//!
//! A backup set is a plain directory tree: a `format` version stamp plus one
//! subpath per exported component (extensions, database dump, config, bulk
//! data, encryption keys, certificates). Export writes one from the live
//! deployment while its write path is suspended; import replays any subset of
//! it onto a live deployment under the same suspension.

pub mod cli;
pub mod collab;
mod handlers;
pub mod layout;
pub mod lock;
pub mod logger;
pub mod orchestrator;
pub mod sanitize;
pub mod selection;
pub mod settings;
pub mod system;
