//! A minimal personal wiki with versioned pages.
//!
//! Every save appends a revision row; the highest id for a name is the
//! current page, and older ids stay addressable as history. Pages are written
//! in Markdown and rendered to HTML on every read.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod output;
pub mod render;
pub mod repo;
pub mod resolver;
pub mod router;
pub mod state;
pub mod templates;
pub mod validation;
