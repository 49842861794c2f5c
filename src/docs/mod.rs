//! Generated documentation: the book's table of contents and pull-request bodies.

pub mod pr_body;
pub mod scanner;
pub mod toc;
