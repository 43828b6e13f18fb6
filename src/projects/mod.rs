//! Authenticated project workflow: projects, guest uploads and card edits.

pub mod handlers;
pub mod models;
pub mod upload;
