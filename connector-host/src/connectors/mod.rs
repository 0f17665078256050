//! Built-in connector implementations.

pub mod bing;
pub mod cognitive;
pub mod jira;
pub mod servicenow;
pub mod yext;
