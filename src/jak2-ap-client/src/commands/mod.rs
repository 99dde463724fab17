//! Command handlers for the jak2-client CLI

pub mod configure;
pub mod console;
pub mod layout;
pub mod run;
