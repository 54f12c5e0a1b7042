//! uiv: drive a running web application through headless Chrome and
//! verify it with a declarative step flow.

pub mod cli;
pub mod commands;
pub mod error;
pub mod flow;
pub mod logging;
pub mod output;
pub mod runner;
pub mod styles;
