//! Integration tests for scriptenv

mod cli;
mod scenarios;
