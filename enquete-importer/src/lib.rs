//! Survey spreadsheet importer
//!
//! Reads facility survey worksheets, maps each row through a declarative
//! column mapping into typed records and replaces the facility's rows in
//! its organization's PostgreSQL database.

pub mod cli;
pub mod config;
pub mod db;
pub mod enquete;
pub mod runner;
pub mod sheet;
