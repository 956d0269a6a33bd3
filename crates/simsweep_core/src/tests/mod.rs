//! Integration tests for the sweep engine
//!
//! Tests are organized by topic:
//! - `stats` - statistics properties and known values
//! - `config` - configuration loading, key stripping, validation
//! - `aggregate` - trial folding and derived metrics
//! - `driver` - full runs against scripted simulator processes
//! - `chart` - chart rendering to disk

mod config;
