//! Vacation-rental availability search.
//!
//! The backend half ([`server`], [`sources`], [`normalize`]) serves spreadsheet
//! rows as JSON. The client half ([`fetcher`], [`reconcile`]) turns that payload
//! into bookable spans, searches them and prices a chosen stay.

pub mod config;
pub mod dates;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod normalize;
pub mod reconcile;
pub mod server;
pub mod sources;
