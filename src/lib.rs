//! traindash — terminal dashboard client for the school training-record
//! system.
//!
//! Talks to the spreadsheet-automation backend (a Google Apps Script web
//! app) through a retrying transport client, keeps the last-fetched
//! dashboard snapshot in an explicit state container, and renders
//! statistics, monthly series, staff rankings, and a paginated task table
//! in the terminal. A small embedded HTTP server re-exposes the same data
//! as JSON for the school LAN.

pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod forms;
pub mod model;
pub mod notify;
pub mod render;
pub mod state;
pub mod util;
pub mod web;
