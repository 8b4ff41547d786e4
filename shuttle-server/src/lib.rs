//! Campus shuttle transfer optimization server.
//!
//! A web service that answers: "which underutilized bus routes could be
//! emptied by moving their riders onto other routes that share a usable
//! boarding point?"

pub mod campus;
pub mod domain;
pub mod matcher;
pub mod planner;
pub mod registry;
pub mod web;
