//! Shared models used by every feature
//!
//! The program model is the input contract of the analysis: functions,
//! instructions, named types and interfaces, already type-checked and
//! lowered by an external front end.

pub mod models;
