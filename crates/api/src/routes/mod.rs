//! HTTP Route Handlers

pub mod calculate;
pub mod form;
