//! Ticker forecast controller
//!
//! Takes a ticker and a date from a host form, asks the prediction backend
//! for a price series and renders it as a line chart, or shows what went
//! wrong in the host's error region.

use std::sync::Arc;

use serenity::prelude::TypeMapKey;

pub mod api;
pub mod commands;
pub mod config;
pub mod models;
pub mod services;
pub mod surface;

pub struct PredictionApi;

impl TypeMapKey for PredictionApi {
    type Value = Arc<dyn api::PredictionTransport>;
}

pub struct AppSettings;

impl TypeMapKey for AppSettings {
    type Value = config::Settings;
}
