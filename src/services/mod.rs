pub mod chart_service;
pub mod error_service;
pub mod fetch_service;
pub mod plot_service;
pub mod submit_service;
