pub mod app;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod fill;
pub mod inspect;
pub mod learn;
pub mod output;
pub mod patterns;
pub mod profile;
pub mod runtime;

pub use app::run;
