pub mod branding;
pub mod config;
pub mod generate;
pub mod render;
