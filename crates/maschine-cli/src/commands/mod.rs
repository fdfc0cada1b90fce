pub mod generate;
pub mod resources;
pub mod update;
pub mod validate;
