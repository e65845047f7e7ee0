pub mod import;
pub mod report;
pub mod validate;
