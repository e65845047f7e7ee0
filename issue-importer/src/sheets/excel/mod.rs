//! xlsx workbook I/O

mod reader;
mod writer;

pub use reader::read_workbook_rows;
pub use writer::write_workbook;
