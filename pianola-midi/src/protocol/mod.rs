pub mod file;
pub mod meta;
pub mod status;
pub mod track;
pub mod vlq;
