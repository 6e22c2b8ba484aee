pub mod bench;
pub mod cli;
pub mod error;
pub mod gen;
pub mod reduce;
pub mod report;
pub mod vacancy;
