pub mod capture;
pub mod decode;
pub mod table;
pub mod types;
