pub mod flows;
pub mod help;

pub use flows::*;
pub use help::*;
