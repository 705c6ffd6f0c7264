pub mod config;
pub mod field;
pub mod item;
pub mod raw;
pub mod value;

pub use config::*;
pub use field::*;
pub use item::*;
pub use value::*;
