pub mod item;
pub mod response;

pub use item::*;
pub use response::*;
