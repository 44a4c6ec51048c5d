pub mod bill;
pub mod product;
pub mod user;

pub use bill::*;
pub use product::*;
pub use user::*;
