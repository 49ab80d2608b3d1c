pub mod font;
pub mod palette;
pub mod social;
pub mod user;
