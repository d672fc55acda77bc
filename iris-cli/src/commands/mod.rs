pub mod convert;
pub mod extract;
pub mod oklab;
