pub mod aisle;
pub mod product;
