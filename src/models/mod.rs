pub mod price;
pub mod window;
