mod price;
mod side;

pub use price::{PRICE_DECIMALS, PRICE_SCALE, Price};
pub use side::Side;
