pub mod albums;
pub mod health;
pub mod payments;
pub mod rates;
pub mod state;

pub use albums::*;
pub use health::*;
pub use payments::*;
pub use rates::*;
pub use state::*;
