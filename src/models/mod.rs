pub mod album;
pub mod payment;
pub mod rate;
pub mod response;

pub use album::*;
pub use payment::*;
pub use rate::*;
pub use response::*;
