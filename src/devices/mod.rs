pub mod snapshot;
pub mod softwell;
pub mod traits;

pub use snapshot::{DecodedSnapshot, Freshness};
pub use softwell::SoftwellDevice;
pub use traits::DeviceData;
