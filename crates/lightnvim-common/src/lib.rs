pub mod errors;
pub mod font;
pub mod id;
pub mod once;
pub mod types;

pub use errors::{ConfigError, LightNvimError, PlatformError};
pub use font::{FontDescriptor, FontStyle, FontWeight};
pub use id::{new_id, socket_name};
pub use once::OneShot;
pub use types::{CellSize, Color, Padding, PixelSize};

pub type Result<T> = std::result::Result<T, LightNvimError>;
