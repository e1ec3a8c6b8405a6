pub mod error_mapping;
pub mod four_file;

pub use error_mapping::{device_error_kind, errno_to_error_kind, error_kind_to_str};
pub use four_file::FourFile;
