mod mode_string_ext;
mod system_time_ext;

pub use mode_string_ext::ModeStringExt;
pub use system_time_ext::SystemTimeExt;
