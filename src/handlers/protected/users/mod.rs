pub mod dietary_settings;

pub use dietary_settings::get as dietary_settings_get;
pub use dietary_settings::patch as dietary_settings_patch;
