pub mod config;
pub mod logging;
pub mod notifications;
pub mod paths;
pub mod pbxproj;
pub mod project;

pub mod commands {
    pub mod move_file;
}
