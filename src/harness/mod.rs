pub mod process;
pub mod pytype_session;
pub mod workdir;
