pub mod init;
pub mod list_models;
pub mod probe;
pub mod take;
pub mod topics;
pub mod validate;
