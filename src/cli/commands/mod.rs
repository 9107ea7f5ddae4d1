pub mod mounts;
pub mod request;
pub mod sudo;
