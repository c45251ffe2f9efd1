pub mod bluetooth;
pub mod logging;
pub mod reporter;
pub mod scratch;
