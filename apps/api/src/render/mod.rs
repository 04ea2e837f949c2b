// Render: compiling generated markup and serving the resulting artifacts.

pub mod compiler;
pub mod handlers;
pub mod storage;
