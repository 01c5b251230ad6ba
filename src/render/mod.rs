pub(crate) mod frame;
pub(crate) mod preview;
pub(crate) mod renderer;
pub(crate) mod session;
