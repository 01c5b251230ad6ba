pub(crate) mod camera;
pub(crate) mod ease;
pub(crate) mod reveal;
pub(crate) mod timeline;
