pub(crate) mod ffmpeg;
pub(crate) mod script;
pub(crate) mod sink;
pub(crate) mod zip;
