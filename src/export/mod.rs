pub(crate) mod pipeline;
pub(crate) mod record;
