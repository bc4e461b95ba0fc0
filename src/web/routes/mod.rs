pub(crate) mod drafts;
pub(crate) mod segments;
pub(crate) mod status;
pub(crate) mod timelines;
