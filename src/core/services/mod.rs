pub mod diff_service;
pub mod sequence_matcher;
pub mod source_loader;
pub mod template_resolver;
