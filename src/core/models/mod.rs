pub mod device_dictionary;
pub mod diff_result;
pub mod resolved_config;
pub mod source_kind;
