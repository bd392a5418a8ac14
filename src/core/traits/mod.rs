pub mod device_store;
pub mod dictionary_codec;
pub mod word_differ;
