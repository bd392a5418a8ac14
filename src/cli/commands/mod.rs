pub mod compare;
pub mod dictionary;
pub mod render;
pub mod template;
