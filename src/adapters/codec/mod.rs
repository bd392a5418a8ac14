pub mod jinja_codec;
