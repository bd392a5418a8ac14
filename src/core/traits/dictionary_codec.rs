use crate::core::errors::Result;
use crate::core::models::device_dictionary::DeviceDictionary;

/// Port for converting device dictionaries to and from their text form.
///
/// The only shipped format is the jinja2-style `extends`/`set` template;
/// the trait keeps the loader and resolver independent of it.
pub trait DictionaryCodec: Send + Sync {
    /// Render `dict` as template text extending the `extends` template.
    fn encode(&self, dict: &DeviceDictionary, extends: &str) -> Result<String>;

    /// Recover a device dictionary from template text.
    fn decode(&self, text: &str) -> Result<DeviceDictionary>;
}
