use serde::de::DeserializeOwned;

use crate::reader::ReadError;

/// Deserialize a JSON document with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str, context: &str) -> Result<T, ReadError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| json_error(context, err))
}

/// Same, for a value already parsed (e.g. one bundle entry).
pub fn from_value_with_path<T: DeserializeOwned>(
    value: serde_json::Value,
    context: &str,
) -> Result<T, ReadError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| json_error(context, err))
}

fn json_error<E: std::fmt::Display>(context: &str, err: serde_path_to_error::Error<E>) -> ReadError {
    ReadError::Json {
        context: context.to_string(),
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    }
}
