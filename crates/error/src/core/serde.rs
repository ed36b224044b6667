//! Client-facing serialization for [`Error`].
//!
//! The serialized view is what an API boundary wants to hand out: this
//! node's operation, the resolved code and message, and the rendered
//! trace. Stacktraces are operator-only and deliberately excluded.

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::core::chain::{error_code, error_message};
use crate::core::error::Error;

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Error", 4)?;
        state.serialize_field("operation", &self.operation())?;
        state.serialize_field("code", &error_code(self))?;
        state.serialize_field("message", &error_message(self))?;
        state.serialize_field("cause", &self.to_string())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::{codes, Error};

    #[test]
    fn serializes_the_client_view() {
        let inner = Error::new("Foo", codes::DATABASE, "cannot foo");
        let err = Error::wrap("Outer", inner).with_message("try again later");

        let value = serde_json::to_value(&err).expect("serializable");
        assert_eq!(
            value,
            json!({
                "operation": "Outer",
                "code": "database_error",
                "message": "try again later",
                "cause": "Outer: Foo: [database_error] cannot foo",
            })
        );
    }

    #[test]
    fn unset_facets_serialize_as_null() {
        let err = Error::new("Foo", "", "boom");
        let value = serde_json::to_value(&err).expect("serializable");
        assert_eq!(value["code"], serde_json::Value::Null);
        assert_eq!(value["message"], serde_json::Value::Null);
    }
}
