use crate::engine::error::{DispatchError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Positional arguments handed to an operation on every attempt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Value", try_from = "Value")]
pub enum Arguments {
    /// The operation is invoked without arguments
    #[default]
    None,
    /// The operation is invoked with these values, in order
    List(Vec<Value>),
}

impl Arguments {
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Arguments::List(values.into_iter().map(Into::into).collect())
    }

    pub fn as_slice(&self) -> &[Value] {
        match self {
            Arguments::None => &[],
            Arguments::List(values) => values,
        }
    }

    pub fn first(&self) -> Option<&Value> {
        self.as_slice().first()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl TryFrom<Value> for Arguments {
    type Error = DispatchError;

    /// `null` means no arguments and an array is a positional list; any
    /// other shape is rejected.
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Arguments::None),
            Value::Array(values) => Ok(Arguments::List(values)),
            other => Err(DispatchError::invalid_configuration(format!(
                "Invalid parameters given: {other}"
            ))),
        }
    }
}

impl From<Arguments> for Value {
    fn from(arguments: Arguments) -> Self {
        match arguments {
            Arguments::None => Value::Null,
            Arguments::List(values) => Value::Array(values),
        }
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Arguments::List(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_shapes() {
        assert_eq!(Arguments::try_from(Value::Null).unwrap(), Arguments::None);
        assert_eq!(
            Arguments::try_from(json!([1, "two"])).unwrap(),
            Arguments::List(vec![json!(1), json!("two")])
        );

        let err = Arguments::try_from(json!({"x": 1})).unwrap_err();
        assert!(err.is_invalid_configuration());
        assert!(Arguments::try_from(json!(7)).is_err());
        assert!(Arguments::try_from(json!("7")).is_err());
    }

    #[test]
    fn test_accessors() {
        let args = Arguments::list([3, 4]);
        assert_eq!(args.len(), 2);
        assert_eq!(args.first(), Some(&json!(3)));
        assert!(Arguments::None.is_empty());
        assert_eq!(Arguments::None.first(), None);
    }

    #[test]
    fn test_serde_uses_plain_json() {
        let args: Arguments = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(args, Arguments::list([1, 2]));
        assert_eq!(serde_json::to_string(&Arguments::None).unwrap(), "null");
        assert!(serde_json::from_str::<Arguments>("{}").is_err());
    }
}
