//! Query-string arguments for backend GET requests.

/// Value of one query argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryValue {
    Scalar(String),
    /// Serialized as the same parameter repeated once per element.
    List(Vec<String>),
    /// Omitted from the query string.
    Null,
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Scalar(value.to_string())
    }
}

macro_rules! scalar_from_number {
    ($($ty:ty),*) => {
        $(impl From<$ty> for QueryValue {
            fn from(value: $ty) -> Self {
                Self::Scalar(value.to_string())
            }
        })*
    };
}

scalar_from_number!(i32, i64, u32, u64, usize);

impl<T: ToString> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Ordered query arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryArgs(Vec<(String, QueryValue)>);

impl QueryArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an argument, replacing an earlier one with the same name.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// First serialized value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .and_then(|(_, value)| match value {
                QueryValue::Scalar(value) => Some(value.as_str()),
                QueryValue::List(values) => values.first().map(String::as_str),
                QueryValue::Null => None,
            })
    }

    /// Flattens the arguments into name/value pairs in insertion order.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.0
            .iter()
            .flat_map(|(key, value)| -> Vec<(&str, &str)> {
                match value {
                    QueryValue::Scalar(value) => vec![(key.as_str(), value.as_str())],
                    QueryValue::List(values) => values
                        .iter()
                        .map(|value| (key.as_str(), value.as_str()))
                        .collect(),
                    QueryValue::Null => Vec::new(),
                }
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }
}
