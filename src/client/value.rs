use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::fmt;

pub type MapFieldValue = BTreeMap<String, FieldValue>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Array(Vec<FieldValue>),
    Map(MapFieldValue),
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> FieldValue {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> FieldValue {
        FieldValue::String(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> FieldValue {
        FieldValue::Integer(i)
    }
}

impl From<f64> for FieldValue {
    fn from(d: f64) -> FieldValue {
        FieldValue::Double(d)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> FieldValue {
        FieldValue::Boolean(b)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Double(d) => write!(f, "{}", d),
            FieldValue::String(s) => write!(f, "{:?}", s),
            FieldValue::Array(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            FieldValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shapes_map_to_variants() {
        let map: MapFieldValue = serde_json::from_str(
            r#"{"n": null, "b": true, "i": 3, "d": 1.5, "s": "x", "a": [1, "y"], "m": {"k": 2}}"#,
        ).unwrap();
        assert_eq!(map["n"], FieldValue::Null);
        assert_eq!(map["b"], FieldValue::Boolean(true));
        assert_eq!(map["i"], FieldValue::Integer(3));
        assert_eq!(map["d"], FieldValue::Double(1.5));
        assert_eq!(map["s"], FieldValue::from("x"));
        assert_eq!(map["a"], FieldValue::Array(vec![FieldValue::Integer(1), FieldValue::from("y")]));
        let mut inner = MapFieldValue::new();
        inner.insert("k".to_string(), FieldValue::Integer(2));
        assert_eq!(map["m"], FieldValue::Map(inner));
    }

    #[test]
    fn display_is_literal() {
        assert_eq!(FieldValue::from("blue").to_string(), "\"blue\"");
        assert_eq!(FieldValue::from(42i64).to_string(), "42");
        assert_eq!(FieldValue::from(false).to_string(), "false");
        assert_eq!(FieldValue::Null.to_string(), "null");

        let mut map = MapFieldValue::new();
        map.insert("a".to_string(), FieldValue::Array(vec![1i64.into(), "z".into()]));
        assert_eq!(FieldValue::Map(map).to_string(), "{a: [1, \"z\"]}");
    }
}
