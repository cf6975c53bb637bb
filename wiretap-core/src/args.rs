//! Ordered name → value argument mapping for an intercepted call.
//!
//! Values are rendered to JSON as soon as they are added, so a `CallArgs`
//! never borrows from the call site and can outlive the arguments it
//! describes. A value that fails to serialize is remembered as a failure;
//! serializing the whole mapping then fails too, which the serializer turns
//! into the `args-formatting-failed` sentinel.

use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;

#[derive(Debug, Clone)]
enum Captured {
    Json(Box<RawValue>),
    Failed(String),
}

/// Arguments of one call, in declaration order, names unique.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    entries: Vec<(String, Captured)>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`CallArgs::insert`].
    pub fn with<T: Serialize + ?Sized>(mut self, name: impl Into<String>, value: &T) -> Self {
        self.insert(name, value);
        self
    }

    /// Capture `value` under `name`. Re-inserting a name replaces its value
    /// and keeps its original position.
    pub fn insert<T: Serialize + ?Sized>(&mut self, name: impl Into<String>, value: &T) {
        let name = name.into();
        let captured = match serde_json::value::to_raw_value(value) {
            Ok(raw) => Captured::Json(raw),
            Err(e) => Captured::Failed(e.to_string()),
        };

        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = captured,
            None => self.entries.push((name, captured)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Argument names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// JSON text captured for `name`, if it serialized.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| match v {
                Captured::Json(raw) => Some(raw.get()),
                Captured::Failed(_) => None,
            })
    }

    /// At least one value failed to serialize.
    pub fn has_failures(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, v)| matches!(v, Captured::Failed(_)))
    }
}

impl Serialize for CallArgs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            match value {
                Captured::Json(raw) => map.serialize_entry(name, raw)?,
                Captured::Failed(reason) => {
                    return Err(S::Error::custom(format!(
                        "argument `{name}` could not be serialized: {reason}"
                    )));
                }
            }
        }
        map.end()
    }
}

/// Build a [`CallArgs`] from local variables or `name = expr` pairs.
///
/// ```
/// use wiretap_core::call_args;
///
/// let amount = 100;
/// let args = call_args!(amount, currency = "USD");
/// assert_eq!(args.names().collect::<Vec<_>>(), vec!["amount", "currency"]);
/// ```
#[macro_export]
macro_rules! call_args {
    (@value $name:ident) => {
        $name
    };
    (@value $name:ident = $value:expr) => {
        $value
    };
    () => {
        $crate::args::CallArgs::new()
    };
    ($($name:ident $(= $value:expr)?),+ $(,)?) => {
        $crate::args::CallArgs::new()
            $(.with(stringify!($name), &$crate::call_args!(@value $name $(= $value)?)))+
    };
}
