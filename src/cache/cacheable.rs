//! Cacheable Module
//!
//! The bound every cached value satisfies, and the stable type tags written
//! next to persisted values.

use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;
use serde::Serialize;

// == Cacheable ==
/// Values a cache can hold.
///
/// Serde support is needed by the persistent tier; `Clone` lets the memory
/// tier hand out copies while keeping its own.
///
/// [`Cacheable::type_tag`] names the type inside persisted records. Tags must
/// not change between builds, otherwise existing files read as absent. Two
/// types that deserialize from the same data need distinct tags.
///
/// ```
/// use relical::Cacheable;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Serialize, Deserialize)]
/// struct Profile {
///     name: String,
/// }
///
/// impl Cacheable for Profile {
///     fn type_tag() -> String {
///         "app.Profile".to_string()
///     }
/// }
/// ```
pub trait Cacheable: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Stable name of the type in persisted records.
    fn type_tag() -> String;
}

macro_rules! impl_cacheable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Cacheable for $ty {
                fn type_tag() -> String {
                    stringify!($ty).to_string()
                }
            }
        )*
    };
}

impl_cacheable!(
    bool, char, String, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
);

impl Cacheable for () {
    fn type_tag() -> String {
        "()".to_string()
    }
}

impl Cacheable for serde_json::Value {
    fn type_tag() -> String {
        "Json".to_string()
    }
}

impl<T: Cacheable> Cacheable for Vec<T> {
    fn type_tag() -> String {
        format!("Vec<{}>", T::type_tag())
    }
}

impl<T: Cacheable> Cacheable for Option<T> {
    fn type_tag() -> String {
        format!("Option<{}>", T::type_tag())
    }
}

impl<V: Cacheable> Cacheable for HashMap<String, V> {
    fn type_tag() -> String {
        format!("HashMap<String,{}>", V::type_tag())
    }
}

impl<V: Cacheable> Cacheable for BTreeMap<String, V> {
    fn type_tag() -> String {
        format!("BTreeMap<String,{}>", V::type_tag())
    }
}

impl<A: Cacheable, B: Cacheable> Cacheable for (A, B) {
    fn type_tag() -> String {
        format!("({},{})", A::type_tag(), B::type_tag())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_tags_are_fixed_names() {
        assert_eq!(u8::type_tag(), "u8");
        assert_eq!(u64::type_tag(), "u64");
        assert_eq!(String::type_tag(), "String");
        assert_eq!(f64::type_tag(), "f64");
        assert_eq!(<()>::type_tag(), "()");
    }

    #[test]
    fn test_container_tags_compose() {
        assert_eq!(Vec::<u8>::type_tag(), "Vec<u8>");
        assert_eq!(Option::<String>::type_tag(), "Option<String>");
        assert_eq!(
            HashMap::<String, serde_json::Value>::type_tag(),
            "HashMap<String,Json>"
        );
        assert_eq!(
            BTreeMap::<String, Vec<i64>>::type_tag(),
            "BTreeMap<String,Vec<i64>>"
        );
        assert_eq!(<(u32, bool)>::type_tag(), "(u32,bool)");
    }

    #[test]
    fn test_same_shape_types_have_distinct_tags() {
        assert_ne!(u32::type_tag(), u64::type_tag());
        assert_ne!(Vec::<u8>::type_tag(), Vec::<u16>::type_tag());
        assert_ne!(
            HashMap::<String, String>::type_tag(),
            BTreeMap::<String, String>::type_tag()
        );
    }
}
