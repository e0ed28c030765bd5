//! Macros for defining typed label values.

/// Macro to define a typed label value.
///
/// This generates a newtype wrapper around `String` with:
/// - A `WHAT` constant naming the value in error messages
/// - `parse()` validating against the label value grammar
/// - `as_str()` and `into_string()` accessors
/// - `Display`, `FromStr`, `TryFrom<String>` and `AsRef<str>` implementations
/// - `Serialize` and `Deserialize` implementations
///
/// # Example
///
/// ```ignore
/// define_label_value!(WorkloadName, "workload name");
///
/// let name: WorkloadName = "default".parse()?;
/// ```
#[macro_export]
macro_rules! define_label_value {
    ($name:ident, $what:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Name of this value in error messages.
            pub const WHAT: &'static str = $what;

            /// Parses and validates a label value.
            pub fn parse(s: &str) -> Result<Self, $crate::LabelError> {
                $crate::validate_label_value(Self::WHAT, s)?;
                Ok(Self(s.to_string()))
            }

            /// Returns the value as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the value, returning the inner string.
            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::LabelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::LabelError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                $crate::validate_label_value(Self::WHAT, &s)?;
                Ok(Self(s))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::try_from(s).map_err(serde::de::Error::custom)
            }
        }
    };
}
