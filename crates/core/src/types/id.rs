//! Newtype IDs for type-safe payment-provider references.
//!
//! Use the `define_id!` macro to create type-safe wrappers around the opaque
//! string identifiers the payment provider hands back (`order_...`,
//! `pay_...`), preventing accidental mixing of IDs from different entities.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use ekagra_core::define_id;
/// define_id!(OrderId);
/// define_id!(PaymentId);
///
/// let order_id = OrderId::new("order_N9f2kTq1");
/// let payment_id = PaymentId::new("pay_test123");
///
/// // These are different types, so this won't compile:
/// // let _: OrderId = payment_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(OrderId);
define_id!(PaymentId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        let id = PaymentId::new("pay_test123");
        assert_eq!(id.as_str(), "pay_test123");
        assert_eq!(id.to_string(), "pay_test123");
        assert_eq!(PaymentId::from(String::from("pay_test123")), id);
    }

    #[test]
    fn test_serde_transparent() {
        let id = OrderId::new("order_N9f2kTq1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"order_N9f2kTq1\"");

        let parsed: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
