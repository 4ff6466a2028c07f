//! Newtype IDs for type-safe document references.
//!
//! Document stores key records by opaque strings. Use the `define_id!` macro
//! to create wrappers that prevent accidentally mixing IDs from different
//! collections.

/// Macro to define a type-safe document ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Default`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use bozor_core::define_id;
/// define_id!(UserId);
/// define_id!(ChatId);
///
/// let user_id = UserId::new("u1");
/// let chat_id = ChatId::new("u1");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = chat_id;
/// assert_eq!(user_id.as_str(), chat_id.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Default,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a document key.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying document key.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the document key.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(UserId);
define_id!(ShopId);
define_id!(ProductId);
define_id!(FavoriteId);
define_id!(ChatId);
define_id!(MessageId);
define_id!(TaskId);

impl ShopId {
    /// The shop owned by `owner`.
    ///
    /// Shops are keyed by their owner's user id, which is what limits each
    /// user to a single shop.
    #[must_use]
    pub fn for_owner(owner: &UserId) -> Self {
        Self(owner.as_str().to_owned())
    }

    /// The user that owns this shop.
    #[must_use]
    pub fn owner(&self) -> UserId {
        UserId::new(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shop_id_is_owner_id() {
        let owner = UserId::new("uid-42");
        let shop = ShopId::for_owner(&owner);
        assert_eq!(shop.as_str(), "uid-42");
        assert_eq!(shop.owner(), owner);
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = ProductId::new("abc");
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("\"abc\""));
    }
}
