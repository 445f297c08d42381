//! Macro for implementing `as_str`, Display and FromStr for closed enums
//! exchanged as strings with external services.
//!
//! # Example
//!
//! ```rust
//! use presencesync_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Visibility {
//!     Public,
//!     Private,
//! }
//!
//! impl_domain_status_conversions!(Visibility {
//!     Public => "public",
//!     Private => "private",
//! });
//!
//! assert_eq!(Visibility::Private.as_str(), "private");
//! assert_eq!("PUBLIC".parse::<Visibility>().unwrap(), Visibility::Public);
//! ```

/// Implements `as_str`, Display and FromStr for string-backed enums
///
/// This macro generates:
/// - `as_str()`: the canonical wire representation
/// - Display: writes the canonical representation
/// - FromStr: case-insensitive parsing, trimming surrounding whitespace;
///   unknown values are rejected with `PresenceSyncError::InvalidInput`
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their lowercase string
///   representations
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical string representation used on the wire.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::PresenceSyncError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err($crate::PresenceSyncError::InvalidInput(format!(
                        "Invalid {}: {}",
                        stringify!($enum_name),
                        s
                    ))),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::PresenceSyncError;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Channel {
        Direct,
        Group,
    }

    impl_domain_status_conversions!(Channel {
        Direct => "direct",
        Group => "group",
    });

    #[test]
    fn display_uses_canonical_form() {
        assert_eq!(Channel::Direct.to_string(), "direct");
        assert_eq!(Channel::Group.as_str(), "group");
    }

    #[test]
    fn parsing_ignores_case_and_whitespace() {
        assert_eq!(Channel::from_str("DIRECT").unwrap(), Channel::Direct);
        assert_eq!(Channel::from_str(" Group ").unwrap(), Channel::Group);
    }

    #[test]
    fn unknown_value_is_invalid_input() {
        let err = Channel::from_str("broadcast").unwrap_err();
        assert_eq!(err, PresenceSyncError::InvalidInput("Invalid Channel: broadcast".into()));
    }

    #[test]
    fn empty_value_is_rejected() {
        assert!(Channel::from_str("").is_err());
    }
}
