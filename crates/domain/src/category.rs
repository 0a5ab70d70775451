//! Closed enumerations identified on the wire by a stable string.
//!
//! The home source names characteristic, service and accessory kinds with
//! opaque identifiers (mostly UUID strings). [`wire_enum!`] generates an enum
//! with, for every member, its wire identifier and a human-readable
//! description. New kinds are added by adding members.

/// Generate a closed wire enumeration.
///
/// Every generated enum gets `ALL`, `wire_id()`, `description()`,
/// `from_wire_id()` (ASCII case-insensitive) and a `Display` impl printing
/// the description.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = ($wire:literal, $desc:literal)
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Identifier used by the home source.
            #[must_use]
            pub fn wire_id(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            /// Human-readable name.
            #[must_use]
            pub fn description(self) -> &'static str {
                match self {
                    $(Self::$variant => $desc,)+
                }
            }

            /// Resolve a wire identifier, ignoring ASCII case.
            #[must_use]
            pub fn from_wire_id(wire_id: &str) -> Option<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|member| member.wire_id().eq_ignore_ascii_case(wire_id))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.description())
            }
        }
    };
}

pub(crate) use wire_enum;
