//! Declarative enumerations that travel through a config as symbols

/// Declare a `Copy` enumeration whose constants persist as symbol names.
///
/// Generates the enum, an `ALL` table, and implementations of
/// [`ConfigSymbol`](p2_config::ConfigSymbol), `Display`, serde and
/// `From<_> for Value`, all driven by the one name table.
macro_rules! symbol_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident as $type_name:literal {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $symbol:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// Every constant in declaration order
            $vis const ALL: &'static [Self] = &[$(Self::$variant),+];
        }

        impl ::p2_config::ConfigSymbol for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn symbol_name(self) -> &'static str {
                match self {
                    $(Self::$variant => $symbol,)+
                }
            }

            fn from_symbol(name: &str) -> Option<Self> {
                match name {
                    $($symbol => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(::p2_config::ConfigSymbol::symbol_name(*self))
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(::p2_config::ConfigSymbol::symbol_name(*self))
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let name = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                <Self as ::p2_config::ConfigSymbol>::from_symbol(&name)
                    .ok_or_else(|| ::serde::de::Error::unknown_variant(&name, &[$($symbol),+]))
            }
        }

        impl From<$name> for ::p2_config::Value {
            fn from(constant: $name) -> Self {
                ::p2_config::Value::symbol(constant)
            }
        }
    };
}

pub(crate) use symbol_enum;
