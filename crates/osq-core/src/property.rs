//! # Properties
//!
//! A property is a named, extractable attribute of a resource. Each resource
//! type declares its properties as a closed enum with [`define_properties!`],
//! so an unknown property name is rejected while a query is being built
//! rather than surfacing as a missing attribute at evaluation time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::error::QueryError;

/// What kind of value a property holds; also the kind a preset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Generic,
    Integer,
    String,
    DateTime,
}

impl ValueKind {
    pub const ALL: [ValueKind; 4] = [Self::Generic, Self::Integer, Self::String, Self::DateTime];
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic => write!(f, "generic"),
            Self::Integer => write!(f, "integer"),
            Self::String => write!(f, "string"),
            Self::DateTime => write!(f, "datetime"),
        }
    }
}

impl FromStr for ValueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" => Ok(Self::Generic),
            "integer" | "int" => Ok(Self::Integer),
            "string" | "str" => Ok(Self::String),
            "datetime" | "date_time" => Ok(Self::DateTime),
            other => Err(format!("unknown value kind '{}'", other)),
        }
    }
}

/// A closed set of named properties for one resource type.
pub trait Property:
    Copy + Eq + Hash + Ord + fmt::Debug + fmt::Display + FromStr<Err = QueryError> + Send + Sync + 'static
{
    /// Canonical snake_case name, also used as the output column name.
    fn name(&self) -> &'static str;

    /// Declared value kind.
    fn kind(&self) -> ValueKind;

    /// Every property, in declaration order.
    fn all() -> &'static [Self];
}

/// Declare a resource's property enum.
///
/// ```
/// osq_core::define_properties! {
///     /// Properties of a widget.
///     pub enum WidgetProperty for Project {
///         Id => "id": String | "widget_id",
///         Size => "size": Integer,
///     }
/// }
/// assert_eq!("widget_id".parse::<WidgetProperty>().unwrap(), WidgetProperty::Id);
/// ```
#[macro_export]
macro_rules! define_properties {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident for $resource:ident {
            $( $variant:ident => $prop:literal : $kind:ident $( | $alias:literal )* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $( $variant ),+
        }

        impl $crate::Property for $name {
            fn name(&self) -> &'static str {
                match self {
                    $( Self::$variant => $prop ),+
                }
            }

            fn kind(&self) -> $crate::ValueKind {
                match self {
                    $( Self::$variant => $crate::ValueKind::$kind ),+
                }
            }

            fn all() -> &'static [Self] {
                &[ $( Self::$variant ),+ ]
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::Property::name(self))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::QueryError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                let needle = s.trim().to_ascii_lowercase().replace('-', "_");
                match needle.as_str() {
                    $( $prop $( | $alias )* => Ok(Self::$variant), )+
                    _ => Err($crate::QueryError::UnknownProperty {
                        resource: $crate::ResourceType::$resource,
                        property: s.to_string(),
                    }),
                }
            }
        }
    };
}
