/*
    Spacetower, typed flight dynamics client
    Copyright (C) 2024 The Spacetower developers

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

/// Declares a closed set of options which the remote service identifies by an upper snake case name.
///
/// The generated enum serializes to and from its wire name, parses from it with `FromStr` (failing with a
/// `ValidationError::UnknownOption` naming `$field`), and implements `enum_iterator::Sequence` so that the
/// whole set can be enumerated.
macro_rules! closed_set {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($field:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $wire:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Copy,
            Clone,
            Debug,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde_derive::Serialize,
            ::serde_derive::Deserialize,
            ::enum_iterator::Sequence,
        )]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Name of this option as understood by the remote service.
            pub const fn wire_name(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::write!(f, "{}", self.wire_name())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::errors::ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($wire => Ok(Self::$variant),)+
                    other => Err($crate::errors::ValidationError::UnknownOption {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Routes the `build()` of a `TypedBuilder` through the `validate` method of the built type.
///
/// Use together with `#[builder(build_method(into = ValidationResult<$ty>))]`.
macro_rules! validated_build {
    ($ty:ty) => {
        impl ::std::convert::From<$ty> for $crate::errors::ValidationResult<$ty> {
            fn from(built: $ty) -> Self {
                built.validate()?;
                Ok(built)
            }
        }
    };
}

/// Ensures that `value` lies in the open interval (0, 1).
pub(crate) fn check_fraction(
    param: &'static str,
    value: f64,
) -> Result<(), crate::errors::ValidationError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(crate::errors::ValidationError::OutOfRange {
            param,
            value,
            range: "(0, 1)",
        })
    }
}

/// Ensures that `value` is strictly positive (and not NaN).
pub(crate) fn check_positive(
    param: &'static str,
    value: f64,
) -> Result<(), crate::errors::ValidationError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(crate::errors::ValidationError::OutOfRange {
            param,
            value,
            range: "(0, +inf)",
        })
    }
}
