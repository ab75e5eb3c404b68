use std::fmt;

use crate::foundation::error::{LiveMixError, LiveMixResult};

/// A named enumeration known to the script compiler.
#[derive(Debug)]
pub struct EnumDef {
    /// Type tag used in scripts.
    pub tag: &'static str,
    /// Variant names; the position is the variant's integer value.
    pub variants: &'static [&'static str],
}

/// Enumerations recognised as property types.
pub static ENUMS: &[EnumDef] = &[EnumDef {
    tag: "GstOrientation",
    variants: &["identity", "90r", "180", "90l"],
}];

/// Index into [`ENUMS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct EnumId(pub u16);

impl EnumId {
    /// Look up an enumeration by its script tag.
    pub fn lookup(tag: &str) -> Option<Self> {
        ENUMS
            .iter()
            .position(|e| e.tag == tag)
            .map(|i| Self(i as u16))
    }

    /// Definition backing this id.
    pub fn def(self) -> &'static EnumDef {
        &ENUMS[self.0 as usize]
    }

    /// Resolve a variant given either its name or its integer value.
    pub fn resolve(self, token: &str) -> Option<u32> {
        let def = self.def();
        if let Some(i) = def.variants.iter().position(|v| *v == token) {
            return Some(i as u32);
        }
        let idx: usize = token.parse().ok()?;
        (idx < def.variants.len()).then_some(idx as u32)
    }
}

/// Declared type of a property binding or `prop` action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropType {
    /// 32-bit signed integer.
    Int,
    /// Finite double.
    Float,
    /// Free text.
    String,
    /// Registered enumeration.
    Enum(EnumId),
}

impl PropType {
    /// Parse a type tag (`int`, `float`, `string` or an enum tag).
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "string" => Some(Self::String),
            other => EnumId::lookup(other).map(Self::Enum),
        }
    }

    /// Script tag for this type.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Enum(id) => id.def().tag,
        }
    }

    /// Coerce literal text to a typed value.
    pub fn coerce(self, text: &str) -> LiveMixResult<PropValue> {
        match self {
            Self::Int => {
                let v: i64 = text
                    .parse()
                    .map_err(|_| LiveMixError::value(format!("cannot parse '{text}' as int")))?;
                let v = i32::try_from(v).map_err(|_| {
                    LiveMixError::value(format!("int '{text}' is out of the 32-bit range"))
                })?;
                Ok(PropValue::Int(v))
            }
            Self::Float => {
                let v: f64 = text
                    .parse()
                    .map_err(|_| LiveMixError::value(format!("cannot parse '{text}' as float")))?;
                if !v.is_finite() {
                    return Err(LiveMixError::value(format!("float '{text}' is not finite")));
                }
                Ok(PropValue::Float(v))
            }
            Self::String => Ok(PropValue::Str(text.to_owned())),
            Self::Enum(id) => {
                let index = id.resolve(text).ok_or_else(|| {
                    LiveMixError::value(format!("'{text}' is not a {} value", id.def().tag))
                })?;
                Ok(PropValue::Enum { ty: id, index })
            }
        }
    }
}

impl fmt::Display for PropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A typed property value.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropValue {
    /// Integer value.
    Int(i32),
    /// Float value.
    Float(f64),
    /// String value.
    Str(String),
    /// Enumeration variant.
    Enum {
        /// Enumeration.
        ty: EnumId,
        /// Variant index.
        index: u32,
    },
}

impl PropValue {
    /// Type this value was coerced to.
    pub fn ty(&self) -> PropType {
        match self {
            Self::Int(_) => PropType::Int,
            Self::Float(_) => PropType::Float,
            Self::Str(_) => PropType::String,
            Self::Enum { ty, .. } => PropType::Enum(*ty),
        }
    }

    /// Numeric view used for window geometry attributes.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(f64::from(*v)),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// String view.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => f.write_str(s),
            Self::Enum { ty, index } => {
                let name = ty.def().variants.get(*index as usize).copied();
                write!(f, "{}::{}", ty.def().tag, name.unwrap_or("?"))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/value.rs"]
mod tests;
