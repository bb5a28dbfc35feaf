use std::{collections::HashMap, fmt, rc::Rc};

/// Maps struct names to their definitions.
pub struct TypeRegistry {
    map: HashMap<Box<str>, StructDef>,
}

pub struct StructDef {
    /// Fields in declaration order.
    pub fields: Vec<(Box<str>, Type)>,
}

impl StructDef {
    pub fn field(&self, name: &str) -> Option<&Type> {
        self.fields
            .iter()
            .find(|(field, _)| &**field == name)
            .map(|(_, ty)| ty)
    }
}

impl TypeRegistry {
    pub fn with_capacity(capacity: usize) -> TypeRegistry {
        TypeRegistry {
            map: HashMap::with_capacity(capacity),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&StructDef> {
        self.map.get(name)
    }

    /// Attempts to define the provided struct, with no fields yet.
    ///
    /// Fails if the struct is already defined.
    pub fn define(&mut self, name: &str) -> Result<Type, ()> {
        if self.has(name) {
            return Err(());
        }
        let def = StructDef { fields: Vec::new() };
        self.map.insert(name.into(), def);
        Ok(Type::Struct(name.into()))
    }

    /// Sets the fields of an already defined struct.
    pub fn set_fields(&mut self, name: &str, fields: Vec<(Box<str>, Type)>) {
        let def = self
            .map
            .get_mut(name)
            .expect("fields set on a struct that was never defined");
        def.fields = fields;
    }
}

/// A semantic type, as computed by the type checker.
///
/// Two types are the same if their canonical names are equal; the derived
/// equality agrees with that.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    Void,
    /// Compatible with everything. Produced whenever resolution fails, so
    /// that one unresolved name doesn't cascade into more diagnostics.
    Unknown,
    /// Type of the `null` literal.
    Null,
    Primitive(Box<str>),
    Struct(Box<str>),
    Function(Rc<Signature>),
    Pointer {
        is_const: bool,
        pointee: Box<Type>,
    },
    Array {
        len: u64,
        elem: Box<Type>,
    },
    Slice {
        is_const: bool,
        elem: Box<Type>,
    },
    Optional(Box<Type>),
    ErrorUnion(Box<Type>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Type>,
    pub ret: Type,
}

impl Type {
    /// Builds the type for the given primitive type name.
    pub fn primitive(name: &str) -> Type {
        match name {
            "void" => Type::Void,
            _ => Type::Primitive(name.into()),
        }
    }

    pub fn bool() -> Type {
        Type::primitive("bool")
    }

    pub fn comptime_int() -> Type {
        Type::primitive("comptime_int")
    }

    pub fn comptime_float() -> Type {
        Type::primitive("comptime_float")
    }

    /// Type of string literals, `[]const u8`.
    pub fn string() -> Type {
        Type::Slice {
            is_const: true,
            elem: Box::new(Type::primitive("u8")),
        }
    }

    /// Canonical name, as used in diagnostics.
    pub fn name(&self) -> String {
        self.to_string()
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_bool(&self) -> bool {
        self.primitive_name() == Some("bool")
    }

    pub fn is_integer(&self) -> bool {
        self.primitive_name().is_some_and(is_integer_name)
    }

    pub fn is_float(&self) -> bool {
        self.primitive_name().is_some_and(is_float_name)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    fn primitive_name(&self) -> Option<&str> {
        match self {
            Type::Primitive(name) => Some(name),
            _ => None,
        }
    }

    /// Whether a value of type `self` may be used where `expected` is
    /// required.
    ///
    /// Besides name equality and the unknown escape hatch, the following
    /// coercions are accepted:
    /// - `comptime_int` to any integer or float type,
    /// - `comptime_float` to any float type,
    /// - `null` to any optional,
    /// - `T` to `?T` and `!T`,
    /// - `*T` to `*const T` and `[]T` to `[]const T`.
    pub fn coerces_to(&self, expected: &Type) -> bool {
        if self.is_unknown() || expected.is_unknown() || self == expected {
            return true;
        }
        match (expected, self) {
            (Type::Primitive(e), Type::Primitive(a)) => match &**a {
                "comptime_int" => is_integer_name(e) || is_float_name(e),
                "comptime_float" => is_float_name(e),
                _ => false,
            },
            (Type::Optional(_), Type::Null) => true,
            (Type::Optional(inner) | Type::ErrorUnion(inner), actual) => actual.coerces_to(inner),
            (
                Type::Pointer {
                    is_const: true,
                    pointee: e,
                },
                Type::Pointer { pointee: a, .. },
            )
            | (
                Type::Slice {
                    is_const: true,
                    elem: e,
                },
                Type::Slice { elem: a, .. },
            ) => e == a,
            _ => false,
        }
    }

    /// Whether the two types may be compared with each other, in either
    /// direction.
    pub fn is_comparable_with(&self, other: &Type) -> bool {
        self.coerces_to(other) || other.coerces_to(self)
    }
}

fn is_integer_name(name: &str) -> bool {
    matches!(
        name,
        "i8" | "i16"
            | "i32"
            | "i64"
            | "i128"
            | "isize"
            | "u8"
            | "u16"
            | "u32"
            | "u64"
            | "u128"
            | "usize"
            | "comptime_int"
    )
}

fn is_float_name(name: &str) -> bool {
    matches!(
        name,
        "f16" | "f32" | "f64" | "f128" | "comptime_float"
    )
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => f.write_str("void"),
            Type::Unknown => f.write_str("unknown"),
            Type::Null => f.write_str("null"),
            Type::Primitive(name) | Type::Struct(name) => f.write_str(name),
            Type::Function(sig) => {
                f.write_str("fn(")?;
                for (i, param) in sig.params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") {}", sig.ret)
            }
            Type::Pointer { is_const, pointee } => {
                let c = if *is_const { "const " } else { "" };
                write!(f, "*{c}{pointee}")
            }
            Type::Array { len, elem } => write!(f, "[{len}]{elem}"),
            Type::Slice { is_const, elem } => {
                let c = if *is_const { "const " } else { "" };
                write!(f, "[]{c}{elem}")
            }
            Type::Optional(inner) => write!(f, "?{inner}"),
            Type::ErrorUnion(inner) => write!(f, "!{inner}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(name: &str) -> Type {
        Type::primitive(name)
    }

    #[test]
    fn canonical_names() {
        let sig = Signature {
            params: vec![p("i32"), p("i32")],
            ret: p("i32"),
        };
        assert_eq!(Type::Function(Rc::new(sig)).name(), "fn(i32, i32) i32");
        assert_eq!(p("void").name(), "void");
        assert_eq!(Type::Unknown.name(), "unknown");
        assert_eq!(Type::string().name(), "[]const u8");
        let nested = Type::ErrorUnion(Box::new(Type::Optional(Box::new(Type::Array {
            len: 4,
            elem: Box::new(Type::Pointer {
                is_const: false,
                pointee: Box::new(Type::Struct("Node".into())),
            }),
        }))));
        assert_eq!(nested.name(), "!?[4]*Node");
    }

    #[test]
    fn unknown_is_compatible_with_everything() {
        let all = [
            Type::Void,
            Type::Null,
            p("i32"),
            Type::Struct("Point".into()),
            Type::string(),
        ];
        for ty in &all {
            assert!(Type::Unknown.coerces_to(ty));
            assert!(ty.coerces_to(&Type::Unknown));
        }
    }

    #[test]
    fn name_equality() {
        assert!(p("i32").coerces_to(&p("i32")));
        assert!(!p("i32").coerces_to(&p("i64")));
        assert!(!p("bool").coerces_to(&p("i32")));
        assert!(!Type::Struct("A".into()).coerces_to(&Type::Struct("B".into())));
    }

    #[test]
    fn comptime_literal_coercions() {
        assert!(Type::comptime_int().coerces_to(&p("u8")));
        assert!(Type::comptime_int().coerces_to(&p("f64")));
        assert!(!Type::comptime_int().coerces_to(&p("bool")));
        assert!(Type::comptime_float().coerces_to(&p("f32")));
        assert!(!Type::comptime_float().coerces_to(&p("i32")));
        assert!(!p("i32").coerces_to(&Type::comptime_int()));
    }

    #[test]
    fn optional_and_error_union_coercions() {
        let opt = Type::Optional(Box::new(p("i32")));
        let err = Type::ErrorUnion(Box::new(p("i32")));
        assert!(Type::Null.coerces_to(&opt));
        assert!(p("i32").coerces_to(&opt));
        assert!(Type::comptime_int().coerces_to(&opt));
        assert!(p("i32").coerces_to(&err));
        assert!(!Type::Null.coerces_to(&err));
        assert!(!opt.coerces_to(&p("i32")));
    }

    #[test]
    fn const_pointer_coercions() {
        let ptr = |is_const| Type::Pointer {
            is_const,
            pointee: Box::new(p("u8")),
        };
        assert!(ptr(false).coerces_to(&ptr(true)));
        assert!(!ptr(true).coerces_to(&ptr(false)));
        let slice = Type::Slice {
            is_const: false,
            elem: Box::new(p("u8")),
        };
        assert!(slice.coerces_to(&Type::string()));
    }

    #[test]
    fn comparable_in_either_direction() {
        assert!(Type::comptime_int().is_comparable_with(&p("i32")));
        assert!(p("i32").is_comparable_with(&Type::comptime_int()));
        assert!(!p("i32").is_comparable_with(&p("bool")));
    }

    #[test]
    fn numeric_classes() {
        assert!(p("usize").is_integer());
        assert!(Type::comptime_int().is_numeric());
        assert!(p("f16").is_float());
        assert!(!p("bool").is_numeric());
        assert!(!Type::Struct("i32".into()).is_numeric());
        assert!(p("bool").is_bool());
    }

    #[test]
    fn registry_define() {
        let reg = &mut TypeRegistry::with_capacity(4);
        let point = reg.define("Point").unwrap();
        assert_eq!(point, Type::Struct("Point".into()));
        assert!(reg.define("Point").is_err());
        assert!(reg.get("Point").is_some_and(|def| def.fields.is_empty()));

        reg.set_fields("Point", vec![("x".into(), p("i32")), ("y".into(), p("i32"))]);
        let def = reg.get("Point").unwrap();
        assert_eq!(def.field("y"), Some(&p("i32")));
        assert_eq!(def.field("z"), None);
        assert!(!reg.has("Line"));
    }
}
