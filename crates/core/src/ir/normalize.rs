//! Normalization from the weedle2 AST to the generator IR.
//!
//! This module owns all knowledge of the parser's AST shapes:
//! - declaration kinds outside the four we register are skipped
//! - primitive spellings are rendered back to their IDL names
//! - extended attributes are collected from type and member positions
//! - default values map onto `Value`, or fail with `NotImplemented`

use weedle::attribute::{ExtendedAttribute, ExtendedAttributeList};
use weedle::dictionary::DictionaryMember;
use weedle::literal::{DefaultValue, FloatLit, IntegerLit};
use weedle::types::{
    FloatingPointType, IntegerType, MayBeNull, NonAnyType, RecordKeyType, SingleType, Type,
    UnionMemberType, UnionType,
};
use weedle::{Definition, DictionaryDefinition, TypedefDefinition};

use super::types::{
    Declaration, DictionaryDecl, EnumDecl, InterfaceDecl, Member, NamedType, TypeExpr,
    TypedefDecl, Value,
};
use crate::error::Error;

/// Convert a parsed definition list into the declaration IR, preserving
/// declaration order.
pub fn normalize(definitions: &[Definition<'_>]) -> Result<Vec<Declaration>, Error> {
    let mut declarations = Vec::new();
    for definition in definitions {
        match definition {
            Definition::Interface(iface) => {
                declarations.push(Declaration::Interface(InterfaceDecl {
                    name: iface.identifier.0.to_string(),
                    partial: false,
                }));
            }
            Definition::PartialInterface(iface) => {
                declarations.push(Declaration::Interface(InterfaceDecl {
                    name: iface.identifier.0.to_string(),
                    partial: true,
                }));
            }
            Definition::Enum(decl) => {
                declarations.push(Declaration::Enum(EnumDecl {
                    name: decl.identifier.0.to_string(),
                    values: decl
                        .values
                        .body
                        .list
                        .iter()
                        .map(|value| value.value.0.to_string())
                        .collect(),
                }));
            }
            Definition::Dictionary(dict) => {
                declarations.push(normalize_dictionary(dict)?);
            }
            Definition::Typedef(typedef) => {
                declarations.push(normalize_typedef(typedef));
            }
            // Callbacks, mixins, namespaces and includes statements carry no
            // converter registration.
            _ => {}
        }
    }
    Ok(declarations)
}

fn normalize_dictionary(dict: &DictionaryDefinition<'_>) -> Result<Declaration, Error> {
    let members = dict
        .members
        .body
        .iter()
        .map(normalize_member)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Declaration::Dictionary(DictionaryDecl {
        name: dict.identifier.0.to_string(),
        inheritance: dict
            .inheritance
            .as_ref()
            .map(|parent| parent.identifier.0.to_string()),
        members,
    }))
}

fn normalize_member(member: &DictionaryMember<'_>) -> Result<Member, Error> {
    let parent_ext_attrs = attr_names(&member.attributes);
    let default = member
        .default
        .as_ref()
        .map(|default| convert_default(&default.value))
        .transpose()?;
    Ok(Member {
        name: member.identifier.0.to_string(),
        idl_type: convert_type(&member.type_, Vec::new(), parent_ext_attrs),
        required: member.required.is_some(),
        default,
    })
}

fn normalize_typedef(typedef: &TypedefDefinition<'_>) -> Declaration {
    let ext_attrs = attr_names(&typedef.type_.attributes);
    Declaration::Typedef(TypedefDecl {
        name: typedef.identifier.0.to_string(),
        idl_type: convert_type(&typedef.type_.type_, ext_attrs, Vec::new()),
    })
}

/// Names of the no-argument extended attributes in a list. Only those can
/// be conversion modifiers, so the argumented forms are ignored.
fn attr_names(attributes: &Option<ExtendedAttributeList<'_>>) -> Vec<String> {
    attributes
        .as_ref()
        .map(|list| {
            list.body
                .list
                .iter()
                .filter_map(|attr| match attr {
                    ExtendedAttribute::NoArgs(no_args) => Some((no_args.0).0.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn convert_type(
    idl_type: &Type<'_>,
    ext_attrs: Vec<String>,
    parent_ext_attrs: Vec<String>,
) -> TypeExpr {
    match idl_type {
        Type::Single(single) => match single {
            SingleType::Any(_) => TypeExpr::Any,
            SingleType::NonAny(non_any) => convert_non_any(non_any, ext_attrs, parent_ext_attrs),
        },
        Type::Union(union) => convert_union(union),
    }
}

fn convert_union(union: &MayBeNull<UnionType<'_>>) -> TypeExpr {
    let members = union
        .type_
        .body
        .list
        .iter()
        .map(convert_union_member)
        .collect();
    nullable_if(TypeExpr::Union(members), union.q_mark.is_some())
}

fn convert_union_member(member: &UnionMemberType<'_>) -> TypeExpr {
    match member {
        UnionMemberType::Single(attributed) => {
            let ext_attrs = attr_names(&attributed.attributes);
            convert_non_any(&attributed.type_, ext_attrs, Vec::new())
        }
        UnionMemberType::Union(inner) => convert_union(inner),
    }
}

fn convert_non_any(
    idl_type: &NonAnyType<'_>,
    ext_attrs: Vec<String>,
    parent_ext_attrs: Vec<String>,
) -> TypeExpr {
    match idl_type {
        NonAnyType::Integer(inner) => named(
            integer_name(&inner.type_),
            inner.q_mark.is_some(),
            ext_attrs,
            parent_ext_attrs,
        ),
        NonAnyType::FloatingPoint(inner) => named(
            float_name(&inner.type_),
            inner.q_mark.is_some(),
            ext_attrs,
            parent_ext_attrs,
        ),
        NonAnyType::Boolean(inner) => {
            named("boolean", inner.q_mark.is_some(), ext_attrs, parent_ext_attrs)
        }
        NonAnyType::Byte(inner) => {
            named("byte", inner.q_mark.is_some(), ext_attrs, parent_ext_attrs)
        }
        NonAnyType::Octet(inner) => {
            named("octet", inner.q_mark.is_some(), ext_attrs, parent_ext_attrs)
        }
        NonAnyType::DOMString(inner) => {
            named("DOMString", inner.q_mark.is_some(), ext_attrs, parent_ext_attrs)
        }
        NonAnyType::ByteString(inner) => {
            named("ByteString", inner.q_mark.is_some(), ext_attrs, parent_ext_attrs)
        }
        NonAnyType::USVString(inner) => {
            named("USVString", inner.q_mark.is_some(), ext_attrs, parent_ext_attrs)
        }
        NonAnyType::ArrayBuffer(inner) => {
            named("ArrayBuffer", inner.q_mark.is_some(), ext_attrs, parent_ext_attrs)
        }
        NonAnyType::DataView(inner) => {
            named("DataView", inner.q_mark.is_some(), ext_attrs, parent_ext_attrs)
        }
        NonAnyType::Int8Array(inner) => {
            named("Int8Array", inner.q_mark.is_some(), ext_attrs, parent_ext_attrs)
        }
        NonAnyType::Int16Array(inner) => {
            named("Int16Array", inner.q_mark.is_some(), ext_attrs, parent_ext_attrs)
        }
        NonAnyType::Int32Array(inner) => {
            named("Int32Array", inner.q_mark.is_some(), ext_attrs, parent_ext_attrs)
        }
        NonAnyType::Uint8Array(inner) => {
            named("Uint8Array", inner.q_mark.is_some(), ext_attrs, parent_ext_attrs)
        }
        NonAnyType::Uint16Array(inner) => {
            named("Uint16Array", inner.q_mark.is_some(), ext_attrs, parent_ext_attrs)
        }
        NonAnyType::Uint32Array(inner) => {
            named("Uint32Array", inner.q_mark.is_some(), ext_attrs, parent_ext_attrs)
        }
        NonAnyType::Uint8ClampedArray(inner) => named(
            "Uint8ClampedArray",
            inner.q_mark.is_some(),
            ext_attrs,
            parent_ext_attrs,
        ),
        NonAnyType::Float32Array(inner) => {
            named("Float32Array", inner.q_mark.is_some(), ext_attrs, parent_ext_attrs)
        }
        NonAnyType::Float64Array(inner) => {
            named("Float64Array", inner.q_mark.is_some(), ext_attrs, parent_ext_attrs)
        }
        NonAnyType::Sequence(inner) => {
            let element = convert_type(&inner.type_.generics.body, Vec::new(), Vec::new());
            nullable_if(
                TypeExpr::Sequence(Box::new(element)),
                inner.q_mark.is_some(),
            )
        }
        NonAnyType::RecordType(inner) => {
            let (key, _, value) = &inner.type_.generics.body;
            let key_expr = convert_record_key(key);
            let value_expr = convert_type(value, Vec::new(), Vec::new());
            nullable_if(
                TypeExpr::Record(Box::new(key_expr), Box::new(value_expr)),
                inner.q_mark.is_some(),
            )
        }
        NonAnyType::Identifier(inner) => named(
            inner.type_.0,
            inner.q_mark.is_some(),
            ext_attrs,
            parent_ext_attrs,
        ),
        // Promise<T>, FrozenArray<T> and the remaining leaf types are
        // handled as the unconstrained converter.
        NonAnyType::Promise(_) => TypeExpr::Any,
        NonAnyType::FrozenArrayType(inner) => nullable_if(TypeExpr::Any, inner.q_mark.is_some()),
        _ => TypeExpr::Any,
    }
}

fn convert_record_key(key: &RecordKeyType<'_>) -> TypeExpr {
    match key {
        RecordKeyType::Byte(_) => TypeExpr::named("ByteString"),
        RecordKeyType::DOM(_) => TypeExpr::named("DOMString"),
        RecordKeyType::USV(_) => TypeExpr::named("USVString"),
        RecordKeyType::NonAny(non_any) => convert_non_any(non_any, Vec::new(), Vec::new()),
    }
}

fn integer_name(idl_type: &IntegerType) -> &'static str {
    match idl_type {
        IntegerType::LongLong(long_long) => {
            if long_long.unsigned.is_some() {
                "unsigned long long"
            } else {
                "long long"
            }
        }
        IntegerType::Long(long) => {
            if long.unsigned.is_some() {
                "unsigned long"
            } else {
                "long"
            }
        }
        IntegerType::Short(short) => {
            if short.unsigned.is_some() {
                "unsigned short"
            } else {
                "short"
            }
        }
    }
}

fn float_name(idl_type: &FloatingPointType) -> &'static str {
    match idl_type {
        FloatingPointType::Float(float) => {
            if float.unrestricted.is_some() {
                "unrestricted float"
            } else {
                "float"
            }
        }
        FloatingPointType::Double(double) => {
            if double.unrestricted.is_some() {
                "unrestricted double"
            } else {
                "double"
            }
        }
    }
}

fn named(
    name: &str,
    nullable: bool,
    ext_attrs: Vec<String>,
    parent_ext_attrs: Vec<String>,
) -> TypeExpr {
    nullable_if(
        TypeExpr::Named(NamedType {
            name: name.to_string(),
            ext_attrs,
            parent_ext_attrs,
        }),
        nullable,
    )
}

fn nullable_if(inner: TypeExpr, nullable: bool) -> TypeExpr {
    if nullable {
        TypeExpr::Nullable(Box::new(inner))
    } else {
        inner
    }
}

fn convert_default(value: &DefaultValue<'_>) -> Result<Value, Error> {
    match value {
        DefaultValue::Boolean(lit) => Ok(Value::Boolean(lit.0)),
        DefaultValue::Integer(lit) => Ok(Value::Number(integer_token(lit))),
        DefaultValue::Float(lit) => Ok(convert_float(lit)),
        DefaultValue::String(lit) => Ok(Value::String(lit.0.to_string())),
        DefaultValue::Null(_) => Ok(Value::Null),
        DefaultValue::EmptyArray(_) => Ok(Value::EmptySequence),
        DefaultValue::EmptyDictionary(_) => Ok(Value::EmptyDictionary),
        other => Err(Error::NotImplemented(format!(
            "unsupported default value {other:?}"
        ))),
    }
}

fn integer_token(lit: &IntegerLit<'_>) -> String {
    match lit {
        IntegerLit::Dec(token) => token.0.to_string(),
        IntegerLit::Hex(token) => token.0.to_string(),
        IntegerLit::Oct(token) => token.0.to_string(),
    }
}

fn convert_float(lit: &FloatLit<'_>) -> Value {
    match lit {
        FloatLit::Value(token) => Value::Number(token.0.to_string()),
        FloatLit::NegInfinity(_) => Value::Infinity { negative: true },
        FloatLit::Infinity(_) => Value::Infinity { negative: false },
        FloatLit::NaN(_) => Value::NaN,
    }
}
