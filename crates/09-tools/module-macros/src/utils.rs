//! 宏工具函数

use syn::{FnArg, Ident, Pat, Result, Signature, Type};

/// 工厂形参
pub struct FactoryParam<'a> {
    /// 形参名
    pub ident: &'a Ident,
    /// 形参类型
    pub ty: &'a Type,
}

/// 提取函数形参，只接受简单标识符模式
pub fn extract_params(signature: &Signature) -> Result<Vec<FactoryParam<'_>>> {
    signature
        .inputs
        .iter()
        .map(|input| match input {
            FnArg::Receiver(receiver) => Err(syn::Error::new_spanned(
                receiver,
                "模块工厂不能是方法，请使用自由函数",
            )),
            FnArg::Typed(pat_type) => match pat_type.pat.as_ref() {
                Pat::Ident(pat_ident) if pat_ident.subpat.is_none() => Ok(FactoryParam {
                    ident: &pat_ident.ident,
                    ty: pat_type.ty.as_ref(),
                }),
                other => Err(syn::Error::new_spanned(
                    other,
                    "模块工厂的形参必须是具名标识符",
                )),
            },
        })
        .collect()
}

/// 形参名（去掉原始标识符前缀 `r#`）
pub fn param_name(ident: &Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix("r#").map(str::to_string).unwrap_or(name)
}

/// 检查类型是否为 `Instance`
pub fn is_instance_type(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident == "Instance")
            .unwrap_or(false),
        _ => false,
    }
}

/// 从 `Arc<T>` 中提取 `T`
pub fn extract_arc_inner_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => match args.args.first() {
            Some(syn::GenericArgument::Type(inner_type)) => Some(inner_type),
            _ => None,
        },
        _ => None,
    }
}

/// 将蛇形命名转换为驼峰命名
pub fn to_camel_case(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = false;

    for ch in s.chars() {
        if ch == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(ch.to_uppercase().next().unwrap_or(ch));
            capitalize_next = false;
        } else {
            result.push(ch);
        }
    }

    result
}

/// 将蛇形命名转换为帕斯卡命名
pub fn to_pascal_case(s: &str) -> String {
    let camel_case = to_camel_case(s);
    let mut chars = camel_case.chars();
    match chars.next() {
        Some(first_char) => first_char.to_uppercase().chain(chars).collect(),
        None => camel_case,
    }
}
