//! 模块工厂宏实现

use crate::utils::{extract_arc_inner_type, extract_params, is_instance_type, param_name, to_pascal_case};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, punctuated::Punctuated, Expr, ItemFn,
    Lit, Meta, Result, ReturnType, Token, Type,
};

/// 工厂宏参数
#[derive(Debug, Clone, Default)]
pub struct FactoryArgs {
    /// 自定义工厂名称
    pub name: Option<String>,
}

impl Parse for FactoryArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut args = FactoryArgs::default();

        let parsed = Punctuated::<Meta, Token![,]>::parse_terminated(input)?;

        for meta in parsed {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("name") => match nv.value {
                    Expr::Lit(expr_lit) => match expr_lit.lit {
                        Lit::Str(lit_str) => args.name = Some(lit_str.value()),
                        other => {
                            return Err(syn::Error::new_spanned(other, "name 必须是字符串字面量"))
                        }
                    },
                    other => return Err(syn::Error::new_spanned(other, "name 必须是字符串字面量")),
                },
                other => return Err(syn::Error::new_spanned(other, "未知的模块工厂参数")),
            }
        }

        Ok(args)
    }
}

/// 模块工厂宏入口
pub fn expand(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args as FactoryArgs);
    let item = parse_macro_input!(input as ItemFn);

    match generate_factory(&args, &item) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

/// 生成工厂结构体与 `ModuleFactory` 实现
pub fn generate_factory(args: &FactoryArgs, item: &ItemFn) -> Result<TokenStream2> {
    let signature = &item.sig;
    if !signature.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &signature.generics,
            "模块工厂不支持泛型参数",
        ));
    }
    if let Some(variadic) = &signature.variadic {
        return Err(syn::Error::new_spanned(variadic, "模块工厂不支持可变参数"));
    }

    let fn_ident = &signature.ident;
    let vis = &item.vis;
    let fn_name = fn_ident.to_string();
    let factory_name = args.name.clone().unwrap_or_else(|| fn_name.clone());
    let struct_ident = format_ident!("{}Factory", to_pascal_case(fn_name.trim_start_matches("r#")));

    let params = extract_params(signature)?;
    let param_names: Vec<String> = params.iter().map(|param| param_name(param.ident)).collect();

    let bindings = params.iter().zip(&param_names).map(|(param, name)| {
        let ident = param.ident;
        let conversion = argument_conversion(param.ty, name);
        quote! {
            let #ident = {
                let argument = __module_args
                    .next()
                    .ok_or_else(|| ::di_abstractions::FactoryError::missing_argument(#name))?;
                #conversion
            };
        }
    });
    let call_args = params.iter().map(|param| param.ident);

    let call = if signature.asyncness.is_some() {
        quote! { #fn_ident(#(#call_args),*).await }
    } else {
        quote! { #fn_ident(#(#call_args),*) }
    };

    let (returns_result, ok_type) = return_shape(&signature.output);
    let value = if returns_result {
        quote! { #call? }
    } else {
        quote! { #call }
    };
    let wrap = if ok_type.map(is_instance_type).unwrap_or(false) {
        quote! { ::std::result::Result::Ok(value) }
    } else {
        quote! { ::std::result::Result::Ok(::std::sync::Arc::new(value) as ::di_abstractions::Instance) }
    };

    let doc = format!("`{}` 的模块工厂", fn_name);

    Ok(quote! {
        #item

        #[doc = #doc]
        #[derive(Debug, Clone, Copy, Default)]
        #vis struct #struct_ident;

        #[::di_abstractions::async_trait]
        impl ::di_abstractions::ModuleFactory for #struct_ident {
            fn name(&self) -> ::std::option::Option<&str> {
                ::std::option::Option::Some(#factory_name)
            }

            fn params(&self) -> ::std::vec::Vec<::std::string::String> {
                ::std::vec![#(::std::string::String::from(#param_names)),*]
            }

            #[allow(unused_mut)]
            async fn create(
                &self,
                args: ::std::vec::Vec<::di_abstractions::Instance>,
            ) -> ::std::result::Result<::di_abstractions::Instance, ::di_abstractions::FactoryError> {
                let mut __module_args = args.into_iter();
                #(#bindings)*
                let value = #value;
                #wrap
            }
        }
    })
}

/// 实参转换：`Instance` 原样传入，`Arc<T>` 向下转型，其他类型向下转型后克隆
fn argument_conversion(ty: &Type, name: &str) -> TokenStream2 {
    if is_instance_type(ty) {
        quote! { argument }
    } else if let Some(inner) = extract_arc_inner_type(ty) {
        quote! { ::di_abstractions::downcast_argument::<#inner>(argument, #name)? }
    } else {
        quote! {
            ::std::clone::Clone::clone(
                &*::di_abstractions::downcast_argument::<#ty>(argument, #name)?
            )
        }
    }
}

/// 返回值形态：是否为 `Result`，以及成功值类型
fn return_shape(output: &ReturnType) -> (bool, Option<&Type>) {
    let ReturnType::Type(_, ty) = output else {
        return (false, None);
    };
    let Type::Path(type_path) = ty.as_ref() else {
        return (false, Some(ty.as_ref()));
    };
    match type_path.path.segments.last() {
        Some(segment) if segment.ident == "Result" => {
            let ok_type = match &segment.arguments {
                syn::PathArguments::AngleBracketed(args) => match args.args.first() {
                    Some(syn::GenericArgument::Type(ok_type)) => Some(ok_type),
                    _ => None,
                },
                _ => None,
            };
            (true, ok_type)
        }
        _ => (false, Some(ty.as_ref())),
    }
}
