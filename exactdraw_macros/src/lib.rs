use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Expr, Fields, Lit, parse_macro_input, spanned::Spanned};

/// Variant attribute: #[weight(<integer expr>)]
#[proc_macro_derive(WeightedEnum, attributes(weight))]
pub fn derive_weighted_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let enum_ident = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new(
            input.ident.span(),
            "WeightedEnum can only be derived for enums",
        )
        .to_compile_error()
        .into();
    };

    let mut variants = Vec::new();
    let mut weights = Vec::new();

    for variant in &data_enum.variants {
        // Only fieldless enums are supported (drop tables are usually C-like)
        if !matches!(variant.fields, Fields::Unit) {
            return syn::Error::new(
                variant.span(),
                "WeightedEnum only supports fieldless variants",
            )
            .to_compile_error()
            .into();
        }

        // Find #[weight(...)]
        let mut weight_expr: Option<Expr> = None;
        for Attribute { meta, .. } in &variant.attrs {
            if !meta.path().is_ident("weight") {
                continue;
            }
            let syn::Meta::List(list) = meta else {
                return syn::Error::new(meta.span(), "use #[weight(<integer expr>)]")
                    .to_compile_error()
                    .into();
            };
            let expr = match syn::parse2::<Expr>(list.tokens.clone()) {
                Ok(e) => e,
                Err(e) => {
                    return syn::Error::new(list.span(), format!("invalid weight expr: {e}"))
                        .to_compile_error()
                        .into();
                }
            };
            if let Some(span) = find_float(&expr) {
                return syn::Error::new(span, "weights are integers; drop the fraction")
                    .to_compile_error()
                    .into();
            }
            weight_expr = Some(expr);
        }
        let Some(expr) = weight_expr else {
            return syn::Error::new(variant.span(), "missing #[weight(...)] on variant")
                .to_compile_error()
                .into();
        };

        let ident = &variant.ident;
        variants.push(quote! { Self::#ident });
        weights.push(quote! { #expr });
    }

    let expanded = quote! {
        impl exactdraw::WeightedEnum for #enum_ident {
            const VARIANTS: &'static [Self] = &[
                #(#variants),*
            ];
            const WEIGHTS: &'static [u32] = &[
                #(#weights),*
            ];
        }

        impl #enum_ident {
            /// Build an alias-backed table from the annotated weights.
            pub fn droptable() -> ::core::result::Result<
                exactdraw::StaticDropTable<exactdraw::AliasTable, Self>,
                exactdraw::WeightError,
            > {
                <Self as exactdraw::WeightedEnum>::droptable_with::<exactdraw::AliasTable>()
            }
        }
    };

    expanded.into()
}

/// Span of the first float literal in `e`, if any.
fn find_float(e: &Expr) -> Option<proc_macro2::Span> {
    match e {
        Expr::Lit(el) => match &el.lit {
            Lit::Float(f) => Some(f.span()),
            _ => None,
        },
        Expr::Binary(b) => find_float(&b.left).or_else(|| find_float(&b.right)),
        Expr::Paren(p) => find_float(&p.expr),
        Expr::Unary(u) => find_float(&u.expr),
        Expr::Group(g) => find_float(&g.expr),
        _ => None,
    }
}
