use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Fields, Ident, LitStr, Meta, Result, Token,
    ext::IdentExt,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Derive `tagcli::Argv`, binding each tagged field to a flag.
///
/// ```ignore
/// #[derive(tagcli::Argv, Default)]
/// struct Opts {
///     /// Port to listen on
///     #[cli("-p, --port, default=8080")]
///     port: u16,
///
///     #[cli("--name, required", usage = "Who to greet")]
///     name: String,
///
///     // Flatten the fields of another `Argv` record into this one.
///     #[cli]
///     output: OutputOpts,
///
///     // No attribute, or `#[cli("-")]`: not bound, any type.
///     scratch: Vec<u8>,
/// }
/// ```
///
/// Usage text comes from `usage = "..."` or, failing that, the field's doc
/// comment. The tag string itself is validated when the registry is built.
#[proc_macro_derive(Argv, attributes(cli))]
pub fn derive_argv(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_derive(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Arguments of `#[cli("tag", usage = "...")]`.
struct CliArgs {
    tag: LitStr,
    usage: Option<LitStr>,
}

impl Parse for CliArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let tag: LitStr = input.parse()?;
        let mut usage = None;

        while input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                break;
            }
            let key: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            let value: LitStr = input.parse()?;
            match key.to_string().as_str() {
                "usage" if usage.is_some() => {
                    return Err(syn::Error::new(key.span(), "duplicate cli option: usage"));
                }
                "usage" => usage = Some(value),
                other => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("unknown cli option: {other}"),
                    ));
                }
            }
        }

        if !input.is_empty() {
            return Err(input.error("expected `,` or end of cli attribute"));
        }

        Ok(Self { tag, usage })
    }
}

/// How one field participates in binding.
enum Binding {
    Flag { tag: LitStr, usage: String },
    Nested,
    Ignored,
}

fn expand_derive(input: DeriveInput) -> Result<proc_macro2::TokenStream> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Argv can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Argv can only be derived for structs with named fields",
        ));
    };

    let mut stmts = Vec::new();
    for field in &fields.named {
        let Some(ident) = &field.ident else {
            continue;
        };
        let Some(binding) = field_binding(&field.attrs)? else {
            continue;
        };

        let stmt = match binding {
            Binding::Flag { tag, usage } => {
                let field_name = LitStr::new(&ident.unraw().to_string(), ident.span());
                let usage = LitStr::new(&usage, proc_macro2::Span::call_site());
                quote! {
                    binder.flag(#field_name, #tag, #usage, &mut self.#ident)?;
                }
            }
            Binding::Nested => quote! {
                binder.nested(&mut self.#ident)?;
            },
            Binding::Ignored => continue,
        };
        stmts.push(stmt);
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::tagcli::Argv for #name #ty_generics #where_clause {
            fn bind<'__tagcli>(
                &'__tagcli mut self,
                binder: &mut ::tagcli::Binder<'__tagcli>,
            ) -> ::tagcli::Result<()> {
                #(#stmts)*
                ::core::result::Result::Ok(())
            }
        }
    })
}

fn field_binding(attrs: &[Attribute]) -> Result<Option<Binding>> {
    let mut binding = None;

    for attr in attrs {
        if !attr.path().is_ident("cli") {
            continue;
        }
        if binding.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate cli attribute"));
        }

        binding = Some(match &attr.meta {
            Meta::Path(_) => Binding::Nested,
            Meta::List(_) => {
                let args: CliArgs = attr.parse_args()?;
                if args.tag.value().trim() == "-" {
                    Binding::Ignored
                } else if args.tag.value().trim().is_empty() {
                    if args.usage.is_some() {
                        return Err(syn::Error::new_spanned(
                            attr,
                            "usage text has no effect on a flattened record",
                        ));
                    }
                    Binding::Nested
                } else {
                    let usage = match args.usage {
                        Some(usage) => usage.value(),
                        None => doc_text(attrs),
                    };
                    Binding::Flag {
                        tag: args.tag,
                        usage,
                    }
                }
            }
            Meta::NameValue(_) => {
                return Err(syn::Error::new_spanned(
                    attr,
                    "expected #[cli] or #[cli(\"...\")]",
                ));
            }
        });
    }

    Ok(binding)
}

/// Join a field's `///` lines into one line of usage text.
fn doc_text(attrs: &[Attribute]) -> String {
    let mut lines = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        if let Meta::NameValue(nv) = &attr.meta {
            if let syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(s),
                ..
            }) = &nv.value
            {
                let line = s.value();
                let line = line.trim();
                if !line.is_empty() {
                    lines.push(line.to_string());
                }
            }
        }
    }
    lines.join(" ")
}
