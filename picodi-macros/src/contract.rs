use itertools::Itertools;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{Error, FnArg, Ident, ItemTrait, Pat, Result, TraitItem, TraitItemFn};

pub fn expand_contract(input: &ItemTrait) -> Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Contract traits cannot be generic!",
        ));
    }

    let methods: Vec<_> = input.items.iter().map(forward_method).try_collect()?;

    let ident = &input.ident;
    let proxy_ident = format_ident!("{}ThreadProxy", ident);
    let contract_name = ident.to_string();

    Ok(quote! {
        #input

        const _: () = {
            struct #proxy_ident {
                handler: picodi::proxy::ProxyHandler<dyn #ident + Send + Sync>,
            }

            #[automatically_derived]
            impl #ident for #proxy_ident {
                #(#methods)*
            }

            #[automatically_derived]
            impl picodi::proxy::Proxiable for dyn #ident + Send + Sync {
                fn contracts() -> &'static [&'static str] {
                    &[#contract_name]
                }

                fn proxy(
                    handler: picodi::proxy::ProxyHandler<Self>,
                ) -> picodi::instance_provider::ComponentInstancePtr<Self> {
                    picodi::instance_provider::ComponentInstancePtr::new(#proxy_ident { handler })
                }
            }
        };
    })
}

fn forward_method(item: &TraitItem) -> Result<TokenStream> {
    let method = if let TraitItem::Fn(method) = item {
        method
    } else {
        return Err(Error::new(
            item.span(),
            "Contract traits can only contain methods!",
        ));
    };

    validate_signature(method)?;

    let args: Vec<_> = method
        .sig
        .inputs
        .iter()
        .skip(1)
        .map(argument_ident)
        .try_collect()?;

    let sig = &method.sig;
    let ident = &sig.ident;

    // every call resolves the calling thread's own instance
    Ok(quote! {
        #sig {
            self.handler.current_instance().#ident(#(#args),*)
        }
    })
}

fn validate_signature(method: &TraitItemFn) -> Result<()> {
    if !method.sig.generics.params.is_empty() {
        return Err(Error::new(
            method.sig.generics.span(),
            "Contract operations cannot be generic!",
        ));
    }

    match method.sig.receiver() {
        Some(receiver) if receiver.reference.is_some() && receiver.mutability.is_none() => Ok(()),
        _ => Err(Error::new(
            method.sig.span(),
            "Contract operations must take &self!",
        )),
    }
}

fn argument_ident(arg: &FnArg) -> Result<&Ident> {
    if let FnArg::Typed(arg) = arg {
        if let Pat::Ident(pat) = arg.pat.as_ref() {
            return Ok(&pat.ident);
        }
    }

    Err(Error::new(
        arg.span(),
        "Contract operation parameters must be simple identifiers!",
    ))
}
