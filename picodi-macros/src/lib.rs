use crate::contract::expand_contract;
use proc_macro::TokenStream;
use syn::{parse_macro_input, Error, ItemTrait};

mod contract;

/// Marks a trait as a proxyable capability contract. Generates a hidden
/// forwarding proxy type for `dyn Trait + Send + Sync` and implements
/// `picodi::proxy::Proxiable` for it, which makes the trait usable with
/// thread-localized component adapters.
#[proc_macro_attribute]
pub fn contract(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        return Error::new(
            proc_macro2::Span::call_site(),
            "#[contract] does not take arguments!",
        )
        .into_compile_error()
        .into();
    }

    let input = parse_macro_input!(input as ItemTrait);
    expand_contract(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}
