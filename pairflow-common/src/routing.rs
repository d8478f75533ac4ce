use alloy_primitives::Address;

/// Router path from `token_in` to `token_out`.
///
/// Direct when either side is the wrapped-native token, otherwise routed through it as the single
/// intermediate hop.
pub fn build_path(token_in: Address, token_out: Address, wrapped_native: Address) -> Vec<Address> {
    if token_in == wrapped_native || token_out == wrapped_native {
        vec![token_in, token_out]
    } else {
        vec![token_in, wrapped_native, token_out]
    }
}

/// Consecutive `(from, to)` hops of a path; each hop needs its own pool.
pub fn hops(path: &[Address]) -> impl Iterator<Item = (Address, Address)> + '_ {
    path.windows(2)
        .map(|hop| (hop[0], hop[1]))
}
