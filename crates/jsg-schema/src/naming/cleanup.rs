//! Definition name clean-ups applied on top of any naming strategy.

/// Make a definition name safe for use in a URI fragment.
///
/// Arrays are marked with `*`, generics with parentheses, and everything
/// outside `[A-Za-z0-9.-_$*(),]` is dropped.
#[must_use]
pub fn ensure_definition_key_is_uri_compatible(name: &str) -> String {
    name.replace("[]", "*")
        .replace('<', "(")
        .replace('>', ")")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || ".-_$*(),".contains(*c))
        .collect()
}

/// Reduce a definition name to alphanumerics, dots, dashes and underscores.
#[must_use]
pub fn ensure_definition_key_is_plain(name: &str) -> String {
    name.replace('$', "-")
        .replace("[]", "...")
        .replace(['<', '>'], "_")
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || ".-_".contains(*c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("map<string, big_decimal>", "map(string,big_decimal)")]
    #[case("Foo[]", "Foo*")]
    #[case("Outer$Inner", "Outer$Inner")]
    #[case("Pair<A, List<B>>", "Pair(A,List(B))")]
    #[case("weird name!", "weirdname")]
    fn uri_compatible(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(ensure_definition_key_is_uri_compatible(input), expected);
    }

    #[rstest]
    #[case("map<string, big_decimal>", "map_string.big_decimal_")]
    #[case("Foo[]", "Foo...")]
    #[case("Outer$Inner", "Outer-Inner")]
    #[case("Pair<A, List<B>>", "Pair_A.List_B__")]
    fn plain(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(ensure_definition_key_is_plain(input), expected);
    }
}
