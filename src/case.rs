//! Identifier case conversion: snake_case columns, camelCase API fields.

/// `created_at` -> `createdAt`
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = false;
    for c in s.chars() {
        match c {
            '_' => upper_next = !out.is_empty(),
            c if upper_next => {
                out.extend(c.to_uppercase());
                upper_next = false;
            }
            c => out.push(c),
        }
    }
    out
}

/// `createdAt` -> `created_at`; already snake_case input is unchanged.
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if c.is_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("created_at", "createdAt")]
    #[case("id", "id")]
    #[case("user_id", "userId")]
    fn snake_to_camel(#[case] snake: &str, #[case] camel: &str) {
        assert_eq!(to_camel_case(snake), camel);
        assert_eq!(to_snake_case(camel), snake);
    }

    #[test]
    fn snake_input_is_stable() {
        assert_eq!(to_snake_case("updated_at"), "updated_at");
    }
}
