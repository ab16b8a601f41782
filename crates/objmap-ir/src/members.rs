//! Name-based member access on source objects

use crate::value::Value;

/// Read access to the public members of a source type.
///
/// Used to fill constructor parameters that have no explicit binding: the
/// parameter name is matched against [`Members::member_names`] and the
/// matching member value is read.
pub trait Members {
    /// Names of the readable members, in declaration order.
    fn member_names() -> &'static [&'static str];

    /// Read a member by its exact name.
    fn member(&self, name: &str) -> Option<Value>;
}

/// Find the member matching `wanted`.
///
/// An exact match always wins; a case-insensitive match is only considered
/// when `ignore_case` is set.
#[must_use]
pub fn find_member(
    names: &'static [&'static str],
    wanted: &str,
    ignore_case: bool,
) -> Option<&'static str> {
    names
        .iter()
        .copied()
        .find(|name| *name == wanted)
        .or_else(|| {
            ignore_case
                .then(|| names.iter().copied().find(|name| name.eq_ignore_ascii_case(wanted)))
                .flatten()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Order {
        id: i64,
        customer_name: String,
    }

    impl Members for Order {
        fn member_names() -> &'static [&'static str] {
            &["id", "customer_name"]
        }

        fn member(&self, name: &str) -> Option<Value> {
            match name {
                "id" => Some(self.id.into()),
                "customer_name" => Some(self.customer_name.clone().into()),
                _ => None,
            }
        }
    }

    #[test]
    fn test_exact_match_preferred() {
        assert_eq!(find_member(Order::member_names(), "id", false), Some("id"));
        assert_eq!(find_member(Order::member_names(), "ID", false), None);
    }

    #[test]
    fn test_ignore_case_match() {
        assert_eq!(
            find_member(Order::member_names(), "Customer_Name", true),
            Some("customer_name")
        );
    }

    #[test]
    fn test_member_read() {
        let order = Order {
            id: 7,
            customer_name: "ACME".to_string(),
        };
        assert_eq!(order.member("id"), Some(Value::Integer(7)));
        assert_eq!(order.member("missing"), None);
    }
}
