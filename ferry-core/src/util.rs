pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Index of the first name equal to `name`, ignoring ASCII case.
pub fn position_ignore_case<S: AsRef<str>>(names: &[S], name: &str) -> Option<usize> {
    names
        .iter()
        .position(|v| v.as_ref().eq_ignore_ascii_case(name))
}

pub fn contains_ignore_case<S: AsRef<str>>(names: &[S], name: &str) -> bool {
    position_ignore_case(names, name).is_some()
}

/// Longest prefix of `value` not exceeding `max` bytes that ends on a char boundary.
pub fn truncate_str(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            $crate::truncate_str(&$query, 497).trim_end(),
            if $query.len() > 497 { "..." } else { "" },
        )
    };
}
