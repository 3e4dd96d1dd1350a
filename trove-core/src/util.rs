use crate::{Query, Result};

/// Calls `f` for every value, writing `separator` between the fragments that produced output.
pub fn separated_by<T, F>(
    out: &mut Query,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) -> Result<()>
where
    F: FnMut(&mut Query, T) -> Result<()>,
{
    let mut len = out.text.len();
    for v in values {
        if out.text.len() > len {
            out.text.push_str(separator);
        }
        len = out.text.len();
        f(out, v)?;
    }
    Ok(())
}

#[macro_export]
macro_rules! possibly_parenthesized {
    ($out:ident, $cond:expr, $v:expr) => {
        if $cond {
            $out.push('(');
            $v;
            $out.push(')');
        } else {
            $v;
        }
    };
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

/// Logs the error and returns it, used where a backend raises an error.
#[macro_export]
macro_rules! log_error {
    ($error:expr) => {{
        let error = $error;
        log::error!("{:#}", error);
        error
    }};
}
