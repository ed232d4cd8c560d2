//! Syntactic checks on request bodies.
//!
//! Only shape is checked here. Whether a referenced row exists, or a key is
//! already taken, is the engine's call.

use api_types::wire;
use engine::Allocation;

use crate::ServerError;

pub(crate) type ResultValidation<T> = Result<T, ServerError>;

fn invalid(message: String) -> ServerError {
    ServerError::Generic(message)
}

pub(crate) fn required(field: &str, value: &str) -> ResultValidation<()> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} must not be empty")));
    }
    Ok(())
}

pub(crate) fn required_opt(field: &str, value: Option<&str>) -> ResultValidation<()> {
    value.map_or(Ok(()), |value| required(field, value))
}

/// One `@`, something on both sides, and a dot in the domain.
pub(crate) fn email(value: &str) -> ResultValidation<()> {
    let Some((local, domain)) = value.trim().split_once('@') else {
        return Err(invalid(format!("invalid email address {value}")));
    };
    let domain_ok = !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty());
    if local.is_empty() || !domain_ok || value.chars().any(char::is_whitespace) {
        return Err(invalid(format!("invalid email address {value}")));
    }
    Ok(())
}

pub(crate) fn non_negative(field: &str, value: f64) -> ResultValidation<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(format!("{field} must be a non-negative number")));
    }
    Ok(())
}

pub(crate) fn non_negative_int(field: &str, value: i32) -> ResultValidation<()> {
    if value < 0 {
        return Err(invalid(format!("{field} must not be negative")));
    }
    Ok(())
}

/// Turn wire allocations into engine buckets, rejecting impossible months.
pub(crate) fn allocations(
    field: &str,
    entries: Vec<wire::Allocation>,
) -> ResultValidation<Vec<Allocation>> {
    entries
        .into_iter()
        .map(|entry| {
            if !(1..=12).contains(&entry.month) {
                return Err(invalid(format!(
                    "{field}: month {} is not between 1 and 12",
                    entry.month
                )));
            }
            non_negative(field, entry.amount)?;
            Allocation::monthly(entry.year, entry.month, entry.amount)
                .ok_or_else(|| invalid(format!("{field}: year {} is out of range", entry.year)))
        })
        .collect()
}
