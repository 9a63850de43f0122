//! VRL boolean expressions over record field paths.
//!
//! `and`/`or` parenthesize every operand when there is more than one, so
//! results nest safely. With no operands they return their identity
//! (`true` for `and`, `false` for `or`). Callers keep operand order stable.

pub const K8S_NAMESPACE_NAME: &str = ".kubernetes.namespace_name";
pub const K8S_CONTAINER_NAME: &str = ".kubernetes.container_name";
pub const ALWAYS_TRUE: &str = "true";
pub const ALWAYS_FALSE: &str = "false";

/// VRL string literal.
pub fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// `.kubernetes.labels."<key>"`
pub fn label_field(key: &str) -> String {
    format!(".kubernetes.labels.{}", quote(key))
}

pub fn eq(field: &str, value: &str) -> String {
    format!("{} == {}", field, quote(value))
}

pub fn starts_with(field: &str, prefix: &str) -> String {
    format!("starts_with!({}, {})", field, quote(prefix))
}

pub fn neg(expr: &str) -> String {
    format!("!{}", expr)
}

pub fn paren(expr: &str) -> String {
    format!("({})", expr)
}

pub fn and<I, S>(exprs: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    join(exprs, " && ", ALWAYS_TRUE)
}

pub fn or<I, S>(exprs: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    join(exprs, " || ", ALWAYS_FALSE)
}

fn join<I, S>(exprs: I, op: &str, identity: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let exprs: Vec<S> = exprs.into_iter().collect();
    match exprs.as_slice() {
        [] => identity.to_string(),
        [single] => single.as_ref().to_string(),
        many => many
            .iter()
            .map(|e| paren(e.as_ref()))
            .collect::<Vec<_>>()
            .join(op),
    }
}

/// Match `field` against a `*` glob.
///
/// Plain names compile to equality, a single trailing `*` to a prefix test,
/// anything else to an anchored regex.
pub fn glob(field: &str, pattern: &str) -> String {
    match pattern.find('*') {
        None => eq(field, pattern),
        Some(i) if i == pattern.len() - 1 => starts_with(field, &pattern[..i]),
        Some(_) => {
            let body = pattern
                .split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".*")
                .replace('\'', r"\x27");
            format!("match!({}, r'^{}$')", field, body)
        }
    }
}
