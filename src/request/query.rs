//! Query string construction.

use url::form_urlencoded;

/// Encode `params` as `k=v` pairs joined by `&`.
///
/// Keys and values use `application/x-www-form-urlencoded` escaping, so a
/// value such as `x&y` cannot be mistaken for a pair separator. An empty
/// input yields an empty string.
pub fn encode_query<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}
