/// Creates [`Params`](crate::Params) from `key => value` pairs.
///
/// Keys are parameter names or `usize` positions, values are anything convertible into [`Param`](crate::Param).
///
/// # Examples
/// ```rust
/// use lazydi::{params, Params};
///
/// let params: Params = params! {
///     "host" => "localhost",
///     1usize => 5432i64,
/// };
/// assert_eq!(params.len(), 2);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::Params::new();
        $(
            params.insert($key, $value);
        )+
        params
    }};
}

/// Creates [`Setters`](crate::Setters) from `method => value` pairs.
///
/// # Examples
/// ```rust
/// use lazydi::{setters, Setters};
///
/// let setters: Setters = setters! {
///     "setLogger" => "stderr",
/// };
/// assert_eq!(setters.len(), 1);
/// ```
#[macro_export]
macro_rules! setters {
    () => {
        $crate::Setters::new()
    };
    ($($method:expr => $value:expr),+ $(,)?) => {{
        let mut setters = $crate::Setters::new();
        $(
            setters.insert($method, $value);
        )+
        setters
    }};
}
