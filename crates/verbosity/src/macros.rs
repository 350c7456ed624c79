//! crates/verbosity/src/macros.rs
//! Call-site macros that fill in the caller label automatically.

/// Expands to the name of the enclosing function as a `&'static str`.
///
/// Closures and async blocks report the function that contains them.
///
/// ```
/// fn load_config() -> &'static str {
///     verbosity::caller_name!()
/// }
///
/// assert_eq!(load_config(), "load_config");
/// ```
#[macro_export]
macro_rules! caller_name {
    () => {{
        fn __caller() {}
        $crate::__function_name(::std::any::type_name_of_val(&__caller))
    }};
}

#[doc(hidden)]
pub fn __function_name(path: &'static str) -> &'static str {
    let mut path = path.strip_suffix("::__caller").unwrap_or(path);
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }
    path.rsplit("::").next().unwrap_or(path)
}

/// Builds a [`VerbositySpec::Mixed`](crate::VerbositySpec::Mixed) list from
/// integers and tags.
///
/// ```
/// let spec = verbosity::spec![2, "loop"];
/// assert_eq!(spec.to_string(), r#"[2, "loop"]"#);
/// ```
#[macro_export]
macro_rules! spec {
    ($($token:expr),* $(,)?) => {
        $crate::VerbositySpec::Mixed(::std::vec![$($crate::SpecToken::from($token)),*])
    };
}

/// Emits a formatted message through the process-wide controller.
///
/// The caller label is the enclosing function's name.
///
/// ```no_run
/// verbosity::global::set_levels("1,loop");
/// verbosity::verbose!(verbosity::spec![3, "loop"], "iteration {}", 7);
/// ```
#[macro_export]
macro_rules! verbose {
    ($spec:expr, $($arg:tt)+) => {
        $crate::global::verbose($spec, $crate::caller_name!(), ::std::format_args!($($arg)+))
    };
}

/// Emits a formatted message through an explicit [`Verbosity`](crate::Verbosity).
#[macro_export]
macro_rules! verbose_to {
    ($controller:expr, $spec:expr, $($arg:tt)+) => {
        $controller.verbose($spec, $crate::caller_name!(), ::std::format_args!($($arg)+))
    };
}

/// Emits a formatted message through the process-wide controller and also
/// writes it to `tee`.
#[macro_export]
macro_rules! verbose_tee {
    ($tee:expr, $spec:expr, $($arg:tt)+) => {
        $crate::global::verbose_with(
            $spec,
            $crate::caller_name!(),
            ::std::format_args!($($arg)+),
            $crate::Emit::new().tee($tee),
        )
    };
}
