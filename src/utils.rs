// ###################################
// ->   Error format chain
// ###################################
/// Calls `Error::source()` on a chain of errors and writes them to a `Formatter`.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    write!(f, "{}", e)?;
    let mut current_src = e.source();
    while let Some(cause) = current_src {
        write!(f, "\nCaused by:\n\t{cause}")?;
        current_src = cause.source();
    }

    Ok(())
}

/// `error_chain_fmt` into an owned `String`.
pub fn error_chain_string(e: &impl std::error::Error) -> String {
    struct Chain<'a, E>(&'a E);
    impl<E: std::error::Error> std::fmt::Display for Chain<'_, E> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            error_chain_fmt(self.0, f)
        }
    }

    Chain(e).to_string()
}
