//! Tracing subscriber setup shared by the binaries.

use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber, filtered by `RUST_LOG`.
///
/// If a subscriber is already installed, the failure is printed to stderr and
/// the existing subscriber stays in place.
pub fn init_tracing(json: bool) {
    let builder = fmt().with_env_filter(EnvFilter::from_default_env());
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(error) = result {
        eprintln!("tracing init failed: {error}");
    }
}

#[cfg(test)]
mod tests {
    //! Repeated initialisation must not panic.

    use super::init_tracing;

    #[test]
    fn second_init_is_ignored() {
        init_tracing(false);
        init_tracing(true);
    }
}
