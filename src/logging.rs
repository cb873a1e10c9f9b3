use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "phonepool=info";

/// Installs a fmt subscriber honouring `RUST_LOG`, falling back to `phonepool=info`.
///
/// Returns false when a global subscriber was already set.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::init_tracing;

    #[test]
    fn second_init_is_harmless() {
        init_tracing();
        assert!(!init_tracing());
    }
}
