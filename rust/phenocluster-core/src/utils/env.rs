// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Phenocluster Authors

use std::str::FromStr;

/// Read `name` from the environment, falling back to `default` when it is
/// unset or does not parse.
pub fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            log::warn!(
                "Ignoring environment variable {}={:?}: cannot be parsed",
                name,
                value
            );
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use phenocluster_testing::util::EnvVarGuard;

    #[test]
    fn test_env_or() {
        assert_eq!(env_or("PHENOCLUSTER_TEST_UNSET_VARIABLE", 7_u32), 7);

        let _guard = EnvVarGuard::new("PHENOCLUSTER_TEST_ENV_OR", " 42 ");
        assert_eq!(env_or("PHENOCLUSTER_TEST_ENV_OR", 7_u32), 42);
        assert_eq!(env_or("PHENOCLUSTER_TEST_ENV_OR", 0.5_f64), 42.0);
    }

    #[test]
    fn test_env_or_unparseable() {
        let _guard = EnvVarGuard::new("PHENOCLUSTER_TEST_ENV_OR_BAD", "many");
        assert_eq!(env_or("PHENOCLUSTER_TEST_ENV_OR_BAD", 3_usize), 3);
    }
}
