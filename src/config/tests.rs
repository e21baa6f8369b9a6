#[cfg(test)]
mod tests {
    use crate::config::{
        bench::{load_bench_config, resolve_bench_config, BenchConfig, BenchOverrides},
        hub::{load_hub_config, HubConfig, HubConfigError},
        traits::{Configuration, MergeableConfiguration},
    };
    use crate::managers::ManagerKind;
    use std::fs;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn write_file(dir: &std::path::Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_bench_config_defaults() {
        let config = BenchConfig::default();

        assert_eq!(config.python, "python3");
        assert_eq!(config.packages.len(), 11);
        assert_eq!(config.packages[0], "requests");
        assert_eq!(config.packages[10], "tqdm");
        assert_eq!(config.managers, ManagerKind::ALL.to_vec());
        assert_eq!(config.conda_channel, "conda-forge");
        assert!(config.pip_flags.contains(&"--root-user-action=ignore".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bench_config_validation() {
        let mut empty = BenchConfig::default();
        empty.packages.clear();
        assert!(empty.validate().is_err());

        let mut no_managers = BenchConfig::default();
        no_managers.managers.clear();
        assert!(no_managers.validate().is_err());

        let mut spaced = BenchConfig::default();
        spaced.packages = vec!["requests pandas".to_string()];
        assert!(spaced.validate().is_err());

        let mut duplicate = BenchConfig::default();
        duplicate.packages = vec!["PyYAML".to_string(), "pyyaml".to_string()];
        let err = duplicate.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate package"));
    }

    #[test]
    fn test_ordered_managers() {
        let mut config = BenchConfig::default();
        config.managers = vec![ManagerKind::Uv, ManagerKind::Pip, ManagerKind::Uv];
        assert_eq!(
            config.ordered_managers(),
            vec![ManagerKind::Pip, ManagerKind::Uv]
        );
    }

    #[test]
    fn test_load_bench_config() {
        let temp_dir = tempdir().unwrap();
        let path = write_file(
            temp_dir.path(),
            "bench.yml",
            r#"
python: /usr/bin/python3.12
packages:
  - requests
  - tqdm
managers: [uv, pip]
conda_channel: defaults
working_dir: work
env:
  PIP_NO_CACHE_DIR: "1"
"#,
        );

        let config = load_bench_config(&path).unwrap();
        assert_eq!(config.python, "/usr/bin/python3.12");
        assert_eq!(config.packages, vec!["requests", "tqdm"]);
        assert_eq!(
            config.ordered_managers(),
            vec![ManagerKind::Pip, ManagerKind::Uv]
        );
        assert_eq!(config.conda_channel, "defaults");
        // Omitted keys keep their defaults
        assert_eq!(config.uv_bin, "uv");
        assert_eq!(config.pip_flags.len(), 4);
        assert_eq!(config.working_dir, Some(temp_dir.path().join("work")));
        assert_eq!(config.env.get("PIP_NO_CACHE_DIR"), Some(&"1".to_string()));
        assert_eq!(config.config_path(), &path);
    }

    #[test]
    fn test_load_bench_config_errors() {
        let temp_dir = tempdir().unwrap();

        let missing = temp_dir.path().join("missing.yml");
        assert!(load_bench_config(&missing).is_err());

        let bad_manager = write_file(temp_dir.path(), "bad.yml", "managers: [poetry]\n");
        assert!(load_bench_config(&bad_manager).is_err());

        let no_packages = write_file(temp_dir.path(), "empty.yml", "packages: []\n");
        let err = load_bench_config(&no_packages).unwrap_err();
        assert!(err.to_string().contains("No packages configured"));
    }

    #[test]
    fn test_resolve_bench_config() {
        let temp_dir = tempdir().unwrap();
        let absent = temp_dir.path().join("bench.yml");

        // Default path that doesn't exist falls back to defaults
        let config = resolve_bench_config(&absent, false).unwrap();
        assert_eq!(config.packages.len(), 11);

        // An explicitly requested file has to exist
        assert!(resolve_bench_config(&absent, true).is_err());
    }

    #[test]
    fn test_merge_overrides() {
        let base = BenchConfig::default();

        let overrides = BenchOverrides {
            packages: vec!["numpy".to_string()],
            managers: vec![ManagerKind::Conda],
            python: Some("/opt/py/bin/python".to_string()),
        };
        let merged = base.merge_with(&overrides).unwrap();
        assert_eq!(merged.packages, vec!["numpy"]);
        assert_eq!(merged.managers, vec![ManagerKind::Conda]);
        assert_eq!(merged.python, "/opt/py/bin/python");

        // Empty overrides leave everything alone
        let unchanged = base.merge_with(&BenchOverrides::default()).unwrap();
        assert_eq!(unchanged.packages, base.packages);
        assert_eq!(unchanged.python, base.python);
    }

    #[test]
    fn test_hub_config_defaults() {
        let hub = HubConfig::default();

        assert_eq!(hub.spawner.cmd, vec!["jupyterhub-singleuser"]);
        assert_eq!(hub.spawner.start_timeout().as_secs(), 60);
        assert_eq!(hub.spawner.http_timeout().as_secs(), 60);
        assert_eq!(hub.spawner.default_url, "/lab");
        assert_eq!(hub.authenticator_class, "dummy");
        assert!(hub.dummy_password.is_empty());
        assert!(hub.is_admin("admin"));
        assert_eq!(hub.token_user("jupyter-token"), Some("admin"));
        assert_eq!(hub.token_user("other"), None);
        assert!(hub.allow_named_servers);
        assert!(hub.validate().is_ok());
    }

    #[test]
    fn test_hub_config_check() {
        let mut hub = HubConfig::default();
        hub.spawner.cmd.clear();
        assert_eq!(hub.check(), Err(HubConfigError::EmptySpawnCommand));

        let mut hub = HubConfig::default();
        hub.spawner.http_timeout = 0;
        assert_eq!(
            hub.check(),
            Err(HubConfigError::ZeroTimeout {
                field: "http_timeout"
            })
        );

        let mut hub = HubConfig::default();
        hub.spawner.default_url = "lab".to_string();
        assert_eq!(
            hub.check(),
            Err(HubConfigError::RelativeDefaultUrl("lab".to_string()))
        );

        let mut hub = HubConfig::default();
        hub.api_tokens.insert("t2".to_string(), " ".to_string());
        assert_eq!(hub.check(), Err(HubConfigError::EmptyTokenUser));
    }

    #[test]
    fn test_hub_non_admin_tokens() {
        let mut hub = HubConfig::default();
        assert!(hub.non_admin_tokens().is_empty());

        hub.api_tokens
            .insert("reader-token".to_string(), "alice".to_string());
        assert_eq!(hub.non_admin_tokens(), vec![("reader-token", "alice")]);
        // A non-admin token is allowed, just reported
        assert!(hub.validate().is_ok());
    }

    #[test]
    fn test_load_hub_config_partial() {
        let temp_dir = tempdir().unwrap();
        let path = write_file(
            temp_dir.path(),
            "hub.yml",
            r#"
spawner:
  start_timeout: 120
allow_named_servers: false
api_tokens:
  ci-token: admin
"#,
        );

        let hub = load_hub_config(&path).unwrap();
        assert_eq!(hub.spawner.start_timeout, 120);
        assert_eq!(hub.spawner.http_timeout, 60);
        assert_eq!(hub.spawner.default_url, "/lab");
        assert!(!hub.allow_named_servers);
        assert_eq!(hub.token_user("ci-token"), Some("admin"));
        assert_eq!(hub.token_user("jupyter-token"), None);
    }

    #[test]
    fn test_hub_yaml_round_trip_keeps_defaults() {
        let hub = HubConfig::default();
        let yaml = hub.to_yaml().unwrap();
        assert!(yaml.contains("jupyterhub-singleuser"));
        assert!(yaml.contains("jupyter-token: admin"));

        let parsed: HubConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, hub);
    }
}
