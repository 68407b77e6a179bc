// ABOUTME: Integration tests for configuration parsing and validation.
// ABOUTME: Tests YAML parsing, env var interpolation, destination merging and plan building.

use catapult::config::*;
use catapult::deploy::DeploymentPlan;
use catapult::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MINIMAL: &str = r#"
artifact:
  name: shop
  source: target/shop.war
server:
  root: /opt/tomcat
"#;

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.artifact.name.as_str(), "shop");
        assert_eq!(config.artifact.extension, "war");
        assert_eq!(config.server.root, PathBuf::from("/opt/tomcat"));
        assert_eq!(config.server.deploy_dir, PathBuf::from("webapps"));
        assert!(config.lock.enabled);
        assert_eq!(config.diagnostics.log_tail_lines, 50);
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
artifact:
  name: shop
  source: /build/shop-2.3.0.war
  version: 2.3.0
  extension: war

server:
  root: /opt/tomcat
  start_script: bin/catalina-start.sh
  stop_script: /usr/local/bin/stop-tomcat
  deploy_dir: apps
  log_file: /var/log/tomcat/catalina.out
  process_match: "org.apache.catalina.startup.Bootstrap"
  env:
    CATALINA_OPTS: "-Xmx1g"

stop:
  grace_period: 30s
  poll_interval: 500ms
  poll_attempts: 5
  kill_wait: 2s
  on_lingering: warn

start:
  settle: 20s
  poll_interval: 1s
  poll_attempts: 4

verify:
  wait: 15s
  poll_interval: 3s
  poll_attempts: 2

diagnostics:
  log_tail_lines: 200

lock:
  enabled: false
  dir: /tmp/catapult-locks
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.artifact.version.as_deref(), Some("2.3.0"));
        assert_eq!(config.stop.grace_period, Duration::from_secs(30));
        assert_eq!(config.stop.poll_interval, Duration::from_millis(500));
        assert_eq!(config.stop.on_lingering, LingeringPolicy::Warn);
        assert_eq!(config.start.settle, Duration::from_secs(20));
        assert_eq!(config.verify.poll_attempts, 2);
        assert_eq!(config.diagnostics.log_tail_lines, 200);
        assert!(!config.lock.enabled);
        assert_eq!(config.lock.dir, Some(PathBuf::from("/tmp/catapult-locks")));
    }

    #[test]
    fn defaults_match_documented_timings() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.stop.grace_period, Duration::from_secs(10));
        assert_eq!(config.stop.on_lingering, LingeringPolicy::Fail);
        assert_eq!(config.start.settle, Duration::from_secs(10));
        assert_eq!(config.verify.wait, Duration::from_secs(10));
    }

    #[test]
    fn invalid_artifact_name_rejected() {
        let yaml = MINIMAL.replace("name: shop", "name: ../shop");
        assert!(Config::from_yaml(&yaml).is_err());
    }

    #[test]
    fn dotted_extension_rejected() {
        let yaml = MINIMAL.replace(
            "  source: target/shop.war",
            "  source: target/shop.war\n  extension: .war",
        );
        let err = Config::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn blank_process_match_rejected() {
        let yaml = format!("{MINIMAL}  process_match: \"  \"\n");
        let err = Config::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn missing_server_section_rejected() {
        let yaml = "artifact:\n  name: shop\n  source: shop.war\n";
        assert!(matches!(Config::from_yaml(yaml), Err(Error::Yaml(_))));
    }

    #[test]
    fn bad_lingering_policy_rejected() {
        let yaml = format!("{MINIMAL}stop:\n  on_lingering: ignore\n");
        assert!(Config::from_yaml(&yaml).is_err());
    }
}

mod discovery {
    use super::*;
    use std::fs;

    #[test]
    fn finds_config_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), MINIMAL).unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.artifact_source(), dir.path().join("target/shop.war"));
    }

    #[test]
    fn finds_config_in_dot_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".catapult")).unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME_DIR), MINIMAL).unwrap();

        let config = Config::discover(dir.path()).unwrap();
        // Relative sources still resolve against the project directory.
        assert_eq!(config.artifact_source(), dir.path().join("target/shop.war"));
    }

    #[test]
    fn missing_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::discover(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }

    #[test]
    fn explicit_path_resolves_against_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deploy");
        fs::create_dir(&nested).unwrap();
        let path = nested.join("prod.yml");
        fs::write(&path, MINIMAL).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.artifact_source(), nested.join("target/shop.war"));
    }

    #[test]
    fn absolute_source_is_kept() {
        let config = Config::from_yaml(MINIMAL)
            .unwrap()
            .with_artifact_source(PathBuf::from("/ci/out/shop.war"));
        assert_eq!(config.artifact_source(), Path::new("/ci/out/shop.war"));
    }
}

mod env_interpolation {
    use super::*;

    const WITH_ENV: &str = r#"
artifact:
  name: shop
  source: shop.war
server:
  root: /opt/tomcat
  env:
    CATALINA_OPTS: "-Xmx512m"
    JAVA_HOME:
      env: CATAPULT_IT_JAVA_HOME
    CATALINA_PID:
      env: CATAPULT_IT_PID_FILE
      default: /tmp/tomcat.pid
"#;

    #[test]
    fn env_values_resolve_into_plan() {
        temp_env::with_vars(
            [
                ("CATAPULT_IT_JAVA_HOME", Some("/usr/lib/jvm/java-17")),
                ("CATAPULT_IT_PID_FILE", None),
            ],
            || {
                let config = Config::from_yaml(WITH_ENV).unwrap();
                let plan = DeploymentPlan::from_config(&config).unwrap();
                let env = &plan.installation.env;
                assert_eq!(env["CATALINA_OPTS"], "-Xmx512m");
                assert_eq!(env["JAVA_HOME"], "/usr/lib/jvm/java-17");
                assert_eq!(env["CATALINA_PID"], "/tmp/tomcat.pid");
            },
        );
    }

    #[test]
    fn missing_env_var_fails_plan() {
        temp_env::with_var_unset("CATAPULT_IT_JAVA_HOME", || {
            let config = Config::from_yaml(WITH_ENV).unwrap();
            let err = DeploymentPlan::from_config(&config).unwrap_err();
            assert!(matches!(err, Error::MissingEnvVar(ref v) if v == "CATAPULT_IT_JAVA_HOME"));
        });
    }
}

mod destinations {
    use super::*;

    const WITH_DESTINATIONS: &str = r#"
artifact:
  name: shop
  source: target/shop.war
server:
  root: /opt/tomcat
  env:
    CATALINA_OPTS: "-Xmx512m"
destinations:
  staging:
    root: /srv/tomcat-staging
    env:
      CATALINA_OPTS: "-Xmx256m"
      STAGE: staging
  canary:
    process_match: "catalina.base=/srv/canary"
    artifact_source: /ci/canary/shop.war
"#;

    #[test]
    fn destination_overrides_root_and_env() {
        let config = Config::from_yaml(WITH_DESTINATIONS).unwrap();
        let staging = config.for_destination("staging").unwrap();

        assert_eq!(staging.server.root, PathBuf::from("/srv/tomcat-staging"));
        assert_eq!(
            staging.server.env["CATALINA_OPTS"],
            EnvValue::Literal("-Xmx256m".to_string())
        );
        assert_eq!(
            staging.server.env["STAGE"],
            EnvValue::Literal("staging".to_string())
        );
        // The default pattern follows the overridden root.
        assert_eq!(
            staging.server.process_pattern(),
            "catalina.base=/srv/tomcat-staging"
        );
    }

    #[test]
    fn destination_overrides_matcher_and_source() {
        let config = Config::from_yaml(WITH_DESTINATIONS).unwrap();
        let canary = config.for_destination("canary").unwrap();

        assert_eq!(canary.server.root, PathBuf::from("/opt/tomcat"));
        assert_eq!(canary.server.process_pattern(), "catalina.base=/srv/canary");
        assert_eq!(canary.artifact_source(), Path::new("/ci/canary/shop.war"));
    }

    #[test]
    fn unknown_destination_is_an_error() {
        let config = Config::from_yaml(WITH_DESTINATIONS).unwrap();
        let err = config.for_destination("production").unwrap_err();
        assert!(matches!(err, Error::UnknownDestination(ref d) if d == "production"));
    }
}

mod plan {
    use super::*;

    #[test]
    fn relative_paths_resolve_against_root() {
        let yaml = format!("{MINIMAL}  stop_script: /usr/local/bin/stop-tomcat\n");
        let config = Config::from_yaml(&yaml).unwrap();
        let plan = DeploymentPlan::from_config(&config).unwrap();

        assert_eq!(
            plan.installation.start_script,
            PathBuf::from("/opt/tomcat/bin/startup.sh")
        );
        assert_eq!(
            plan.installation.stop_script,
            PathBuf::from("/usr/local/bin/stop-tomcat")
        );
        assert_eq!(
            plan.installation.log_file,
            PathBuf::from("/opt/tomcat/logs/catalina.out")
        );
        assert_eq!(plan.artifact.deployed_file_name(), "shop.war");
    }

    #[test]
    fn poll_policies_follow_config() {
        let yaml = format!("{MINIMAL}verify:\n  wait: 2s\n  poll_interval: 1s\n  poll_attempts: 3\n");
        let config = Config::from_yaml(&yaml).unwrap();
        let plan = DeploymentPlan::from_config(&config).unwrap();

        assert_eq!(plan.verify.initial_wait, Duration::from_secs(2));
        assert_eq!(plan.verify.budget(), Duration::from_secs(4));
    }
}
