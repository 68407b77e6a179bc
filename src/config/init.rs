// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates catapult.yml template files.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::ArtifactName;

use super::{CONFIG_FILENAME, Config};

pub fn init_config(
    dir: &Path,
    artifact: Option<&str>,
    root: Option<&Path>,
    force: bool,
) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template();

    if let Some(name) = artifact {
        config.artifact.name =
            ArtifactName::new(name).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.artifact.source = format!("target/{}.war", name).into();
    }

    if let Some(root) = root {
        config.server.root = root.to_path_buf();
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"artifact:
  name: {}
  source: {}
  # version: 1.0.0

server:
  root: {}
  # start_script: bin/startup.sh
  # stop_script: bin/shutdown.sh
  # deploy_dir: webapps
  # log_file: logs/catalina.out
  # process_match: "catalina.base={}"

stop:
  grace_period: 10s
  kill_wait: 5s
  # Abort the deployment if the server survives a forced stop (fail | warn)
  on_lingering: fail

start:
  settle: 10s

verify:
  wait: 10s
"#,
        config.artifact.name,
        config.artifact.source.display(),
        config.server.root.display(),
        config.server.root.display(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_round_trips_through_parser() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), Some("shop"), Some(Path::new("/srv/tomcat")), false).unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.artifact.name.as_str(), "shop");
        assert_eq!(config.server.root, Path::new("/srv/tomcat"));
        assert_eq!(config.artifact_source(), dir.path().join("target/shop.war"));
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "existing").unwrap();

        let err = init_config(dir.path(), None, None, false).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));

        init_config(dir.path(), None, None, true).unwrap();
    }

    #[test]
    fn rejects_invalid_artifact_name() {
        let dir = tempfile::tempdir().unwrap();
        let err = init_config(dir.path(), Some("../evil"), None, false).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
