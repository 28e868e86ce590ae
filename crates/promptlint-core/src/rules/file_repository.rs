use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use tracing::debug;

use super::{RuleRepository, RuleSet, BUILTIN_RULES_YAML};

/// Where a repository reads its YAML from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    Builtin,
    File(PathBuf),
}

/// Loads a `prompt_rules:` YAML document, either the embedded pack or a file on disk.
pub struct FileRuleRepository {
    source: RuleSource,
    cache: OnceCell<RuleSet>,
}

impl FileRuleRepository {
    /// Repository over the rules compiled into the binary.
    pub fn builtin() -> Self {
        Self::with_source(RuleSource::Builtin)
    }

    /// Repository over a user-supplied rule file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_source(RuleSource::File(path.into()))
    }

    pub fn with_source(source: RuleSource) -> Self {
        Self {
            source,
            cache: OnceCell::new(),
        }
    }

    fn read(&self) -> Result<RuleSet> {
        match &self.source {
            RuleSource::Builtin => {
                RuleSet::from_yaml(BUILTIN_RULES_YAML).context("error parsing embedded YAML file")
            }
            RuleSource::File(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read rules file at {}", path.display()))?;
                RuleSet::from_yaml(&raw)
                    .with_context(|| format!("invalid YAML in rules file at {}", path.display()))
            }
        }
    }
}

#[async_trait::async_trait]
impl RuleRepository for FileRuleRepository {
    async fn load_rules(&self) -> Result<RuleSet> {
        let rules = self.cache.get_or_try_init(|| self.read())?;
        debug!(count = rules.len(), source = ?self.source, "rules loaded");
        Ok(rules.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::Path;

    fn write(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn loads_rules_from_file_in_order() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("rules.yaml");
        write(
            &path,
            r#"
prompt_rules:
  - name: second-alphabetically
    rule: Be brief.
    reason: Tokens cost money.
    fix: Remove filler.
  - name: first-alphabetically
    rule: Be specific.
    reason: Vague prompts get vague answers.
    fix: Name the output format.
    badExample: "write stuff"
    goodExample: "write 3 bullet points"
"#,
        );

        let repo = FileRuleRepository::new(&path);
        let rules = futures::executor::block_on(repo.load_rules()).unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules.as_slice()[0].name, "second-alphabetically");
        assert_eq!(rules.as_slice()[1].name, "first-alphabetically");
        assert_eq!(rules.as_slice()[1].bad_example, "write stuff");
    }

    #[test]
    fn missing_file_reports_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("absent.yaml");
        let repo = FileRuleRepository::new(&path);
        let err = futures::executor::block_on(repo.load_rules()).unwrap_err();
        assert!(err.to_string().contains("absent.yaml"));
    }

    #[test]
    fn malformed_yaml_errors() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("broken.yaml");
        write(&path, "prompt_rules:\n  - name: [unclosed\n");
        let repo = FileRuleRepository::new(&path);
        let err = futures::executor::block_on(repo.load_rules()).unwrap_err();
        assert!(err.to_string().contains("invalid YAML"));
    }

    #[test]
    fn cache_survives_file_removal() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("rules.yaml");
        write(
            &path,
            "prompt_rules:\n  - {name: only, rule: r, reason: why, fix: how}\n",
        );
        let repo = FileRuleRepository::new(&path);
        let first = futures::executor::block_on(repo.load_rules()).unwrap();
        fs::remove_file(&path).unwrap();
        let second = futures::executor::block_on(repo.load_rules()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn builtin_repository_loads_embedded_pack() {
        let repo = FileRuleRepository::with_source(RuleSource::Builtin);
        let rules = futures::executor::block_on(repo.load_rules()).unwrap();
        assert!(rules.iter().any(|rule| rule.name == "token-length"));
    }

    fn plain_text() -> impl Strategy<Value = String> {
        proptest::string::string_regex("[A-Za-z0-9][A-Za-z0-9 _\\-]{2,40}").unwrap()
    }

    proptest! {
        #[test]
        fn yaml_rules_round_trip(
            entries in proptest::collection::vec(
                (plain_text(), plain_text(), plain_text(), plain_text()),
                1..10
            )
        ) {
            let temp = tempfile::tempdir().unwrap();
            let mut buffer = String::from("prompt_rules:\n");
            for (idx, (name, rule, reason, fix)) in entries.iter().enumerate() {
                buffer.push_str(&format!(
                    "  - name: \"{idx}-{name}\"\n    rule: \"{rule}\"\n    reason: \"{reason}\"\n    fix: \"{fix}\"\n"
                ));
            }
            let path = temp.path().join("rules.yaml");
            write(&path, &buffer);

            let repo = FileRuleRepository::new(&path);
            let rules = futures::executor::block_on(repo.load_rules())
                .expect("generated rules should parse");

            prop_assert_eq!(rules.len(), entries.len());
            for (idx, rule) in rules.iter().enumerate() {
                let prefix = format!("{idx}-");
                prop_assert!(rule.name.starts_with(&prefix));
            }
        }
    }
}
