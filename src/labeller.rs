//! Turns `git describe` output into a build label.
//!
//! Describe output has the shape `<tag>[-<count>-g<hash>]`. The tag (minus an
//! optional prefix) is combined with the number of commits since the tag
//! according to the configured `commitCountAction`:
//!
//! * `concatenate`: `1.2.3` with 5 commits becomes `1.2.3.5`
//! * `replace`: the last dotted segment is replaced, `1.2.3` becomes `1.2.5`
//! * `ignore`: the tag is used as is, unless `autoIncrement` asks for the
//!   build or revision part of a four part version to be bumped

use crate::config::Settings;
use crate::error::LabelError;
use crate::exec::CommandExecutor;
use crate::integration::IntegrationResult;
use crate::version::FourPartVersion;
use serde::Serialize;
use std::future::Future;
use std::str::FromStr;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitCountAction {
    Concatenate,
    Replace,
    Ignore,
}

impl FromStr for CommitCountAction {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "concatenate" => Ok(Self::Concatenate),
            "replace" => Ok(Self::Replace),
            "ignore" => Ok(Self::Ignore),
            _ => Err(LabelError::InvalidArgument(format!(
                "Invalid commitCountAction: {}",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoIncrement {
    None,
    Build,
    Revision,
}

impl FromStr for AutoIncrement {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "build" => Ok(Self::Build),
            "revision" => Ok(Self::Revision),
            _ => Err(LabelError::InvalidArgument(format!(
                "Invalid autoIncrement: {}",
                s
            ))),
        }
    }
}

/// Describe output split into the tag and the raw commit count segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor<'a> {
    pub tag_name: &'a str,
    pub commit_count: Option<&'a str>,
}

impl<'a> Descriptor<'a> {
    pub fn parse(describe: &'a str, skip_prefix: &str) -> Self {
        let mut segments = describe.split('-');
        let raw_tag = segments.next().unwrap_or_default();
        let commit_count = segments.next();

        Self {
            tag_name: raw_tag.strip_prefix(skip_prefix).unwrap_or(raw_tag),
            commit_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub label: String,
    pub tag: String,
    pub commit_count: Option<u32>,
    pub describe: String,
}

/// Builds the label for one describe result. `None` or blank output means no
/// tag is reachable from HEAD.
pub fn format_label(settings: &Settings, describe: Option<&str>) -> Result<Label, LabelError> {
    let describe = describe
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(LabelError::NoTagFound)?;

    let descriptor = Descriptor::parse(describe, &settings.skip_prefix);
    let tag = descriptor.tag_name.to_string();
    debug!(tag = %tag, commit_count = ?descriptor.commit_count, "Parsed describe output");

    let ignore_without_increment = settings.commit_count_action.eq_ignore_ascii_case("ignore")
        && settings.auto_increment.eq_ignore_ascii_case("none");

    let count_text = match descriptor.commit_count {
        Some(count) if !ignore_without_increment => count,
        _ => {
            return Ok(Label {
                label: tag.clone(),
                tag,
                commit_count: descriptor.commit_count.and_then(|c| c.parse().ok()),
                describe: describe.to_string(),
            })
        }
    };

    let commit_count: u32 =
        count_text
            .parse()
            .map_err(|_| LabelError::InvalidDescribeOutput {
                output: describe.to_string(),
            })?;
    let count = i64::from(commit_count) + i64::from(settings.commit_count_offset);

    let label = match settings.commit_count_action.parse::<CommitCountAction>()? {
        CommitCountAction::Concatenate => format!("{}.{}", tag, count),
        CommitCountAction::Ignore => auto_increment(&tag, &settings.auto_increment)?,
        CommitCountAction::Replace => match tag.rfind('.') {
            Some(i) => format!("{}{}", &tag[..=i], count),
            None => format!("{}.{}", tag, count),
        },
    };

    Ok(Label {
        label,
        tag,
        commit_count: Some(commit_count),
        describe: describe.to_string(),
    })
}

fn auto_increment(tag: &str, mode: &str) -> Result<String, LabelError> {
    let version: FourPartVersion = tag.parse()?;

    let bumped = match mode.parse::<AutoIncrement>()? {
        AutoIncrement::Revision => version.bump_revision(),
        AutoIncrement::Build => version.bump_build(),
        AutoIncrement::None => {
            return Err(LabelError::InvalidArgument(format!(
                "Invalid autoIncrement: {}",
                mode
            )))
        }
    };

    bumped.map(|v| v.to_string()).ok_or_else(|| {
        LabelError::InvalidArgument(format!(
            "Cannot auto increment {} of tag '{}' without overflow",
            mode, tag
        ))
    })
}

/// Something that can produce a label for an integration cycle.
pub trait Labeller: Sync {
    fn generate(
        &self,
        result: &IntegrationResult,
    ) -> impl Future<Output = Result<Label, LabelError>> + Send;

    /// Generates a label and stores it on the integration result.
    fn run(
        &self,
        result: &mut IntegrationResult,
    ) -> impl Future<Output = Result<Label, LabelError>> + Send {
        async move {
            let label = self.generate(result).await?;
            result.label = Some(label.label.clone());
            Ok(label)
        }
    }
}

pub struct GitTagLabeller<E> {
    settings: Settings,
    executor: E,
}

impl<E: CommandExecutor> GitTagLabeller<E> {
    pub fn new(settings: Settings, executor: E) -> Self {
        Self { settings, executor }
    }
}

impl<E: CommandExecutor + Sync> Labeller for GitTagLabeller<E> {
    async fn generate(&self, result: &IntegrationResult) -> Result<Label, LabelError> {
        let settings = &self.settings;
        let working_dir = result.base_from_working_directory(&settings.working_directory);

        if !settings.branch.is_empty() {
            info!("Checking out branch {}", settings.branch);
            self.executor
                .execute(
                    &settings.executable,
                    &["checkout", "-f", "-q", &settings.branch],
                    &working_dir,
                )
                .await?;
        }

        let output = self
            .executor
            .execute(&settings.executable, &["describe"], &working_dir)
            .await?;

        let label = format_label(settings, Some(&output.stdout))?;
        info!("Generated label {} from '{}'", label.label, label.describe);
        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandError;
    use crate::exec::CommandOutput;
    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    fn settings(action: &str) -> Settings {
        Settings::new("repo", action)
    }

    fn label(settings: &Settings, describe: &str) -> Result<String, LabelError> {
        format_label(settings, Some(describe)).map(|l| l.label)
    }

    #[test]
    fn test_descriptor_parse() {
        let d = Descriptor::parse("v1.2.3-5-gabc123", "v");
        assert_eq!(d.tag_name, "1.2.3");
        assert_eq!(d.commit_count, Some("5"));

        let d = Descriptor::parse("v1.2.3", "");
        assert_eq!(d.tag_name, "v1.2.3");
        assert_eq!(d.commit_count, None);

        // Prefix only stripped when present
        let d = Descriptor::parse("1.2.3-1-gabc", "release");
        assert_eq!(d.tag_name, "1.2.3");
    }

    #[test]
    fn test_no_commits_ahead_returns_tag_for_every_policy() {
        for action in ["concatenate", "replace", "ignore", "frobnicate"] {
            let mut s = settings(action);
            s.skip_prefix = "v".to_string();
            s.commit_count_offset = 10;
            s.auto_increment = "revision".to_string();
            assert_eq!(label(&s, "v1.2.3").unwrap(), "1.2.3", "{}", action);
        }
    }

    #[test]
    fn test_concatenate() {
        let mut s = settings("concatenate");
        s.skip_prefix = "v".to_string();
        assert_eq!(label(&s, "v1.2.3-5-gabc123").unwrap(), "1.2.3.5");
    }

    #[test]
    fn test_concatenate_is_case_insensitive() {
        let s = settings("Concatenate");
        assert_eq!(label(&s, "1.0-2-gabc").unwrap(), "1.0.2");
    }

    #[test]
    fn test_replace_with_offset() {
        let mut s = settings("replace");
        s.commit_count_offset = 2;
        assert_eq!(label(&s, "1.2.3-5-gabc123").unwrap(), "1.2.7");
    }

    #[test]
    fn test_replace_without_dot_appends() {
        let mut s = settings("REPLACE");
        s.skip_prefix = "v".to_string();
        assert_eq!(label(&s, "v5-3-gabc").unwrap(), "5.3");
    }

    #[test]
    fn test_negative_offset_is_not_clamped() {
        let mut s = settings("concatenate");
        s.commit_count_offset = -10;
        assert_eq!(label(&s, "1.2-3-gabc").unwrap(), "1.2.-7");
    }

    #[test]
    fn test_ignore_with_revision_increment() {
        let mut s = settings("ignore");
        s.auto_increment = "revision".to_string();
        assert_eq!(label(&s, "1.2.3.4-7-gabc").unwrap(), "1.2.3.5");
    }

    #[test]
    fn test_ignore_with_build_increment() {
        let mut s = settings("ignore");
        s.auto_increment = "build".to_string();
        assert_eq!(label(&s, "1.2.3.4-7-gabc").unwrap(), "1.2.4.0");
    }

    #[test]
    fn test_ignore_without_increment_returns_tag() {
        let s = settings("ignore");
        assert_eq!(label(&s, "1.2.3.4-7-gabc").unwrap(), "1.2.3.4");
        // The count segment is never parsed in this case
        assert_eq!(label(&s, "1.2.3.4-x-gabc").unwrap(), "1.2.3.4");
    }

    #[test]
    fn test_malformed_count() {
        let mut s = settings("concatenate");
        s.skip_prefix = "v".to_string();
        match format_label(&s, Some("v1.0-x-gabc")) {
            Err(LabelError::InvalidDescribeOutput { output }) => assert_eq!(output, "v1.0-x-gabc"),
            other => panic!("Expected InvalidDescribeOutput, got {:?}", other),
        }
    }

    #[test]
    fn test_auto_increment_requires_four_parts() {
        let mut s = settings("ignore");
        s.auto_increment = "build".to_string();
        match format_label(&s, Some("1.2.3-4-gabc")) {
            Err(LabelError::InvalidArgument(msg)) => assert!(msg.contains("'1.2.3'"), "{}", msg),
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_auto_increment() {
        let mut s = settings("ignore");
        s.auto_increment = "major".to_string();
        match format_label(&s, Some("1.2.3.4-4-gabc")) {
            Err(LabelError::InvalidArgument(msg)) => assert!(msg.contains("major"), "{}", msg),
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn test_auto_increment_overflow() {
        let mut s = settings("ignore");
        s.auto_increment = "revision".to_string();
        assert!(matches!(
            format_label(&s, Some("1.2.3.32767-1-gabc")),
            Err(LabelError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_absent_output_is_no_tag() {
        let s = settings("concatenate");
        assert!(matches!(format_label(&s, None), Err(LabelError::NoTagFound)));
        assert!(matches!(
            format_label(&s, Some("  \n")),
            Err(LabelError::NoTagFound)
        ));
    }

    #[test]
    fn test_unknown_action() {
        let s = settings("frobnicate");
        match format_label(&s, Some("1.2.3-5-gabc")) {
            Err(LabelError::InvalidArgument(msg)) => assert!(msg.contains("frobnicate"), "{}", msg),
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn test_label_details() {
        let mut s = settings("concatenate");
        s.skip_prefix = "v".to_string();
        s.commit_count_offset = 100;
        let l = format_label(&s, Some("v2.0-3-g1234567\n")).unwrap();
        assert_eq!(
            l,
            Label {
                label: "2.0.103".to_string(),
                tag: "2.0".to_string(),
                commit_count: Some(3),
                describe: "v2.0-3-g1234567".to_string(),
            }
        );
    }

    type Call = (String, Vec<String>, PathBuf);

    #[derive(Default)]
    struct FakeExecutor {
        responses: Mutex<VecDeque<Result<CommandOutput, CommandError>>>,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeExecutor {
        fn with(responses: Vec<Result<CommandOutput, CommandError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::default(),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandExecutor for FakeExecutor {
        fn execute(
            &self,
            executable: &str,
            args: &[&str],
            working_dir: &Path,
        ) -> impl Future<Output = Result<CommandOutput, CommandError>> + Send {
            self.calls.lock().unwrap().push((
                executable.to_string(),
                args.iter().map(|a| a.to_string()).collect(),
                working_dir.to_path_buf(),
            ));
            let response = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected command");
            std::future::ready(response)
        }
    }

    fn stdout(s: &str) -> Result<CommandOutput, CommandError> {
        Ok(CommandOutput {
            stdout: s.to_string(),
        })
    }

    #[tokio::test]
    async fn test_run_describes_in_resolved_directory() {
        let executor = FakeExecutor::with(vec![stdout("v1.4-2-gdeadbee\n")]);
        let mut s = settings("concatenate");
        s.skip_prefix = "v".to_string();
        s.executable = "/usr/bin/git".to_string();
        let labeller = GitTagLabeller::new(s, executor);

        let mut result = IntegrationResult::new("/ci/work");
        let label = labeller.run(&mut result).await.unwrap();

        assert_eq!(label.commit_count, Some(2));
        assert_eq!(result.label.as_deref(), Some("1.4.2"));
        assert_eq!(
            labeller.executor.calls(),
            vec![(
                "/usr/bin/git".to_string(),
                vec!["describe".to_string()],
                PathBuf::from("/ci/work/repo")
            )]
        );
    }

    #[tokio::test]
    async fn test_branch_checkout_precedes_describe() {
        let executor = FakeExecutor::with(vec![stdout(""), stdout("1.0-1-gabc")]);
        let mut s = settings("replace");
        s.branch = "release".to_string();
        let labeller = GitTagLabeller::new(s, executor);

        let label = labeller
            .generate(&IntegrationResult::new("/ci"))
            .await
            .unwrap();
        assert_eq!(label.label, "1.1");

        let args: Vec<Vec<String>> = labeller
            .executor
            .calls()
            .into_iter()
            .map(|(_, args, _)| args)
            .collect();
        assert_eq!(
            args,
            vec![
                vec!["checkout", "-f", "-q", "release"]
                    .into_iter()
                    .map(String::from)
                    .collect::<Vec<_>>(),
                vec!["describe".to_string()],
            ]
        );
    }

    #[tokio::test]
    async fn test_checkout_failure_propagates_without_describe() {
        let executor = FakeExecutor::with(vec![Err(CommandError::Failed {
            executable: "git".to_string(),
            args: "checkout -f -q missing".to_string(),
            code: "exit status: 1".to_string(),
            stderr: "error: pathspec 'missing' did not match".to_string(),
        })]);
        let mut s = settings("concatenate");
        s.branch = "missing".to_string();
        let labeller = GitTagLabeller::new(s, executor);

        let mut result = IntegrationResult::new("/ci");
        let err = labeller.run(&mut result).await.unwrap_err();

        assert!(matches!(err, LabelError::Command(CommandError::Failed { .. })));
        assert_eq!(labeller.executor.calls().len(), 1);
        assert!(result.label.is_none());
    }

    #[tokio::test]
    async fn test_empty_describe_is_no_tag() {
        let labeller = GitTagLabeller::new(settings("concatenate"), FakeExecutor::with(vec![stdout("")]));
        let mut result = IntegrationResult::new("/ci");
        assert!(matches!(
            labeller.run(&mut result).await,
            Err(LabelError::NoTagFound)
        ));
        assert!(result.label.is_none());
    }
}
