use crate::error::LabelError;
use std::fmt;
use std::str::FromStr;

/// A `major.minor.build.revision` tag where every part fits in an `i16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FourPartVersion {
    pub major: i16,
    pub minor: i16,
    pub build: i16,
    pub revision: i16,
}

fn not_four_part(tag: &str) -> LabelError {
    LabelError::InvalidArgument(format!(
        "Tag '{}' is not a four part version (major.minor.build.revision)",
        tag
    ))
}

impl FromStr for FourPartVersion {
    type Err = LabelError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let parts = tag
            .split('.')
            .map(|p| p.parse::<i16>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| not_four_part(tag))?;

        match parts.as_slice() {
            [major, minor, build, revision] => Ok(Self {
                major: *major,
                minor: *minor,
                build: *build,
                revision: *revision,
            }),
            _ => Err(not_four_part(tag)),
        }
    }
}

impl FourPartVersion {
    pub fn bump_revision(self) -> Option<Self> {
        Some(Self {
            revision: self.revision.checked_add(1)?,
            ..self
        })
    }

    pub fn bump_build(self) -> Option<Self> {
        Some(Self {
            build: self.build.checked_add(1)?,
            revision: 0,
            ..self
        })
    }
}

impl fmt::Display for FourPartVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}
