use std::fmt;

/// Build phase types a file can be moved between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Sources,
    Resources,
}

impl PhaseKind {
    pub fn isa(self) -> &'static str {
        match self {
            Self::Sources => "PBXSourcesBuildPhase",
            Self::Resources => "PBXResourcesBuildPhase",
        }
    }

    pub fn from_isa(isa: &str) -> Option<Self> {
        match isa {
            "PBXSourcesBuildPhase" => Some(Self::Sources),
            "PBXResourcesBuildPhase" => Some(Self::Resources),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Sources => "Sources",
            Self::Resources => "Resources",
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
