use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecFrameType {
    CreateContainer,
    Cmd,
    Rslt,
}

/// Framing used by the execution channel riding on the data channel.
/// The negotiation layer moves these as opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecFrame {
    #[serde(rename = "type")]
    pub frame_type: ExecFrameType,
    pub data: String,
}

impl ExecFrame {
    pub fn create_container(image: impl Into<String>) -> Self {
        Self {
            frame_type: ExecFrameType::CreateContainer,
            data: image.into(),
        }
    }

    pub fn cmd(data: impl Into<String>) -> Self {
        Self {
            frame_type: ExecFrameType::Cmd,
            data: data.into(),
        }
    }

    pub fn rslt(data: impl Into<String>) -> Self {
        Self {
            frame_type: ExecFrameType::Rslt,
            data: data.into(),
        }
    }
}
