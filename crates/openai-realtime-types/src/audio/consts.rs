use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Voice {
    Alloy,
    Echo,
    Shimmer,
    Custom(String),
}

impl Voice {
    pub fn as_str(&self) -> &str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Shimmer => "shimmer",
            Voice::Custom(s) => s,
        }
    }
}

impl Serialize for Voice {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "alloy" => Voice::Alloy,
            "echo" => Voice::Echo,
            "shimmer" => Voice::Shimmer,
            _ => Voice::Custom(s.to_string()),
        })
    }
}

impl<'de> Deserialize<'de> for Voice {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let Ok(voice) = Voice::from_str(&s);
        Ok(voice)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub enum AudioFormat {
    #[serde(rename = "pcm16")]
    Pcm16,
    #[serde(rename = "g711_ulaw")]
    Mulaw,
    #[serde(rename = "g711_alaw")]
    Alaw,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Serialize, serde::Deserialize)]
    struct AudioConsts {
        #[serde(skip_serializing_if = "Option::is_none")]
        voice: Option<Voice>,
        #[serde(skip_serializing_if = "Option::is_none")]
        audio_format: Option<AudioFormat>,
    }

    #[test]
    fn test_serialize() {
        let consts = AudioConsts {
            voice: Some(Voice::Alloy),
            audio_format: Some(AudioFormat::Pcm16),
        };
        let json = serde_json::to_string(&consts).unwrap();
        assert_eq!(json, r#"{"voice":"alloy","audio_format":"pcm16"}"#);

        let consts = AudioConsts {
            voice: Some(Voice::Custom("verse".to_string())),
            audio_format: None,
        };
        let json = serde_json::to_string(&consts).unwrap();
        assert_eq!(json, r#"{"voice":"verse"}"#);
    }

    #[test]
    fn test_deserialize_unknown_voice_is_custom() {
        let consts: AudioConsts = serde_json::from_str(r#"{"voice":"ballad"}"#).unwrap();
        assert_eq!(consts.voice, Some(Voice::Custom("ballad".to_string())));
        assert_eq!(consts.audio_format, None);

        let consts: AudioConsts = serde_json::from_str(r#"{"audio_format":"g711_ulaw"}"#).unwrap();
        assert_eq!(consts.audio_format, Some(AudioFormat::Mulaw));
    }
}
