//! 말투 프리셋과 별점 매핑

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// 리뷰 말투 (고정 4종)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Friendly,
    Professional,
    Simple,
    Emotional,
}

impl Tone {
    pub const ALL: [Tone; 4] = [
        Tone::Friendly,
        Tone::Professional,
        Tone::Simple,
        Tone::Emotional,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Tone::Friendly => "friendly",
            Tone::Professional => "professional",
            Tone::Simple => "simple",
            Tone::Emotional => "emotional",
        }
    }

    /// 화면 표시용 이름
    pub fn label(&self) -> &'static str {
        match self {
            Tone::Friendly => "친근한 말투",
            Tone::Professional => "전문적인 말투",
            Tone::Simple => "간단한 말투",
            Tone::Emotional => "감성적인 말투",
        }
    }

    /// 생성 프롬프트에 넣는 지시문
    pub fn instruction(&self) -> &'static str {
        match self {
            Tone::Friendly => {
                "친근하고 활발한 말투로 작성해주세요. 이모티콘이나 감탄사를 적절히 사용하세요."
            }
            Tone::Professional => {
                "정중하고 객관적인 말투로 작성해주세요. 전문적이고 신뢰감 있는 표현을 사용하세요."
            }
            Tone::Simple => "간단명료한 말투로 작성해주세요. 핵심만 담아 짧고 명확하게 표현하세요.",
            Tone::Emotional => {
                "감성적이고 따뜻한 말투로 작성해주세요. 개인적인 감정과 추억을 담아 표현하세요."
            }
        }
    }
}

impl FromStr for Tone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "friendly" => Ok(Tone::Friendly),
            "professional" => Ok(Tone::Professional),
            "simple" => Ok(Tone::Simple),
            "emotional" => Ok(Tone::Emotional),
            _ => Err(Error::UnknownTone(s.to_string())),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// 1~5 별점
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidRating(i64::from(value)))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn satisfaction_level(&self) -> &'static str {
        satisfaction_level(self.0)
    }

    pub fn stars(&self) -> String {
        let filled = usize::from(self.0);
        format!("{}{}", "★".repeat(filled), "☆".repeat(usize::from(Self::MAX) - filled))
    }
}

impl TryFrom<u8> for Rating {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 별점을 만족도 문구로 변환
///
/// 범위 밖의 값은 "보통"으로 취급한다.
pub fn satisfaction_level(rating: u8) -> &'static str {
    match rating {
        1 => "매우 불만족 (1점)",
        2 => "불만족 (2점)",
        3 => "보통 (3점)",
        4 => "만족 (4점)",
        5 => "매우 만족 (5점)",
        _ => "보통",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_satisfaction_level_is_injective() {
        let phrases: HashSet<&str> = (1..=5).map(satisfaction_level).collect();
        assert_eq!(phrases.len(), 5);
    }

    #[test]
    fn test_satisfaction_level_is_stable() {
        for r in 1..=5u8 {
            assert_eq!(satisfaction_level(r), satisfaction_level(r));
            assert_eq!(Rating::new(r).unwrap().satisfaction_level(), satisfaction_level(r));
        }
        assert_eq!(satisfaction_level(4), "만족 (4점)");
    }

    #[test]
    fn test_satisfaction_level_out_of_range() {
        assert_eq!(satisfaction_level(0), "보통");
        assert_eq!(satisfaction_level(9), "보통");
    }

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert_eq!(Rating::new(5).unwrap().value(), 5);
    }

    #[test]
    fn test_rating_serde() {
        let rating: Rating = serde_json::from_str("3").unwrap();
        assert_eq!(rating.value(), 3);
        assert_eq!(serde_json::to_string(&rating).unwrap(), "3");
        assert!(serde_json::from_str::<Rating>("8").is_err());
    }

    #[test]
    fn test_rating_stars() {
        assert_eq!(Rating::new(2).unwrap().stars(), "★★☆☆☆");
    }

    #[test]
    fn test_tone_parse() {
        assert_eq!("simple".parse::<Tone>().unwrap(), Tone::Simple);
        assert_eq!(" Friendly ".parse::<Tone>().unwrap(), Tone::Friendly);
        assert!("casual".parse::<Tone>().is_err());
    }

    #[test]
    fn test_tone_instructions_distinct() {
        let instructions: HashSet<&str> = Tone::ALL.iter().map(|t| t.instruction()).collect();
        assert_eq!(instructions.len(), Tone::ALL.len());
    }

    #[test]
    fn test_tone_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Tone::Emotional).unwrap(), "\"emotional\"");
    }
}
