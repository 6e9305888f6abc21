//! Heavenly stems, earthly branches and their five-element classification.
//!
//! Both symbol sets are closed enumerations, so every lookup here is total.
//! Index-based construction is the only fallible path and reports an
//! [`CoreError::ArithmeticInvariant`] instead of wrapping around.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> CoreResult<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(CoreError::ArithmeticInvariant { kind: "element", index: index as i64 })
    }

    pub fn name(self) -> &'static str {
        match self {
            Element::Wood => "wood",
            Element::Fire => "fire",
            Element::Earth => "earth",
            Element::Metal => "metal",
            Element::Water => "water",
        }
    }

    pub fn hanja(self) -> &'static str {
        match self {
            Element::Wood => "木",
            Element::Fire => "火",
            Element::Earth => "土",
            Element::Metal => "金",
            Element::Water => "水",
        }
    }

    pub fn hangul(self) -> &'static str {
        match self {
            Element::Wood => "목",
            Element::Fire => "화",
            Element::Earth => "토",
            Element::Metal => "금",
            Element::Water => "수",
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Yang,
    Yin,
}

impl Polarity {
    fn from_parity(index: u8) -> Self {
        if index % 2 == 0 {
            Polarity::Yang
        } else {
            Polarity::Yin
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Polarity::Yang => write!(f, "yang"),
            Polarity::Yin => write!(f, "yin"),
        }
    }
}

/// 천간 (heavenly stems), in cycle order starting at 갑.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stem {
    #[serde(rename = "甲")]
    Gap,
    #[serde(rename = "乙")]
    Eul,
    #[serde(rename = "丙")]
    Byeong,
    #[serde(rename = "丁")]
    Jeong,
    #[serde(rename = "戊")]
    Mu,
    #[serde(rename = "己")]
    Gi,
    #[serde(rename = "庚")]
    Gyeong,
    #[serde(rename = "辛")]
    Sin,
    #[serde(rename = "壬")]
    Im,
    #[serde(rename = "癸")]
    Gye,
}

impl Stem {
    pub const COUNT: usize = 10;

    pub const ALL: [Stem; 10] = [
        Stem::Gap,
        Stem::Eul,
        Stem::Byeong,
        Stem::Jeong,
        Stem::Mu,
        Stem::Gi,
        Stem::Gyeong,
        Stem::Sin,
        Stem::Im,
        Stem::Gye,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: i64) -> CoreResult<Self> {
        if !(0..Self::COUNT as i64).contains(&index) {
            return Err(CoreError::ArithmeticInvariant { kind: "stem", index });
        }
        Ok(Self::ALL[index as usize])
    }

    /// Stems come in yang/yin pairs per element: 갑을 wood, 병정 fire, …
    pub fn element(self) -> Element {
        Element::ALL[self.index() as usize / 2]
    }

    pub fn polarity(self) -> Polarity {
        Polarity::from_parity(self.index())
    }

    pub fn hanja(self) -> &'static str {
        ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"][self.index() as usize]
    }

    pub fn hangul(self) -> &'static str {
        ["갑", "을", "병", "정", "무", "기", "경", "신", "임", "계"][self.index() as usize]
    }
}

impl std::fmt::Display for Stem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hanja())
    }
}

/// 지지 (earthly branches), in cycle order starting at 자.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Branch {
    #[serde(rename = "子")]
    Ja,
    #[serde(rename = "丑")]
    Chuk,
    #[serde(rename = "寅")]
    In,
    #[serde(rename = "卯")]
    Myo,
    #[serde(rename = "辰")]
    Jin,
    #[serde(rename = "巳")]
    Sa,
    #[serde(rename = "午")]
    O,
    #[serde(rename = "未")]
    Mi,
    #[serde(rename = "申")]
    Sin,
    #[serde(rename = "酉")]
    Yu,
    #[serde(rename = "戌")]
    Sul,
    #[serde(rename = "亥")]
    Hae,
}

impl Branch {
    pub const COUNT: usize = 12;

    pub const ALL: [Branch; 12] = [
        Branch::Ja,
        Branch::Chuk,
        Branch::In,
        Branch::Myo,
        Branch::Jin,
        Branch::Sa,
        Branch::O,
        Branch::Mi,
        Branch::Sin,
        Branch::Yu,
        Branch::Sul,
        Branch::Hae,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: i64) -> CoreResult<Self> {
        if !(0..Self::COUNT as i64).contains(&index) {
            return Err(CoreError::ArithmeticInvariant { kind: "branch", index });
        }
        Ok(Self::ALL[index as usize])
    }

    pub fn element(self) -> Element {
        match self {
            Branch::In | Branch::Myo => Element::Wood,
            Branch::Sa | Branch::O => Element::Fire,
            Branch::Jin | Branch::Sul | Branch::Chuk | Branch::Mi => Element::Earth,
            Branch::Sin | Branch::Yu => Element::Metal,
            Branch::Hae | Branch::Ja => Element::Water,
        }
    }

    pub fn polarity(self) -> Polarity {
        Polarity::from_parity(self.index())
    }

    /// Branch whose two-hour window contains `hour`.
    ///
    /// Windows are closed-open and start at 23:00: 자 covers [23:00, 01:00),
    /// 축 covers [01:00, 03:00), and so on.
    pub fn from_hour(hour: u32) -> CoreResult<Self> {
        if hour > 23 {
            return Err(CoreError::ArithmeticInvariant { kind: "hour", index: hour as i64 });
        }
        Self::from_index(((hour as i64 + 1) / 2) % 12)
    }

    /// Start and end hour of the window, end exclusive.
    pub fn hour_window(self) -> (u8, u8) {
        let start = (self.index() * 2 + 23) % 24;
        (start, (start + 2) % 24)
    }

    pub fn hanja(self) -> &'static str {
        ["子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥"][self.index() as usize]
    }

    pub fn hangul(self) -> &'static str {
        ["자", "축", "인", "묘", "진", "사", "오", "미", "신", "유", "술", "해"][self.index() as usize]
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hanja())
    }
}

/// Either kind of chart symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Stem(Stem),
    Branch(Branch),
}

impl From<Stem> for Symbol {
    fn from(stem: Stem) -> Self {
        Symbol::Stem(stem)
    }
}

impl From<Branch> for Symbol {
    fn from(branch: Branch) -> Self {
        Symbol::Branch(branch)
    }
}

pub fn classify(symbol: impl Into<Symbol>) -> (Element, Polarity) {
    match symbol.into() {
        Symbol::Stem(s) => (s.element(), s.polarity()),
        Symbol::Branch(b) => (b.element(), b.polarity()),
    }
}
