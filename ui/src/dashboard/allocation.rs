//! Profile selection and the geometry of the allocation visuals.

use crate::snapshot::model::{AllocationVector, MultiFundData};

/// Radius of the profile donut in SVG user units.
pub const DONUT_RADIUS: f64 = 40.0;

/// Circumference of a donut ring with the given radius.
pub fn circumference(radius: f64) -> f64 {
    2.0 * std::f64::consts::PI * radius
}

/// The four funds, in the order the visuals draw them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fund {
    PeaF,
    PeaE,
    PeaG,
    PeaP,
}

impl Fund {
    pub const ALL: [Fund; 4] = [Fund::PeaF, Fund::PeaE, Fund::PeaG, Fund::PeaP];

    /// Identifier used in the published document.
    pub fn code(self) -> &'static str {
        match self {
            Fund::PeaF => "PEA-F",
            Fund::PeaE => "PEA-E",
            Fund::PeaG => "PEA-G",
            Fund::PeaP => "PEA-P",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Fund::PeaF => "#f472b6",
            Fund::PeaE => "#22d3ee",
            Fund::PeaG => "#a78bfa",
            Fund::PeaP => "#fb923c",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Fund::PeaF => "🛡️",
            Fund::PeaE => "🇹🇭",
            Fund::PeaG => "🌍",
            Fund::PeaP => "🏢",
        }
    }

    pub fn name(self) -> String {
        match self {
            Fund::PeaF => crate::t!("fund-pea-f"),
            Fund::PeaE => crate::t!("fund-pea-e"),
            Fund::PeaG => crate::t!("fund-pea-g"),
            Fund::PeaP => crate::t!("fund-pea-p"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Profile {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl Profile {
    pub const ALL: [Profile; 3] = [Profile::Conservative, Profile::Moderate, Profile::Aggressive];

    /// Key of the profile in the published document.
    pub fn key(self) -> &'static str {
        match self {
            Profile::Conservative => "conservative",
            Profile::Moderate => "moderate",
            Profile::Aggressive => "aggressive",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Profile::Conservative => "🛡️",
            Profile::Moderate => "⚖️",
            Profile::Aggressive => "🚀",
        }
    }

    pub fn name(self) -> String {
        match self {
            Profile::Conservative => crate::t!("profile-conservative"),
            Profile::Moderate => crate::t!("profile-moderate"),
            Profile::Aggressive => crate::t!("profile-aggressive"),
        }
    }

    pub fn description(self) -> String {
        match self {
            Profile::Conservative => crate::t!("profile-conservative-description"),
            Profile::Moderate => crate::t!("profile-moderate-description"),
            Profile::Aggressive => crate::t!("profile-aggressive-description"),
        }
    }
}

/// One horizontal bar; `width_pct` is the CSS width in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FundBar {
    pub fund: Fund,
    pub percentage: f64,
    pub width_pct: f64,
}

/// One donut segment drawn with `stroke-dasharray`/`stroke-dashoffset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FundArc {
    pub fund: Fund,
    pub percentage: f64,
    /// Sum of the percentages drawn before this segment.
    pub start_pct: f64,
    pub length: f64,
    pub offset: f64,
    pub circumference: f64,
}

impl FundArc {
    pub fn dash_array(&self) -> String {
        dash_array(self.length, self.circumference)
    }

    pub fn dash_offset(&self) -> String {
        dash_offset(self.offset)
    }
}

fn dash_array(length: f64, circumference: f64) -> String {
    format!("{length:.3} {circumference:.3}")
}

fn dash_offset(offset: f64) -> String {
    format!("{:.3}", -offset)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendEntry {
    pub fund: Fund,
    pub percentage: f64,
}

/// Holds the three profile vectors and which one is on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationProfileEngine {
    data: MultiFundData,
    selected: Profile,
}

impl AllocationProfileEngine {
    pub fn new(data: MultiFundData) -> Self {
        Self::with_selection(data, Profile::default())
    }

    pub fn with_selection(data: MultiFundData, selected: Profile) -> Self {
        Self { data, selected }
    }

    pub fn select(&mut self, profile: Profile) {
        self.selected = profile;
    }

    pub fn selected(&self) -> Profile {
        self.selected
    }

    pub fn data(&self) -> &MultiFundData {
        &self.data
    }

    pub fn current_vector(&self) -> &AllocationVector {
        self.data.vector(self.selected)
    }

    pub fn bars(&self) -> Vec<FundBar> {
        let vector = self.current_vector();
        Fund::ALL
            .iter()
            .map(|fund| {
                let percentage = vector.get(*fund);
                FundBar {
                    fund: *fund,
                    percentage,
                    width_pct: percentage.clamp(0.0, 100.0),
                }
            })
            .collect()
    }

    /// Donut segments in declared fund order, each starting where the
    /// previous one ended.
    pub fn arcs(&self, circumference: f64) -> Vec<FundArc> {
        let vector = self.current_vector();
        let mut start_pct = 0.0;
        Fund::ALL
            .iter()
            .map(|fund| {
                let percentage = vector.get(*fund);
                let arc = FundArc {
                    fund: *fund,
                    percentage,
                    start_pct,
                    length: percentage / 100.0 * circumference,
                    offset: start_pct / 100.0 * circumference,
                    circumference,
                };
                start_pct += percentage;
                arc
            })
            .collect()
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        let vector = self.current_vector();
        Fund::ALL
            .iter()
            .map(|fund| LegendEntry {
                fund: *fund,
                percentage: vector.get(*fund),
            })
            .collect()
    }
}

/// Equity/bond donut for snapshots published without per-profile data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoFundSplit {
    pub equity_pct: f64,
    pub bond_pct: f64,
}

impl TwoFundSplit {
    pub const DEFAULT_EQUITY_PCT: f64 = 50.0;

    pub fn from_recommendation(recommended: Option<f64>) -> Self {
        let equity_pct = recommended
            .unwrap_or(Self::DEFAULT_EQUITY_PCT)
            .clamp(0.0, 100.0);
        Self {
            equity_pct,
            bond_pct: 100.0 - equity_pct,
        }
    }

    /// `(equity, bond)` segments; the bond arc starts where equity ends.
    pub fn arcs(&self, circumference: f64) -> [FundArc; 2] {
        let equity_len = self.equity_pct / 100.0 * circumference;
        [
            FundArc {
                fund: Fund::PeaE,
                percentage: self.equity_pct,
                start_pct: 0.0,
                length: equity_len,
                offset: 0.0,
                circumference,
            },
            FundArc {
                fund: Fund::PeaF,
                percentage: self.bond_pct,
                start_pct: self.equity_pct,
                length: self.bond_pct / 100.0 * circumference,
                offset: equity_len,
                circumference,
            },
        ]
    }
}
