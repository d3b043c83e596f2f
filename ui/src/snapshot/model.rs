//! Typed view of the published `prediction.json` document.
//!
//! Every section the producer may omit is an `Option`, so consumers are forced
//! to check presence before reading. Unknown fields are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::LoadError;
use crate::dashboard::allocation::{Fund, Profile};

/// Tolerance on the 100% sum of an allocation vector (producer rounds per fund).
pub const ALLOCATION_SUM_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub updated_at: String,
    #[serde(default)]
    pub updated_timestamp: Option<String>,
    #[serde(default)]
    pub prediction: Option<Prediction>,
    #[serde(default)]
    pub backtest: Option<Backtest>,
    #[serde(default)]
    pub model_info: ModelInfo,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(rename = "type", default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub last_trained: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketLabel {
    Bullish,
    Bearish,
    Neutral,
}

impl MarketLabel {
    pub fn is_bullish(self) -> bool {
        matches!(self, MarketLabel::Bullish)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "prediction")]
    pub label: MarketLabel,
    pub probability: f64,
    #[serde(default)]
    pub recommended_allocation: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub trend: Option<TrendInfo>,
    #[serde(default)]
    pub multi_fund: Option<MultiFundData>,
    #[serde(default)]
    pub ml_features: Option<MlFeatures>,
    #[serde(default)]
    pub ml_details: Option<MlDetails>,
    #[serde(default)]
    pub top_features: Vec<TopFeature>,
}

impl Prediction {
    /// Confidence as a whole percentage.
    pub fn confidence_pct(&self) -> f64 {
        (self.probability * 100.0).round()
    }

    /// First glyph of the weather string (`"☀️ Sunny"` -> `"☀️"`).
    pub fn weather_icon(&self) -> Option<&str> {
        self.weather
            .as_deref()
            .and_then(|weather| weather.split(' ').next())
            .filter(|icon| !icon.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendInfo {
    #[serde(default)]
    pub trend: Option<String>,
    #[serde(default)]
    pub trend_icon: Option<String>,
    #[serde(default)]
    pub trend_score: f64,
    #[serde(default)]
    pub momentum: Momentum,
    #[serde(default)]
    pub comparison: Option<Comparison>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Momentum {
    #[serde(rename = "1m", default)]
    pub one_month: f64,
    #[serde(rename = "3m", default)]
    pub three_months: f64,
    #[serde(rename = "6m", default)]
    pub six_months: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub recommendation: String,
    #[serde(default)]
    pub reason: String,
}

impl Comparison {
    /// The producer recommends either the equity fund or the bond fund.
    pub fn favours_equity(&self) -> bool {
        self.recommendation.contains(Fund::PeaE.code())
    }
}

/// Percentages for the four funds, keyed by their published identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationVector {
    #[serde(rename = "PEA-F")]
    pub pea_f: f64,
    #[serde(rename = "PEA-E")]
    pub pea_e: f64,
    #[serde(rename = "PEA-G")]
    pub pea_g: f64,
    #[serde(rename = "PEA-P")]
    pub pea_p: f64,
}

impl AllocationVector {
    pub fn new(pea_f: f64, pea_e: f64, pea_g: f64, pea_p: f64) -> Self {
        Self {
            pea_f,
            pea_e,
            pea_g,
            pea_p,
        }
    }

    pub fn get(&self, fund: Fund) -> f64 {
        match fund {
            Fund::PeaF => self.pea_f,
            Fund::PeaE => self.pea_e,
            Fund::PeaG => self.pea_g,
            Fund::PeaP => self.pea_p,
        }
    }

    pub fn total(&self) -> f64 {
        Fund::ALL.iter().map(|fund| self.get(*fund)).sum()
    }

    pub fn validate(&self, profile: Profile) -> Result<(), LoadError> {
        for fund in Fund::ALL {
            let pct = self.get(fund);
            if !(0.0..=100.0).contains(&pct) {
                return Err(LoadError::Parse(format!(
                    "{} allocation for {} is {pct}, outside 0..=100",
                    profile.key(),
                    fund.code()
                )));
            }
        }
        let total = self.total();
        if (total - 100.0).abs() > ALLOCATION_SUM_TOLERANCE {
            return Err(LoadError::Parse(format!(
                "{} allocation sums to {total}, expected 100",
                profile.key()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiFundData {
    pub conservative: AllocationVector,
    pub moderate: AllocationVector,
    pub aggressive: AllocationVector,
    #[serde(default)]
    pub market_data: Option<serde_json::Value>,
}

impl MultiFundData {
    pub fn vector(&self, profile: Profile) -> &AllocationVector {
        match profile {
            Profile::Conservative => &self.conservative,
            Profile::Moderate => &self.moderate,
            Profile::Aggressive => &self.aggressive,
        }
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        Profile::ALL
            .iter()
            .try_for_each(|profile| self.vector(*profile).validate(*profile))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MlFeatures {
    #[serde(rename = "Return_1m", default)]
    pub return_1m: f64,
    #[serde(rename = "Return_3m", default)]
    pub return_3m: f64,
    #[serde(rename = "RSI_6", default)]
    pub rsi_6: f64,
    #[serde(rename = "Price_SMA6_Ratio", default)]
    pub price_sma6_ratio: f64,
    #[serde(rename = "Volatility_3m", default)]
    pub volatility_3m: f64,
    #[serde(default)]
    pub drawdown: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlDetails {
    #[serde(default)]
    pub individual_models: BTreeMap<String, ModelVote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelVote {
    pub prediction: f64,
    pub confidence: f64,
}

impl ModelVote {
    pub fn is_bullish(&self) -> bool {
        self.prediction >= 0.5
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopFeature {
    pub name: String,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backtest {
    #[serde(default)]
    pub period: Option<BacktestPeriod>,
    pub returns: BacktestReturns,
    pub metrics: BacktestMetrics,
    #[serde(default)]
    pub history: Option<Vec<HistoryPoint>>,
}

impl Backtest {
    /// Non-empty history, if any. An empty list is treated like an absent one.
    pub fn history(&self) -> Option<&[HistoryPoint]> {
        self.history
            .as_deref()
            .filter(|history| !history.is_empty())
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        let Some(history) = self.history() else {
            return Ok(());
        };
        match history
            .windows(2)
            .position(|pair| pair[1].date < pair[0].date)
        {
            Some(index) => Err(LoadError::Parse(format!(
                "backtest history out of order at {} -> {}",
                history[index].date,
                history[index + 1].date
            ))),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestPeriod {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub months: Option<u32>,
    #[serde(default)]
    pub total_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReturns {
    pub strategy_return_pct: f64,
    pub buy_hold_return_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outperformance_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excess_return_pct: Option<f64>,
}

impl BacktestReturns {
    /// Older producers called this `excess_return_pct`; both name the same metric.
    pub fn outperformance_pct(&self) -> f64 {
        self.outperformance_pct
            .or(self.excess_return_pct)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestMetrics {
    pub win_rate_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown_pct: f64,
    #[serde(default)]
    pub total_trades: Option<u32>,
    #[serde(default)]
    pub correct_trades: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: String,
    #[serde(rename = "allocation")]
    pub allocation_pct: f64,
    #[serde(rename = "correct")]
    pub predicted_correct: bool,
    pub strategy_value: f64,
    #[serde(rename = "buyhold_value")]
    pub buy_hold_value: f64,
    pub bond_value: f64,
}

impl Snapshot {
    /// Structural checks serde cannot express.
    pub fn validate(&self) -> Result<(), LoadError> {
        if let Some(prediction) = &self.prediction {
            if !(0.0..=1.0).contains(&prediction.probability) {
                return Err(LoadError::Parse(format!(
                    "probability {} outside 0..=1",
                    prediction.probability
                )));
            }
            if let Some(allocation) = prediction.recommended_allocation {
                if !(0.0..=100.0).contains(&allocation) {
                    return Err(LoadError::Parse(format!(
                        "recommended allocation {allocation} outside 0..=100"
                    )));
                }
            }
            if let Some(multi_fund) = &prediction.multi_fund {
                multi_fund.validate()?;
            }
        }
        if let Some(backtest) = &self.backtest {
            backtest.validate()?;
        }
        Ok(())
    }

    /// Timestamp used for age and display: the machine-readable one when present.
    pub fn timestamp_source(&self) -> &str {
        self.updated_timestamp
            .as_deref()
            .filter(|ts| !ts.trim().is_empty())
            .unwrap_or(&self.updated_at)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    pub fn document() -> Value {
        json!({
            "updated_at": "2026-10-18 09:00:00",
            "updated_timestamp": "2026-10-18T09:00:00.123456",
            "prediction": {
                "ticker": "^SET50",
                "date": "2026-10",
                "prediction": "Bullish",
                "probability": 0.68,
                "recommended_allocation": 70,
                "weather": "☀️ Sunny",
                "action": "Hold equity",
                "trend": {
                    "trend": "Uptrend",
                    "trend_icon": "📈",
                    "trend_score": 72,
                    "momentum": { "1m": 1.2, "3m": 4.5, "6m": -0.8 },
                    "comparison": { "recommendation": "PEA-E", "reason": "Momentum positive" }
                },
                "multi_fund": {
                    "conservative": { "PEA-F": 50, "PEA-E": 25, "PEA-G": 15, "PEA-P": 10 },
                    "moderate": { "PEA-F": 30, "PEA-E": 40, "PEA-G": 20, "PEA-P": 10 },
                    "aggressive": { "PEA-F": 10, "PEA-E": 50, "PEA-G": 30, "PEA-P": 10 },
                    "market_data": { "PEA-E": { "return_3m": 4.5 } }
                },
                "ml_features": {
                    "Return_1m": 1.2, "Return_3m": 4.5, "RSI_6": 61.0,
                    "Price_SMA6_Ratio": 2.1, "Volatility_3m": 3.3, "Drawdown": -4.0
                },
                "ml_details": {
                    "individual_models": {
                        "xgb": { "prediction": 1, "confidence": 0.71 },
                        "rf": { "prediction": 0, "confidence": 0.55 }
                    }
                }
            },
            "backtest": {
                "period": { "start": "2025-01", "end": "2025-04", "months": 4 },
                "returns": { "strategy_return_pct": 8.4, "buy_hold_return_pct": 5.1, "excess_return_pct": 3.3 },
                "metrics": { "win_rate_pct": 62.5, "sharpe_ratio": 1.1, "max_drawdown_pct": -7.5, "total_trades": 4, "correct_trades": 3 },
                "history": [
                    { "date": "2025-01", "allocation": 70, "correct": true, "strategy_value": 100.0, "buyhold_value": 100.0, "bond_value": 100.0 },
                    { "date": "2025-02", "allocation": 40, "correct": false, "strategy_value": 103.0, "buyhold_value": 98.0, "bond_value": 100.3 },
                    { "date": "2025-03", "allocation": 60, "correct": true, "strategy_value": 106.0, "buyhold_value": 101.0, "bond_value": 100.6 },
                    { "date": "2025-04", "allocation": 80, "correct": true, "strategy_value": 108.4, "buyhold_value": 105.1, "bond_value": 100.9 }
                ]
            },
            "model_info": { "type": "ML Ensemble (XGB + RF + GB)", "ticker": "^SET50" }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: serde_json::Value) -> Snapshot {
        serde_json::from_value(value).expect("fixture parses")
    }

    #[test]
    fn full_document_parses_with_all_sections() {
        let snapshot = parse(fixtures::document());
        let prediction = snapshot.prediction.as_ref().unwrap();

        assert_eq!(prediction.label, MarketLabel::Bullish);
        assert_eq!(prediction.confidence_pct(), 68.0);
        assert_eq!(prediction.weather_icon(), Some("☀️"));
        assert_eq!(prediction.trend.as_ref().unwrap().momentum.three_months, 4.5);
        assert!(prediction
            .trend
            .as_ref()
            .and_then(|trend| trend.comparison.as_ref())
            .unwrap()
            .favours_equity());
        assert_eq!(
            prediction.multi_fund.as_ref().unwrap().moderate.get(Fund::PeaE),
            40.0
        );
        assert!(prediction
            .ml_details
            .as_ref()
            .unwrap()
            .individual_models["xgb"]
            .is_bullish());
        assert_eq!(snapshot.backtest.as_ref().unwrap().history().unwrap().len(), 4);
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn optional_sections_may_be_missing() {
        let snapshot = parse(serde_json::json!({
            "updated_at": "2026-10-18 09:00:00",
            "prediction": { "prediction": "Neutral", "probability": 0.5 },
            "backtest": null,
            "model_info": { "type": "ML Ensemble", "ticker": "^SET50" }
        }));

        let prediction = snapshot.prediction.as_ref().unwrap();
        assert!(prediction.trend.is_none());
        assert!(prediction.multi_fund.is_none());
        assert!(snapshot.backtest.is_none());
        assert_eq!(snapshot.timestamp_source(), "2026-10-18 09:00:00");
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn outperformance_prefers_current_name_then_legacy_then_zero() {
        let mut returns = BacktestReturns {
            strategy_return_pct: 8.0,
            buy_hold_return_pct: 5.0,
            outperformance_pct: Some(3.0),
            excess_return_pct: Some(2.5),
        };
        assert_eq!(returns.outperformance_pct(), 3.0);

        returns.outperformance_pct = None;
        assert_eq!(returns.outperformance_pct(), 2.5);

        returns.excess_return_pct = None;
        assert_eq!(returns.outperformance_pct(), 0.0);
    }

    #[test]
    fn every_fixture_profile_sums_to_one_hundred() {
        let snapshot = parse(fixtures::document());
        let multi_fund = snapshot.prediction.unwrap().multi_fund.unwrap();
        for profile in Profile::ALL {
            let total = multi_fund.vector(profile).total();
            assert!((total - 100.0).abs() <= ALLOCATION_SUM_TOLERANCE);
        }
    }

    #[test]
    fn allocation_vector_rejects_bad_sums_and_ranges() {
        let off_by_two = AllocationVector::new(30.0, 40.0, 20.0, 12.0);
        assert!(matches!(
            off_by_two.validate(Profile::Moderate),
            Err(LoadError::Parse(_))
        ));

        let rounding = AllocationVector::new(33.0, 33.0, 33.0, 0.0);
        assert!(rounding.validate(Profile::Moderate).is_ok());

        let negative = AllocationVector::new(110.0, -10.0, 0.0, 0.0);
        assert!(negative.validate(Profile::Aggressive).is_err());
    }

    #[test]
    fn unordered_history_is_rejected() {
        let mut document = fixtures::document();
        document["backtest"]["history"][1]["date"] = "2024-12".into();
        let snapshot = parse(document);
        assert!(matches!(snapshot.validate(), Err(LoadError::Parse(_))));
    }

    #[test]
    fn probability_out_of_range_is_rejected() {
        let mut document = fixtures::document();
        document["prediction"]["probability"] = 1.4.into();
        assert!(parse(document).validate().is_err());
    }
}
