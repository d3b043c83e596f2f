//! Cards that make up the dashboard. Each one paints values that were already
//! derived by the engine; none of them hold snapshot state of their own.

use dioxus::prelude::*;

use crate::core::config::ChartFrame;
use crate::core::format::{
    format_compact, format_number, format_signed_compact, format_whole_percent,
};
use crate::dashboard::allocation::{
    circumference, AllocationProfileEngine, Fund, Profile, TwoFundSplit, DONUT_RADIUS,
};
use crate::dashboard::series::{allocation_timeline, BacktestChart, ChartSeries, TimelineBar};
use crate::snapshot::model::{
    Backtest, MarketLabel, MlDetails, MlFeatures, ModelInfo, ModelVote, Prediction, TrendInfo,
};
use crate::t;

fn label_text(label: MarketLabel) -> String {
    match label {
        MarketLabel::Bullish => t!("label-bullish"),
        MarketLabel::Bearish => t!("label-bearish"),
        MarketLabel::Neutral => t!("label-neutral"),
    }
}

fn series_label(series: ChartSeries) -> String {
    match series {
        ChartSeries::Strategy => t!("chart-series-strategy"),
        ChartSeries::BuyHold => t!("chart-series-buy-hold"),
        ChartSeries::Bond => t!("chart-series-bond"),
    }
}

fn sign_class(value: f64) -> &'static str {
    if value >= 0.0 {
        "value--up"
    } else {
        "value--down"
    }
}

#[component]
pub fn UpdatedLine(display: String, age: String) -> Element {
    let text = if age.is_empty() {
        t!("updated-at", time = display.clone())
    } else {
        t!("updated-at-age", time = display.clone(), age = age.clone())
    };
    rsx! {
        div { class: "dashboard__updated", aria_live: "polite", "{text}" }
    }
}

#[component]
pub fn PredictionHero(prediction: Prediction, confidence: i64) -> Element {
    let tone = if prediction.label.is_bullish() {
        "hero--bull"
    } else {
        "hero--bear"
    };
    let weather = prediction.weather.clone().unwrap_or_default();
    let icon = prediction.weather_icon().map(str::to_string);

    rsx! {
        section { class: "hero {tone}", aria_label: t!("section-prediction"),
            if let Some(icon) = icon {
                div { class: "hero__weather", role: "img", aria_label: "{weather}", "{icon}" }
            }
            if let Some(date) = prediction.date.as_ref() {
                p { class: "hero__date", "{date}" }
            }
            h2 { class: "hero__label", {label_text(prediction.label)} }
            if let Some(action) = prediction.action.as_ref() {
                p { class: "hero__action", "{action}" }
            }
            div { class: "hero__confidence",
                span { class: "hero__dot", aria_hidden: "true" }
                span { aria_live: "polite", {t!("confidence", value = confidence)} }
            }
        }
    }
}

#[component]
pub fn TrendCard(trend: TrendInfo) -> Element {
    let momentum = [
        (t!("momentum-1m"), trend.momentum.one_month),
        (t!("momentum-3m"), trend.momentum.three_months),
        (t!("momentum-6m"), trend.momentum.six_months),
    ];
    let score = format_compact(trend.trend_score);

    rsx! {
        section { class: "card trend", aria_label: t!("section-trend"),
            div { class: "trend__header",
                div { class: "trend__name",
                    if let Some(icon) = trend.trend_icon.as_ref() {
                        span { class: "trend__icon", "{icon}" }
                    }
                    if let Some(name) = trend.trend.as_ref() {
                        span { "{name}" }
                    }
                }
                div { class: "trend__score", {t!("trend-score", score = score)} }
            }
            if let Some(comparison) = trend.comparison.as_ref() {
                div {
                    class: if comparison.favours_equity() { "trend__advice trend__advice--equity" } else { "trend__advice trend__advice--bond" },
                    span { class: "trend__recommendation",
                        if comparison.favours_equity() { "💎 " } else { "🛡️ " }
                        "{comparison.recommendation}"
                    }
                    p { class: "trend__reason", "{comparison.reason}" }
                }
            }
            div { class: "trend__momentum",
                for (label, value) in momentum {
                    span {
                        key: "{label}",
                        class: "pill {sign_class(value)}",
                        "{label}: {format_signed_compact(value)}"
                    }
                }
            }
        }
    }
}

#[component]
pub fn ProfileAllocation(
    engine: AllocationProfileEngine,
    on_select: EventHandler<Profile>,
) -> Element {
    let selected = engine.selected();
    let ring = circumference(DONUT_RADIUS);

    rsx! {
        section { class: "card allocation", aria_label: t!("section-allocation"),
            h3 { class: "allocation__title",
                span { aria_hidden: "true", "📊" }
                span { {t!("allocation-title")} }
                span { class: "muted", {t!("allocation-hint")} }
            }
            div { class: "profile-tabs", role: "group",
                for profile in Profile::ALL {
                    button {
                        key: "{profile.key()}",
                        r#type: "button",
                        class: if profile == selected { "profile-tab profile-tab--active" } else { "profile-tab" },
                        aria_pressed: profile == selected,
                        onclick: move |_| on_select.call(profile),
                        div { class: "profile-tab__name",
                            span { "{profile.icon()}" }
                            span { {profile.name()} }
                        }
                        div { class: "profile-tab__desc", {profile.description()} }
                    }
                }
            }
            div { class: "fund-bars",
                for bar in engine.bars() {
                    div { key: "{bar.fund.code()}", class: "fund-bar",
                        div { class: "fund-bar__label",
                            span { "{bar.fund.icon()}" }
                            span { "{bar.fund.code()}" }
                            span { class: "muted", "({bar.fund.name()})" }
                            span {
                                class: "fund-bar__value",
                                style: "color: {bar.fund.color()}",
                                "{format_compact(bar.percentage)}%"
                            }
                        }
                        div { class: "fund-bar__track",
                            div {
                                class: "fund-bar__fill",
                                style: "width: {bar.width_pct}%; background-color: {bar.fund.color()};",
                            }
                        }
                    }
                }
            }
            div { class: "donut",
                svg { class: "donut__ring", view_box: "0 0 100 100",
                    for arc in engine.arcs(ring) {
                        circle {
                            key: "{arc.fund.code()}",
                            cx: "50",
                            cy: "50",
                            r: "{DONUT_RADIUS}",
                            fill: "none",
                            stroke: "{arc.fund.color()}",
                            stroke_width: "20",
                            stroke_dasharray: "{arc.dash_array()}",
                            stroke_dashoffset: "{arc.dash_offset()}",
                        }
                    }
                }
                div { class: "donut__center",
                    div { class: "donut__icon", "{selected.icon()}" }
                    div { class: "donut__caption", {selected.name()} }
                }
            }
            div { class: "legend",
                for entry in engine.legend() {
                    div { key: "{entry.fund.code()}", class: "legend__item",
                        span { class: "legend__swatch", style: "background-color: {entry.fund.color()}" }
                        span { "{entry.fund.code()}" }
                        span { class: "muted", "{format_compact(entry.percentage)}%" }
                    }
                }
            }
            p { class: "allocation__note", {t!("allocation-note")} }
        }
    }
}

/// Equity/bond donut; arcs follow the animated numbers.
#[component]
pub fn TwoFundAllocation(split: TwoFundSplit, equity: i64, bond: i64) -> Element {
    let ring = circumference(DONUT_RADIUS);
    let animated = TwoFundSplit {
        equity_pct: equity as f64,
        bond_pct: bond as f64,
    };
    let summary = format!(
        "{} {}% {} {}%",
        Fund::PeaE.code(),
        format_compact(split.equity_pct),
        Fund::PeaF.code(),
        format_compact(split.bond_pct)
    );

    rsx! {
        section { class: "card allocation allocation--legacy", aria_label: t!("section-allocation"),
            div { class: "donut donut--legacy", role: "img", aria_label: "{summary}",
                svg { class: "donut__ring", view_box: "0 0 100 100",
                    circle { class: "donut__track", cx: "50", cy: "50", r: "{DONUT_RADIUS}", fill: "none", stroke_width: "12" }
                    for arc in animated.arcs(ring) {
                        circle {
                            key: "{arc.fund.code()}",
                            cx: "50",
                            cy: "50",
                            r: "{DONUT_RADIUS}",
                            fill: "none",
                            stroke: "{arc.fund.color()}",
                            stroke_width: "12",
                            stroke_linecap: "round",
                            stroke_dasharray: "{arc.dash_array()}",
                            stroke_dashoffset: "{arc.dash_offset()}",
                        }
                    }
                }
                div { class: "donut__center",
                    span { class: "muted", {t!("allocation-split")} }
                }
            }
            div { class: "legend legend--stacked",
                for (fund, value) in [(Fund::PeaE, equity), (Fund::PeaF, bond)] {
                    div { key: "{fund.code()}", class: "legend__item",
                        span { class: "legend__swatch", style: "background-color: {fund.color()}" }
                        span { "{fund.code()}" }
                        span { class: "muted", "({fund.name()})" }
                        span { class: "legend__value", style: "color: {fund.color()}", aria_live: "polite", "{format_whole_percent(value)}" }
                    }
                }
            }
        }
    }
}

#[component]
pub fn BacktestCard(backtest: Backtest, win_rate: i64, frame: ChartFrame) -> Element {
    let chart = backtest
        .history()
        .and_then(|history| BacktestChart::from_history(history, frame));
    let timeline = backtest.history().map(allocation_timeline).unwrap_or_default();
    let strategy = backtest.returns.strategy_return_pct;
    let outperformance = backtest.returns.outperformance_pct();

    rsx! {
        section { class: "backtest", aria_label: t!("section-backtest"),
            p { class: "section-caption", {t!("backtest-title")} }
            div { class: "stats",
                div { class: "stat", tabindex: "0",
                    div { class: "stat__value", "{format_whole_percent(win_rate)}" }
                    div { class: "stat__label", {t!("stat-win-rate")} }
                }
                div { class: "stat", tabindex: "0",
                    div { class: "stat__value {sign_class(strategy)}", "{format_signed_compact(strategy)}" }
                    div { class: "stat__label", {t!("stat-return")} }
                }
                div { class: "stat", tabindex: "0",
                    div { class: "stat__value", "{format_number(backtest.metrics.sharpe_ratio, 2)}" }
                    div { class: "stat__label", {t!("stat-sharpe")} }
                }
                div { class: "stat", tabindex: "0",
                    div { class: "stat__value {sign_class(outperformance)}", "{format_signed_compact(outperformance)}" }
                    div { class: "stat__label", {t!("stat-outperformance")} }
                }
            }
            if let Some(chart) = chart {
                BacktestChartView { chart }
            }
            if !timeline.is_empty() {
                AllocationTimeline { bars: timeline }
            }
        }
    }
}

#[component]
fn BacktestChartView(chart: BacktestChart) -> Element {
    let view_box = format!("0 0 {} {}", chart.frame.width, chart.frame.height);
    let mid = chart.midline_y();
    let width = chart.frame.width;
    let caption = t!(
        "chart-caption",
        months = chart.months,
        from = chart.first_date.clone(),
        to = chart.last_date.clone()
    );

    rsx! {
        div { class: "chart",
            p { class: "chart__caption", "{caption}" }
            div { class: "chart__body",
                svg {
                    class: "chart__plot",
                    view_box: "{view_box}",
                    preserve_aspect_ratio: "none",
                    line { class: "chart__grid", x1: "0", y1: "{mid}", x2: "{width}", y2: "{mid}" }
                    for line in chart.lines.iter() {
                        polyline {
                            key: "{line.series.label_key()}",
                            fill: "none",
                            stroke: "{line.series.color()}",
                            stroke_width: "2",
                            stroke_dasharray: line.series.dash(),
                            points: "{line.polyline.svg_points()}",
                        }
                    }
                }
                div { class: "chart__end-labels",
                    for line in chart.lines.iter() {
                        span {
                            key: "{line.series.label_key()}",
                            class: "chart__end-label",
                            style: "color: {line.series.color()}",
                            "{format_compact(line.final_value)}"
                        }
                    }
                }
            }
            div { class: "chart__legend",
                for series in ChartSeries::ALL {
                    span { key: "{series.label_key()}", class: "chart__legend-item",
                        span {
                            class: if series.dash().is_some() { "chart__swatch chart__swatch--dashed" } else { "chart__swatch" },
                            style: "background-color: {series.color()}",
                        }
                        span { {series_label(series)} }
                    }
                }
            }
        }
    }
}

#[component]
fn AllocationTimeline(bars: Vec<TimelineBar>) -> Element {
    rsx! {
        div { class: "timeline",
            p { class: "timeline__caption", {t!("timeline-title")} }
            div { class: "timeline__bars",
                for (index, bar) in bars.iter().enumerate() {
                    div { key: "{index}", class: "timeline__column",
                        div {
                            class: if bar.correct { "timeline__bar timeline__bar--hit" } else { "timeline__bar timeline__bar--miss" },
                            style: "height: {bar.height_px}px",
                            if bar.show_value {
                                span { "{format_compact(bar.allocation_pct)}" }
                            }
                        }
                        div { class: "timeline__tick", "{bar.tick}" }
                    }
                }
            }
            div { class: "timeline__legend",
                span { span { class: "timeline__key timeline__key--hit" } {t!("timeline-hit")} }
                span { span { class: "timeline__key timeline__key--miss" } {t!("timeline-miss")} }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Up,
    Down,
    Cool,
    Hot,
    Plain,
}

impl Tone {
    fn class(self) -> &'static str {
        match self {
            Tone::Up => "value--up",
            Tone::Down => "value--down",
            Tone::Cool => "value--cool",
            Tone::Hot => "value--hot",
            Tone::Plain => "",
        }
    }

    fn of_sign(value: f64) -> Self {
        if value >= 0.0 {
            Tone::Up
        } else {
            Tone::Down
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct FeatureCell {
    label: String,
    value: String,
    tone: Tone,
}

const RSI_OVERSOLD: f64 = 35.0;
const RSI_OVERBOUGHT: f64 = 65.0;
const DRAWDOWN_WARNING_PCT: f64 = -5.0;

fn rsi_tone(rsi: f64) -> Tone {
    if rsi < RSI_OVERSOLD {
        Tone::Cool
    } else if rsi > RSI_OVERBOUGHT {
        Tone::Hot
    } else {
        Tone::Plain
    }
}

fn feature_cells(features: &MlFeatures) -> Vec<FeatureCell> {
    vec![
        FeatureCell {
            label: t!("feature-rsi"),
            value: format_compact(features.rsi_6),
            tone: rsi_tone(features.rsi_6),
        },
        FeatureCell {
            label: t!("feature-return-3m"),
            value: format_signed_compact(features.return_3m),
            tone: Tone::of_sign(features.return_3m),
        },
        FeatureCell {
            label: t!("feature-volatility"),
            value: format!("{}%", format_compact(features.volatility_3m)),
            tone: Tone::Plain,
        },
        FeatureCell {
            label: t!("feature-return-1m"),
            value: format_signed_compact(features.return_1m),
            tone: Tone::of_sign(features.return_1m),
        },
        FeatureCell {
            label: t!("feature-price-sma"),
            value: format_signed_compact(features.price_sma6_ratio),
            tone: Tone::of_sign(features.price_sma6_ratio),
        },
        FeatureCell {
            label: t!("feature-drawdown"),
            value: format!("{}%", format_compact(features.drawdown)),
            tone: if features.drawdown >= DRAWDOWN_WARNING_PCT {
                Tone::Up
            } else {
                Tone::Down
            },
        },
    ]
}

/// Display name for the producer's short model keys.
fn model_display_name(key: &str) -> &str {
    match key {
        "xgb" => "XGBoost",
        "rf" => "Random Forest",
        "gb" => "Gradient Boosting",
        other => other,
    }
}

/// One model's vote, ready for display.
#[derive(Debug, Clone, PartialEq)]
struct VoteRow {
    name: String,
    bullish: bool,
    confidence_pct: f64,
}

impl VoteRow {
    fn new(key: &str, vote: &ModelVote) -> Self {
        Self {
            name: model_display_name(key).to_string(),
            bullish: vote.is_bullish(),
            confidence_pct: (vote.confidence * 100.0).round(),
        }
    }
}

#[component]
pub fn DetailsPanel(
    features: MlFeatures,
    #[props(!optional)] details: Option<MlDetails>,
    #[props(!optional)] backtest: Option<Backtest>,
) -> Element {
    let mut open = use_signal(|| false);
    let cells = feature_cells(&features);
    let votes: Vec<VoteRow> = details
        .map(|details| {
            details
                .individual_models
                .iter()
                .map(|(key, vote)| VoteRow::new(key, vote))
                .collect()
        })
        .unwrap_or_default();

    rsx! {
        section { class: "details",
            button {
                r#type: "button",
                class: "details__toggle",
                aria_expanded: open(),
                onclick: move |_| open.toggle(),
                span { class: if open() { "details__dot details__dot--open" } else { "details__dot" } }
                span { {t!("details-toggle")} }
                span { class: if open() { "details__chevron details__chevron--open" } else { "details__chevron" }, "⌄" }
            }
            if open() {
                div { class: "details__body",
                    div { class: "details__group", aria_label: t!("details-features"),
                        p { class: "section-caption", {t!("details-features")} }
                        div { class: "feature-grid",
                            for cell in cells {
                                div { key: "{cell.label}", class: "feature",
                                    div { class: "feature__label", "{cell.label}" }
                                    div { class: "feature__value {cell.tone.class()}", "{cell.value}" }
                                }
                            }
                        }
                    }
                    if !votes.is_empty() {
                        div { class: "details__group", aria_label: t!("details-votes"),
                            p { class: "section-caption", {t!("details-votes")} }
                            for row in votes {
                                div { key: "{row.name}", class: "vote",
                                    span { class: "vote__name", "{row.name}" }
                                    div { class: "vote__track",
                                        div {
                                            class: if row.bullish { "vote__fill vote__fill--up" } else { "vote__fill vote__fill--down" },
                                            style: "width: {row.confidence_pct}%",
                                        }
                                    }
                                    span {
                                        class: if row.bullish { "vote__verdict value--cool" } else { "vote__verdict value--hot" },
                                        if row.bullish { {t!("vote-up")} } else { {t!("vote-down")} }
                                        " {row.confidence_pct}%"
                                    }
                                }
                            }
                        }
                    }
                    if let Some(backtest) = backtest {
                        BacktestDetails { backtest }
                    }
                }
            }
        }
    }
}

fn optional_count(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "—".to_string())
}

#[component]
fn BacktestDetails(backtest: Backtest) -> Element {
    let buy_hold = backtest.returns.buy_hold_return_pct;
    rsx! {
        div { class: "details__group", aria_label: t!("details-backtest"),
            p { class: "section-caption", {t!("details-backtest")} }
            div { class: "detail-grid",
                div { class: "detail",
                    span { class: "detail__label", {t!("detail-months")} }
                    span { class: "detail__value", "{optional_count(backtest.metrics.total_trades)}" }
                }
                div { class: "detail",
                    span { class: "detail__label", {t!("detail-correct")} }
                    span { class: "detail__value", "{optional_count(backtest.metrics.correct_trades)}" }
                }
                div { class: "detail",
                    span { class: "detail__label", {t!("detail-max-drawdown")} }
                    span { class: "detail__value value--down", "{format_compact(backtest.metrics.max_drawdown_pct)}%" }
                }
                div { class: "detail",
                    span { class: "detail__label", {t!("detail-buy-hold")} }
                    span { class: "detail__value {sign_class(buy_hold)}", "{format_signed_compact(buy_hold)}" }
                }
            }
        }
    }
}

#[component]
pub fn Footer(model_info: ModelInfo) -> Element {
    let model = model_info
        .model_type
        .clone()
        .unwrap_or_else(|| "ML Ensemble".to_string());
    let ticker = model_info.ticker.clone().unwrap_or_else(|| "^SET50".to_string());
    let (equity, bond) = (Fund::PeaE, Fund::PeaF);

    rsx! {
        footer { class: "dashboard__footer",
            p { class: "muted", {t!("footer-disclaimer")} }
            div { class: "footer__about",
                p { class: "footer__heading", {t!("footer-about")} }
                p { {t!("footer-model", model = model)} }
                p { {t!("footer-basis", ticker = ticker)} }
                p {
                    span { style: "color: {equity.color()}", "{equity.code()}" }
                    " = "
                    {t!("footer-fund-equity")}
                }
                p {
                    span { style: "color: {bond.color()}", "{bond.code()}" }
                    " = "
                    {t!("footer-fund-bond")}
                }
            }
        }
    }
}

#[component]
pub fn LoadingSkeleton() -> Element {
    rsx! {
        div { class: "skeleton", role: "status", aria_label: t!("state-loading"),
            div { class: "skeleton__line skeleton__line--title" }
            div { class: "skeleton__circle" }
            div { class: "skeleton__line" }
            div { class: "skeleton__ring" }
            span { class: "visually-hidden", {t!("state-loading")} }
        }
    }
}

#[component]
pub fn ErrorPanel(message: String, on_retry: EventHandler<()>) -> Element {
    rsx! {
        div { class: "state-panel", role: "alert",
            p { class: "state-panel__message", "{message}" }
            button {
                r#type: "button",
                class: "button button--ghost",
                aria_label: t!("retry-label"),
                onclick: move |_| on_retry.call(()),
                {t!("retry")}
            }
        }
    }
}

#[component]
pub fn NoDataPanel(
    #[props(!optional)] message: Option<String>,
    on_retry: EventHandler<()>,
) -> Element {
    rsx! {
        div { class: "state-panel",
            p { class: "state-panel__message", {t!("state-no-data")} }
            if let Some(message) = message {
                code { class: "state-panel__detail", "{message}" }
            }
            button {
                r#type: "button",
                class: "button button--ghost",
                onclick: move |_| on_retry.call(()),
                {t!("retry")}
            }
        }
    }
}
